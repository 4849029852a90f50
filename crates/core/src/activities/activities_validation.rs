use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Soft warnings attached to a write. They never block it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
}

impl ValidationFlags {
    pub fn is_empty(&self) -> bool {
        self.duration.is_none() && self.time_range.is_none() && self.calories.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityValidationConfig {
    pub min_calories: Decimal,
    pub max_calories: Decimal,
}

impl Default for ActivityValidationConfig {
    fn default() -> Self {
        Self {
            min_calories: dec!(0),
            max_calories: dec!(10000),
        }
    }
}

pub fn validate_activity(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration_minutes: i32,
    calories_burned: Decimal,
    config: &ActivityValidationConfig,
) -> ValidationFlags {
    let mut flags = ValidationFlags::default();

    if duration_minutes <= 0 {
        flags.duration = Some("Duration must be greater than 0".to_string());
    }
    if start_time >= end_time {
        flags.time_range = Some("Start time must be before end time".to_string());
    }
    if calories_burned < config.min_calories || calories_burned > config.max_calories {
        flags.calories = Some(format!(
            "Calories should be between {} and {}",
            config.min_calories, config.max_calories
        ));
    }

    flags
}
