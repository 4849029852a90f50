use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::calories::CalorieCalculation;
use crate::errors::{Error, Result};

use super::ValidationFlags;

pub const MAX_NOTES_LEN: usize = 255;
pub const MAX_CLIENT_TEMP_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub owner_id: String,
    pub activity_type_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub calories_burned: Decimal,
    pub calories_override: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Calories counted in totals: the override when present.
    pub fn effective_calories(&self) -> Decimal {
        self.calories_override.unwrap_or(self.calories_burned)
    }
}

/// Create request body. Also used for each bulk-upsert item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivityInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub activity_type_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_override: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_temp_id: Option<String>,
}

impl NewActivityInput {
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = &self.id {
            validate_uuid("id", id)?;
        }
        validate_uuid("activityTypeId", &self.activity_type_id)?;
        if matches!(self.duration_minutes, Some(d) if d <= 0) {
            return Err(Error::invalid_input(
                "durationMinutes",
                "Duration must be greater than 0",
            ));
        }
        validate_override(self.calories_override)?;
        validate_notes(self.notes.as_deref())?;
        if let Some(temp) = &self.client_temp_id {
            if temp.chars().count() > MAX_CLIENT_TEMP_ID_LEN {
                return Err(Error::invalid_input(
                    "clientTempId",
                    "Client temp id is too long",
                ));
            }
        }
        Ok(())
    }
}

/// Partial update. `calories_override` and `notes` distinguish "absent"
/// (outer `None`) from "set to null" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub calories_override: Option<Option<Decimal>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        self.activity_type_id.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.duration_minutes.is_none()
            && self.calories_override.is_none()
            && self.notes.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::invalid_input(
                "body",
                "At least one field must be provided",
            ));
        }
        if let Some(type_id) = &self.activity_type_id {
            validate_uuid("activityTypeId", type_id)?;
        }
        if matches!(self.duration_minutes, Some(d) if d <= 0) {
            return Err(Error::invalid_input(
                "durationMinutes",
                "Duration must be greater than 0",
            ));
        }
        validate_override(self.calories_override.flatten())?;
        validate_notes(self.notes.as_ref().and_then(|n| n.as_deref()))
    }
}

fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn validate_uuid(field: &str, value: &str) -> Result<()> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| Error::invalid_input(field, format!("Invalid {}", field)))
}

fn validate_override(value: Option<Decimal>) -> Result<()> {
    if matches!(value, Some(v) if v < Decimal::ZERO) {
        return Err(Error::invalid_input(
            "caloriesOverride",
            "Calories override cannot be negative",
        ));
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<()> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => {
            Err(Error::invalid_input("notes", "Notes are too long"))
        }
        _ => Ok(()),
    }
}

/// Fully resolved row handed to the repository for insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub id: String,
    pub owner_id: String,
    pub activity_type_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub calories_burned: Decimal,
    pub calories_override: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieCalculationReport {
    #[serde(flatten)]
    pub calculation: CalorieCalculation,
    pub is_suspicious_override: bool,
}

/// Response of a create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityWriteResult {
    pub activity: Activity,
    pub validation_flags: ValidationFlags,
    pub calorie_calculation: CalorieCalculationReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpsertResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_temp_id: Option<String>,
    pub action: UpsertAction,
}
