use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const MAX_ACTIVITY_TYPE_NAME_LEN: usize = 100;
pub const MAX_ACTIVITY_TYPE_DESCRIPTION_LEN: usize = 255;

/// A kind of activity with the metabolic equivalent used for calorie estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    pub id: String,
    pub name: String,
    pub met: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivityType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub met: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewActivityType {
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = &self.id {
            if uuid::Uuid::parse_str(id).is_err() {
                return Err(Error::invalid_input("id", "Invalid activity type ID"));
            }
        }
        validate_name(&self.name)?;
        validate_met(self.met)?;
        validate_description(self.description.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub met: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActivityTypeUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_none() && self.met.is_none() && self.description.is_none() {
            return Err(Error::invalid_input(
                "body",
                "At least one field must be provided",
            ));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(met) = self.met {
            validate_met(met)?;
        }
        validate_description(self.description.as_deref())
    }

    /// Applies the provided fields on top of `existing`.
    pub fn apply_to(&self, existing: &ActivityType) -> ActivityType {
        ActivityType {
            id: existing.id.clone(),
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            met: self.met.unwrap_or(existing.met),
            description: self
                .description
                .clone()
                .or_else(|| existing.description.clone()),
            created_at: existing.created_at,
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if len == 0 || len > MAX_ACTIVITY_TYPE_NAME_LEN {
        return Err(Error::invalid_input(
            "name",
            format!("Name must be 1-{} characters", MAX_ACTIVITY_TYPE_NAME_LEN),
        ));
    }
    Ok(())
}

fn validate_met(met: Decimal) -> Result<()> {
    if met <= Decimal::ZERO {
        return Err(Error::invalid_input("met", "MET must be greater than 0"));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    match description {
        Some(d) if d.chars().count() > MAX_ACTIVITY_TYPE_DESCRIPTION_LEN => Err(
            Error::invalid_input("description", "Description is too long"),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_positive_met() {
        let input = NewActivityType {
            id: None,
            name: "Yoga".to_string(),
            met: dec!(0),
            description: None,
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(ActivityTypeUpdate::default().validate().is_err());
    }

    #[test]
    fn update_keeps_unset_fields() {
        let existing = ActivityType {
            id: "t-1".to_string(),
            name: "Running".to_string(),
            met: dec!(8.0),
            description: Some("outdoor".to_string()),
            created_at: Utc::now(),
        };
        let update = ActivityTypeUpdate {
            met: Some(dec!(9.8)),
            ..Default::default()
        };
        let merged = update.apply_to(&existing);
        assert_eq!(merged.name, "Running");
        assert_eq!(merged.met, dec!(9.8));
        assert_eq!(merged.description.as_deref(), Some("outdoor"));
    }
}
