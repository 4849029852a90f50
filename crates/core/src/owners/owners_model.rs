use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Error, Result, ValidationError};

pub const OWNER_ID_HEADER: &str = "x-owner-id";
pub const MAX_DISPLAY_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub owner_id: String,
    pub display_name: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub height_cm: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a profile upsert. Absent fields are stored as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfileInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<Decimal>,
}

impl OwnerProfileInput {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.display_name {
            if name.chars().count() > MAX_DISPLAY_NAME_LEN {
                return Err(Error::invalid_input(
                    "displayName",
                    "Display name is too long",
                ));
            }
        }
        if matches!(self.weight_kg, Some(w) if w <= Decimal::ZERO) {
            return Err(Error::invalid_input("weightKg", "Weight must be positive"));
        }
        if matches!(self.height_cm, Some(h) if h <= Decimal::ZERO) {
            return Err(Error::invalid_input("heightCm", "Height must be positive"));
        }
        Ok(())
    }
}

/// Validates the owner id carried by a request header.
///
/// The value must be a UUID; it is returned in canonical lowercase form.
pub fn parse_owner_id(raw: Option<&str>) -> Result<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Uuid::parse_str(v).ok())
        .map(|id| id.to_string())
        .ok_or(Error::Validation(ValidationError::OwnerIdRequired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_owner_id_accepts_uuid() {
        let id = "6F9619FF-8B86-D011-B42D-00C04FC964FF";
        assert_eq!(
            parse_owner_id(Some(id)).expect("valid"),
            "6f9619ff-8b86-d011-b42d-00c04fc964ff"
        );
    }

    #[test]
    fn parse_owner_id_rejects_missing_or_garbage() {
        for raw in [None, Some(""), Some("   "), Some("not-a-uuid")] {
            let err = parse_owner_id(raw).unwrap_err();
            assert_eq!(err.code(), "OWNER_ID_REQUIRED");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn profile_rejects_non_positive_weight() {
        let input = OwnerProfileInput {
            weight_kg: Some(dec!(0)),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let ok = OwnerProfileInput {
            weight_kg: Some(dec!(72.5)),
            height_cm: Some(dec!(180)),
            display_name: Some("Sam".to_string()),
        };
        assert!(ok.validate().is_ok());
    }
}
