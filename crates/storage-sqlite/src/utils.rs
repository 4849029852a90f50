//! Column encodings. Decimals are stored as text; instants as RFC 3339 UTC
//! with millisecond precision, which keeps them lexically ordered.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use fitlog_core::Result;

use crate::errors::StorageError;

pub(crate) fn datetime_to_db(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn now_to_db() -> String {
    datetime_to_db(&Utc::now())
}

pub(crate) fn datetime_from_db(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidValue(format!("timestamp '{}': {}", value, e)).into())
}

pub(crate) fn decimal_to_db(value: &Decimal) -> String {
    value.to_string()
}

pub(crate) fn decimal_from_db(value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::InvalidValue(format!("decimal '{}': {}", value, e)).into())
}

pub(crate) fn optional_decimal_from_db(value: Option<&str>) -> Result<Option<Decimal>> {
    value.map(decimal_from_db).transpose()
}

pub(crate) fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

pub(crate) fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_str(&format!("\"{}\"", value))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fitlog_core::sync::HttpMethod;

    #[test]
    fn datetimes_round_trip_and_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap();
        assert_eq!(datetime_to_db(&early), "2024-03-06T09:00:00.000Z");
        assert!(datetime_to_db(&early) < datetime_to_db(&late));
        assert_eq!(datetime_from_db(&datetime_to_db(&late)).unwrap(), late);
    }

    #[test]
    fn enums_are_stored_without_quotes() {
        assert_eq!(enum_to_db(&HttpMethod::Patch).unwrap(), "PATCH");
        assert_eq!(
            enum_from_db::<HttpMethod>("DELETE").unwrap(),
            HttpMethod::Delete
        );
    }

    #[test]
    fn bad_decimal_is_an_error() {
        assert!(decimal_from_db("seventy").is_err());
        assert_eq!(optional_decimal_from_db(None).unwrap(), None);
    }
}
