use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::activities::Activity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub total_calories: Decimal,
    #[serde(alias = "totalDuration")]
    pub total_duration_minutes: i64,
    #[serde(alias = "activitiesCount")]
    pub activity_count: i64,
}

impl PeriodTotals {
    pub fn add(&mut self, activity: &Activity) {
        self.total_calories += activity.effective_calories();
        self.total_duration_minutes += i64::from(activity.duration_minutes);
        self.activity_count += 1;
    }

    pub fn from_activities<'a>(activities: impl IntoIterator<Item = &'a Activity>) -> Self {
        let mut totals = Self::default();
        for activity in activities {
            totals.add(activity);
        }
        totals
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 instant, taken as its UTC day.
fn deserialize_calendar_date<'de, D>(
    deserializer: D,
) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc).date_naive())
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

/// `week_end` is exclusive: the Sunday after the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub daily: Vec<DailyStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub month_start: DateTime<Utc>,
    pub month_end: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub weekly: Vec<WeeklyStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypeBreakdown {
    pub activity_type_id: String,
    pub activity_type_name: String,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub daily: DailyStats,
    pub weekly: WeeklyStats,
    pub monthly: MonthlyStats,
    pub breakdown: Vec<ActivityTypeBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn daily_stats_accept_backend_field_names_and_instant_dates() {
        let daily: DailyStats = serde_json::from_value(json!({
            "date": "2024-03-05T00:00:00.000Z",
            "totalCalories": 350.5,
            "totalDuration": 45,
            "activitiesCount": 2
        }))
        .expect("decode");
        assert_eq!(daily.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(daily.totals.total_calories, dec!(350.5));
        assert_eq!(daily.totals.total_duration_minutes, 45);
        assert_eq!(daily.totals.activity_count, 2);
    }

    #[test]
    fn daily_stats_round_trip_plain_dates() {
        let daily = DailyStats {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            totals: PeriodTotals {
                total_calories: dec!(120),
                total_duration_minutes: 30,
                activity_count: 1,
            },
        };
        let value = serde_json::to_value(&daily).expect("encode");
        assert_eq!(value["date"], "2024-03-05");
        assert_eq!(value["totalDurationMinutes"], 30);
        let decoded: DailyStats = serde_json::from_value(value).expect("decode");
        assert_eq!(decoded, daily);
    }

    #[test]
    fn daily_stats_reject_garbage_dates() {
        let result = serde_json::from_value::<DailyStats>(json!({
            "date": "yesterday",
            "totalCalories": 0,
            "totalDurationMinutes": 0,
            "activityCount": 0
        }));
        assert!(result.is_err());
    }
}
