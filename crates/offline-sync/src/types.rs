//! Response envelopes returned by the fitlog backend.
//!
//! Every payload arrives wrapped in a single named field, e.g. `{ "activity": {...} }`.

use fitlog_core::activities::{Activity, BulkUpsertResult};
use fitlog_core::activity_types::ActivityType;
use fitlog_core::dashboard::{ActivityTypeBreakdown, DailyStats, MonthlyStats, WeeklyStats};
use fitlog_core::owners::OwnerProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: OwnerProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypesResponse {
    pub activity_types: Vec<ActivityType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypeResponse {
    pub activity_type: ActivityType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub activity: Activity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpsertResponse {
    pub results: Vec<BulkUpsertResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyResponse {
    pub daily: DailyStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyResponse {
    pub weekly: WeeklyStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyResponse {
    pub monthly: MonthlyStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownResponse {
    pub breakdown: Vec<ActivityTypeBreakdown>,
}
