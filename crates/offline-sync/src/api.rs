//! Typed endpoints of the fitlog REST API.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use fitlog_core::activities::{
    Activity, ActivityUpdate, ActivityWriteResult, BulkUpsertResult, NewActivityInput,
};
use fitlog_core::activity_types::{ActivityType, ActivityTypeUpdate, NewActivityType};
use fitlog_core::dashboard::{
    ActivityTypeBreakdown, DailyStats, DashboardSummary, MonthlyStats, WeeklyStats,
};
use fitlog_core::owners::{OwnerProfile, OwnerProfileInput};
use log::debug;

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::*;

const PROFILE_PATH: &str = "/api/v1/owners/profile";
const ACTIVITY_TYPES_PATH: &str = "/api/v1/activity-types";
const ACTIVITIES_PATH: &str = "/api/v1/activities";
const DASHBOARD_PATH: &str = "/api/v1/dashboard";

/// Appends the present parameters as a URL-encoded query string.
fn with_query(path: &str, params: &[(&str, Option<String>)]) -> String {
    let query = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

fn date_param(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn instant_param(instant: Option<DateTime<Utc>>) -> Option<String> {
    instant.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl ApiClient {
    // ─────────────────────────────────────────────────────────────────────────
    // Owner profile
    // ─────────────────────────────────────────────────────────────────────────

    /// GET /api/v1/owners/profile
    pub async fn get_profile(&self) -> Result<OwnerProfile> {
        let response: ProfileResponse = self.get(PROFILE_PATH).await?;
        Ok(response.profile)
    }

    /// PUT /api/v1/owners/profile
    pub async fn upsert_profile(&self, input: &OwnerProfileInput) -> Result<OwnerProfile> {
        let response: ProfileResponse = self.put(PROFILE_PATH, input).await?;
        Ok(response.profile)
    }

    /// DELETE /api/v1/owners/profile
    pub async fn delete_profile(&self) -> Result<()> {
        self.delete(PROFILE_PATH).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activity types
    // ─────────────────────────────────────────────────────────────────────────

    /// GET /api/v1/activity-types
    pub async fn list_activity_types(&self) -> Result<Vec<ActivityType>> {
        let response: ActivityTypesResponse = self.get(ACTIVITY_TYPES_PATH).await?;
        Ok(response.activity_types)
    }

    /// GET /api/v1/activity-types/{id}
    pub async fn get_activity_type(&self, id: &str) -> Result<ActivityType> {
        let path = format!("{}/{}", ACTIVITY_TYPES_PATH, urlencoding::encode(id));
        let response: ActivityTypeResponse = self.get(&path).await?;
        Ok(response.activity_type)
    }

    /// POST /api/v1/activity-types
    pub async fn create_activity_type(&self, input: &NewActivityType) -> Result<ActivityType> {
        let response: ActivityTypeResponse = self.post(ACTIVITY_TYPES_PATH, input).await?;
        Ok(response.activity_type)
    }

    /// PUT /api/v1/activity-types/{id}
    pub async fn update_activity_type(
        &self,
        id: &str,
        update: &ActivityTypeUpdate,
    ) -> Result<ActivityType> {
        let path = format!("{}/{}", ACTIVITY_TYPES_PATH, urlencoding::encode(id));
        let response: ActivityTypeResponse = self.put(&path, update).await?;
        Ok(response.activity_type)
    }

    /// DELETE /api/v1/activity-types/{id}
    pub async fn delete_activity_type(&self, id: &str) -> Result<()> {
        let path = format!("{}/{}", ACTIVITY_TYPES_PATH, urlencoding::encode(id));
        self.delete(&path).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activities
    // ─────────────────────────────────────────────────────────────────────────

    /// List the owner's activities, newest first.
    ///
    /// GET /api/v1/activities
    pub async fn list_activities(&self) -> Result<Vec<Activity>> {
        let response: ActivitiesResponse = self.get(ACTIVITIES_PATH).await?;
        Ok(response.activities)
    }

    /// GET /api/v1/activities/{id}
    pub async fn get_activity(&self, id: &str) -> Result<Activity> {
        let path = format!("{}/{}", ACTIVITIES_PATH, urlencoding::encode(id));
        let response: ActivityResponse = self.get(&path).await?;
        Ok(response.activity)
    }

    /// POST /api/v1/activities
    pub async fn create_activity(&self, input: &NewActivityInput) -> Result<ActivityWriteResult> {
        debug!(
            "[OfflineSync] Creating activity of type {}",
            input.activity_type_id
        );
        self.post(ACTIVITIES_PATH, input).await
    }

    /// PUT /api/v1/activities/{id}
    pub async fn update_activity(
        &self,
        id: &str,
        update: &ActivityUpdate,
    ) -> Result<ActivityWriteResult> {
        let path = format!("{}/{}", ACTIVITIES_PATH, urlencoding::encode(id));
        self.put(&path, update).await
    }

    /// DELETE /api/v1/activities/{id}
    pub async fn delete_activity(&self, id: &str) -> Result<()> {
        let path = format!("{}/{}", ACTIVITIES_PATH, urlencoding::encode(id));
        self.delete(&path).await
    }

    /// Insert-or-update a batch atomically on the server.
    ///
    /// POST /api/v1/activities/bulk-upsert
    pub async fn bulk_upsert_activities(
        &self,
        items: &[NewActivityInput],
    ) -> Result<Vec<BulkUpsertResult>> {
        let path = format!("{}/bulk-upsert", ACTIVITIES_PATH);
        let response: BulkUpsertResponse = self.post(&path, items).await?;
        Ok(response.results)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dashboard
    // ─────────────────────────────────────────────────────────────────────────

    /// Daily, weekly and monthly stats around `date` plus the month's
    /// per-type breakdown. The server defaults to today.
    ///
    /// GET /api/v1/dashboard?date=YYYY-MM-DD
    pub async fn dashboard(&self, date: Option<NaiveDate>) -> Result<DashboardSummary> {
        let path = with_query(DASHBOARD_PATH, &[("date", date_param(date))]);
        self.get(&path).await
    }

    /// GET /api/v1/dashboard/daily?date=YYYY-MM-DD
    pub async fn daily_stats(&self, date: Option<NaiveDate>) -> Result<DailyStats> {
        let base = format!("{}/daily", DASHBOARD_PATH);
        let path = with_query(&base, &[("date", date_param(date))]);
        let response: DailyResponse = self.get(&path).await?;
        Ok(response.daily)
    }

    /// GET /api/v1/dashboard/weekly?date=YYYY-MM-DD
    pub async fn weekly_stats(&self, date: Option<NaiveDate>) -> Result<WeeklyStats> {
        let base = format!("{}/weekly", DASHBOARD_PATH);
        let path = with_query(&base, &[("date", date_param(date))]);
        let response: WeeklyResponse = self.get(&path).await?;
        Ok(response.weekly)
    }

    /// GET /api/v1/dashboard/monthly?date=YYYY-MM-DD
    pub async fn monthly_stats(&self, date: Option<NaiveDate>) -> Result<MonthlyStats> {
        let base = format!("{}/monthly", DASHBOARD_PATH);
        let path = with_query(&base, &[("date", date_param(date))]);
        let response: MonthlyResponse = self.get(&path).await?;
        Ok(response.monthly)
    }

    /// GET /api/v1/dashboard/breakdown?from=...&to=...
    pub async fn activity_type_breakdown(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityTypeBreakdown>> {
        let base = format!("{}/breakdown", DASHBOARD_PATH);
        let path = with_query(
            &base,
            &[("from", instant_param(from)), ("to", instant_param(to))],
        );
        let response: BreakdownResponse = self.get(&path).await?;
        Ok(response.breakdown)
    }
}
