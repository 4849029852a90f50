use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    Activity, ActivityRecord, ActivityUpdate, ActivityWriteResult, BulkUpsertResult,
    NewActivityInput, UpsertAction,
};
use crate::errors::Result;

#[async_trait]
pub trait ActivityRepositoryTrait: Send + Sync {
    fn get_activity(&self, id: &str) -> Result<Option<Activity>>;
    /// Newest first by start time.
    fn list_activities_for_owner(&self, owner_id: &str) -> Result<Vec<Activity>>;
    /// Activities with `from <= start_time < to`, oldest first.
    fn list_activities_in_range(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>>;
    async fn create_activity(&self, record: ActivityRecord) -> Result<Activity>;
    async fn update_activity(&self, record: ActivityRecord) -> Result<Activity>;
    async fn delete_activity(&self, id: String) -> Result<usize>;
    /// Inserts or updates every record in one transaction. Fails the whole
    /// batch when an existing row belongs to another owner.
    async fn bulk_upsert_activities(
        &self,
        records: Vec<ActivityRecord>,
    ) -> Result<Vec<(String, UpsertAction)>>;
}

#[async_trait]
pub trait ActivityServiceTrait: Send + Sync {
    fn get_activity(&self, owner_id: &str, id: &str) -> Result<Activity>;
    fn list_activities(&self, owner_id: &str) -> Result<Vec<Activity>>;
    async fn create_activity(
        &self,
        owner_id: &str,
        input: NewActivityInput,
    ) -> Result<ActivityWriteResult>;
    async fn update_activity(
        &self,
        owner_id: &str,
        id: &str,
        update: ActivityUpdate,
    ) -> Result<ActivityWriteResult>;
    async fn delete_activity(&self, owner_id: &str, id: &str) -> Result<()>;
    async fn bulk_upsert_activities(
        &self,
        owner_id: &str,
        items: Vec<NewActivityInput>,
    ) -> Result<Vec<BulkUpsertResult>>;
}
