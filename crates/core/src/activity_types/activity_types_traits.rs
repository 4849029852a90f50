use async_trait::async_trait;

use super::{ActivityType, ActivityTypeUpdate, NewActivityType};
use crate::errors::Result;

#[async_trait]
pub trait ActivityTypeRepositoryTrait: Send + Sync {
    fn get_activity_type(&self, id: &str) -> Result<Option<ActivityType>>;
    /// All activity types ordered by name.
    fn list_activity_types(&self) -> Result<Vec<ActivityType>>;
    async fn create_activity_type(&self, new_type: NewActivityType) -> Result<ActivityType>;
    async fn update_activity_type(&self, updated: ActivityType) -> Result<ActivityType>;
    async fn delete_activity_type(&self, id: String) -> Result<usize>;
}

#[async_trait]
pub trait ActivityTypeServiceTrait: Send + Sync {
    fn get_activity_type(&self, id: &str) -> Result<ActivityType>;
    fn list_activity_types(&self) -> Result<Vec<ActivityType>>;
    async fn create_activity_type(&self, new_type: NewActivityType) -> Result<ActivityType>;
    async fn update_activity_type(
        &self,
        id: &str,
        update: ActivityTypeUpdate,
    ) -> Result<ActivityType>;
    async fn delete_activity_type(&self, id: &str) -> Result<()>;
}
