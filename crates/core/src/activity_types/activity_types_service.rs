use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::{
    ActivityType, ActivityTypeRepositoryTrait, ActivityTypeServiceTrait, ActivityTypeUpdate,
    NewActivityType,
};
use crate::errors::{Error, Result};

pub const ACTIVITY_TYPE_NOT_FOUND: &str = "ACTIVITY_TYPE_NOT_FOUND";

pub(crate) fn activity_type_not_found(id: &str) -> Error {
    Error::not_found(
        ACTIVITY_TYPE_NOT_FOUND,
        format!("Activity type not found: {}", id),
    )
}

pub struct ActivityTypeService {
    repository: Arc<dyn ActivityTypeRepositoryTrait>,
}

impl ActivityTypeService {
    pub fn new(repository: Arc<dyn ActivityTypeRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ActivityTypeServiceTrait for ActivityTypeService {
    fn get_activity_type(&self, id: &str) -> Result<ActivityType> {
        self.repository
            .get_activity_type(id)?
            .ok_or_else(|| activity_type_not_found(id))
    }

    fn list_activity_types(&self) -> Result<Vec<ActivityType>> {
        self.repository.list_activity_types()
    }

    async fn create_activity_type(&self, new_type: NewActivityType) -> Result<ActivityType> {
        new_type.validate()?;
        let created = self.repository.create_activity_type(new_type).await?;
        debug!("Activity type created: {}", created.id);
        Ok(created)
    }

    async fn update_activity_type(
        &self,
        id: &str,
        update: ActivityTypeUpdate,
    ) -> Result<ActivityType> {
        update.validate()?;
        let existing = self.get_activity_type(id)?;
        let updated = self
            .repository
            .update_activity_type(update.apply_to(&existing))
            .await?;
        debug!("Activity type updated: {}", id);
        Ok(updated)
    }

    async fn delete_activity_type(&self, id: &str) -> Result<()> {
        let affected = self.repository.delete_activity_type(id.to_string()).await?;
        if affected == 0 {
            return Err(activity_type_not_found(id));
        }
        Ok(())
    }
}
