use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::{OwnerProfile, OwnerProfileInput, OwnerProfileServiceTrait, OwnerRepositoryTrait};
use crate::errors::{Error, Result};

pub const PROFILE_NOT_FOUND: &str = "PROFILE_NOT_FOUND";

pub(crate) fn profile_not_found() -> Error {
    Error::not_found(PROFILE_NOT_FOUND, "Owner profile not found")
}

pub struct OwnerProfileService {
    repository: Arc<dyn OwnerRepositoryTrait>,
}

impl OwnerProfileService {
    pub fn new(repository: Arc<dyn OwnerRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl OwnerProfileServiceTrait for OwnerProfileService {
    fn get_profile(&self, owner_id: &str) -> Result<OwnerProfile> {
        self.repository
            .get_profile(owner_id)?
            .ok_or_else(profile_not_found)
    }

    async fn upsert_profile(
        &self,
        owner_id: &str,
        input: OwnerProfileInput,
    ) -> Result<OwnerProfile> {
        input.validate()?;
        let profile = self
            .repository
            .upsert_profile(owner_id.to_string(), input)
            .await?;
        debug!("Profile upserted for owner {}", owner_id);
        Ok(profile)
    }

    async fn delete_profile(&self, owner_id: &str) -> Result<()> {
        let affected = self.repository.delete_profile(owner_id.to_string()).await?;
        if affected == 0 {
            return Err(profile_not_found());
        }
        Ok(())
    }
}
