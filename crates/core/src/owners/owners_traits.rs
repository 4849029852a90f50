use async_trait::async_trait;

use super::{OwnerProfile, OwnerProfileInput};
use crate::errors::Result;

#[async_trait]
pub trait OwnerRepositoryTrait: Send + Sync {
    fn get_profile(&self, owner_id: &str) -> Result<Option<OwnerProfile>>;
    /// Creates the owner row when missing, then inserts or replaces the profile.
    async fn upsert_profile(
        &self,
        owner_id: String,
        input: OwnerProfileInput,
    ) -> Result<OwnerProfile>;
    async fn delete_profile(&self, owner_id: String) -> Result<usize>;
}

#[async_trait]
pub trait OwnerProfileServiceTrait: Send + Sync {
    fn get_profile(&self, owner_id: &str) -> Result<OwnerProfile>;
    async fn upsert_profile(&self, owner_id: &str, input: OwnerProfileInput)
        -> Result<OwnerProfile>;
    async fn delete_profile(&self, owner_id: &str) -> Result<()>;
}
