use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use fitlog_core::owners::{Owner, OwnerProfile, OwnerProfileInput, OwnerRepositoryTrait};
use fitlog_core::Result;

use super::model::{OwnerDB, OwnerProfileDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{owner_profiles, owners};
use crate::utils::{decimal_to_db, now_to_db};

/// Inserts the owner row if it does not exist yet.
pub(crate) fn ensure_owner(conn: &mut SqliteConnection, owner_id: &str) -> Result<()> {
    diesel::insert_or_ignore_into(owners::table)
        .values(&OwnerDB {
            id: owner_id.to_string(),
            created_at: now_to_db(),
        })
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

pub struct OwnerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OwnerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        OwnerRepository { pool, writer }
    }

    pub fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>> {
        let mut conn = get_connection(&self.pool)?;
        owners::table
            .find(owner_id)
            .select(OwnerDB::as_select())
            .first::<OwnerDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Owner::try_from)
            .transpose()
    }
}

#[async_trait]
impl OwnerRepositoryTrait for OwnerRepository {
    fn get_profile(&self, owner_id: &str) -> Result<Option<OwnerProfile>> {
        let mut conn = get_connection(&self.pool)?;
        owner_profiles::table
            .find(owner_id)
            .select(OwnerProfileDB::as_select())
            .first::<OwnerProfileDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(OwnerProfile::try_from)
            .transpose()
    }

    async fn upsert_profile(
        &self,
        owner_id: String,
        input: OwnerProfileInput,
    ) -> Result<OwnerProfile> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<OwnerProfile> {
                ensure_owner(conn, &owner_id)?;

                let now = now_to_db();
                let row = OwnerProfileDB {
                    owner_id: owner_id.clone(),
                    display_name: input.display_name,
                    weight_kg: input.weight_kg.as_ref().map(decimal_to_db),
                    height_cm: input.height_cm.as_ref().map(decimal_to_db),
                    created_at: now.clone(),
                    updated_at: now,
                };

                diesel::insert_into(owner_profiles::table)
                    .values(&row)
                    .on_conflict(owner_profiles::owner_id)
                    .do_update()
                    .set((
                        owner_profiles::display_name.eq(&row.display_name),
                        owner_profiles::weight_kg.eq(&row.weight_kg),
                        owner_profiles::height_cm.eq(&row.height_cm),
                        owner_profiles::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let stored = owner_profiles::table
                    .find(&owner_id)
                    .select(OwnerProfileDB::as_select())
                    .first::<OwnerProfileDB>(conn)
                    .map_err(StorageError::from)?;
                OwnerProfile::try_from(stored)
            })
            .await
    }

    async fn delete_profile(&self, owner_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(owner_profiles::table.find(owner_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
