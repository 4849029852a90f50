use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use fitlog_core::activities::{
    Activity, ActivityRecord, ActivityRepositoryTrait, UpsertAction, ACTIVITY_OWNER_MISMATCH,
};
use fitlog_core::errors::Error;
use fitlog_core::Result;

use super::model::{ActivityChangesDB, ActivityDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::owners::ensure_owner;
use crate::schema::activities;
use crate::utils::{datetime_to_db, now_to_db};

fn load_rows(rows: Vec<ActivityDB>) -> Result<Vec<Activity>> {
    rows.into_iter().map(Activity::try_from).collect()
}

fn insert_record(conn: &mut SqliteConnection, record: &ActivityRecord) -> Result<ActivityDB> {
    ensure_owner(conn, &record.owner_id)?;
    let row = ActivityDB::from_record(record, &now_to_db());
    Ok(diesel::insert_into(activities::table)
        .values(&row)
        .returning(ActivityDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?)
}

fn update_record(conn: &mut SqliteConnection, record: &ActivityRecord) -> Result<ActivityDB> {
    let changes = ActivityChangesDB::from_record(record, &now_to_db());
    Ok(diesel::update(activities::table.find(&record.id))
        .set(&changes)
        .returning(ActivityDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?)
}

pub struct ActivityRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ActivityRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ActivityRepository { pool, writer }
    }
}

#[async_trait]
impl ActivityRepositoryTrait for ActivityRepository {
    fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        let mut conn = get_connection(&self.pool)?;
        activities::table
            .find(id)
            .select(ActivityDB::as_select())
            .first::<ActivityDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Activity::try_from)
            .transpose()
    }

    fn list_activities_for_owner(&self, owner_id: &str) -> Result<Vec<Activity>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = activities::table
            .filter(activities::owner_id.eq(owner_id))
            .order_by(activities::start_time.desc())
            .select(ActivityDB::as_select())
            .load::<ActivityDB>(&mut conn)
            .map_err(StorageError::from)?;
        load_rows(rows)
    }

    fn list_activities_in_range(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = activities::table
            .filter(activities::owner_id.eq(owner_id))
            .filter(activities::start_time.ge(datetime_to_db(&from)))
            .filter(activities::start_time.lt(datetime_to_db(&to)))
            .order_by(activities::start_time.asc())
            .select(ActivityDB::as_select())
            .load::<ActivityDB>(&mut conn)
            .map_err(StorageError::from)?;
        load_rows(rows)
    }

    async fn create_activity(&self, record: ActivityRecord) -> Result<Activity> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Activity> {
                Activity::try_from(insert_record(conn, &record)?)
            })
            .await
    }

    async fn update_activity(&self, record: ActivityRecord) -> Result<Activity> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Activity> {
                Activity::try_from(update_record(conn, &record)?)
            })
            .await
    }

    async fn delete_activity(&self, id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(activities::table.find(id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn bulk_upsert_activities(
        &self,
        records: Vec<ActivityRecord>,
    ) -> Result<Vec<(String, UpsertAction)>> {
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<Vec<(String, UpsertAction)>> {
                    let mut results = Vec::with_capacity(records.len());
                    for record in &records {
                        let existing_owner = activities::table
                            .find(&record.id)
                            .select(activities::owner_id)
                            .first::<String>(conn)
                            .optional()
                            .map_err(StorageError::from)?;

                        let action = match existing_owner {
                            Some(owner) if owner != record.owner_id => {
                                return Err(Error::conflict(
                                    ACTIVITY_OWNER_MISMATCH,
                                    format!("Activity owner mismatch for {}", record.id),
                                ));
                            }
                            Some(_) => {
                                update_record(conn, record)?;
                                UpsertAction::Updated
                            }
                            None => {
                                insert_record(conn, record)?;
                                UpsertAction::Created
                            }
                        };
                        results.push((record.id.clone(), action));
                    }
                    debug!("Bulk upserted {} activities", results.len());
                    Ok(results)
                },
            )
            .await
    }
}
