use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use fitlog_core::sync::{NewQueuedRequest, OfflineQueueRepositoryTrait, QueuedRequest};
use fitlog_core::Result;

use super::model::OfflineQueueItemDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::offline_queue;

pub struct OfflineQueueRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OfflineQueueRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Current time, bumped past the newest queued item so that insertion order
/// and timestamp order agree even within one millisecond.
fn next_timestamp(conn: &mut SqliteConnection) -> Result<i64> {
    let newest: Option<i64> = offline_queue::table
        .select(max(offline_queue::timestamp))
        .first(conn)
        .map_err(StorageError::from)?;
    let now = Utc::now().timestamp_millis();
    Ok(match newest {
        Some(ts) if ts >= now => ts + 1,
        _ => now,
    })
}

#[async_trait]
impl OfflineQueueRepositoryTrait for OfflineQueueRepository {
    async fn add(&self, request: NewQueuedRequest) -> Result<String> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<String> {
                let item = QueuedRequest {
                    id: Uuid::new_v4().to_string(),
                    method: request.method,
                    url: request.url,
                    data: request.data,
                    timestamp: next_timestamp(conn)?,
                    retries: 0,
                };
                let row = OfflineQueueItemDB::try_from(&item)?;
                diesel::insert_into(offline_queue::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!(
                    "[OfflineQueue] Queued {} {} as {}",
                    item.method, item.url, item.id
                );
                Ok(item.id)
            })
            .await
    }

    fn list_sorted(&self) -> Result<Vec<QueuedRequest>> {
        let mut conn = get_connection(&self.pool)?;
        offline_queue::table
            .order_by((offline_queue::timestamp.asc(), offline_queue::id.asc()))
            .select(OfflineQueueItemDB::as_select())
            .load::<OfflineQueueItemDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(QueuedRequest::try_from)
            .collect()
    }

    fn get(&self, id: &str) -> Result<Option<QueuedRequest>> {
        let mut conn = get_connection(&self.pool)?;
        offline_queue::table
            .find(id)
            .select(OfflineQueueItemDB::as_select())
            .first::<OfflineQueueItemDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(QueuedRequest::try_from)
            .transpose()
    }

    async fn remove(&self, id: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(offline_queue::table.find(id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn increment_retries(&self, id: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(offline_queue::table.find(id))
                    .set(offline_queue::retries.eq(offline_queue::retries + 1))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(offline_queue::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn clear(&self) -> Result<()> {
        self.writer
            .exec(|conn| {
                let removed = diesel::delete(offline_queue::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("[OfflineQueue] Cleared {} item(s)", removed);
                Ok(())
            })
            .await
    }
}
