use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fitlog_core::sync::QueuedRequest;
use fitlog_core::Result;

use crate::utils::{enum_from_db, enum_to_db};

#[derive(
    Queryable, Identifiable, Insertable, Selectable, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::offline_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OfflineQueueItemDB {
    pub id: String,
    pub method: String,
    pub url: String,
    pub data: Option<String>,
    pub timestamp: i64,
    pub retries: i32,
}

impl TryFrom<OfflineQueueItemDB> for QueuedRequest {
    type Error = fitlog_core::Error;

    fn try_from(row: OfflineQueueItemDB) -> Result<Self> {
        Ok(QueuedRequest {
            method: enum_from_db(&row.method)?,
            id: row.id,
            url: row.url,
            data: row.data,
            timestamp: row.timestamp,
            retries: row.retries,
        })
    }
}

impl TryFrom<&QueuedRequest> for OfflineQueueItemDB {
    type Error = fitlog_core::Error;

    fn try_from(item: &QueuedRequest) -> Result<Self> {
        Ok(OfflineQueueItemDB {
            id: item.id.clone(),
            method: enum_to_db(&item.method)?,
            url: item.url.clone(),
            data: item.data.clone(),
            timestamp: item.timestamp,
            retries: item.retries,
        })
    }
}
