use diesel::prelude::*;
use diesel::SqliteConnection;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use fitlog_core::owners::parse_owner_id;
use fitlog_core::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::client_settings;
use crate::utils::now_to_db;

pub const OWNER_ID_SETTING_KEY: &str = "owner_id";

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::client_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct ClientSettingDB {
    setting_key: String,
    setting_value: String,
    updated_at: String,
}

fn read_setting(conn: &mut SqliteConnection, key: &str) -> Result<Option<String>> {
    Ok(client_settings::table
        .find(key)
        .select(client_settings::setting_value)
        .first::<String>(conn)
        .optional()
        .map_err(StorageError::from)?)
}

fn write_setting(conn: &mut SqliteConnection, key: &str, value: &str) -> Result<()> {
    let row = ClientSettingDB {
        setting_key: key.to_string(),
        setting_value: value.to_string(),
        updated_at: now_to_db(),
    };
    diesel::insert_into(client_settings::table)
        .values(&row)
        .on_conflict(client_settings::setting_key)
        .do_update()
        .set((
            client_settings::setting_value.eq(&row.setting_value),
            client_settings::updated_at.eq(&row.updated_at),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

/// Anonymous owner id generated on first use and reused afterwards.
pub struct ClientIdentityRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ClientIdentityRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub fn get_owner_id(&self) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        read_setting(&mut conn, OWNER_ID_SETTING_KEY)
    }

    pub async fn get_or_create_owner_id(&self) -> Result<String> {
        self.writer
            .exec(|conn| {
                if let Some(existing) = read_setting(conn, OWNER_ID_SETTING_KEY)? {
                    return Ok(existing);
                }
                let owner_id = Uuid::new_v4().to_string();
                write_setting(conn, OWNER_ID_SETTING_KEY, &owner_id)?;
                info!("Generated new local owner id {}", owner_id);
                Ok(owner_id)
            })
            .await
    }

    /// Stores a caller-supplied owner id. It must be a UUID.
    pub async fn set_owner_id(&self, owner_id: &str) -> Result<String> {
        let owner_id = parse_owner_id(Some(owner_id))?;
        self.writer
            .exec(move |conn| {
                write_setting(conn, OWNER_ID_SETTING_KEY, &owner_id)?;
                Ok(owner_id)
            })
            .await
    }

    pub async fn clear_owner_id(&self) -> Result<()> {
        self.writer
            .exec(|conn| {
                diesel::delete(client_settings::table.find(OWNER_ID_SETTING_KEY))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
