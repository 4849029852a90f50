use diesel::prelude::*;

use fitlog_core::activity_types::ActivityType;
use fitlog_core::Result;

use crate::utils::{datetime_from_db, datetime_to_db, decimal_from_db, decimal_to_db};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::activity_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ActivityTypeDB {
    pub id: String,
    pub name: String,
    pub met: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl TryFrom<ActivityTypeDB> for ActivityType {
    type Error = fitlog_core::Error;

    fn try_from(row: ActivityTypeDB) -> Result<Self> {
        Ok(ActivityType {
            met: decimal_from_db(&row.met)?,
            created_at: datetime_from_db(&row.created_at)?,
            id: row.id,
            name: row.name,
            description: row.description,
        })
    }
}

impl From<&ActivityType> for ActivityTypeDB {
    fn from(value: &ActivityType) -> Self {
        ActivityTypeDB {
            id: value.id.clone(),
            name: value.name.clone(),
            met: decimal_to_db(&value.met),
            description: value.description.clone(),
            created_at: datetime_to_db(&value.created_at),
        }
    }
}
