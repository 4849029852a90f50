use diesel::prelude::*;

use fitlog_core::activities::{Activity, ActivityRecord};
use fitlog_core::Result;

use crate::utils::{
    datetime_from_db, datetime_to_db, decimal_from_db, decimal_to_db, optional_decimal_from_db,
};

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::activities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ActivityDB {
    pub id: String,
    pub owner_id: String,
    pub activity_type_id: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i32,
    pub calories_burned: String,
    pub calories_override: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Mutable columns written on update.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::activities)]
#[diesel(treat_none_as_null = true)]
pub struct ActivityChangesDB {
    pub activity_type_id: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i32,
    pub calories_burned: String,
    pub calories_override: Option<String>,
    pub notes: Option<String>,
    pub updated_at: String,
}

impl ActivityDB {
    pub fn from_record(record: &ActivityRecord, now: &str) -> Self {
        ActivityDB {
            id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            activity_type_id: record.activity_type_id.clone(),
            start_time: datetime_to_db(&record.start_time),
            end_time: datetime_to_db(&record.end_time),
            duration_minutes: record.duration_minutes,
            calories_burned: decimal_to_db(&record.calories_burned),
            calories_override: record.calories_override.as_ref().map(decimal_to_db),
            notes: record.notes.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

impl ActivityChangesDB {
    pub fn from_record(record: &ActivityRecord, now: &str) -> Self {
        ActivityChangesDB {
            activity_type_id: record.activity_type_id.clone(),
            start_time: datetime_to_db(&record.start_time),
            end_time: datetime_to_db(&record.end_time),
            duration_minutes: record.duration_minutes,
            calories_burned: decimal_to_db(&record.calories_burned),
            calories_override: record.calories_override.as_ref().map(decimal_to_db),
            notes: record.notes.clone(),
            updated_at: now.to_string(),
        }
    }
}

impl TryFrom<ActivityDB> for Activity {
    type Error = fitlog_core::Error;

    fn try_from(row: ActivityDB) -> Result<Self> {
        Ok(Activity {
            start_time: datetime_from_db(&row.start_time)?,
            end_time: datetime_from_db(&row.end_time)?,
            calories_burned: decimal_from_db(&row.calories_burned)?,
            calories_override: optional_decimal_from_db(row.calories_override.as_deref())?,
            created_at: datetime_from_db(&row.created_at)?,
            updated_at: datetime_from_db(&row.updated_at)?,
            id: row.id,
            owner_id: row.owner_id,
            activity_type_id: row.activity_type_id,
            duration_minutes: row.duration_minutes,
            notes: row.notes,
        })
    }
}
