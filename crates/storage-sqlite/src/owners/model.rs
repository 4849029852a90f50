use diesel::prelude::*;

use fitlog_core::owners::{Owner, OwnerProfile};
use fitlog_core::Result;

use crate::utils::{datetime_from_db, optional_decimal_from_db};

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::owners)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OwnerDB {
    pub id: String,
    pub created_at: String,
}

impl TryFrom<OwnerDB> for Owner {
    type Error = fitlog_core::Error;

    fn try_from(row: OwnerDB) -> Result<Self> {
        Ok(Owner {
            created_at: datetime_from_db(&row.created_at)?,
            id: row.id,
        })
    }
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(primary_key(owner_id))]
#[diesel(table_name = crate::schema::owner_profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OwnerProfileDB {
    pub owner_id: String,
    pub display_name: Option<String>,
    pub weight_kg: Option<String>,
    pub height_cm: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<OwnerProfileDB> for OwnerProfile {
    type Error = fitlog_core::Error;

    fn try_from(row: OwnerProfileDB) -> Result<Self> {
        Ok(OwnerProfile {
            weight_kg: optional_decimal_from_db(row.weight_kg.as_deref())?,
            height_cm: optional_decimal_from_db(row.height_cm.as_deref())?,
            created_at: datetime_from_db(&row.created_at)?,
            updated_at: datetime_from_db(&row.updated_at)?,
            owner_id: row.owner_id,
            display_name: row.display_name,
        })
    }
}
