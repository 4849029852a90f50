use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use fitlog_core::activity_types::{ActivityType, ActivityTypeRepositoryTrait, NewActivityType};
use fitlog_core::errors::{DatabaseError, Error};
use fitlog_core::Result;

use super::model::ActivityTypeDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{is_foreign_key_violation, StorageError};
use crate::schema::activity_types;
use crate::utils::{decimal_to_db, now_to_db};

pub struct ActivityTypeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ActivityTypeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ActivityTypeRepository { pool, writer }
    }
}

#[async_trait]
impl ActivityTypeRepositoryTrait for ActivityTypeRepository {
    fn get_activity_type(&self, id: &str) -> Result<Option<ActivityType>> {
        let mut conn = get_connection(&self.pool)?;
        activity_types::table
            .find(id)
            .select(ActivityTypeDB::as_select())
            .first::<ActivityTypeDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(ActivityType::try_from)
            .transpose()
    }

    fn list_activity_types(&self) -> Result<Vec<ActivityType>> {
        let mut conn = get_connection(&self.pool)?;
        activity_types::table
            .order_by(activity_types::name.asc())
            .select(ActivityTypeDB::as_select())
            .load::<ActivityTypeDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(ActivityType::try_from)
            .collect()
    }

    async fn create_activity_type(&self, new_type: NewActivityType) -> Result<ActivityType> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ActivityType> {
                let row = ActivityTypeDB {
                    id: new_type.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    name: new_type.name,
                    met: decimal_to_db(&new_type.met),
                    description: new_type.description,
                    created_at: now_to_db(),
                };
                let created = diesel::insert_into(activity_types::table)
                    .values(&row)
                    .returning(ActivityTypeDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                ActivityType::try_from(created)
            })
            .await
    }

    async fn update_activity_type(&self, updated: ActivityType) -> Result<ActivityType> {
        let row = ActivityTypeDB::from(&updated);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ActivityType> {
                let stored = diesel::update(activity_types::table.find(row.id.clone()))
                    .set((
                        activity_types::name.eq(&row.name),
                        activity_types::met.eq(&row.met),
                        activity_types::description.eq(&row.description),
                    ))
                    .returning(ActivityTypeDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                ActivityType::try_from(stored)
            })
            .await
    }

    async fn delete_activity_type(&self, id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                diesel::delete(activity_types::table.find(&id))
                    .execute(conn)
                    .map_err(|e| {
                        if is_foreign_key_violation(&e) {
                            Error::Database(DatabaseError::ChildRecords(format!(
                                "Activity type {} is used by logged activities",
                                id
                            )))
                        } else {
                            StorageError::from(e).into()
                        }
                    })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, write_actor::spawn_writer};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn setup_repo() -> ActivityTypeRepository {
        let app_data = tempdir()
            .expect("tempdir")
            .keep()
            .to_string_lossy()
            .to_string();
        let db_path = init(&app_data).expect("init db");
        run_migrations(&db_path).expect("migrate db");
        let pool = create_pool(&db_path).expect("create pool");
        let writer = spawn_writer(pool.as_ref().clone());
        ActivityTypeRepository::new(pool, writer)
    }

    fn new_type(name: &str, met: rust_decimal::Decimal) -> NewActivityType {
        NewActivityType {
            id: None,
            name: name.to_string(),
            met,
            description: None,
        }
    }

    #[tokio::test]
    async fn list_is_ordered_by_name_and_keeps_decimal_met() {
        let repo = setup_repo();
        repo.create_activity_type(new_type("Swimming", dec!(6.0)))
            .await
            .expect("create");
        repo.create_activity_type(new_type("Cycling", dec!(7.5)))
            .await
            .expect("create");

        let types = repo.list_activity_types().expect("list");
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Cycling", "Swimming"]);
        assert_eq!(types[0].met, dec!(7.5));
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let repo = setup_repo();
        repo.create_activity_type(new_type("Rowing", dec!(7.0)))
            .await
            .expect("create");
        let err = repo
            .create_activity_type(new_type("Rowing", dec!(6.0)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DB_DUPLICATE");
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = setup_repo();
        let created = repo
            .create_activity_type(new_type("Hiking", dec!(6.0)))
            .await
            .expect("create");

        let updated = repo
            .update_activity_type(ActivityType {
                met: dec!(6.5),
                description: Some("with pack".to_string()),
                ..created.clone()
            })
            .await
            .expect("update");
        assert_eq!(updated.met, dec!(6.5));
        assert_eq!(updated.created_at, created.created_at);

        assert_eq!(
            repo.delete_activity_type(created.id.clone())
                .await
                .expect("delete"),
            1
        );
        assert!(repo.get_activity_type(&created.id).expect("get").is_none());
    }
}
