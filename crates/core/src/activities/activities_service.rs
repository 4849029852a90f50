use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    validate_activity, Activity, ActivityRecord, ActivityRepositoryTrait, ActivityServiceTrait,
    ActivityUpdate, ActivityValidationConfig, ActivityWriteResult, BulkUpsertResult,
    CalorieCalculationReport, NewActivityInput, ValidationFlags,
};
use crate::activity_types::ActivityTypeRepositoryTrait;
use crate::calories::{
    is_calorie_override_suspicious, CalorieCalculation, CalorieService,
    DEFAULT_SUSPICION_THRESHOLD,
};
use crate::errors::{Error, Result, ValidationError};
use crate::owners::OwnerRepositoryTrait;

pub const ACTIVITY_NOT_FOUND: &str = "ACTIVITY_NOT_FOUND";
pub const ACTIVITY_OWNER_MISMATCH: &str = "ACTIVITY_OWNER_MISMATCH";

fn activity_not_found() -> Error {
    Error::not_found(ACTIVITY_NOT_FOUND, "Activity not found")
}

/// Whole minutes between `start` and `end`, rounded half up.
pub fn compute_duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    let millis = (end - start).num_milliseconds();
    let minutes = (millis + 30_000).div_euclid(60_000);
    minutes.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

pub fn ensure_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start >= end {
        return Err(ValidationError::InvalidTimeRange.into());
    }
    Ok(())
}

fn ensure_positive_duration(duration_minutes: i32) -> Result<()> {
    if duration_minutes <= 0 {
        return Err(ValidationError::InvalidDuration.into());
    }
    Ok(())
}

fn suspicion_for(calc: &CalorieCalculation, calories_override: Option<Decimal>) -> bool {
    calories_override
        .map(|o| {
            is_calorie_override_suspicious(calc.calculated_calories, o, DEFAULT_SUSPICION_THRESHOLD)
        })
        .unwrap_or(false)
}

struct PreparedActivity {
    record: ActivityRecord,
    calculation: CalorieCalculation,
    flags: ValidationFlags,
}

pub struct ActivityService {
    repository: Arc<dyn ActivityRepositoryTrait>,
    calorie_service: CalorieService,
    validation_config: ActivityValidationConfig,
}

impl ActivityService {
    pub fn new(
        repository: Arc<dyn ActivityRepositoryTrait>,
        activity_type_repository: Arc<dyn ActivityTypeRepositoryTrait>,
        owner_repository: Arc<dyn OwnerRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            calorie_service: CalorieService::new(activity_type_repository, owner_repository),
            validation_config: ActivityValidationConfig::default(),
        }
    }

    pub fn with_validation_config(mut self, config: ActivityValidationConfig) -> Self {
        self.validation_config = config;
        self
    }

    fn get_owned(&self, owner_id: &str, id: &str) -> Result<Activity> {
        match self.repository.get_activity(id)? {
            Some(activity) if activity.owner_id == owner_id => Ok(activity),
            _ => Err(activity_not_found()),
        }
    }

    /// Range and duration checks, calorie calculation and soft flags for a
    /// create-shaped input.
    fn prepare_new(&self, owner_id: &str, input: &NewActivityInput) -> Result<PreparedActivity> {
        input.validate()?;
        ensure_time_range(input.start_time, input.end_time)?;
        let duration_minutes = input
            .duration_minutes
            .unwrap_or_else(|| compute_duration_minutes(input.start_time, input.end_time));
        ensure_positive_duration(duration_minutes)?;

        let calculation = self.calorie_service.calculate_for_owner(
            owner_id,
            &input.activity_type_id,
            duration_minutes,
            input.calories_override,
        )?;
        let flags = validate_activity(
            input.start_time,
            input.end_time,
            duration_minutes,
            calculation.calculated_calories,
            &self.validation_config,
        );

        let record = ActivityRecord {
            id: input
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            owner_id: owner_id.to_string(),
            activity_type_id: input.activity_type_id.clone(),
            start_time: input.start_time,
            end_time: input.end_time,
            duration_minutes,
            calories_burned: calculation.calculated_calories,
            calories_override: input.calories_override,
            notes: input.notes.clone(),
        };

        Ok(PreparedActivity {
            record,
            calculation,
            flags,
        })
    }

    fn write_result(
        activity: Activity,
        calculation: CalorieCalculation,
        flags: ValidationFlags,
    ) -> ActivityWriteResult {
        let is_suspicious_override = suspicion_for(&calculation, activity.calories_override);
        ActivityWriteResult {
            activity,
            validation_flags: flags,
            calorie_calculation: CalorieCalculationReport {
                calculation,
                is_suspicious_override,
            },
        }
    }
}

#[async_trait]
impl ActivityServiceTrait for ActivityService {
    fn get_activity(&self, owner_id: &str, id: &str) -> Result<Activity> {
        self.get_owned(owner_id, id)
    }

    fn list_activities(&self, owner_id: &str) -> Result<Vec<Activity>> {
        self.repository.list_activities_for_owner(owner_id)
    }

    async fn create_activity(
        &self,
        owner_id: &str,
        input: NewActivityInput,
    ) -> Result<ActivityWriteResult> {
        let prepared = self.prepare_new(owner_id, &input)?;
        let created = self.repository.create_activity(prepared.record).await?;
        debug!("Activity created: {} for owner {}", created.id, owner_id);
        Ok(Self::write_result(
            created,
            prepared.calculation,
            prepared.flags,
        ))
    }

    async fn update_activity(
        &self,
        owner_id: &str,
        id: &str,
        update: ActivityUpdate,
    ) -> Result<ActivityWriteResult> {
        update.validate()?;
        let existing = self.get_owned(owner_id, id)?;

        let start_time = update.start_time.unwrap_or(existing.start_time);
        let end_time = update.end_time.unwrap_or(existing.end_time);
        ensure_time_range(start_time, end_time)?;

        let times_changed = update.start_time.is_some() || update.end_time.is_some();
        let duration_minutes = match update.duration_minutes {
            Some(d) => d,
            None if times_changed => compute_duration_minutes(start_time, end_time),
            None => existing.duration_minutes,
        };
        ensure_positive_duration(duration_minutes)?;

        let activity_type_id = update
            .activity_type_id
            .clone()
            .unwrap_or_else(|| existing.activity_type_id.clone());
        let calories_override = match update.calories_override {
            Some(value) => value,
            None => existing.calories_override,
        };
        let notes = match update.notes {
            Some(value) => value,
            None => existing.notes.clone(),
        };

        let calculation = self.calorie_service.calculate_for_owner(
            owner_id,
            &activity_type_id,
            duration_minutes,
            calories_override,
        )?;
        let flags = validate_activity(
            start_time,
            end_time,
            duration_minutes,
            calculation.calculated_calories,
            &self.validation_config,
        );

        let updated = self
            .repository
            .update_activity(ActivityRecord {
                id: existing.id,
                owner_id: existing.owner_id,
                activity_type_id,
                start_time,
                end_time,
                duration_minutes,
                calories_burned: calculation.calculated_calories,
                calories_override,
                notes,
            })
            .await?;
        debug!("Activity updated: {}", id);
        Ok(Self::write_result(updated, calculation, flags))
    }

    async fn delete_activity(&self, owner_id: &str, id: &str) -> Result<()> {
        let existing = self.get_owned(owner_id, id)?;
        self.repository.delete_activity(existing.id).await?;
        debug!("Activity deleted: {}", id);
        Ok(())
    }

    async fn bulk_upsert_activities(
        &self,
        owner_id: &str,
        items: Vec<NewActivityInput>,
    ) -> Result<Vec<BulkUpsertResult>> {
        let mut records = Vec::with_capacity(items.len());
        let mut temp_ids = Vec::with_capacity(items.len());
        for item in &items {
            let prepared = self.prepare_new(owner_id, item)?;
            temp_ids.push((prepared.record.id.clone(), item.client_temp_id.clone()));
            records.push(prepared.record);
        }

        let actions: HashMap<String, _> = self
            .repository
            .bulk_upsert_activities(records)
            .await?
            .into_iter()
            .collect();

        let results = temp_ids
            .into_iter()
            .map(|(id, client_temp_id)| {
                let action = actions.get(&id).copied().ok_or_else(|| {
                    Error::Unexpected(format!("No upsert result returned for activity {}", id))
                })?;
                Ok(BulkUpsertResult {
                    id,
                    client_temp_id,
                    action,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "Bulk upsert of {} activities for owner {}",
            results.len(),
            owner_id
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::UpsertAction;
    use crate::test_support::InMemoryStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const OWNER: &str = "0b7c2f1e-4a55-4c0e-9d53-7d5b3c1f2a10";
    const OTHER_OWNER: &str = "5a1d9e64-31f2-4d8b-8a7c-0e9f6b2d4c33";

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryStore>, ActivityService, String) {
        let store = Arc::new(InMemoryStore::default());
        let type_id = store.seed_activity_type("Running", dec!(8.0));
        store.seed_profile(OWNER, dec!(70));
        store.seed_profile(OTHER_OWNER, dec!(60));
        let service = ActivityService::new(store.clone(), store.clone(), store.clone());
        (store, service, type_id)
    }

    fn input(type_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> NewActivityInput {
        NewActivityInput {
            id: None,
            activity_type_id: type_id.to_string(),
            start_time: start,
            end_time: end,
            duration_minutes: None,
            calories_override: None,
            notes: None,
            client_temp_id: None,
        }
    }

    #[test]
    fn duration_rounds_to_nearest_minute() {
        let start = at(10, 0);
        assert_eq!(
            compute_duration_minutes(start, start + chrono::Duration::seconds(89)),
            1
        );
        assert_eq!(
            compute_duration_minutes(start, start + chrono::Duration::seconds(90)),
            2
        );
    }

    #[tokio::test]
    async fn create_rejects_inverted_or_empty_time_range() {
        let (_store, service, type_id) = setup();

        let err = service
            .create_activity(OWNER, input(&type_id, at(11, 0), at(10, 0)))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "INVALID_TIME_RANGE");

        let err = service
            .create_activity(OWNER, input(&type_id, at(10, 0), at(10, 0)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_TIME_RANGE");
    }

    #[tokio::test]
    async fn create_rejects_sub_minute_activity() {
        let (_store, service, type_id) = setup();
        let start = at(10, 0);
        let err = service
            .create_activity(
                OWNER,
                input(&type_id, start, start + chrono::Duration::seconds(20)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_DURATION");
    }

    #[tokio::test]
    async fn create_derives_duration_and_calories() {
        let (_store, service, type_id) = setup();
        let mut new_activity = input(&type_id, at(10, 0), at(11, 0));
        new_activity.calories_override = Some(dec!(700));

        let result = service
            .create_activity(OWNER, new_activity)
            .await
            .expect("create");

        assert_eq!(result.activity.duration_minutes, 60);
        assert_eq!(result.activity.calories_burned, dec!(560.00));
        assert_eq!(result.activity.effective_calories(), dec!(700));
        assert!(result.validation_flags.is_empty());
        assert!(result.calorie_calculation.is_suspicious_override);
    }

    #[tokio::test]
    async fn update_can_clear_override_and_recompute_duration() {
        let (_store, service, type_id) = setup();
        let mut new_activity = input(&type_id, at(10, 0), at(11, 0));
        new_activity.calories_override = Some(dec!(600));
        let created = service
            .create_activity(OWNER, new_activity)
            .await
            .expect("create")
            .activity;

        let result = service
            .update_activity(
                OWNER,
                &created.id,
                ActivityUpdate {
                    end_time: Some(at(10, 30)),
                    calories_override: Some(None),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        assert_eq!(result.activity.duration_minutes, 30);
        assert_eq!(result.activity.calories_override, None);
        assert_eq!(result.activity.calories_burned, dec!(280.00));
        assert!(!result.calorie_calculation.is_suspicious_override);
    }

    #[tokio::test]
    async fn other_owners_activity_is_not_found() {
        let (_store, service, type_id) = setup();
        let created = service
            .create_activity(OWNER, input(&type_id, at(10, 0), at(11, 0)))
            .await
            .expect("create")
            .activity;

        let err = service.get_activity(OTHER_OWNER, &created.id).unwrap_err();
        assert_eq!(err.code(), ACTIVITY_NOT_FOUND);

        let err = service
            .delete_activity(OTHER_OWNER, &created.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(service.get_activity(OWNER, &created.id).is_ok());
    }

    #[tokio::test]
    async fn bulk_upsert_reports_created_then_updated() {
        let (_store, service, type_id) = setup();
        let id = Uuid::new_v4().to_string();
        let mut item = input(&type_id, at(7, 0), at(7, 45));
        item.id = Some(id.clone());
        item.client_temp_id = Some("tmp-1".to_string());

        let first = service
            .bulk_upsert_activities(OWNER, vec![item.clone()])
            .await
            .expect("first upsert");
        assert_eq!(first[0].action, UpsertAction::Created);
        assert_eq!(first[0].client_temp_id.as_deref(), Some("tmp-1"));

        item.notes = Some("felt good".to_string());
        let second = service
            .bulk_upsert_activities(OWNER, vec![item])
            .await
            .expect("second upsert");
        assert_eq!(second[0].id, id);
        assert_eq!(second[0].action, UpsertAction::Updated);
        assert_eq!(service.list_activities(OWNER).expect("list").len(), 1);
    }

    #[tokio::test]
    async fn bulk_upsert_rejects_rows_of_other_owner() {
        let (_store, service, type_id) = setup();
        let id = Uuid::new_v4().to_string();
        let mut item = input(&type_id, at(7, 0), at(8, 0));
        item.id = Some(id);

        service
            .bulk_upsert_activities(OWNER, vec![item.clone()])
            .await
            .expect("seed");
        let err = service
            .bulk_upsert_activities(OTHER_OWNER, vec![item])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ACTIVITY_OWNER_MISMATCH);
        assert_eq!(err.status_code(), 409);
    }
}
