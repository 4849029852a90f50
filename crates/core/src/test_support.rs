//! In-memory repositories for service tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::activities::{
    Activity, ActivityRecord, ActivityRepositoryTrait, UpsertAction, ACTIVITY_OWNER_MISMATCH,
};
use crate::activity_types::{ActivityType, ActivityTypeRepositoryTrait, NewActivityType};
use crate::errors::{Error, Result};
use crate::owners::{OwnerProfile, OwnerProfileInput, OwnerRepositoryTrait};

#[derive(Default)]
pub struct InMemoryStore {
    activity_types: Mutex<HashMap<String, ActivityType>>,
    profiles: Mutex<HashMap<String, OwnerProfile>>,
    activities: Mutex<HashMap<String, Activity>>,
}

impl InMemoryStore {
    pub fn seed_activity_type(&self, name: &str, met: Decimal) -> String {
        let id = Uuid::new_v4().to_string();
        self.activity_types.lock().unwrap().insert(
            id.clone(),
            ActivityType {
                id: id.clone(),
                name: name.to_string(),
                met,
                description: None,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn seed_profile(&self, owner_id: &str, weight_kg: Decimal) {
        let now = Utc::now();
        self.profiles.lock().unwrap().insert(
            owner_id.to_string(),
            OwnerProfile {
                owner_id: owner_id.to_string(),
                display_name: None,
                weight_kg: Some(weight_kg),
                height_cm: None,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn seed_activity(
        &self,
        owner_id: &str,
        activity_type_id: &str,
        start_time: DateTime<Utc>,
        duration_minutes: i32,
        calories_burned: Decimal,
        calories_override: Option<Decimal>,
    ) -> String {
        let record = ActivityRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            activity_type_id: activity_type_id.to_string(),
            start_time,
            end_time: start_time + chrono::Duration::minutes(i64::from(duration_minutes)),
            duration_minutes,
            calories_burned,
            calories_override,
            notes: None,
        };
        let id = record.id.clone();
        self.put_activity(record, None);
        id
    }

    fn put_activity(&self, record: ActivityRecord, created_at: Option<DateTime<Utc>>) -> Activity {
        let now = Utc::now();
        let activity = Activity {
            id: record.id,
            owner_id: record.owner_id,
            activity_type_id: record.activity_type_id,
            start_time: record.start_time,
            end_time: record.end_time,
            duration_minutes: record.duration_minutes,
            calories_burned: record.calories_burned,
            calories_override: record.calories_override,
            notes: record.notes,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        };
        self.activities
            .lock()
            .unwrap()
            .insert(activity.id.clone(), activity.clone());
        activity
    }
}

#[async_trait]
impl ActivityTypeRepositoryTrait for InMemoryStore {
    fn get_activity_type(&self, id: &str) -> Result<Option<ActivityType>> {
        Ok(self.activity_types.lock().unwrap().get(id).cloned())
    }

    fn list_activity_types(&self) -> Result<Vec<ActivityType>> {
        let mut types: Vec<_> = self.activity_types.lock().unwrap().values().cloned().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn create_activity_type(&self, new_type: NewActivityType) -> Result<ActivityType> {
        let created = ActivityType {
            id: new_type.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_type.name,
            met: new_type.met,
            description: new_type.description,
            created_at: Utc::now(),
        };
        self.activity_types
            .lock()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_activity_type(&self, updated: ActivityType) -> Result<ActivityType> {
        self.activity_types
            .lock()
            .unwrap()
            .insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_activity_type(&self, id: String) -> Result<usize> {
        Ok(usize::from(
            self.activity_types.lock().unwrap().remove(&id).is_some(),
        ))
    }
}

#[async_trait]
impl OwnerRepositoryTrait for InMemoryStore {
    fn get_profile(&self, owner_id: &str) -> Result<Option<OwnerProfile>> {
        Ok(self.profiles.lock().unwrap().get(owner_id).cloned())
    }

    async fn upsert_profile(
        &self,
        owner_id: String,
        input: OwnerProfileInput,
    ) -> Result<OwnerProfile> {
        let now = Utc::now();
        let mut profiles = self.profiles.lock().unwrap();
        let created_at = profiles.get(&owner_id).map(|p| p.created_at).unwrap_or(now);
        let profile = OwnerProfile {
            owner_id: owner_id.clone(),
            display_name: input.display_name,
            weight_kg: input.weight_kg,
            height_cm: input.height_cm,
            created_at,
            updated_at: now,
        };
        profiles.insert(owner_id, profile.clone());
        Ok(profile)
    }

    async fn delete_profile(&self, owner_id: String) -> Result<usize> {
        Ok(usize::from(
            self.profiles.lock().unwrap().remove(&owner_id).is_some(),
        ))
    }
}

#[async_trait]
impl ActivityRepositoryTrait for InMemoryStore {
    fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        Ok(self.activities.lock().unwrap().get(id).cloned())
    }

    fn list_activities_for_owner(&self, owner_id: &str) -> Result<Vec<Activity>> {
        let mut list: Vec<_> = self
            .activities
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(list)
    }

    fn list_activities_in_range(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let mut list: Vec<_> = self
            .activities
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.owner_id == owner_id && a.start_time >= from && a.start_time < to)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(list)
    }

    async fn create_activity(&self, record: ActivityRecord) -> Result<Activity> {
        Ok(self.put_activity(record, None))
    }

    async fn update_activity(&self, record: ActivityRecord) -> Result<Activity> {
        let created_at = self
            .activities
            .lock()
            .unwrap()
            .get(&record.id)
            .map(|a| a.created_at);
        Ok(self.put_activity(record, created_at))
    }

    async fn delete_activity(&self, id: String) -> Result<usize> {
        Ok(usize::from(
            self.activities.lock().unwrap().remove(&id).is_some(),
        ))
    }

    async fn bulk_upsert_activities(
        &self,
        records: Vec<ActivityRecord>,
    ) -> Result<Vec<(String, UpsertAction)>> {
        {
            let activities = self.activities.lock().unwrap();
            for record in &records {
                if let Some(existing) = activities.get(&record.id) {
                    if existing.owner_id != record.owner_id {
                        return Err(Error::conflict(
                            ACTIVITY_OWNER_MISMATCH,
                            format!("Activity owner mismatch for {}", record.id),
                        ));
                    }
                }
            }
        }

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let existing = self.activities.lock().unwrap().get(&record.id).cloned();
            let id = record.id.clone();
            match existing {
                Some(prev) => {
                    self.put_activity(record, Some(prev.created_at));
                    results.push((id, UpsertAction::Updated));
                }
                None => {
                    self.put_activity(record, None);
                    results.push((id, UpsertAction::Created));
                }
            }
        }
        Ok(results)
    }
}
