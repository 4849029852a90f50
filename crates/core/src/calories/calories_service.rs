use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::activity_types::{activity_type_not_found, ActivityTypeRepositoryTrait};
use crate::errors::Result;
use crate::owners::{profile_not_found, OwnerRepositoryTrait};

/// Relative difference above which a manual override is flagged.
pub const DEFAULT_SUSPICION_THRESHOLD: Decimal = dec!(0.10);

const MINUTES_PER_HOUR: Decimal = dec!(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieCalculation {
    pub calculated_calories: Decimal,
    pub actual_calories: Decimal,
    pub is_overridden: bool,
    pub met: Decimal,
    pub weight_kg: Decimal,
    pub duration_hours: Decimal,
}

fn round_calories(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `MET × weight(kg) × hours`, rounded to two decimals.
///
/// `actual_calories` is the override when one is given.
pub fn calculate_calories(
    met: Decimal,
    weight_kg: Decimal,
    duration_minutes: i32,
    calories_override: Option<Decimal>,
) -> CalorieCalculation {
    let duration_hours = Decimal::from(duration_minutes) / MINUTES_PER_HOUR;
    let calculated_calories = round_calories(met * weight_kg * duration_hours);
    let actual_calories = calories_override
        .map(round_calories)
        .unwrap_or(calculated_calories);

    CalorieCalculation {
        calculated_calories,
        actual_calories,
        is_overridden: calories_override.is_some(),
        met,
        weight_kg,
        duration_hours: duration_hours.round_dp(4),
    }
}

/// Whether `calories_override` deviates from `calculated` by more than
/// `threshold` (a fraction of `calculated`).
pub fn is_calorie_override_suspicious(
    calculated: Decimal,
    calories_override: Decimal,
    threshold: Decimal,
) -> bool {
    if calculated.is_zero() {
        return !calories_override.is_zero();
    }
    let relative = (calories_override - calculated).abs() / calculated.abs();
    relative > threshold
}

/// Resolves MET and weight from storage before calculating.
pub struct CalorieService {
    activity_type_repository: Arc<dyn ActivityTypeRepositoryTrait>,
    owner_repository: Arc<dyn OwnerRepositoryTrait>,
}

impl CalorieService {
    pub fn new(
        activity_type_repository: Arc<dyn ActivityTypeRepositoryTrait>,
        owner_repository: Arc<dyn OwnerRepositoryTrait>,
    ) -> Self {
        Self {
            activity_type_repository,
            owner_repository,
        }
    }

    pub fn calculate_for_owner(
        &self,
        owner_id: &str,
        activity_type_id: &str,
        duration_minutes: i32,
        calories_override: Option<Decimal>,
    ) -> Result<CalorieCalculation> {
        let activity_type = self
            .activity_type_repository
            .get_activity_type(activity_type_id)?
            .ok_or_else(|| activity_type_not_found(activity_type_id))?;

        let weight_kg = self
            .owner_repository
            .get_profile(owner_id)?
            .and_then(|p| p.weight_kg)
            .ok_or_else(profile_not_found)?;

        Ok(calculate_calories(
            activity_type.met,
            weight_kg,
            duration_minutes,
            calories_override,
        ))
    }
}
