use chrono::{DateTime, Days, NaiveDate, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    day_period, days_in, month_period, week_period, ActivityTypeBreakdown, DailyStats,
    DashboardSummary, MonthlyStats, Period, PeriodTotals, WeeklyStats,
};
use crate::activities::{Activity, ActivityRepositoryTrait};
use crate::activity_types::ActivityTypeRepositoryTrait;
use crate::errors::Result;

pub trait AggregationServiceTrait: Send + Sync {
    fn get_daily_stats(&self, owner_id: &str, date: DateTime<Utc>) -> Result<DailyStats>;
    fn get_weekly_stats(&self, owner_id: &str, date: DateTime<Utc>) -> Result<WeeklyStats>;
    fn get_monthly_stats(&self, owner_id: &str, date: DateTime<Utc>) -> Result<MonthlyStats>;
    fn get_activity_type_breakdown(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ActivityTypeBreakdown>>;
    fn get_dashboard(&self, owner_id: &str, date: DateTime<Utc>) -> Result<DashboardSummary>;
}

/// Recomputes every summary from the activity store on each call.
pub struct AggregationService {
    activity_repository: Arc<dyn ActivityRepositoryTrait>,
    activity_type_repository: Arc<dyn ActivityTypeRepositoryTrait>,
}

impl AggregationService {
    pub fn new(
        activity_repository: Arc<dyn ActivityRepositoryTrait>,
        activity_type_repository: Arc<dyn ActivityTypeRepositoryTrait>,
    ) -> Self {
        Self {
            activity_repository,
            activity_type_repository,
        }
    }

    fn load(&self, owner_id: &str, period: &Period) -> Result<Vec<Activity>> {
        self.activity_repository
            .list_activities_in_range(owner_id, period.start, period.end)
    }

    fn weekly_for(&self, owner_id: &str, date: NaiveDate) -> Result<WeeklyStats> {
        let week = week_period(date);
        let activities = self.load(owner_id, &week)?;

        let daily = days_in(&week)
            .into_iter()
            .map(|day| {
                let bounds = day_period(day);
                DailyStats {
                    date: day,
                    totals: PeriodTotals::from_activities(
                        activities.iter().filter(|a| bounds.contains(a.start_time)),
                    ),
                }
            })
            .collect();

        Ok(WeeklyStats {
            week_start: week.start,
            week_end: week.end,
            totals: PeriodTotals::from_activities(&activities),
            daily,
        })
    }
}

impl AggregationServiceTrait for AggregationService {
    fn get_daily_stats(&self, owner_id: &str, date: DateTime<Utc>) -> Result<DailyStats> {
        let day = date.date_naive();
        let activities = self.load(owner_id, &day_period(day))?;
        Ok(DailyStats {
            date: day,
            totals: PeriodTotals::from_activities(&activities),
        })
    }

    fn get_weekly_stats(&self, owner_id: &str, date: DateTime<Utc>) -> Result<WeeklyStats> {
        self.weekly_for(owner_id, date.date_naive())
    }

    fn get_monthly_stats(&self, owner_id: &str, date: DateTime<Utc>) -> Result<MonthlyStats> {
        let month = month_period(date.date_naive());
        let activities = self.load(owner_id, &month)?;

        // One entry per 7-day step from the first of the month; each entry is
        // the full calendar week containing that day.
        let mut weekly = Vec::new();
        let mut cursor = month.start.date_naive();
        while month.contains(day_period(cursor).start) {
            weekly.push(self.weekly_for(owner_id, cursor)?);
            cursor = match cursor.checked_add_days(Days::new(7)) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(MonthlyStats {
            month_start: month.start,
            month_end: month.end,
            totals: PeriodTotals::from_activities(&activities),
            weekly,
        })
    }

    fn get_activity_type_breakdown(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ActivityTypeBreakdown>> {
        let activities = self.load(owner_id, &Period { start: from, end: to })?;
        let names: HashMap<String, String> = self
            .activity_type_repository
            .list_activity_types()?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let mut grouped: HashMap<&str, PeriodTotals> = HashMap::new();
        for activity in &activities {
            grouped
                .entry(activity.activity_type_id.as_str())
                .or_default()
                .add(activity);
        }

        let mut breakdown: Vec<ActivityTypeBreakdown> = grouped
            .into_iter()
            .map(|(type_id, totals)| ActivityTypeBreakdown {
                activity_type_id: type_id.to_string(),
                activity_type_name: names
                    .get(type_id)
                    .cloned()
                    .unwrap_or_else(|| type_id.to_string()),
                totals,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.totals
                .total_calories
                .cmp(&a.totals.total_calories)
                .then_with(|| a.activity_type_name.cmp(&b.activity_type_name))
        });

        debug!(
            "Breakdown for owner {}: {} activity types between {} and {}",
            owner_id,
            breakdown.len(),
            from,
            to
        );
        Ok(breakdown)
    }

    fn get_dashboard(&self, owner_id: &str, date: DateTime<Utc>) -> Result<DashboardSummary> {
        let daily = self.get_daily_stats(owner_id, date)?;
        let weekly = self.get_weekly_stats(owner_id, date)?;
        let monthly = self.get_monthly_stats(owner_id, date)?;
        let breakdown =
            self.get_activity_type_breakdown(owner_id, monthly.month_start, monthly.month_end)?;
        Ok(DashboardSummary {
            daily,
            weekly,
            monthly,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const OWNER: &str = "owner-1";

    fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryStore>, AggregationService, String, String) {
        let store = Arc::new(InMemoryStore::default());
        let running = store.seed_activity_type("Running", dec!(8.0));
        let yoga = store.seed_activity_type("Yoga", dec!(2.5));
        let service = AggregationService::new(store.clone(), store.clone());
        (store, service, running, yoga)
    }

    #[test]
    fn daily_uses_override_and_half_open_day() {
        let (store, service, running, _) = setup();
        store.seed_activity(OWNER, &running, at(3, 6, 9), 30, dec!(280), Some(dec!(300)));
        store.seed_activity(OWNER, &running, at(3, 6, 18), 45, dec!(420), None);
        // Starts exactly at the next midnight: belongs to the next day.
        store.seed_activity(OWNER, &running, at(3, 7, 0), 60, dec!(560), None);
        store.seed_activity("someone-else", &running, at(3, 6, 10), 60, dec!(560), None);

        let daily = service.get_daily_stats(OWNER, at(3, 6, 12)).expect("daily");
        assert_eq!(daily.totals.total_calories, dec!(720));
        assert_eq!(daily.totals.total_duration_minutes, 75);
        assert_eq!(daily.totals.activity_count, 2);
    }

    #[test]
    fn weekly_runs_sunday_to_saturday_with_daily_breakdown() {
        let (store, service, running, _) = setup();
        // Sunday 3rd and Saturday 9th are in the week of Wednesday 6th.
        store.seed_activity(OWNER, &running, at(3, 3, 8), 30, dec!(100), None);
        store.seed_activity(OWNER, &running, at(3, 9, 8), 30, dec!(200), None);
        store.seed_activity(OWNER, &running, at(3, 10, 8), 30, dec!(400), None);

        let weekly = service.get_weekly_stats(OWNER, at(3, 6, 12)).expect("weekly");
        assert_eq!(weekly.week_start, at(3, 3, 0));
        assert_eq!(weekly.week_end, at(3, 10, 0));
        assert_eq!(weekly.totals.total_calories, dec!(300));
        assert_eq!(weekly.daily.len(), 7);
        assert_eq!(weekly.daily[0].totals.total_calories, dec!(100));
        assert_eq!(weekly.daily[6].totals.total_calories, dec!(200));
    }

    #[test]
    fn monthly_steps_weeks_from_first_of_month() {
        let (store, service, running, _) = setup();
        store.seed_activity(OWNER, &running, at(2, 29, 8), 30, dec!(50), None);
        store.seed_activity(OWNER, &running, at(3, 1, 8), 30, dec!(100), None);
        store.seed_activity(OWNER, &running, at(3, 31, 8), 30, dec!(200), None);

        let monthly = service.get_monthly_stats(OWNER, at(3, 15, 0)).expect("monthly");
        assert_eq!(monthly.totals.total_calories, dec!(300));
        assert_eq!(monthly.totals.activity_count, 2);
        // March 1, 8, 15, 22 and 29 of 2024.
        assert_eq!(monthly.weekly.len(), 5);
        // The first week starts Sunday Feb 25 and includes Feb 29.
        assert_eq!(monthly.weekly[0].week_start, at(2, 25, 0));
        assert_eq!(monthly.weekly[0].totals.total_calories, dec!(150));
    }

    #[test]
    fn breakdown_groups_by_type_ordered_by_calories() {
        let (store, service, running, yoga) = setup();
        store.seed_activity(OWNER, &yoga, at(3, 2, 8), 60, dec!(150), None);
        store.seed_activity(OWNER, &yoga, at(3, 3, 8), 60, dec!(150), None);
        store.seed_activity(OWNER, &running, at(3, 4, 8), 60, dec!(560), None);

        let breakdown = service
            .get_activity_type_breakdown(OWNER, at(3, 1, 0), at(4, 1, 0))
            .expect("breakdown");
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].activity_type_name, "Running");
        assert_eq!(breakdown[1].activity_type_name, "Yoga");
        assert_eq!(breakdown[1].totals.activity_count, 2);
        assert_eq!(breakdown[1].totals.total_duration_minutes, 120);
    }

    #[test]
    fn dashboard_is_empty_for_new_owner() {
        let (_store, service, _, _) = setup();
        let summary = service.get_dashboard(OWNER, at(3, 6, 12)).expect("dashboard");
        assert_eq!(summary.daily.totals, PeriodTotals::default());
        assert!(summary.breakdown.is_empty());
        assert_eq!(summary.monthly.weekly.len(), 5);
    }
}
