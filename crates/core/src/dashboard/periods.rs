use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

/// Half-open `[start, end)` interval on UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

pub fn day_period(date: NaiveDate) -> Period {
    Period {
        start: midnight(date),
        end: midnight(next_day(date)),
    }
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN)
}

/// Calendar week, Sunday through Saturday.
pub fn week_period(date: NaiveDate) -> Period {
    let start = week_start(date);
    let end = start.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
    Period {
        start: midnight(start),
        end: midnight(end),
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_period(date: NaiveDate) -> Period {
    let start = month_start(date);
    let end = start
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    Period {
        start: midnight(start),
        end: midnight(end),
    }
}

/// Days covered by `period`, one per calendar day starting at `period.start`.
pub fn days_in(period: &Period) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = period.start.date_naive();
    while midnight(day) < period.end {
        days.push(day);
        day = next_day(day);
    }
    days
}

/// Parses a `date`/`from`/`to` query value: an RFC 3339 datetime, a naive
/// ISO datetime (taken as UTC) or a plain `YYYY-MM-DD` date. Absent or
/// unparseable input yields `now`.
pub fn parse_reference_date(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(parse_instant)
        .unwrap_or(now)
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(midnight)
}

/// Range for the breakdown report: `from` widened to the start of its day,
/// `to` to the end of its day. Missing bounds default to the current month.
pub fn breakdown_period(from: Option<&str>, to: Option<&str>, now: DateTime<Utc>) -> Period {
    let current_month = month_period(now.date_naive());
    let start = from
        .and_then(|v| parse_instant(v.trim()))
        .map(|dt| day_period(dt.date_naive()).start)
        .unwrap_or(current_month.start);
    let end = to
        .and_then(|v| parse_instant(v.trim()))
        .map(|dt| day_period(dt.date_naive()).end)
        .unwrap_or(current_month.end);
    Period { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-03-06 is a Wednesday.
        assert_eq!(week_start(date(2024, 3, 6)), date(2024, 3, 3));
        assert_eq!(week_start(date(2024, 3, 3)), date(2024, 3, 3));
        assert_eq!(week_start(date(2024, 3, 9)), date(2024, 3, 3));

        let week = week_period(date(2024, 3, 6));
        assert_eq!(days_in(&week).len(), 7);
        assert_eq!(week.end, midnight(date(2024, 3, 10)));
    }

    #[test]
    fn month_period_handles_year_end_and_leap_february() {
        let dec = month_period(date(2023, 12, 15));
        assert_eq!(dec.start, midnight(date(2023, 12, 1)));
        assert_eq!(dec.end, midnight(date(2024, 1, 1)));

        assert_eq!(days_in(&month_period(date(2024, 2, 10))).len(), 29);
    }

    #[test]
    fn periods_are_half_open() {
        let day = day_period(date(2024, 3, 6));
        assert!(day.contains(midnight(date(2024, 3, 6))));
        assert!(!day.contains(midnight(date(2024, 3, 7))));
    }

    #[test]
    fn parse_reference_date_accepts_dates_and_datetimes() {
        let now = midnight(date(2030, 1, 1));
        assert_eq!(
            parse_reference_date(Some("2024-03-06"), now),
            midnight(date(2024, 3, 6))
        );
        assert_eq!(
            parse_reference_date(Some("2024-03-06T08:30:00+02:00"), now),
            Utc.with_ymd_and_hms(2024, 3, 6, 6, 30, 0).unwrap()
        );
        assert_eq!(
            parse_reference_date(Some("2024-03-06T08:30:00"), now),
            Utc.with_ymd_and_hms(2024, 3, 6, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn parse_reference_date_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_reference_date(None, now), now);
        assert_eq!(parse_reference_date(Some(""), now), now);
        assert_eq!(parse_reference_date(Some("yesterday"), now), now);
        assert_eq!(parse_reference_date(Some("2024-13-45"), now), now);
    }

    #[test]
    fn breakdown_period_widens_to_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let period = breakdown_period(Some("2024-03-02T15:00:00Z"), Some("2024-03-05"), now);
        assert_eq!(period.start, midnight(date(2024, 3, 2)));
        assert_eq!(period.end, midnight(date(2024, 3, 6)));

        let default = breakdown_period(None, None, now);
        assert_eq!(default, month_period(now.date_naive()));
    }
}
