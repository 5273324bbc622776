use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use now::DateTimeNow;
use serde::Serialize;

use crate::utils::time::week_start;

/// Inclusive interval of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// From the first to the last instant of the calendar month containing `now`, in the zone of
    /// `now`.
    pub fn month_of<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self {
            start: now.beginning_of_month().with_timezone(&Utc),
            end: now.end_of_month().with_timezone(&Utc),
        }
    }

    pub fn contains(&self, moment: DateTime<Utc>) -> bool {
        self.start <= moment && moment <= self.end
    }

    /// Unknown dates are never inside a window.
    pub fn contains_opt(&self, moment: Option<DateTime<Utc>>) -> bool {
        moment.is_some_and(|v| self.contains(v))
    }
}

/// Keeps records whose `accessor` yields an instant inside `window`, in input order.
pub fn filter_within<'a, T, F>(
    records: &'a [T],
    window: &'a TimeWindow,
    accessor: F,
) -> impl Iterator<Item = &'a T> + 'a
where
    F: Fn(&T) -> Option<DateTime<Utc>> + 'a,
{
    records
        .iter()
        .filter(move |record| window.contains_opt(accessor(record)))
}

/// The 7 dates of the week containing `now`, Monday first.
pub fn week_dates<Tz: TimeZone>(now: &DateTime<Tz>) -> [NaiveDate; 7] {
    let monday = week_start(now.date_naive());
    std::array::from_fn(|offset| monday + Duration::days(offset as i64))
}

/// The last `count` calendar days including today, newest first.
pub fn trailing_days<Tz: TimeZone>(now: &DateTime<Tz>, count: usize) -> Vec<NaiveDate> {
    let today = now.date_naive();
    (0..count)
        .map(|offset| today - Duration::days(offset as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

    use super::{filter_within, trailing_days, week_dates, TimeWindow};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filter_is_boundary_inclusive() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        let window = TimeWindow::new(start, end);
        let records: Vec<Option<DateTime<Utc>>> = vec![
            Some(start),
            None,
            Some(start - Duration::seconds(1)),
            Some(end),
            Some(end + Duration::seconds(1)),
            Some(start + Duration::days(3)),
        ];
        let kept = filter_within(&records, &window, |v| *v)
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(kept, vec![Some(start), Some(end), Some(start + Duration::days(3))]);
    }

    #[test]
    fn test_month_window() {
        let now = Utc.with_ymd_and_hms(2024, 2, 14, 13, 0, 0).unwrap();
        let window = TimeWindow::month_of(&now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(window.contains(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        assert!(!window.contains_opt(None));
    }

    #[test]
    fn test_month_window_uses_zone_of_now() {
        let zone = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2025, 4, 1, 1, 0, 0).unwrap();
        let window = TimeWindow::month_of(&now);
        // 2025-04-01 00:00 at +03:00
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 31, 21, 0, 0).unwrap());
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 3, 31, 20, 59, 59).unwrap()));
    }

    #[test]
    fn test_week_dates_monday_first() {
        // Sunday
        let now = Utc.with_ymd_and_hms(2025, 3, 16, 22, 0, 0).unwrap();
        let week = week_dates(&now);
        assert_eq!(week[0], date(2025, 3, 10));
        assert_eq!(week[6], date(2025, 3, 16));
    }

    #[test]
    fn test_trailing_days_newest_first() {
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        let days = trailing_days(&now, 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2025, 3, 2));
        assert_eq!(days[6], date(2025, 2, 24));
    }
}
