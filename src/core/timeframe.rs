//! Resolves analytics timeframes into date windows and trend buckets.

use std::{collections::HashMap, fmt};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Aggregation window selector used by the analytics views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Timeframe {
    /// Parses a timeframe token; unknown tokens fall back to [`Timeframe::Month`].
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "day" => Timeframe::Day,
            "week" => Timeframe::Week,
            "year" => Timeframe::Year,
            _ => Timeframe::Month,
        }
    }

    /// Query window for the timeframe: `[start, now]`, inclusive on both ends.
    pub fn window(self, now: NaiveDateTime) -> TimeWindow {
        let today = now.date();
        let start = match self {
            Timeframe::Day => today,
            Timeframe::Week => start_of_week(today),
            Timeframe::Month => start_of_month(today),
            Timeframe::Year => start_of_year(today),
        };
        TimeWindow::new(midnight(start), now)
    }

    /// Window covered by the trend series. The week series spans the seven
    /// days ending today rather than the calendar week.
    pub fn trend_window(self, now: NaiveDateTime) -> TimeWindow {
        match self {
            Timeframe::Week => {
                TimeWindow::new(midnight(now.date() - Duration::days(6)), now)
            }
            Timeframe::Year => Timeframe::Year.window(now),
            Timeframe::Day | Timeframe::Month => Timeframe::Month.window(now),
        }
    }

    /// Ordered trend buckets for the timeframe, oldest first, never reaching
    /// past `now`.
    pub fn buckets(self, now: NaiveDateTime) -> TrendBuckets {
        let today = now.date();
        let keys: Vec<BucketKey> = match self {
            Timeframe::Week => (0..7)
                .rev()
                .map(|offset| BucketKey::Day(today - Duration::days(offset)))
                .collect(),
            Timeframe::Year => (1..=today.month())
                .map(|month| BucketKey::Month {
                    year: today.year(),
                    month,
                })
                .collect(),
            Timeframe::Day | Timeframe::Month => {
                let first = start_of_month(today);
                (0..today.day0())
                    .map(|offset| BucketKey::Day(first + Duration::days(offset as i64)))
                    .chain(std::iter::once(BucketKey::Day(today)))
                    .collect()
            }
        };
        TrendBuckets::new(self, keys)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Timeframe::Day => "Today",
            Timeframe::Week => "This Week",
            Timeframe::Month => "This Month",
            Timeframe::Year => "This Year",
        };
        f.write_str(label)
    }
}

impl From<&str> for Timeframe {
    fn from(token: &str) -> Self {
        Timeframe::parse(token)
    }
}

/// Inclusive date-time range used for store queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Whole days spanned by the window, rounded up and floored at one.
    pub fn elapsed_days(&self) -> i64 {
        let millis = (self.end - self.start).num_milliseconds();
        let days = (millis as f64 / 86_400_000.0).ceil() as i64;
        days.max(1)
    }
}

/// Canonical trend bucket identity. Labels are derived from keys, and expenses
/// are folded by key, so both sides always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl BucketKey {
    fn label(&self, timeframe: Timeframe) -> String {
        match (self, timeframe) {
            (BucketKey::Day(date), Timeframe::Week) => date.format("%a").to_string(),
            (BucketKey::Day(date), _) => date.day().to_string(),
            (BucketKey::Month { month, .. }, _) => MONTH_ABBREVIATIONS
                .get(month.saturating_sub(1) as usize)
                .copied()
                .unwrap_or("")
                .to_string(),
        }
    }
}

/// Ordered bucket keys for one trend series.
#[derive(Debug, Clone)]
pub struct TrendBuckets {
    timeframe: Timeframe,
    keys: Vec<BucketKey>,
    positions: HashMap<BucketKey, usize>,
}

impl TrendBuckets {
    fn new(timeframe: Timeframe, keys: Vec<BucketKey>) -> Self {
        let positions = keys
            .iter()
            .enumerate()
            .map(|(idx, key)| (*key, idx))
            .collect();
        Self {
            timeframe,
            keys,
            positions,
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[BucketKey] {
        &self.keys
    }

    pub fn labels(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|key| key.label(self.timeframe))
            .collect()
    }

    /// Bucket an expense date falls into for this series' granularity.
    pub fn key_for(&self, instant: NaiveDateTime) -> BucketKey {
        match self.timeframe {
            Timeframe::Year => BucketKey::Month {
                year: instant.year(),
                month: instant.month(),
            },
            Timeframe::Day | Timeframe::Week | Timeframe::Month => BucketKey::Day(instant.date()),
        }
    }

    /// Position of the bucket containing `instant`, if it is part of the series.
    pub fn position(&self, instant: NaiveDateTime) -> Option<usize> {
        self.positions.get(&self.key_for(instant)).copied()
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Weeks start on Sunday (weekday index 0).
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.ordinal0() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn unknown_tokens_fall_back_to_month() {
        assert_eq!(Timeframe::parse("quarter"), Timeframe::Month);
        assert_eq!(Timeframe::parse(""), Timeframe::Month);
        assert_eq!(Timeframe::parse("WEEK"), Timeframe::Week);
    }

    #[test]
    fn week_window_starts_on_sunday() {
        // 2024-06-13 is a Thursday; the week began Sunday 2024-06-09.
        let now = at(2024, 6, 13, 15, 30);
        let window = Timeframe::Week.window(now);
        assert_eq!(window.start, at(2024, 6, 9, 0, 0));
        assert_eq!(window.end, now);
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        let now = at(2024, 6, 9, 8, 0);
        assert_eq!(Timeframe::Week.window(now).start, at(2024, 6, 9, 0, 0));
    }

    #[test]
    fn day_month_year_windows() {
        let now = at(2024, 3, 17, 9, 45);
        assert_eq!(Timeframe::Day.window(now).start, at(2024, 3, 17, 0, 0));
        assert_eq!(Timeframe::Month.window(now).start, at(2024, 3, 1, 0, 0));
        assert_eq!(Timeframe::Year.window(now).start, at(2024, 1, 1, 0, 0));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = at(2024, 6, 13, 12, 0);
        let window = Timeframe::Month.window(now);
        assert!(window.contains(window.start));
        assert!(window.contains(now));
        assert!(!window.contains(now + Duration::seconds(1)));
    }

    #[test]
    fn elapsed_days_rounds_up_and_floors_at_one() {
        let same_instant = TimeWindow::new(at(2024, 6, 13, 0, 0), at(2024, 6, 13, 0, 0));
        assert_eq!(same_instant.elapsed_days(), 1);
        let partial = TimeWindow::new(at(2024, 6, 9, 0, 0), at(2024, 6, 13, 15, 0));
        assert_eq!(partial.elapsed_days(), 5);
        let exact = TimeWindow::new(at(2024, 6, 1, 0, 0), at(2024, 6, 3, 0, 0));
        assert_eq!(exact.elapsed_days(), 2);
    }

    #[test]
    fn week_buckets_cover_seven_days_ending_today() {
        let buckets = Timeframe::Week.buckets(at(2024, 6, 13, 10, 0));
        assert_eq!(
            buckets.labels(),
            vec!["Fri", "Sat", "Sun", "Mon", "Tue", "Wed", "Thu"]
        );
        assert_eq!(
            buckets.keys().first(),
            Some(&BucketKey::Day(NaiveDate::from_ymd_opt(2024, 6, 7).unwrap()))
        );
    }

    #[test]
    fn month_buckets_stop_at_today() {
        let labels = Timeframe::Month.buckets(at(2024, 6, 10, 23, 59)).labels();
        let expected: Vec<String> = (1..=10).map(|d| d.to_string()).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn first_of_month_has_single_bucket() {
        let labels = Timeframe::Month.buckets(at(2024, 2, 1, 6, 0)).labels();
        assert_eq!(labels, vec!["1"]);
    }

    #[test]
    fn year_buckets_stop_at_current_month() {
        let labels = Timeframe::Year.buckets(at(2024, 4, 2, 0, 0)).labels();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "Apr"]);
    }

    #[test]
    fn week_bucket_positions_distinguish_same_weekday() {
        let now = at(2024, 6, 13, 10, 0);
        let buckets = Timeframe::Week.buckets(now);
        assert_eq!(buckets.position(at(2024, 6, 13, 8, 0)), Some(6));
        // A Thursday one week earlier shares the label but not the bucket.
        assert_eq!(buckets.position(at(2024, 6, 6, 8, 0)), None);
    }
}
