//! Decides whether a post is recent from the timestamp string a board printed.
//!
//! Boards print dates in a handful of shapes: a bare `14:22` for today's
//! posts, `3분 전` style markers, `02.18` for this year and `2024.02.18` or
//! `24.02.18` for anything older. Classification never fails: strings that fit
//! none of these shapes get [`FreshnessPolicy::unparseable_default`].

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Longest string still read as a bare `HH:MM`.
const TIME_OF_DAY_MAX_CHARS: usize = 5;

/// Markers meaning "posted moments ago".
const RELATIVE_MARKERS: &[&str] = &[
    "방금",
    "분 전",
    "분전",
    "초 전",
    "초전",
    "just now",
    "min ago",
    "mins ago",
    "minutes ago",
    "sec ago",
    "secs ago",
    "seconds ago",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessPolicy {
    /// Maximum age in whole calendar days for a dated post.
    pub window_days: u32,
    pub treat_time_of_day_as_fresh: bool,
    pub treat_relative_markers_as_fresh: bool,
    /// Verdict for strings that fit no known shape.
    pub unparseable_default: bool,
    /// How many days into the future a dated post may be and still count.
    pub future_tolerance_days: u32,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            window_days: 2,
            treat_time_of_day_as_fresh: true,
            treat_relative_markers_as_fresh: true,
            unparseable_default: true,
            future_tolerance_days: 0,
        }
    }
}

impl FreshnessPolicy {
    /// Only posts dated today.
    pub fn same_day() -> Self {
        Self {
            window_days: 0,
            ..Self::default()
        }
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn with_unparseable_default(mut self, verdict: bool) -> Self {
        self.unparseable_default = verdict;
        self
    }

    pub fn with_future_tolerance_days(mut self, days: u32) -> Self {
        self.future_tolerance_days = days;
        self
    }

    /// `age_days` is `today - post_date`; negative for future-dated posts.
    pub fn admits_age(&self, age_days: i64) -> bool {
        if age_days < 0 {
            -age_days <= i64::from(self.future_tolerance_days)
        } else {
            age_days <= i64::from(self.window_days)
        }
    }

    pub fn verdict(&self, shape: &TimestampShape, now: NaiveDateTime) -> bool {
        match shape {
            TimestampShape::TimeOfDay => self.treat_time_of_day_as_fresh,
            TimestampShape::RelativeMarker => self.treat_relative_markers_as_fresh,
            TimestampShape::Date(date) => self.admits_age((now.date() - *date).num_days()),
            TimestampShape::Unparseable => self.unparseable_default,
        }
    }
}

/// What a raw timestamp was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "date", rename_all = "snake_case")]
pub enum TimestampShape {
    /// `HH:MM` with no date, i.e. today
    TimeOfDay,
    /// "just now", "N minutes ago" and the like
    RelativeMarker,
    Date(NaiveDate),
    Unparseable,
}

/// Returns whether a post stamped `raw` should be shown at `now`.
pub fn is_fresh(raw: &str, now: NaiveDateTime, policy: &FreshnessPolicy) -> bool {
    policy.verdict(&classify(raw, now), now)
}

/// Recognizes the shape of `raw`, resolving dates against `now`.
pub fn classify(raw: &str, now: NaiveDateTime) -> TimestampShape {
    let text = raw.trim();
    if text.is_empty() {
        return TimestampShape::Unparseable;
    }

    if text.contains(':') && text.chars().count() <= TIME_OF_DAY_MAX_CHARS {
        return TimestampShape::TimeOfDay;
    }

    let lowered = text.to_lowercase();
    if RELATIVE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return TimestampShape::RelativeMarker;
    }

    calendar_date(text, now)
        .map(TimestampShape::Date)
        .unwrap_or(TimestampShape::Unparseable)
}

fn calendar_date(text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    // "2024-02-18 14:22:05" keeps only the date; "2024. 2. 18." is rejoined.
    let date_part: String = text
        .split_whitespace()
        .take_while(|token| !token.contains(':'))
        .collect();

    let normalized: String = date_part
        .chars()
        .map(|c| if c == '-' || c == '/' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let normalized = normalized.trim_matches('.');
    if normalized.is_empty() {
        return None;
    }

    let parts = normalized
        .split('.')
        .map(|p| p.parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .ok()?;

    match parts.as_slice() {
        &[month, day] => NaiveDate::from_ymd_opt(now.year(), month, day),
        &[year, month, day] => {
            let year = if year < 100 { year + 2000 } else { year };
            NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2024, 2, 19, 13, 30)
    }

    fn date(y: i32, m: u32, d: u32) -> TimestampShape {
        TimestampShape::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_time_of_day_is_fresh_for_any_now() {
        let policy = FreshnessPolicy::default();
        for now in [now(), at(2025, 1, 1, 0, 5), at(1999, 12, 31, 23, 59)] {
            for raw in ["14:22", "00:00", "9:05", " 23:59 "] {
                assert!(is_fresh(raw, now, &policy), "{raw} at {now}");
                assert_eq!(classify(raw, now), TimestampShape::TimeOfDay);
            }
        }
    }

    #[test]
    fn test_time_of_day_follows_policy_flag() {
        let policy = FreshnessPolicy {
            treat_time_of_day_as_fresh: false,
            ..FreshnessPolicy::default()
        };
        assert!(!is_fresh("14:22", now(), &policy));
    }

    #[test]
    fn test_relative_markers() {
        let policy = FreshnessPolicy::default();
        for raw in ["방금", "3분 전", "10초 전", "59분전", "just now", "5 mins ago"] {
            assert_eq!(classify(raw, now()), TimestampShape::RelativeMarker, "{raw}");
            assert!(is_fresh(raw, now(), &policy));
        }

        let strict = FreshnessPolicy {
            treat_relative_markers_as_fresh: false,
            ..FreshnessPolicy::default()
        };
        assert!(!is_fresh("방금", now(), &strict));
    }

    #[test]
    fn test_dated_posts_against_two_day_window() {
        let policy = FreshnessPolicy::default().with_window_days(2);
        assert!(is_fresh("02.18", now(), &policy));
        assert!(!is_fresh("02.16", now(), &policy));
        assert!(is_fresh("2024.02.17", now(), &policy));
        assert!(is_fresh("24.02.19", now(), &policy));
        assert_eq!(classify("24.02.19", now()), date(2024, 2, 19));
    }

    #[test]
    fn test_window_boundary() {
        for window in [0, 1, 2, 7] {
            let policy = FreshnessPolicy::default().with_window_days(window);
            let edge = now().date() - Duration::days(i64::from(window));
            let past_edge = edge - Duration::days(1);
            assert!(is_fresh(&edge.format("%Y.%m.%d").to_string(), now(), &policy));
            assert!(!is_fresh(&past_edge.format("%Y.%m.%d").to_string(), now(), &policy));
        }
    }

    #[test]
    fn test_same_day_preset() {
        let policy = FreshnessPolicy::same_day();
        assert!(is_fresh("02.19", now(), &policy));
        assert!(!is_fresh("02.18", now(), &policy));
        assert!(is_fresh("14:22", now(), &policy));
    }

    #[test]
    fn test_unparseable_uses_default() {
        let open = FreshnessPolicy::default();
        let closed = FreshnessPolicy::default().with_unparseable_default(false);
        for raw in ["13.45", "garbage", "", "   ", "18", "02..18", "1.2.3.4", "02.30"] {
            assert_eq!(classify(raw, now()), TimestampShape::Unparseable, "{raw:?}");
            assert!(is_fresh(raw, now(), &open));
            assert!(!is_fresh(raw, now(), &closed));
        }
    }

    #[test]
    fn test_separators_are_equivalent() {
        let policy = FreshnessPolicy::default();
        for raw in ["02-18", "02/18", "2024-02-18", "24/02/18"] {
            assert_eq!(classify(raw, now()), classify("02.18", now()), "{raw}");
            assert_eq!(is_fresh(raw, now(), &policy), is_fresh("02.18", now(), &policy));
        }
    }

    #[test]
    fn test_repeated_calls_agree() {
        let policy = FreshnessPolicy::default();
        for raw in ["02.17", "garbage", "3분 전", "14:22"] {
            assert_eq!(is_fresh(raw, now(), &policy), is_fresh(raw, now(), &policy));
        }
    }

    #[test]
    fn test_future_dates_need_tolerance() {
        let policy = FreshnessPolicy::default();
        assert!(!is_fresh("2024.02.20", now(), &policy));

        let tolerant = FreshnessPolicy::default().with_future_tolerance_days(1);
        assert!(is_fresh("2024.02.20", now(), &tolerant));
        assert!(!is_fresh("2024.02.21", now(), &tolerant));
    }

    #[test]
    fn test_month_day_always_uses_current_year() {
        let new_year = at(2025, 1, 1, 0, 10);
        assert_eq!(classify("12.31", new_year), date(2025, 12, 31));
        assert!(!is_fresh("12.31", new_year, &FreshnessPolicy::default()));

        let tolerant = FreshnessPolicy::default().with_future_tolerance_days(30);
        assert_eq!(classify("03.01", now()), date(2024, 3, 1));
        assert!(is_fresh("03.01", now(), &tolerant));
    }

    #[test]
    fn test_date_with_trailing_time() {
        assert_eq!(classify("2024-02-18 14:22:05", now()), date(2024, 2, 18));
        assert_eq!(classify("2024. 2. 18.", now()), date(2024, 2, 18));
        assert_eq!(classify("24.02.17 23:10", now()), date(2024, 2, 17));
    }

    #[test]
    fn test_elapsed_markers_are_unparseable() {
        let open = FreshnessPolicy::default();
        for raw in ["3일 전", "5시간 전", "어제"] {
            assert_eq!(classify(raw, now()), TimestampShape::Unparseable, "{raw}");
            assert!(is_fresh(raw, now(), &open));
        }
    }

    #[test]
    fn test_colon_strings_past_length_limit_are_not_time_of_day() {
        assert_eq!(classify("14:22:05", now()), TimestampShape::Unparseable);
        assert_eq!(classify("2024-02-18 14:22", now()), date(2024, 2, 18));
        assert_eq!(classify("9:41:1", now()), TimestampShape::Unparseable);

        let closed = FreshnessPolicy::default().with_unparseable_default(false);
        assert!(!is_fresh("09:41:12", now(), &closed));
        assert!(is_fresh("09:41", now(), &closed));
    }

    #[test]
    fn test_hostile_input_never_panics() {
        let policy = FreshnessPolicy::default();
        for raw in [
            "99999999999.1.1",
            "4294967295.12.31",
            "0.0",
            "00:00:00:00",
            "💥:",
            "...",
            "4294967295시간 전",
            "4294967295일 전",
            "-3시간 전",
        ] {
            let _ = is_fresh(raw, now(), &policy);
        }
    }
}
