use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_MIN_RATING: u8 = 80;

/// Recency and score predicate applied to every scraped release.
///
/// A release passes when it came out between `today - window_days` and
/// `today`, both ends inclusive, and its rating is at least `min_rating`.
/// Comparison is done on calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseFilter {
    pub window_days: i64,
    pub min_rating: u8,
}

impl Default for ReleaseFilter {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            min_rating: DEFAULT_MIN_RATING,
        }
    }
}

impl ReleaseFilter {
    pub fn new(window_days: i64, min_rating: u8) -> Self {
        Self {
            window_days,
            min_rating,
        }
    }

    pub fn accepts(&self, rating: u8, release_date: NaiveDate, today: NaiveDate) -> bool {
        // A window reaching past the calendar's start has no lower bound
        let within_window = Duration::try_days(self.window_days)
            .and_then(|window| today.checked_sub_signed(window))
            .is_none_or(|oldest| release_date >= oldest);
        release_date <= today && within_window && rating >= self.min_rating
    }
}
