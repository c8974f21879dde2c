//! Release date handling.
//!
//! Listing pages usually print only a month and a day ("Jun 23"), so the year
//! has to be inferred from the date the page is read on. Sources never list
//! albums far outside a short horizon around today, which is what makes the
//! straddle window below work.

use crate::{PlaylistError, Result};
use chrono::{Datelike, Month, NaiveDate};

/// How many months a listed date may sit away from today before it is moved
/// into the neighbouring year. A heuristic, tunable via
/// [`DateNormalizer::with_straddle_months`].
pub const YEAR_STRADDLE_MONTHS: i32 = 4;

/// Format used when albums are written to storage and in playlist
/// descriptions, e.g. "Jun 23 2017".
pub const STORED_DATE_FORMAT: &str = "%b %d %Y";

/// Long form used by the detailed listing, e.g. "July 24, 2020".
pub const LONG_DATE_FORMAT: &str = "%B %d, %Y";

/// Turns "Month Day" strings into full dates relative to a reference day.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    today: NaiveDate,
    straddle_months: i32,
}

impl DateNormalizer {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            straddle_months: YEAR_STRADDLE_MONTHS,
        }
    }

    pub fn with_straddle_months(mut self, months: i32) -> Self {
        self.straddle_months = months;
        self
    }

    /// Infer the full date for a "Mon DD" string.
    ///
    /// The month may be abbreviated or spelled out, case-insensitively. With
    /// `month_diff = today.month - month`, a diff above the straddle window
    /// moves the date into next year and a diff below the negative window
    /// moves it into last year.
    ///
    /// February 29 is accepted in any year: when the inferred year has no leap
    /// day, the nearest leap year is used instead.
    pub fn normalize(&self, month_and_day: &str) -> Result<NaiveDate> {
        let (month, day) = parse_month_day(month_and_day)?;

        let month_diff = self.today.month() as i32 - month as i32;
        let year = if month_diff > self.straddle_months {
            self.today.year() + 1
        } else if month_diff < -self.straddle_months {
            self.today.year() - 1
        } else {
            self.today.year()
        };

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }

        // Only Feb 29 gets here, parse_month_day validated everything else
        let leap_year = nearest_leap_year(year);
        log::debug!("'{month_and_day}' does not exist in {year}, using leap year {leap_year}");
        NaiveDate::from_ymd_opt(leap_year, month, day)
            .ok_or_else(|| PlaylistError::Parse(format!("Invalid date '{month_and_day}'")))
    }
}

/// Split "Mon DD" into a month number and a day, validating the day against
/// the month as it appears in a leap year.
fn parse_month_day(text: &str) -> Result<(u32, u32)> {
    let mut parts = text.split_whitespace();
    let (Some(month_text), Some(day_text), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(PlaylistError::Parse(format!(
            "Expected 'Mon DD' date, got '{text}'"
        )));
    };

    let month = month_text
        .trim_end_matches('.')
        .parse::<Month>()
        .map_err(|_| PlaylistError::Parse(format!("Unknown month '{month_text}' in '{text}'")))?
        .number_from_month();

    let day = day_text
        .trim_end_matches(',')
        .parse::<u32>()
        .map_err(|_| PlaylistError::Parse(format!("Invalid day '{day_text}' in '{text}'")))?;

    // 2000 is a leap year, so Feb 29 passes here
    if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
        return Err(PlaylistError::Parse(format!(
            "Day {day} does not exist in month '{month_text}'"
        )));
    }

    Ok((month, day))
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Closest leap year to `year`, preferring the earlier one on a tie.
fn nearest_leap_year(year: i32) -> i32 {
    (0..=8)
        .flat_map(|offset| [year - offset, year + offset])
        .find(|candidate| is_leap_year(*candidate))
        .unwrap_or(year)
}

/// Parse a long-form date such as "July 24, 2020".
pub fn parse_long_date(text: &str) -> Result<NaiveDate> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&cleaned, LONG_DATE_FORMAT)
        .map_err(|e| PlaylistError::Parse(format!("Invalid long date '{text}': {e}")))
}

pub fn format_stored_date(date: NaiveDate) -> String {
    date.format(STORED_DATE_FORMAT).to_string()
}

pub fn parse_stored_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), STORED_DATE_FORMAT)
        .map_err(|e| PlaylistError::Parse(format!("Invalid stored date '{text}': {e}")))
}
