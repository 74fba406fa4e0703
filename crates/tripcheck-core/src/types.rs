//! Trip types shared across tripcheck.
//!
//! [`TripDates`] carries the departure/return pair the flow script types into
//! the site, and [`DayCounting`] captures whether the site counts the
//! boundary day.

use crate::error::TripcheckError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display format used by the date inputs (`dd/MM/yyyy`).
pub const UI_DATE_FORMAT: &str = "%d/%m/%Y";

/// Digits-only format typed into masked date inputs (`ddMMyyyy`).
pub const UI_DATE_DIGITS_FORMAT: &str = "%d%m%Y";

/// Format a date the way the site displays it.
#[must_use]
pub fn format_ui_date(date: NaiveDate) -> String {
    date.format(UI_DATE_FORMAT).to_string()
}

/// Format a date as the bare digit sequence a masked input expects.
#[must_use]
pub fn format_ui_date_digits(date: NaiveDate) -> String {
    date.format(UI_DATE_DIGITS_FORMAT).to_string()
}

/// Whether a trip length includes the boundary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCounting {
    /// Departure and return day both count (`between + 1`)
    Inclusive,
    /// Plain calendar difference (`between`)
    Exclusive,
}

impl DayCounting {
    /// Map the `count_inclusive` config flag to a convention.
    #[must_use]
    pub fn from_inclusive(inclusive: bool) -> Self {
        if inclusive {
            Self::Inclusive
        } else {
            Self::Exclusive
        }
    }

    /// Days added on top of the calendar difference.
    #[must_use]
    pub fn boundary_days(self) -> i64 {
        match self {
            Self::Inclusive => 1,
            Self::Exclusive => 0,
        }
    }
}

/// Ordered departure/return pair. Invariant: `depart <= return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripDates {
    depart: NaiveDate,
    #[serde(rename = "return")]
    return_date: NaiveDate,
}

impl TripDates {
    /// Create a trip.
    ///
    /// # Errors
    /// Returns a validation error if `return_date` precedes `depart`.
    pub fn new(depart: NaiveDate, return_date: NaiveDate) -> Result<Self, TripcheckError> {
        if return_date < depart {
            return Err(TripcheckError::Validation(format!(
                "return date {return_date} precedes departure {depart}"
            )));
        }
        Ok(Self {
            depart,
            return_date,
        })
    }

    /// Build the trip whose displayed length is `requested_days` under `counting`.
    ///
    /// Inclusive counting returns on `depart + requested_days - 1`, exclusive
    /// counting on `depart + requested_days`.
    pub fn for_requested_days(
        depart: NaiveDate,
        requested_days: u32,
        counting: DayCounting,
    ) -> Result<Self, TripcheckError> {
        let span = match counting {
            DayCounting::Inclusive => requested_days.checked_sub(1).ok_or_else(|| {
                TripcheckError::Validation(
                    "an inclusive trip must request at least one day".to_string(),
                )
            })?,
            DayCounting::Exclusive => requested_days,
        };
        let return_date = add_days(depart, span)?;
        Self::new(depart, return_date)
    }

    /// Trip departing `offset_days` after `today`, sized like [`Self::for_requested_days`].
    pub fn starting_in(
        today: NaiveDate,
        offset_days: u32,
        requested_days: u32,
        counting: DayCounting,
    ) -> Result<Self, TripcheckError> {
        let depart = add_days(today, offset_days)?;
        Self::for_requested_days(depart, requested_days, counting)
    }

    /// Departure date.
    #[must_use]
    pub fn depart(&self) -> NaiveDate {
        self.depart
    }

    /// Return date.
    #[must_use]
    pub fn return_date(&self) -> NaiveDate {
        self.return_date
    }

    /// Calendar days from departure to return.
    #[must_use]
    pub fn days_between(&self) -> i64 {
        (self.return_date - self.depart).num_days()
    }

    /// Trip length under `counting`.
    #[must_use]
    pub fn expected_days(&self, counting: DayCounting) -> i64 {
        self.days_between() + counting.boundary_days()
    }
}

impl fmt::Display for TripDates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.depart, self.return_date)
    }
}

fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate, TripcheckError> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| TripcheckError::Validation(format!("{date} + {days} days is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_trip_rejects_reversed_dates() {
        let err = TripDates::new(date(2026, 10, 23), date(2026, 10, 22)).unwrap_err();
        assert!(matches!(err, TripcheckError::Validation(_)));
    }

    #[test]
    fn test_same_day_trip() {
        let trip = TripDates::new(date(2026, 10, 23), date(2026, 10, 23)).expect("same day");
        assert_eq!(trip.days_between(), 0);
        assert_eq!(trip.expected_days(DayCounting::Inclusive), 1);
        assert_eq!(trip.expected_days(DayCounting::Exclusive), 0);
    }

    #[test]
    fn test_for_requested_days_inclusive() {
        let trip = TripDates::for_requested_days(date(2026, 10, 23), 30, DayCounting::Inclusive)
            .expect("trip");
        assert_eq!(trip.return_date(), date(2026, 11, 21));
        assert_eq!(trip.days_between(), 29);
        assert_eq!(trip.expected_days(DayCounting::Inclusive), 30);
    }

    #[test]
    fn test_for_requested_days_exclusive() {
        let trip = TripDates::for_requested_days(date(2026, 10, 23), 30, DayCounting::Exclusive)
            .expect("trip");
        assert_eq!(trip.days_between(), 30);
        assert_eq!(trip.expected_days(DayCounting::Exclusive), 30);
    }

    #[test]
    fn test_inclusive_zero_days_is_invalid() {
        assert!(TripDates::for_requested_days(date(2026, 1, 1), 0, DayCounting::Inclusive).is_err());
    }

    #[test]
    fn test_starting_in_crosses_year() {
        let trip = TripDates::starting_in(date(2026, 12, 28), 7, 30, DayCounting::Inclusive)
            .expect("trip");
        assert_eq!(trip.depart(), date(2027, 1, 4));
        assert_eq!(trip.return_date(), date(2027, 2, 2));
    }

    #[test]
    fn test_ui_date_formats() {
        let d = date(2026, 3, 5);
        assert_eq!(format_ui_date(d), "05/03/2026");
        assert_eq!(format_ui_date_digits(d), "05032026");
    }
}
