//! Trip-duration verification.
//!
//! The site renders the trip length as localized, often right-to-left text
//! (e.g. `סה"כ: 30 ימים`). [`extract_last_integer`] pulls the trailing day
//! count out of such a label and [`DurationCheck`] compares it with the
//! expectation derived from the trip dates.

use crate::error::{ensure, AssertionFailure};
use crate::types::{DayCounting, TripDates};
use regex::Regex;
use std::sync::OnceLock;

/// Returned by [`extract_last_integer`] when the text holds no digit run.
pub const NO_INTEGER: i64 = -1;

/// Default accepted difference between displayed and expected trip length.
pub const DEFAULT_TOLERANCE_DAYS: i64 = 1;

/// Bidirectional control characters that may surround numbers in RTL labels.
const BIDI_MARKS: &[char] = &[
    '\u{200E}', '\u{200F}', '\u{061C}', '\u{202A}', '\u{202B}', '\u{202C}', '\u{202D}',
    '\u{202E}', '\u{2066}', '\u{2067}', '\u{2068}', '\u{2069}',
];

/// Extract the last maximal run of ASCII digits in `text`.
///
/// Bidi marks are normalized to spaces first so they never split or hide a
/// number. Returns [`NO_INTEGER`] when there is no digit run or the run does
/// not fit in an `i64`.
#[must_use]
pub fn extract_last_integer(text: &str) -> i64 {
    static LAST_DIGITS: OnceLock<Regex> = OnceLock::new();
    let regex =
        LAST_DIGITS.get_or_init(|| Regex::new(r"([0-9]+)[^0-9]*$").expect("valid regex"));

    let normalized: String = text
        .chars()
        .map(|c| if BIDI_MARKS.contains(&c) { ' ' } else { c })
        .collect();

    regex
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(NO_INTEGER)
}

/// Fail unless `|actual - expected| <= tolerance`.
pub fn ensure_within_tolerance(
    actual: i64,
    expected: i64,
    tolerance: i64,
) -> Result<(), AssertionFailure> {
    ensure((actual - expected).abs() <= tolerance, || {
        format!("Expected ~{expected} (±{tolerance}), but was {actual}")
    })
}

/// Compares a displayed trip length with the trip dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationCheck {
    /// Convention used to compute the expectation
    pub counting: DayCounting,
    /// Accepted difference in days
    pub tolerance: i64,
}

impl DurationCheck {
    /// Check with the default one-day tolerance.
    #[must_use]
    pub fn new(counting: DayCounting) -> Self {
        Self {
            counting,
            tolerance: DEFAULT_TOLERANCE_DAYS,
        }
    }

    /// Override the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: i64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Expected trip length for `trip`.
    #[must_use]
    pub fn expected(&self, trip: &TripDates) -> i64 {
        trip.expected_days(self.counting)
    }

    /// Evaluate the label text. Returns the extracted day count on success.
    pub fn evaluate(&self, text: &str, trip: &TripDates) -> Result<i64, AssertionFailure> {
        let expected = self.expected(trip);
        let found = extract_last_integer(text);

        ensure(found > 0, || {
            format!("Total days number not found in text: {text}")
        })?;
        ensure_within_tolerance(found, expected, self.tolerance)?;

        tracing::info!(expected, actual = found, "Total days validated");
        Ok(found)
    }
}
