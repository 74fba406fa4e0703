//! Tripcheck Core - Foundation crate for the tripcheck browser scenario.
//!
//! This crate provides shared types, error handling, configuration management
//! and the trip-duration verifier that the browser and flow crates build on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based run parameters with XDG paths and env overrides
//! - [`types`] - Trip dates and day-counting convention
//! - [`duration`] - Trailing-integer extraction and tolerance check
//!
//! # Example
//!
//! ```rust
//! use tripcheck_core::{DayCounting, DurationCheck, TripDates};
//! use chrono::NaiveDate;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let depart = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();
//! let trip = TripDates::for_requested_days(depart, 30, DayCounting::Inclusive)?;
//!
//! let days = DurationCheck::new(DayCounting::Inclusive).evaluate("סה\"כ: 30 ימים", &trip)?;
//! assert_eq!(days, 30);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod duration;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, SiteConfig, TripConfig, WaitConfig};
pub use duration::{extract_last_integer, DurationCheck, NO_INTEGER};
pub use error::{AssertionFailure, ConfigError, ConfigResult, Result, TripcheckError};
pub use types::{format_ui_date, format_ui_date_digits, DayCounting, TripDates};
