//! Scenario runner: bootstrap, flow, teardown.

use crate::error::{FlowError, Result};
use crate::flow::TravelFlow;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};
use tripcheck_browser::{BrowserEngine, Interactor, PageDriver, SessionHost};
use tripcheck_core::{AppConfig, DurationCheck, TripConfig, TripDates};

/// How a scenario ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every step passed; carries the displayed trip length
    Passed { total_days: i64 },
    /// First failing step's error, as displayed
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub outcome: Outcome,
    pub trip: TripDates,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed { .. })
    }

    fn failed(name: &'static str, trip: TripDates, err: &FlowError) -> Self {
        Self {
            name,
            outcome: Outcome::Failed {
                message: err.to_string(),
            },
            trip,
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Passed { total_days } => write!(
                f,
                "PASS {} [{}]: {} days",
                self.name, self.trip, total_days
            ),
            Outcome::Failed { message } => {
                write!(f, "FAIL {} [{}]: {}", self.name, self.trip, message)
            }
        }
    }
}

pub struct Scenario;

impl Scenario {
    pub const FIRST_PURCHASE: &'static str = "first-purchase";

    /// Trip departing `depart_offset_days` after `today`.
    pub fn trip_for(config: &TripConfig, today: NaiveDate) -> Result<TripDates> {
        Ok(TripDates::starting_in(
            today,
            config.depart_offset_days,
            config.requested_days,
            config.counting(),
        )?)
    }

    /// Run the first-purchase flow on an already open session.
    pub async fn run_with<D: PageDriver>(
        driver: Arc<D>,
        config: &AppConfig,
        trip: TripDates,
    ) -> ScenarioReport {
        let check =
            DurationCheck::new(config.trip.counting()).with_tolerance(config.trip.tolerance_days);
        let flow = TravelFlow::new(
            Interactor::from_config(driver, &config.waits),
            config.site.base_url.clone(),
            check,
        );

        info!(
            "Scenario {}: depart={}, return={}, requested_days={}, inclusive={}, days_between={}",
            Self::FIRST_PURCHASE,
            trip.depart(),
            trip.return_date(),
            config.trip.requested_days,
            config.trip.count_inclusive,
            trip.days_between()
        );

        match flow.run_first_purchase(&trip).await {
            Ok(total_days) => ScenarioReport {
                name: Self::FIRST_PURCHASE,
                outcome: Outcome::Passed { total_days },
                trip,
            },
            Err(e) => {
                error!("Scenario {} failed: {}", Self::FIRST_PURCHASE, e);
                ScenarioReport::failed(Self::FIRST_PURCHASE, trip, &e)
            }
        }
    }

    /// Open a page on `host`, run the flow and close `host`.
    ///
    /// The host is closed whatever the outcome, including when no page
    /// could be opened.
    pub async fn run_in<H: SessionHost>(
        host: H,
        config: &AppConfig,
        trip: TripDates,
    ) -> ScenarioReport {
        let report = match host.open_page().await {
            Ok(page) => Self::run_with(page, config, trip).await,
            Err(e) => {
                let e = FlowError::from(e);
                error!("Opening a page failed: {}", e);
                ScenarioReport::failed(Self::FIRST_PURCHASE, trip, &e)
            }
        };

        if let Err(e) = host.close().await {
            warn!("Browser teardown failed: {}", e);
        }
        report
    }

    /// Launch Chrome and run the flow in it.
    ///
    /// Only an invalid configuration is returned as an error; any failure
    /// once the trip is known ends up in the report.
    pub async fn first_purchase(config: &AppConfig, today: NaiveDate) -> Result<ScenarioReport> {
        config.validate()?;
        let trip = Self::trip_for(&config.trip, today)?;

        match BrowserEngine::launch(&config.browser, config.waits.explicit_timeout()).await {
            Ok(engine) => Ok(Self::run_in(engine, config, trip).await),
            Err(e) => {
                let e = FlowError::from(e);
                error!("Browser bootstrap failed: {}", e);
                Ok(ScenarioReport::failed(Self::FIRST_PURCHASE, trip, &e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trip_for_defaults() {
        let trip = Scenario::trip_for(&TripConfig::default(), date(2026, 10, 16)).unwrap();
        assert_eq!(trip.depart(), date(2026, 10, 23));
        assert_eq!(trip.return_date(), date(2026, 11, 21));
        assert_eq!(trip.days_between(), 29);
    }

    #[test]
    fn test_trip_for_exclusive() {
        let config = TripConfig {
            count_inclusive: false,
            ..TripConfig::default()
        };
        let trip = Scenario::trip_for(&config, date(2026, 10, 16)).unwrap();
        assert_eq!(trip.days_between(), 30);
    }

    #[test]
    fn test_report_display() {
        let trip = TripDates::new(date(2026, 10, 23), date(2026, 11, 21)).unwrap();
        let passed = ScenarioReport {
            name: Scenario::FIRST_PURCHASE,
            outcome: Outcome::Passed { total_days: 30 },
            trip,
        };
        assert!(passed.passed());
        assert!(passed.to_string().starts_with("PASS first-purchase"));
        assert!(passed.to_string().ends_with(": 30 days"));

        let failed = ScenarioReport {
            outcome: Outcome::Failed {
                message: "assertion failed: Passengers page not visible".to_string(),
            },
            ..passed
        };
        assert!(!failed.passed());
        assert!(failed
            .to_string()
            .ends_with("assertion failed: Passengers page not visible"));
    }

    #[tokio::test]
    async fn test_first_purchase_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.trip.requested_days = 0;
        let result = Scenario::first_purchase(&config, date(2026, 10, 16)).await;
        assert!(matches!(result, Err(FlowError::Config(_))));
    }
}
