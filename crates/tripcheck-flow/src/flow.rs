//! The first-purchase wizard as a linear script.
//!
//! Steps never branch or retry; resilience lives in [`Interactor`].

use crate::error::Result;
use crate::locators::{
    ANY_CONTINENT_CARD, DEPARTURE_DATE_FIELD, FIRST_PURCHASE_BTN, PASSENGERS_HEADER,
    RETURN_DATE_FIELD, TOTAL_DAYS_TEXT, TO_DATES_BTN, TO_PASSENGERS_BTN,
};
use tracing::info;
use tripcheck_browser::{Interactor, PageDriver};
use tripcheck_core::error::ensure;
use tripcheck_core::{DurationCheck, TripDates};

pub struct TravelFlow<D: PageDriver> {
    ui: Interactor<D>,
    base_url: String,
    check: DurationCheck,
}

impl<D: PageDriver> TravelFlow<D> {
    pub fn new(ui: Interactor<D>, base_url: impl Into<String>, check: DurationCheck) -> Self {
        Self {
            ui,
            base_url: base_url.into(),
            check,
        }
    }

    pub async fn open_base_url(&self) -> Result<()> {
        info!("Opening URL: {}", self.base_url);
        self.ui.navigate(&self.base_url).await?;
        Ok(())
    }

    pub async fn click_first_purchase(&self) -> Result<()> {
        info!("Click: first purchase");
        self.ui.click(&FIRST_PURCHASE_BTN).await?;
        Ok(())
    }

    pub async fn pick_any_continent(&self) -> Result<()> {
        info!("Selecting a destination card");
        self.ui.click(&ANY_CONTINENT_CARD).await?;
        Ok(())
    }

    pub async fn go_to_dates(&self) -> Result<()> {
        info!("Navigating to dates step");
        self.ui.click(&TO_DATES_BTN).await?;
        Ok(())
    }

    /// Fill both date inputs. The inputs are masked, so the encoding is
    /// picked from their placeholder.
    pub async fn choose_dates(&self, trip: &TripDates) -> Result<()> {
        info!(
            "Filling dates: depart={}, return={}",
            trip.depart(),
            trip.return_date()
        );
        self.ui
            .set_date_autodetect(&DEPARTURE_DATE_FIELD, trip.depart())
            .await?;
        self.ui
            .set_date_autodetect(&RETURN_DATE_FIELD, trip.return_date())
            .await?;
        Ok(())
    }

    /// Read the trip-length label and compare it with `trip`.
    ///
    /// Returns the displayed day count.
    pub async fn verify_total_days(&self, trip: &TripDates) -> Result<i64> {
        info!("Verifying total days for {}", trip);
        let label = self.ui.visible(&TOTAL_DAYS_TEXT).await?;
        let text = self.ui.driver().text(&label).await?;
        Ok(self.check.evaluate(&text, trip)?)
    }

    pub async fn go_to_passengers(&self) -> Result<()> {
        info!("Navigating to passengers step");
        self.ui.click(&TO_PASSENGERS_BTN).await?;
        Ok(())
    }

    /// Times out when the passengers header never shows up; fails with an
    /// assertion when it is found but not displayed.
    pub async fn assert_passengers_page(&self) -> Result<()> {
        let header = self.ui.visible(&PASSENGERS_HEADER).await?;
        let displayed = self.ui.driver().is_displayed(&header).await?;
        ensure(displayed, || "Passengers page not visible".to_string())?;
        info!("Passengers page is visible");
        Ok(())
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run_first_purchase(&self, trip: &TripDates) -> Result<i64> {
        self.open_base_url().await?;
        self.click_first_purchase().await?;
        self.pick_any_continent().await?;
        self.go_to_dates().await?;
        self.choose_dates(trip).await?;
        let days = self.verify_total_days(trip).await?;
        self.go_to_passengers().await?;
        self.assert_passengers_page().await?;
        Ok(days)
    }
}
