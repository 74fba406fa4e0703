//! Explicit waits.
//!
//! A wait re-queries the document on every poll: the element that satisfies
//! the predicate may be a different node than the one seen on the previous
//! poll after the page re-renders.

use crate::driver::PageDriver;
use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tripcheck_core::WaitConfig;

/// Condition an element must reach before a wait returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Attached to the document
    Present,
    /// Present and rendered
    Visible,
    /// Visible and enabled
    Clickable,
    /// Absent or not rendered
    Invisible,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Readiness::Present => "present",
            Readiness::Visible => "visible",
            Readiness::Clickable => "clickable",
            Readiness::Invisible => "invisible",
        };
        f.write_str(name)
    }
}

enum Check<E> {
    Ready(Option<E>),
    NotYet,
}

/// Polling budget for explicit waits.
///
/// `Waits` is a plain value: a shorter budget is obtained with
/// [`Waits::with_timeout`] or [`Waits::short`], which return a new value and
/// leave the default untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waits {
    timeout: Duration,
    short_timeout: Duration,
    poll_interval: Duration,
}

impl Waits {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            short_timeout: timeout,
            poll_interval,
        }
    }

    pub fn from_config(config: &WaitConfig) -> Self {
        Self {
            timeout: config.explicit_timeout(),
            short_timeout: config.short_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Same polling cadence with a different budget.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// The configured short budget.
    pub fn short(self) -> Self {
        self.with_timeout(self.short_timeout)
    }

    /// Poll until `locator` satisfies `readiness`.
    ///
    /// Returns the element for every predicate except
    /// [`Readiness::Invisible`], which yields `None`. Query errors during a
    /// poll count as "not yet".
    pub async fn wait_for<D: PageDriver>(
        &self,
        driver: &D,
        locator: &Locator,
        readiness: Readiness,
    ) -> Result<Option<D::Element>> {
        let started = Instant::now();

        loop {
            if let Check::Ready(element) = check(driver, locator, readiness).await {
                return Ok(element);
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(BrowserError::Timeout {
                    locator: locator.to_string(),
                    readiness: readiness.to_string(),
                    waited,
                });
            }
            tokio::time::sleep(self.poll_interval.min(self.timeout - waited)).await;
        }
    }

    pub async fn present<D: PageDriver>(&self, driver: &D, locator: &Locator) -> Result<D::Element> {
        self.element(driver, locator, Readiness::Present).await
    }

    pub async fn visible<D: PageDriver>(&self, driver: &D, locator: &Locator) -> Result<D::Element> {
        self.element(driver, locator, Readiness::Visible).await
    }

    pub async fn clickable<D: PageDriver>(
        &self,
        driver: &D,
        locator: &Locator,
    ) -> Result<D::Element> {
        self.element(driver, locator, Readiness::Clickable).await
    }

    /// Wait until the element is gone or hidden, e.g. a closing dialog.
    pub async fn invisible<D: PageDriver>(&self, driver: &D, locator: &Locator) -> Result<()> {
        self.wait_for(driver, locator, Readiness::Invisible).await?;
        Ok(())
    }

    async fn element<D: PageDriver>(
        &self,
        driver: &D,
        locator: &Locator,
        readiness: Readiness,
    ) -> Result<D::Element> {
        self.wait_for(driver, locator, readiness)
            .await?
            .ok_or_else(|| BrowserError::SelectorNotFound(locator.to_string()))
    }
}

async fn check<D: PageDriver>(
    driver: &D,
    locator: &Locator,
    readiness: Readiness,
) -> Check<D::Element> {
    let element = match driver.find(locator).await {
        Ok(Some(element)) => element,
        Ok(None) if readiness == Readiness::Invisible => return Check::Ready(None),
        Ok(None) => return Check::NotYet,
        Err(e) => {
            tracing::trace!("query for {} failed: {}", locator, e);
            return Check::NotYet;
        }
    };

    if readiness == Readiness::Present {
        return Check::Ready(Some(element));
    }

    let displayed = match driver.is_displayed(&element).await {
        Ok(displayed) => displayed,
        Err(e) if e.is_stale() && readiness == Readiness::Invisible => {
            return Check::Ready(None);
        }
        Err(e) => {
            tracing::trace!("visibility of {} unknown: {}", locator, e);
            return Check::NotYet;
        }
    };

    match readiness {
        Readiness::Invisible if displayed => Check::NotYet,
        Readiness::Invisible => Check::Ready(None),
        Readiness::Visible if displayed => Check::Ready(Some(element)),
        Readiness::Clickable if displayed => match driver.is_enabled(&element).await {
            Ok(true) => Check::Ready(Some(element)),
            _ => Check::NotYet,
        },
        _ => Check::NotYet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElementSpec, MockPage};
    use std::sync::Arc;

    const BUTTON: Locator = Locator::css("#next");

    fn fast() -> Waits {
        Waits::new(Duration::from_millis(300), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_visible_returns_element() {
        let page = MockPage::new();
        page.add(&BUTTON, MockElementSpec::button("Next"));

        let element = fast().visible(&page, &BUTTON).await.expect("visible");
        assert_eq!(page.text(&element).await.expect("text"), "Next");
    }

    #[tokio::test]
    async fn test_timeout_when_never_ready() {
        let page = MockPage::new();
        page.add(&BUTTON, MockElementSpec::button("Next").hidden());

        let err = fast().visible(&page, &BUTTON).await.unwrap_err();
        match err {
            BrowserError::Timeout {
                locator,
                readiness,
                waited,
            } => {
                assert_eq!(locator, "css=#next");
                assert_eq!(readiness, "visible");
                assert!(waited >= Duration::from_millis(300));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_present_accepts_hidden_element() {
        let page = MockPage::new();
        page.add(&BUTTON, MockElementSpec::button("Next").hidden());
        assert!(fast().present(&page, &BUTTON).await.is_ok());
    }

    #[tokio::test]
    async fn test_clickable_requires_enabled() {
        let page = Arc::new(MockPage::new());
        page.add(&BUTTON, MockElementSpec::button("Next").disabled());

        let enabler = {
            let page = Arc::clone(&page);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                page.update(&BUTTON, |el| el.enabled = true);
            })
        };

        let waits = fast().with_timeout(Duration::from_secs(2));
        assert!(waits.clickable(page.as_ref(), &BUTTON).await.is_ok());
        enabler.await.expect("enabler task");
    }

    #[tokio::test]
    async fn test_waits_for_element_to_appear() {
        let page = Arc::new(MockPage::new());

        let adder = {
            let page = Arc::clone(&page);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(40)).await;
                page.add(&BUTTON, MockElementSpec::button("Next"));
            })
        };

        let waits = fast().with_timeout(Duration::from_secs(2));
        assert!(waits.visible(page.as_ref(), &BUTTON).await.is_ok());
        adder.await.expect("adder task");
    }

    #[tokio::test]
    async fn test_invisible() {
        let page = MockPage::new();
        assert!(fast().invisible(&page, &BUTTON).await.is_ok());

        page.add(&BUTTON, MockElementSpec::button("Next").hidden());
        assert!(fast().invisible(&page, &BUTTON).await.is_ok());

        page.update(&BUTTON, |el| el.displayed = true);
        assert!(matches!(
            fast().invisible(&page, &BUTTON).await,
            Err(BrowserError::Timeout { .. })
        ));
    }

    #[test]
    fn test_short_is_scoped() {
        let config = WaitConfig::default();
        let waits = Waits::from_config(&config);
        let short = waits.short();

        assert_eq!(short.timeout(), Duration::from_secs(5));
        assert_eq!(waits.timeout(), Duration::from_secs(25));
        assert_eq!(short.poll_interval(), waits.poll_interval());
    }
}
