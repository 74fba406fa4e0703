use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout after {waited:?} waiting for {locator} to be {readiness}")]
    Timeout {
        locator: String,
        readiness: String,
        waited: Duration,
    },

    /// The element was detached from the document after it was resolved.
    #[error("stale element: {0}")]
    StaleElement(String),

    /// Another element covers the click point.
    #[error("click intercepted on {target}: {obscured_by}")]
    ClickIntercepted { target: String, obscured_by: String },

    /// The element cannot take keyboard input (disabled, readonly or hidden).
    #[error("invalid element state: {0}")]
    InvalidElementState(String),

    #[error("script error: {0}")]
    Script(String),

    /// Every fallback of a click or typing operation failed.
    #[error("interaction failed on {locator}: {reason}")]
    Interaction { locator: String, reason: String },
}

impl BrowserError {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement(_))
    }

    /// Native-click failures that the pointer fallback can recover from.
    pub fn is_transient_click_failure(&self) -> bool {
        matches!(self, Self::StaleElement(_) | Self::ClickIntercepted { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidElementState(_))
    }
}
