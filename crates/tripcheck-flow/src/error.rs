use thiserror::Error;
use tripcheck_browser::BrowserError;
use tripcheck_core::{AssertionFailure, ConfigError, TripcheckError};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] TripcheckError),
}

impl FlowError {
    /// Whether the scenario reached a check and the check failed.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            FlowError::Assertion(_) | FlowError::Core(TripcheckError::Assertion(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
