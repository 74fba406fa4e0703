//! Travel-policy first-purchase scenario.
//!
//! [`TravelFlow`] walks the purchase wizard step by step over any
//! [`tripcheck_browser::PageDriver`]; [`Scenario`] wraps it with Chrome
//! bootstrap and teardown and reports the outcome.

pub mod error;
pub mod flow;
pub mod locators;
pub mod scenario;

pub use error::{FlowError, Result};
pub use flow::TravelFlow;
pub use scenario::{Outcome, Scenario, ScenarioReport};
