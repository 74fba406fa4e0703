//! Resilient interaction layer over a Chrome session.
//!
//! [`PageDriver`] is the seam between the interaction logic and the browser:
//! [`ChromePage`] drives a real Chrome tab over CDP, while the `mock` module
//! (behind the `mock` feature) provides an in-memory page for tests.
//! [`Interactor`] layers explicit waits and click/type fallbacks on top.

pub mod driver;
pub mod engine;
pub mod error;
pub mod interact;
pub mod locator;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod script;
pub mod wait;

pub use driver::{Key, Modifier, PageDriver, SessionHost};
pub use engine::{BrowserEngine, ChromePage, LaunchOptions};
pub use error::{BrowserError, Result};
pub use interact::{ClickStrategy, Interactor, Typing};
pub use locator::{By, Locator};
pub use script::Script;
pub use wait::{Readiness, Waits};
