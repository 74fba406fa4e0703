use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use crate::script::Script;
use serde_json::Value;
use std::sync::Arc;

/// Non-character keys sent through [`PageDriver::press_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    Escape,
    Delete,
}

impl Key {
    /// DOM `KeyboardEvent.key` name.
    pub fn name(self) -> &'static str {
        match self {
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::Escape => "Escape",
            Key::Delete => "Delete",
        }
    }
}

/// Modifier held for a chord such as select-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Control,
    Meta,
}

impl Modifier {
    /// Select-all modifier of the host platform, followed by the other one.
    pub fn select_all_order() -> [Modifier; 2] {
        if cfg!(target_os = "macos") {
            [Modifier::Meta, Modifier::Control]
        } else {
            [Modifier::Control, Modifier::Meta]
        }
    }

    /// CDP `Input.dispatchKeyEvent` modifier bit.
    pub fn cdp_bit(self) -> i64 {
        match self {
            Modifier::Control => 2,
            Modifier::Meta => 4,
        }
    }
}

/// Live browser session the interaction layer drives.
///
/// Implementations resolve locators against the current document on every
/// call and report detached elements as [`BrowserError::StaleElement`].
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    /// Handle to a resolved element. Only valid until the document changes.
    type Element: Send + Sync;

    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Resolve a locator; `None` when nothing matches
    async fn find(&self, locator: &Locator) -> Result<Option<Self::Element>>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Rendered text of the element
    async fn text(&self, element: &Self::Element) -> Result<String>;

    /// Native click at the element's center.
    ///
    /// Fails with [`BrowserError::ClickIntercepted`] when another element
    /// would receive the click.
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Move the pointer onto the element, then press and release, without hit-testing
    async fn pointer_click(&self, element: &Self::Element) -> Result<()>;

    /// Type characters. Fails with [`BrowserError::InvalidElementState`]
    /// when the element cannot take input.
    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<()>;

    async fn press_key(&self, element: &Self::Element, key: Key) -> Result<()>;

    /// Press `modifier` + `key` as one chord
    async fn press_chord(&self, element: &Self::Element, modifier: Modifier, key: char)
        -> Result<()>;

    /// Native clear of an editable element
    async fn clear(&self, element: &Self::Element) -> Result<()>;

    /// Scripting bridge: run `script` in the page with `this` bound to `element`
    async fn run_script(&self, element: &Self::Element, script: &Script) -> Result<Value>;
}

/// A browser process hosting the session a scenario runs in.
///
/// `close` must be called on every path once the host exists, including
/// after `open_page` failed.
#[async_trait::async_trait]
pub trait SessionHost: Send + Sized {
    type Page: PageDriver;

    /// Open a blank page to drive
    async fn open_page(&self) -> Result<Arc<Self::Page>>;

    /// Shut the browser down
    async fn close(self) -> Result<()>;
}

/// Parse and check a navigation URL: only `http`/`https` pages with a host.
pub fn navigation_target(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("invalid URL '{url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(BrowserError::NavigationError(format!(
                "unsupported scheme '{other}' in {url}"
            )))
        }
    }
    if parsed.host_str().is_none() {
        return Err(BrowserError::NavigationError(format!("no host in {url}")));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_target_accepts_web_pages() {
        let target = navigation_target("https://digital.harel-group.co.il/travel-policy").unwrap();
        assert_eq!(target.host_str(), Some("digital.harel-group.co.il"));
        assert!(navigation_target("http://localhost:8080/path").is_ok());
    }

    #[test]
    fn test_navigation_target_rejects_other_urls() {
        for url in ["not-a-url", "file:///etc/hosts", "javascript:alert(1)", "about:blank"] {
            assert!(
                matches!(navigation_target(url), Err(BrowserError::NavigationError(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn test_select_all_order_covers_both_modifiers() {
        let order = Modifier::select_all_order();
        assert_ne!(order[0], order[1]);
        assert!(order.contains(&Modifier::Control));
        assert!(order.contains(&Modifier::Meta));
    }
}
