use crate::driver::{navigation_target, Key, Modifier, PageDriver, SessionHost};
use crate::error::{BrowserError, Result};
use crate::locator::{By, Locator};
use crate::script::Script;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig as ChromeConfig, Element, Page};
use futures::stream::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use tripcheck_core::BrowserConfig;

/// CDP error fragments that mean the node left the document.
const STALE_MARKERS: &[&str] = &[
    "does not belong to the document",
    "Could not find node with given id",
    "No node with given id found",
    "Node is detached from document",
    "Cannot find context with specified id",
];

/// Editing command attached to the select-all chord.
const SELECT_ALL_COMMAND: &str = "selectAll";

/// How long Chrome gets to exit before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(10);

fn cdp_error(context: &str, e: CdpError) -> BrowserError {
    let message = e.to_string();
    if STALE_MARKERS.iter().any(|marker| message.contains(marker)) {
        BrowserError::StaleElement(message)
    } else {
        BrowserError::ChromiumError(format!("{context}: {message}"))
    }
}

/// Key event for `modifier`+`key`.
fn key_event(
    kind: DispatchKeyEventType,
    modifier: Modifier,
    key: char,
) -> Result<DispatchKeyEventParams> {
    let upper = key.to_ascii_uppercase();
    let mut builder = DispatchKeyEventParams::builder()
        .r#type(kind.clone())
        .modifiers(modifier.cdp_bit())
        .key(key.to_string())
        .code(format!("Key{upper}"))
        .windows_virtual_key_code(i64::from(u32::from(upper)));
    // Chrome does not map raw modifier chords to editing commands
    if matches!(kind, DispatchKeyEventType::KeyDown) && upper == 'A' {
        builder = builder.commands(vec![SELECT_ALL_COMMAND.to_string()]);
    }
    builder.build().map_err(BrowserError::ChromiumError)
}

/// Chrome launch arguments derived from [`BrowserConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub headless: bool,
    pub args: Vec<String>,
    pub window: (u32, u32),
}

impl LaunchOptions {
    pub fn from_config(config: &BrowserConfig) -> Self {
        let mut args = vec![format!("--lang={}", config.language)];
        if !config.headless && config.start_maximized {
            args.push("--start-maximized".to_string());
        }
        Self {
            headless: config.headless,
            args,
            window: (config.window_width, config.window_height),
        }
    }
}

/// A launched Chrome process and its CDP event loop.
pub struct BrowserEngine {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch Chrome configured from `config`.
    pub async fn launch(config: &BrowserConfig, request_timeout: Duration) -> Result<Self> {
        let options = LaunchOptions::from_config(config);
        info!(
            "Launching Chrome (headless={}, lang={})",
            options.headless, config.language
        );

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(options.window.0, options.window.1)
            .request_timeout(request_timeout)
            .args(options.args);
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let chrome_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("browser handler event error: {}", e);
                }
            }
        });

        info!("Chrome launched");
        Ok(Self { browser, handler })
    }
}

#[async_trait::async_trait]
impl SessionHost for BrowserEngine {
    type Page = ChromePage;

    async fn open_page(&self) -> Result<Arc<ChromePage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(Arc::new(ChromePage { page }))
    }

    /// Close the browser, killing it when the close command fails or the
    /// process outlives [`EXIT_GRACE`], then stop the event loop.
    async fn close(mut self) -> Result<()> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if let Err(e) = &closed {
            warn!("Closing Chrome failed, killing it: {}", e);
            if let Some(Err(e)) = self.browser.kill().await {
                debug!("killing Chrome failed: {}", e);
            }
        }

        match tokio::time::timeout(EXIT_GRACE, self.browser.wait()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!("waiting for Chrome to exit failed: {}", e),
            Err(_) => {
                warn!("Chrome still running after {:?}, killing it", EXIT_GRACE);
                if let Some(Err(e)) = self.browser.kill().await {
                    debug!("killing Chrome failed: {}", e);
                }
            }
        }

        self.handler.abort();
        info!("Chrome closed");
        closed
    }
}

/// A Chrome tab implementing [`PageDriver`].
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    async fn bool_script(&self, element: &Element, script: Script) -> Result<bool> {
        Ok(self
            .run_script(element, &script)
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn ensure_editable(&self, element: &Element) -> Result<()> {
        if self.bool_script(element, Script::IsEditable).await? {
            Ok(())
        } else {
            Err(BrowserError::InvalidElementState(
                "element is disabled, readonly or not rendered".to_string(),
            ))
        }
    }

    async fn dispatch_key(
        &self,
        kind: DispatchKeyEventType,
        modifier: Modifier,
        key: char,
    ) -> Result<()> {
        let params = key_event(kind, modifier, key)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| cdp_error("key event", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageDriver for ChromePage {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        let target = navigation_target(url)?;
        debug!("Navigating to {}", target);
        self.page
            .goto(target.as_str())
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<Element>> {
        let found = match locator.strategy() {
            By::Css => self.page.find_element(locator.selector()).await,
            By::XPath => self.page.find_xpath(locator.selector()).await,
            By::Text => {
                self.page
                    .find_xpath(Locator::text_xpath(locator.selector()))
                    .await
            }
        };
        match found {
            Ok(element) => Ok(Some(element)),
            Err(e) => {
                trace!("{} not resolved: {}", locator, e);
                Ok(None)
            }
        }
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        self.bool_script(element, Script::IsDisplayed).await
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        self.bool_script(element, Script::IsEnabled).await
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        // `value` tracks what the user typed only as a property
        if name == "value" {
            let value = element
                .property("value")
                .await
                .map_err(|e| cdp_error("read value", e))?;
            return Ok(value.and_then(|v| v.as_str().map(str::to_string)));
        }
        element
            .attribute(name)
            .await
            .map_err(|e| cdp_error("read attribute", e))
    }

    async fn text(&self, element: &Element) -> Result<String> {
        Ok(element
            .inner_text()
            .await
            .map_err(|e| cdp_error("read text", e))?
            .unwrap_or_default())
    }

    async fn click(&self, element: &Element) -> Result<()> {
        if let Some(overlay) = self
            .run_script(element, &Script::ObscuringElement)
            .await?
            .as_str()
        {
            return Err(BrowserError::ClickIntercepted {
                target: element.remote_object_id.inner().clone(),
                obscured_by: overlay.to_string(),
            });
        }
        element
            .click()
            .await
            .map_err(|e| cdp_error("native click", e))?;
        Ok(())
    }

    async fn pointer_click(&self, element: &Element) -> Result<()> {
        let point = element
            .clickable_point()
            .await
            .map_err(|e| cdp_error("locate click point", e))?;
        self.page
            .move_mouse(point)
            .await
            .map_err(|e| cdp_error("pointer move", e))?;
        self.page
            .click(point)
            .await
            .map_err(|e| cdp_error("pointer click", e))?;
        Ok(())
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        self.ensure_editable(element).await?;
        element
            .focus()
            .await
            .map_err(|e| cdp_error("focus", e))?;
        element
            .type_str(text)
            .await
            .map_err(|e| cdp_error("type", e))?;
        Ok(())
    }

    async fn press_key(&self, element: &Element, key: Key) -> Result<()> {
        element
            .press_key(key.name())
            .await
            .map_err(|e| cdp_error("press key", e))?;
        Ok(())
    }

    async fn press_chord(&self, element: &Element, modifier: Modifier, key: char) -> Result<()> {
        self.ensure_editable(element).await?;
        element
            .focus()
            .await
            .map_err(|e| cdp_error("focus", e))?;
        self.dispatch_key(DispatchKeyEventType::KeyDown, modifier, key)
            .await?;
        self.dispatch_key(DispatchKeyEventType::KeyUp, modifier, key)
            .await
    }

    async fn clear(&self, element: &Element) -> Result<()> {
        self.ensure_editable(element).await?;
        self.run_script(element, &Script::SetValue(String::new()))
            .await?;
        Ok(())
    }

    async fn run_script(&self, element: &Element, script: &Script) -> Result<Value> {
        let returns = element
            .call_js_fn(script.to_function(), false)
            .await
            .map_err(|e| cdp_error(script.name(), e))?;

        if let Some(details) = returns.exception_details {
            let description = details
                .exception
                .as_ref()
                .and_then(|exception| exception.description.clone())
                .unwrap_or(details.text);
            return Err(BrowserError::Script(format!(
                "{} threw: {}",
                script.name(),
                description
            )));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_headed() {
        let config = BrowserConfig::default();
        let options = LaunchOptions::from_config(&config);
        assert!(!options.headless);
        assert_eq!(options.args, ["--lang=he", "--start-maximized"]);
        assert_eq!(options.window, (1920, 1080));
    }

    #[test]
    fn test_launch_options_headless_skips_maximize() {
        let config = BrowserConfig {
            headless: true,
            language: "en".to_string(),
            ..BrowserConfig::default()
        };
        let options = LaunchOptions::from_config(&config);
        assert!(options.headless);
        assert_eq!(options.args, ["--lang=en"]);
    }

    #[test]
    fn test_select_all_key_down_carries_command() {
        let [platform, _] = Modifier::select_all_order();
        let down = key_event(DispatchKeyEventType::KeyDown, platform, 'a').unwrap();
        assert_eq!(down.commands, Some(vec!["selectAll".to_string()]));
        assert_eq!(down.code.as_deref(), Some("KeyA"));
        assert_eq!(down.modifiers, Some(platform.cdp_bit()));

        let up = key_event(DispatchKeyEventType::KeyUp, platform, 'a').unwrap();
        assert_eq!(up.commands, None);
    }

    #[test]
    fn test_other_chords_carry_no_command() {
        let [platform, _] = Modifier::select_all_order();
        let down = key_event(DispatchKeyEventType::KeyDown, platform, 'c').unwrap();
        assert_eq!(down.commands, None);
    }
}
