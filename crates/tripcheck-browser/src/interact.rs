//! Resilient click and typing operations.
//!
//! Every operation waits for its target first, then works through an ordered
//! chain of strategies. Later strategies are only tried when the earlier one
//! failed, and typing finishes with a read-back that overwrites the field
//! through the scripting bridge when the observed value is wrong.

use crate::driver::{Key, Modifier, PageDriver};
use crate::error::{BrowserError, Result};
use crate::locator::{By, Locator};
use crate::script::Script;
use crate::wait::Waits;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use tripcheck_core::{format_ui_date, format_ui_date_digits, WaitConfig};

/// Placeholder fragment that marks a masked date input.
const DATE_MASK_HINT: &str = "dd/mm/yyyy";

/// How a click was finally delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickStrategy {
    /// Native click at the element's center, with hit-testing
    Native,
    /// Pointer moved onto the element, then pressed and released
    SimulatedPointer,
    /// `element.click()` through the scripting bridge
    ScriptBridge,
}

impl ClickStrategy {
    /// The next strategy to try after this one failed.
    pub fn fallback(self) -> Option<Self> {
        match self {
            Self::Native => Some(Self::SimulatedPointer),
            Self::SimulatedPointer => Some(Self::ScriptBridge),
            Self::ScriptBridge => None,
        }
    }
}

impl fmt::Display for ClickStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Native => "native",
            Self::SimulatedPointer => "pointer",
            Self::ScriptBridge => "script",
        };
        f.write_str(name)
    }
}

/// Typing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typing {
    /// Pause between keystrokes into masked inputs
    pub keystroke_delay: Duration,
    /// Pause after a hard clear
    pub clear_settle: Duration,
}

impl Typing {
    pub fn from_config(config: &WaitConfig) -> Self {
        Self {
            keystroke_delay: config.keystroke_delay(),
            clear_settle: config.clear_settle(),
        }
    }
}

impl Default for Typing {
    fn default() -> Self {
        Self::from_config(&WaitConfig::default())
    }
}

/// Best-effort step: the failure is intentionally dropped.
fn discard<T>(step: &str, locator: &Locator, result: Result<T>) {
    if let Err(e) = result {
        trace!("best-effort {} on {} skipped: {}", step, locator, e);
    }
}

/// Click and typing operations over a [`PageDriver`].
pub struct Interactor<D: PageDriver> {
    driver: Arc<D>,
    waits: Waits,
    typing: Typing,
}

impl<D: PageDriver> Clone for Interactor<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            waits: self.waits,
            typing: self.typing,
        }
    }
}

impl<D: PageDriver> Interactor<D> {
    pub fn new(driver: Arc<D>, waits: Waits, typing: Typing) -> Self {
        Self {
            driver,
            waits,
            typing,
        }
    }

    pub fn from_config(driver: Arc<D>, config: &WaitConfig) -> Self {
        Self::new(driver, Waits::from_config(config), Typing::from_config(config))
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn waits(&self) -> Waits {
        self.waits
    }

    /// A copy of this interactor using `waits`; `self` is unchanged.
    pub fn with_waits(&self, waits: Waits) -> Self {
        Self {
            waits,
            ..self.clone()
        }
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.driver.navigate(url).await
    }

    /// Wait until `locator` is visible and return its element.
    pub async fn visible(&self, locator: &Locator) -> Result<D::Element> {
        self.waits.visible(self.driver(), locator).await
    }

    /// Wait until `locator` is absent or hidden.
    pub async fn invisible(&self, locator: &Locator) -> Result<()> {
        self.waits.invisible(self.driver(), locator).await
    }

    /// Click `locator`, degrading from a native click to a simulated pointer
    /// click to a scripted `click()`.
    ///
    /// Only interception or staleness move past the native click; any other
    /// native failure is returned as is. Fails with
    /// [`BrowserError::Interaction`] only when the scripted click throws.
    pub async fn click(&self, locator: &Locator) -> Result<ClickStrategy> {
        let mut element = self.waits.clickable(self.driver(), locator).await?;
        discard(
            "scroll",
            locator,
            self.driver
                .run_script(&element, &Script::ScrollIntoViewCenter)
                .await,
        );

        let mut strategy = ClickStrategy::Native;
        loop {
            let attempt = match strategy {
                ClickStrategy::Native => self.driver.click(&element).await,
                ClickStrategy::SimulatedPointer => self.driver.pointer_click(&element).await,
                ClickStrategy::ScriptBridge => self
                    .driver
                    .run_script(&element, &Script::Click)
                    .await
                    .map(|_| ()),
            };

            let err = match attempt {
                Ok(()) => {
                    match strategy {
                        ClickStrategy::Native => info!("Clicked {}", locator),
                        _ => info!("Clicked via {} {}", strategy, locator),
                    }
                    return Ok(strategy);
                }
                Err(e) if strategy == ClickStrategy::Native && !e.is_transient_click_failure() => {
                    return Err(e);
                }
                Err(e) => e,
            };

            let Some(next) = strategy.fallback() else {
                return Err(BrowserError::Interaction {
                    locator: locator.to_string(),
                    reason: err.to_string(),
                });
            };
            debug!(
                "{} click on {} failed, trying {}: {}",
                strategy, locator, next, err
            );
            if err.is_stale() {
                if let Ok(Some(fresh)) = self.driver.find(locator).await {
                    element = fresh;
                }
            }
            strategy = next;
        }
    }

    /// Click any visible, enabled button/anchor/div/span containing `text`.
    pub async fn click_visible_text(&self, text: &str) -> Result<ClickStrategy> {
        self.click(&Locator::new(By::Text, text)).await
    }

    /// Replace the content of `locator` with `value`.
    ///
    /// On return the field reads back exactly `value`, whichever input path
    /// got it there.
    pub async fn set_text(&self, locator: &Locator, value: &str) -> Result<()> {
        let element = self.focus_visible(locator).await?;
        self.hard_clear(locator, &element).await;

        match self.driver.send_keys(&element, value).await {
            Ok(()) => {}
            Err(e) if e.is_invalid_state() => {
                debug!("Typing into {} rejected, setting via script: {}", locator, e);
                self.script_set(locator, &element, value).await?;
            }
            Err(e) if e.is_stale() => {
                warn!("Stale during typing into {}, retrying once", locator);
                let fresh = self.waits.short().visible(self.driver(), locator).await?;
                if let Err(e) = self.driver.send_keys(&fresh, value).await {
                    debug!("Retry into {} failed, setting via script: {}", locator, e);
                    self.script_set(locator, &fresh, value).await?;
                }
            }
            Err(e) => return Err(e),
        }

        self.ensure_value(locator, value).await?;
        info!("Set '{}' into {}", value, locator);
        Ok(())
    }

    /// Type `date` as `dd/MM/yyyy`.
    pub async fn set_date(&self, locator: &Locator, date: NaiveDate) -> Result<()> {
        self.set_text(locator, &format_ui_date(date)).await
    }

    /// Type `date`, choosing the encoding from the field's placeholder.
    ///
    /// A `dd/mm/yyyy` placeholder marks a masked input: the digits
    /// `ddMMyyyy` are typed one at a time so the page inserts the
    /// separators, then Tab commits. Other fields get `dd/MM/yyyy` directly.
    pub async fn set_date_autodetect(&self, locator: &Locator, date: NaiveDate) -> Result<()> {
        let element = self.focus_visible(locator).await?;
        let masked = self
            .driver
            .attribute(&element, "placeholder")
            .await
            .ok()
            .flatten()
            .is_some_and(|p| p.to_lowercase().contains(DATE_MASK_HINT));
        let expected = format_ui_date(date);

        self.hard_clear(locator, &element).await;

        if masked {
            for digit in format_ui_date_digits(date).chars() {
                match self.driver.send_keys(&element, &digit.to_string()).await {
                    Ok(()) => {}
                    Err(e) if e.is_invalid_state() => {
                        debug!("Masked input {} rejected a key: {}", locator, e);
                        self.script_set(locator, &element, &expected).await?;
                        break;
                    }
                    // The read-back below re-resolves and corrects
                    Err(e) if e.is_stale() => {
                        warn!("Masked input {} re-rendered while typing", locator);
                        break;
                    }
                    Err(e) => return Err(e),
                }
                tokio::time::sleep(self.typing.keystroke_delay).await;
            }
            discard(
                "tab out",
                locator,
                self.driver.press_key(&element, Key::Tab).await,
            );
        } else {
            match self.driver.send_keys(&element, &expected).await {
                Ok(()) => {}
                Err(e) if e.is_invalid_state() => {
                    self.script_set(locator, &element, &expected).await?;
                }
                Err(e) if e.is_stale() => {
                    warn!("Date input {} re-rendered while typing", locator);
                }
                Err(e) => return Err(e),
            }
        }

        self.ensure_value(locator, &expected).await?;
        info!("Date set (auto) '{}' into {}", expected, locator);
        Ok(())
    }

    /// The field's value, or its trimmed text when it has none.
    ///
    /// Read through the scripting bridge in one round trip; when the bridge
    /// is unavailable the value attribute and the rendered text are queried.
    pub async fn read_value(&self, locator: &Locator) -> Result<String> {
        let element = self.visible(locator).await?;
        match self.driver.run_script(&element, &Script::ReadValue).await {
            Ok(serde_json::Value::String(value)) => return Ok(value),
            Ok(other) => trace!("read-value on {} returned {}", locator, other),
            Err(e) => trace!("read-value on {} via script failed: {}", locator, e),
        }
        let value = self.driver.attribute(&element, "value").await.ok().flatten();
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            return Ok(value);
        }
        Ok(self
            .driver
            .text(&element)
            .await
            .map(|t| t.trim().to_string())
            .unwrap_or_default())
    }

    /// Empty the field using every clearing path available.
    pub async fn clear(&self, locator: &Locator) -> Result<()> {
        let element = self.focus_visible(locator).await?;
        self.hard_clear(locator, &element).await;
        Ok(())
    }

    pub async fn press_enter(&self, locator: &Locator) -> Result<()> {
        self.press(locator, Key::Enter).await
    }

    pub async fn press_tab(&self, locator: &Locator) -> Result<()> {
        self.press(locator, Key::Tab).await
    }

    pub async fn press_escape(&self, locator: &Locator) -> Result<()> {
        self.press(locator, Key::Escape).await
    }

    async fn press(&self, locator: &Locator, key: Key) -> Result<()> {
        let element = self.visible(locator).await?;
        self.driver.press_key(&element, key).await
    }

    /// Scroll the element to the vertical center of the viewport.
    pub async fn scroll_into_view_center(&self, locator: &Locator) -> Result<()> {
        let element = self.visible(locator).await?;
        self.driver
            .run_script(&element, &Script::ScrollIntoViewCenter)
            .await?;
        Ok(())
    }

    /// Visible element, scrolled into view and clicked for focus (both best-effort).
    async fn focus_visible(&self, locator: &Locator) -> Result<D::Element> {
        let element = self.visible(locator).await?;
        discard(
            "scroll",
            locator,
            self.driver
                .run_script(&element, &Script::ScrollIntoViewCenter)
                .await,
        );
        discard("focus click", locator, self.driver.click(&element).await);
        Ok(element)
    }

    /// Select-all + delete under both modifiers, then a native clear if
    /// anything is left. Every sub-step is best-effort.
    async fn hard_clear(&self, locator: &Locator, element: &D::Element) {
        for modifier in Modifier::select_all_order() {
            discard(
                "select all",
                locator,
                self.driver.press_chord(element, modifier, 'a').await,
            );
            discard(
                "delete",
                locator,
                self.driver.press_key(element, Key::Delete).await,
            );
        }

        if let Ok(Some(residual)) = self.driver.attribute(element, "value").await {
            if !residual.is_empty() {
                discard("native clear", locator, self.driver.clear(element).await);
            }
        }
        tokio::time::sleep(self.typing.clear_settle).await;
    }

    async fn script_set(&self, locator: &Locator, element: &D::Element, value: &str) -> Result<()> {
        self.driver
            .run_script(element, &Script::SetValue(value.to_string()))
            .await
            .map_err(|e| BrowserError::Interaction {
                locator: locator.to_string(),
                reason: format!("script set failed: {e}"),
            })?;
        Ok(())
    }

    /// Read back the field and overwrite it via script when it differs.
    async fn ensure_value(&self, locator: &Locator, expected: &str) -> Result<()> {
        let observed = self.read_value(locator).await?;
        if observed == expected {
            return Ok(());
        }

        debug!(
            "Read back '{}' from {}, expected '{}'; overwriting via script",
            observed, locator, expected
        );
        let element = self.visible(locator).await?;
        self.script_set(locator, &element, expected).await?;

        let corrected = self.read_value(locator).await?;
        if corrected == expected {
            Ok(())
        } else {
            Err(BrowserError::Interaction {
                locator: locator.to_string(),
                reason: format!("value reads '{corrected}' after correction, expected '{expected}'"),
            })
        }
    }
}
