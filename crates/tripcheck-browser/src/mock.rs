//! In-memory [`PageDriver`] for exercising the interaction layer without a browser.
//!
//! A [`MockPage`] holds one node per locator. Nodes can be hidden, disabled,
//! covered by an overlay, re-rendered (making earlier handles stale) or made
//! to reject particular input paths, which is enough to drive every fallback
//! branch of [`crate::Interactor`].

use crate::driver::{Key, Modifier, PageDriver, SessionHost};
use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use crate::script::Script;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Static description of a mock element. Fields are public so tests can
/// flip them through [`MockPage::update`].
#[derive(Debug, Clone, Default)]
pub struct MockElementSpec {
    pub text: String,
    /// `Some` for editable elements
    pub value: Option<String>,
    pub placeholder: Option<String>,
    pub displayed: bool,
    pub enabled: bool,
    pub readonly: bool,
    /// Auto-insert `/` after the day and month digits, ignore typed separators
    pub date_mask: bool,
    /// Keep only the first character of multi-character key input
    pub drops_bulk_input: bool,
    /// Description of an element covering this one
    pub obscured_by: Option<String>,
    /// The overlay goes away once it has intercepted a click
    pub overlay_fades: bool,
    pub rejects_keys: bool,
    pub rejects_pointer: bool,
    pub rejects_script: bool,
    /// Number of upcoming interactions that find the node re-rendered
    pub stale_interactions: u32,
    /// Re-render once this many more key inputs have been accepted
    pub rerender_after_keys: Option<u32>,
    /// Locators displayed once this element is clicked
    pub reveals: Vec<Locator>,
}

impl MockElementSpec {
    pub fn button(text: &str) -> Self {
        Self {
            text: text.to_string(),
            displayed: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Static text such as a label or heading.
    pub fn label(text: &str) -> Self {
        Self::button(text)
    }

    pub fn input() -> Self {
        Self {
            value: Some(String::new()),
            displayed: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Masked date input with a `dd/mm/yyyy` placeholder.
    pub fn date_input() -> Self {
        Self {
            placeholder: Some("dd/mm/yyyy".to_string()),
            date_mask: true,
            ..Self::input()
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn obscured_by(mut self, overlay: &str) -> Self {
        self.obscured_by = Some(overlay.to_string());
        self
    }

    /// Covered by an overlay that disappears after intercepting one click,
    /// like a closing backdrop animation.
    pub fn fading_overlay(mut self, overlay: &str) -> Self {
        self.obscured_by = Some(overlay.to_string());
        self.overlay_fades = true;
        self
    }

    pub fn dropping_bulk_input(mut self) -> Self {
        self.drops_bulk_input = true;
        self
    }

    pub fn rejecting_keys(mut self) -> Self {
        self.rejects_keys = true;
        self
    }

    pub fn rejecting_pointer(mut self) -> Self {
        self.rejects_pointer = true;
        self
    }

    pub fn rejecting_script(mut self) -> Self {
        self.rejects_script = true;
        self
    }

    pub fn stale_for(mut self, interactions: u32) -> Self {
        self.stale_interactions = interactions;
        self
    }

    pub fn rerendering_after_keys(mut self, keys: u32) -> Self {
        self.rerender_after_keys = Some(keys);
        self
    }

    pub fn revealing(mut self, locator: Locator) -> Self {
        self.reveals.push(locator);
        self
    }
}

/// Something the page was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    Navigate(String),
    Scroll(String),
    NativeClick(String),
    PointerClick(String),
    ScriptClick(String),
    Keys { target: String, text: String },
    Key { target: String, key: Key },
    Chord { target: String, modifier: Modifier, key: char },
    Clear(String),
    ScriptSetValue { target: String, value: String },
    CloseBrowser,
}

/// Handle returned by [`MockPage::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    key: String,
    generation: u64,
}

#[derive(Debug)]
struct Node {
    spec: MockElementSpec,
    generation: u64,
    selected_all: bool,
}

#[derive(Debug, Default)]
struct State {
    nodes: HashMap<String, Node>,
    actions: Vec<MockAction>,
}

#[derive(Debug, Default)]
pub struct MockPage {
    state: Mutex<State>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach (or replace) the node a locator resolves to.
    pub fn add(&self, locator: &Locator, spec: MockElementSpec) {
        let mut state = self.lock();
        let generation = state
            .nodes
            .get(&locator.to_string())
            .map_or(0, |node| node.generation + 1);
        state.nodes.insert(
            locator.to_string(),
            Node {
                spec,
                generation,
                selected_all: false,
            },
        );
    }

    /// Mutate a node in place; existing handles stay valid.
    pub fn update(&self, locator: &Locator, f: impl FnOnce(&mut MockElementSpec)) {
        if let Some(node) = self.lock().nodes.get_mut(&locator.to_string()) {
            f(&mut node.spec);
        }
    }

    /// Replace the node with an identical one; existing handles go stale.
    pub fn rerender(&self, locator: &Locator) {
        if let Some(node) = self.lock().nodes.get_mut(&locator.to_string()) {
            node.generation += 1;
        }
    }

    /// Current value of an editable node.
    pub fn value(&self, locator: &Locator) -> Option<String> {
        self.lock()
            .nodes
            .get(&locator.to_string())
            .and_then(|node| node.spec.value.clone())
    }

    pub fn is_shown(&self, locator: &Locator) -> bool {
        self.lock()
            .nodes
            .get(&locator.to_string())
            .is_some_and(|node| node.spec.displayed)
    }

    pub fn actions(&self) -> Vec<MockAction> {
        self.lock().actions.clone()
    }

    fn with_node<T>(
        &self,
        element: &MockElement,
        f: impl FnOnce(&mut Node, &mut Vec<MockAction>) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let node = state
            .nodes
            .get_mut(&element.key)
            .ok_or_else(|| BrowserError::StaleElement(format!("{} was removed", element.key)))?;
        if node.generation != element.generation {
            return Err(BrowserError::StaleElement(format!(
                "{} was re-rendered",
                element.key
            )));
        }
        f(node, &mut state.actions)
    }

    /// Like `with_node`, but consumes a pending staleness first.
    fn interact<T>(
        &self,
        element: &MockElement,
        f: impl FnOnce(&mut Node, &mut Vec<MockAction>) -> Result<T>,
    ) -> Result<T> {
        self.with_node(element, |node, actions| {
            if node.spec.stale_interactions > 0 {
                node.spec.stale_interactions -= 1;
                node.generation += 1;
                return Err(BrowserError::StaleElement(format!(
                    "{} was re-rendered",
                    element.key
                )));
            }
            f(node, actions)
        })
    }

    fn reveal(&self, locators: &[Locator]) {
        let mut state = self.lock();
        for locator in locators {
            if let Some(node) = state.nodes.get_mut(&locator.to_string()) {
                node.spec.displayed = true;
            }
        }
    }
}

fn ensure_typeable(key: &str, node: &Node) -> Result<()> {
    let spec = &node.spec;
    if spec.value.is_none() {
        return Err(BrowserError::InvalidElementState(format!(
            "{key} is not editable"
        )));
    }
    if !spec.displayed || !spec.enabled || spec.readonly || spec.rejects_keys {
        return Err(BrowserError::InvalidElementState(format!(
            "{key} cannot take keyboard input"
        )));
    }
    Ok(())
}

fn type_char(node: &mut Node, c: char) {
    let mask = node.spec.date_mask;
    let selected_all = std::mem::take(&mut node.selected_all);
    let Some(value) = node.spec.value.as_mut() else {
        return;
    };
    if selected_all {
        value.clear();
    }
    if mask {
        if !c.is_ascii_digit() || value.len() >= 10 {
            return;
        }
        value.push(c);
        if value.len() == 2 || value.len() == 5 {
            value.push('/');
        }
    } else {
        value.push(c);
    }
}

#[async_trait::async_trait]
impl PageDriver for MockPage {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        crate::driver::navigation_target(url)?;
        self.lock().actions.push(MockAction::Navigate(url.to_string()));
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<MockElement>> {
        let key = locator.to_string();
        Ok(self.lock().nodes.get(&key).map(|node| MockElement {
            key: key.clone(),
            generation: node.generation,
        }))
    }

    async fn is_displayed(&self, element: &MockElement) -> Result<bool> {
        self.with_node(element, |node, _| Ok(node.spec.displayed))
    }

    async fn is_enabled(&self, element: &MockElement) -> Result<bool> {
        self.with_node(element, |node, _| Ok(node.spec.enabled))
    }

    async fn attribute(&self, element: &MockElement, name: &str) -> Result<Option<String>> {
        self.with_node(element, |node, _| {
            Ok(match name {
                "value" => node.spec.value.clone(),
                "placeholder" => node.spec.placeholder.clone(),
                "disabled" => (!node.spec.enabled).then(|| "true".to_string()),
                "readonly" => node.spec.readonly.then(|| "true".to_string()),
                _ => None,
            })
        })
    }

    async fn text(&self, element: &MockElement) -> Result<String> {
        self.with_node(element, |node, _| Ok(node.spec.text.clone()))
    }

    async fn click(&self, element: &MockElement) -> Result<()> {
        let reveals = self.interact(element, |node, actions| {
            if !node.spec.displayed {
                return Err(BrowserError::InvalidElementState(format!(
                    "{} is not displayed",
                    element.key
                )));
            }
            if let Some(overlay) = &node.spec.obscured_by {
                let err = BrowserError::ClickIntercepted {
                    target: element.key.clone(),
                    obscured_by: overlay.clone(),
                };
                if node.spec.overlay_fades {
                    node.spec.obscured_by = None;
                }
                return Err(err);
            }
            actions.push(MockAction::NativeClick(element.key.clone()));
            Ok(node.spec.reveals.clone())
        })?;
        self.reveal(&reveals);
        Ok(())
    }

    async fn pointer_click(&self, element: &MockElement) -> Result<()> {
        let reveals = self.interact(element, |node, actions| {
            if node.spec.rejects_pointer {
                return Err(BrowserError::ChromiumError(format!(
                    "pointer dispatch on {} failed",
                    element.key
                )));
            }
            if let Some(overlay) = &node.spec.obscured_by {
                return Err(BrowserError::ClickIntercepted {
                    target: element.key.clone(),
                    obscured_by: overlay.clone(),
                });
            }
            actions.push(MockAction::PointerClick(element.key.clone()));
            Ok(node.spec.reveals.clone())
        })?;
        self.reveal(&reveals);
        Ok(())
    }

    async fn send_keys(&self, element: &MockElement, text: &str) -> Result<()> {
        self.interact(element, |node, actions| {
            ensure_typeable(&element.key, node)?;
            actions.push(MockAction::Keys {
                target: element.key.clone(),
                text: text.to_string(),
            });
            let accepted: Vec<char> = if node.spec.drops_bulk_input {
                text.chars().take(1).collect()
            } else {
                text.chars().collect()
            };
            for c in accepted {
                type_char(node, c);
            }
            if let Some(remaining) = node.spec.rerender_after_keys {
                if remaining <= 1 {
                    node.spec.rerender_after_keys = None;
                    node.generation += 1;
                } else {
                    node.spec.rerender_after_keys = Some(remaining - 1);
                }
            }
            Ok(())
        })
    }

    async fn press_key(&self, element: &MockElement, key: Key) -> Result<()> {
        self.interact(element, |node, actions| {
            actions.push(MockAction::Key {
                target: element.key.clone(),
                key,
            });
            if key == Key::Delete {
                ensure_typeable(&element.key, node)?;
                let selected_all = std::mem::take(&mut node.selected_all);
                if let Some(value) = node.spec.value.as_mut().filter(|_| selected_all) {
                    value.clear();
                }
            }
            Ok(())
        })
    }

    async fn press_chord(&self, element: &MockElement, modifier: Modifier, key: char) -> Result<()> {
        self.interact(element, |node, actions| {
            ensure_typeable(&element.key, node)?;
            actions.push(MockAction::Chord {
                target: element.key.clone(),
                modifier,
                key,
            });
            // Only the platform's own modifier selects; the other is a no-op
            let platform = Modifier::select_all_order()[0];
            if key == 'a' && modifier == platform {
                node.selected_all = true;
            }
            Ok(())
        })
    }

    async fn clear(&self, element: &MockElement) -> Result<()> {
        self.interact(element, |node, actions| {
            ensure_typeable(&element.key, node)?;
            actions.push(MockAction::Clear(element.key.clone()));
            if let Some(value) = node.spec.value.as_mut() {
                value.clear();
            }
            Ok(())
        })
    }

    async fn run_script(&self, element: &MockElement, script: &Script) -> Result<Value> {
        let mut reveals = Vec::new();
        let result = self.with_node(element, |node, actions| {
            let rejected = || BrowserError::Script(format!("{} threw in page", script.name()));
            match script {
                Script::ScrollIntoViewCenter => {
                    actions.push(MockAction::Scroll(element.key.clone()));
                    Ok(Value::Null)
                }
                Script::Click => {
                    if node.spec.rejects_script {
                        return Err(rejected());
                    }
                    actions.push(MockAction::ScriptClick(element.key.clone()));
                    reveals = node.spec.reveals.clone();
                    Ok(Value::Null)
                }
                Script::SetValue(value) => {
                    if node.spec.rejects_script {
                        return Err(rejected());
                    }
                    actions.push(MockAction::ScriptSetValue {
                        target: element.key.clone(),
                        value: value.clone(),
                    });
                    if node.spec.value.is_some() {
                        node.spec.value = Some(value.clone());
                    }
                    Ok(Value::Null)
                }
                Script::ReadValue if node.spec.rejects_script => Err(rejected()),
                Script::ReadValue => Ok(Value::String(
                    node.spec
                        .value
                        .clone()
                        .filter(|v| !v.is_empty())
                        .unwrap_or_else(|| node.spec.text.trim().to_string()),
                )),
                Script::IsDisplayed => Ok(Value::Bool(node.spec.displayed)),
                Script::IsEnabled => Ok(Value::Bool(node.spec.enabled)),
                Script::IsEditable => Ok(Value::Bool(ensure_typeable(&element.key, node).is_ok())),
                Script::ObscuringElement => Ok(node
                    .spec
                    .obscured_by
                    .clone()
                    .map_or(Value::Null, Value::String)),
            }
        })?;
        self.reveal(&reveals);
        Ok(result)
    }
}

/// [`SessionHost`] over a single [`MockPage`]; closing it is recorded as
/// [`MockAction::CloseBrowser`] on that page.
#[derive(Debug)]
pub struct MockBrowser {
    page: Arc<MockPage>,
    fail_open: bool,
}

impl MockBrowser {
    pub fn new(page: Arc<MockPage>) -> Self {
        Self {
            page,
            fail_open: false,
        }
    }

    /// A browser whose `open_page` always fails.
    pub fn failing_open(page: Arc<MockPage>) -> Self {
        Self {
            page,
            fail_open: true,
        }
    }
}

#[async_trait::async_trait]
impl SessionHost for MockBrowser {
    type Page = MockPage;

    async fn open_page(&self) -> Result<Arc<MockPage>> {
        if self.fail_open {
            return Err(BrowserError::ChromiumError(
                "target crashed while opening page".to_string(),
            ));
        }
        Ok(Arc::clone(&self.page))
    }

    async fn close(self) -> Result<()> {
        self.page.lock().actions.push(MockAction::CloseBrowser);
        Ok(())
    }
}
