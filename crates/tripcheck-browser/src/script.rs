//! Scripting-bridge operations.
//!
//! Each [`Script`] renders to a JavaScript function declaration that the
//! session invokes with `this` bound to the target element. Arguments are
//! embedded as JSON literals.

use serde_json::Value;

/// An operation executed inside the page against one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Scroll the element to the vertical center of the viewport
    ScrollIntoViewCenter,
    /// Invoke the element's click behavior directly, bypassing hit-testing
    Click,
    /// Assign the value on the element (or its first nested input/textarea),
    /// notify `input`/`change` listeners when it changed, then blur
    SetValue(String),
    /// Read the element's `value` property, or its trimmed text
    ReadValue,
    /// Report whether the element is rendered and not hidden
    IsDisplayed,
    /// Report whether the element accepts input (not disabled)
    IsEnabled,
    /// Report whether the element can take keyboard input
    IsEditable,
    /// Describe the element at the center of the target if it is not the target
    /// or one of its descendants, otherwise `null`
    ObscuringElement,
}

impl Script {
    /// Render as a function declaration.
    pub fn to_function(&self) -> String {
        match self {
            Self::ScrollIntoViewCenter => {
                "function() { this.scrollIntoView({block: 'center', inline: 'nearest'}); }"
                    .to_string()
            }
            Self::Click => "function() { this.click(); }".to_string(),
            Self::SetValue(value) => format!(
                r"function() {{
    const v = {value};
    const tag = (this.tagName || '').toLowerCase();
    const tgt = (tag === 'input' || tag === 'textarea') ? this : this.querySelector('input,textarea');
    if (!tgt) return;
    const last = tgt.value;
    tgt.focus();
    tgt.value = v;
    if (last !== v) {{
        tgt.dispatchEvent(new Event('input', {{bubbles: true}}));
        tgt.dispatchEvent(new Event('change', {{bubbles: true}}));
    }}
    tgt.blur();
}}",
                value = json_literal(value)
            ),
            Self::ReadValue => r"function() {
    const v = this.value;
    if (typeof v === 'string' && v.length > 0) return v;
    return (this.innerText || this.textContent || '').trim();
}"
            .to_string(),
            Self::IsDisplayed => r"function() {
    if (!this.isConnected) return false;
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') return false;
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"
            .to_string(),
            Self::IsEnabled => "function() { return !this.disabled; }".to_string(),
            Self::IsEditable => r"function() {
    if (!this.isConnected || this.disabled || this.readOnly) return false;
    if (this.isContentEditable) return true;
    const tag = (this.tagName || '').toLowerCase();
    if (tag !== 'input' && tag !== 'textarea') return false;
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"
            .to_string(),
            Self::ObscuringElement => r"function() {
    const rect = this.getBoundingClientRect();
    const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
    if (hit === null || hit === this || this.contains(hit)) return null;
    const id = hit.id ? '#' + hit.id : '';
    const cls = typeof hit.className === 'string' && hit.className ? '.' + hit.className.trim().split(/\s+/).join('.') : '';
    return hit.tagName.toLowerCase() + id + cls;
}"
            .to_string(),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScrollIntoViewCenter => "scroll-into-view",
            Self::Click => "click",
            Self::SetValue(_) => "set-value",
            Self::ReadValue => "read-value",
            Self::IsDisplayed => "is-displayed",
            Self::IsEnabled => "is-enabled",
            Self::IsEditable => "is-editable",
            Self::ObscuringElement => "obscuring-element",
        }
    }
}

fn json_literal(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
