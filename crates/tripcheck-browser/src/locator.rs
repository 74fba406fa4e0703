use std::borrow::Cow;
use std::fmt;

/// Strategy used to resolve a [`Locator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Css,
    XPath,
    /// Any visible, enabled button/anchor/div/span whose normalized text contains the selector
    Text,
}

/// Opaque description of at most one live element.
///
/// Locators are never cached as elements; every wait or interaction
/// resolves them again against the current document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: By,
    selector: Cow<'static, str>,
}

impl Locator {
    pub const fn css(selector: &'static str) -> Self {
        Self {
            strategy: By::Css,
            selector: Cow::Borrowed(selector),
        }
    }

    pub const fn xpath(selector: &'static str) -> Self {
        Self {
            strategy: By::XPath,
            selector: Cow::Borrowed(selector),
        }
    }

    pub const fn text(text: &'static str) -> Self {
        Self {
            strategy: By::Text,
            selector: Cow::Borrowed(text),
        }
    }

    pub fn new(strategy: By, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: Cow::Owned(selector.into()),
        }
    }

    pub fn strategy(&self) -> By {
        self.strategy
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The XPath a `By::Text` locator resolves through.
    pub fn text_xpath(text: &str) -> String {
        format!(
            "//*[self::button or self::a or self::div or self::span]\
             [contains(normalize-space(.),{}) and not(@disabled)]",
            xpath_literal(text)
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.strategy {
            By::Css => "css",
            By::XPath => "xpath",
            By::Text => "text",
        };
        write!(f, "{prefix}={}", self.selector)
    }
}

/// Quote `value` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so values holding both quote kinds are
/// assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
