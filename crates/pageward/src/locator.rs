//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a declarative description of how to find an element. It
//! performs no I/O itself; a [`BrowserDriver`](crate::BrowserDriver) resolves
//! it into an [`ElementHandle`](crate::ElementHandle).
//!
//! Locators carry a human-readable description so that failures read like
//! `"Text Box Title not visible after 5000ms"` rather than a raw selector.

use std::fmt;
use std::time::Duration;

/// Default timeout for visibility waits (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for visibility waits (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "span.text")
    Css(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// ARIA role with an exact accessible name
    Role {
        /// Role name (e.g., "heading", "button")
        role: String,
        /// Accessible name, matched exactly after trimming
        name: String,
    },
    /// Input placeholder text, matched exactly
    Placeholder(String),
    /// Inner selector evaluated inside every match of an outer selector
    Within {
        /// Scoping selector
        scope: Box<Selector>,
        /// Selector evaluated relative to the scope
        inner: Box<Selector>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Create a placeholder selector
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// Scope this selector inside another one
    #[must_use]
    pub fn within(self, scope: Self) -> Self {
        Self::Within {
            scope: Box::new(scope),
            inner: Box::new(self),
        }
    }

    /// CSS tags that carry an implicit ARIA role
    #[must_use]
    pub fn role_css(role: &str) -> String {
        match role {
            "heading" => "h1,h2,h3,h4,h5,h6,[role=heading]".to_string(),
            "button" => {
                "button,[role=button],input[type=button],input[type=submit]".to_string()
            }
            "textbox" => "input:not([type]),input[type=text],input[type=email],textarea,[role=textbox]"
                .to_string(),
            other => format!("[role={other}]"),
        }
    }

    /// JavaScript expression evaluating to the array of matches under `root`
    #[must_use]
    pub fn to_candidates(&self, root: &str) -> String {
        match self {
            Self::Css(s) => format!("Array.from({root}.querySelectorAll({s:?}))"),
            Self::CssWithText { css, text } => format!(
                "Array.from({root}.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?}))"
            ),
            Self::Role { role, name } => {
                let css = Self::role_css(role);
                format!(
                    "Array.from({root}.querySelectorAll({css:?})).filter(el => (el.getAttribute('aria-label') || el.textContent || el.value || '').trim() === {name:?})"
                )
            }
            Self::Placeholder(p) => format!(
                "Array.from({root}.querySelectorAll('[placeholder]')).filter(el => el.getAttribute('placeholder') === {p:?})"
            ),
            Self::Within { scope, inner } => format!(
                "{}.flatMap(scope => {})",
                scope.to_candidates(root),
                inner.to_candidates("scope")
            ),
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("({}[0] ?? null)", self.to_candidates("document"))
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_candidates("document"))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::CssWithText { css, text } => write!(f, "{css} >> text={text:?}"),
            Self::Role { role, name } => write!(f, "role={role}[name={name:?}]"),
            Self::Placeholder(p) => write!(f, "placeholder={p:?}"),
            Self::Within { scope, inner } => write!(f, "{scope} >> {inner}"),
        }
    }
}

/// A described selector with its own wait budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    description: Option<String>,
    timeout: Duration,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            description: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Attach a human description used in logs and errors
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Description, falling back to the rendered selector
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.selector.to_string())
    }
}
