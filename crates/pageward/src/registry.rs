//! Element page registry.
//!
//! Maps a semantic page key (`"textBox"`) to the labels needed to reach and
//! recognise that page: the side-menu button text and the page heading.
//!
//! The built-in pages form a closed set, [`ElementPage`]. Typed lookups on
//! that enum cannot fail. String keys are parsed at the boundary and fail with
//! `UnknownKey`. Extra pages (from configuration) are validated once when the
//! registry is built; afterwards the registry is read-only and can be shared
//! across threads without locking.

use crate::result::{PagewardError, PagewardResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Display metadata for one element page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPageConfig {
    /// Stable identifier
    pub key: String,
    /// Label of the menu entry that opens the page
    pub button_text: String,
    /// Text of the page heading
    pub title_text: String,
    /// Direct route, when the page should not be reached from the listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ElementPageConfig {
    /// Create a config without a direct route
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        button_text: impl Into<String>,
        title_text: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            button_text: button_text.into(),
            title_text: title_text.into(),
            url: None,
        }
    }

    /// Set a direct route
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    fn validate(&self) -> PagewardResult<()> {
        let blank = |field: &str| PagewardError::InvalidRegistry {
            message: format!("page {:?} has an empty {field}", self.key),
        };
        if self.key.trim().is_empty() {
            return Err(PagewardError::InvalidRegistry {
                message: "page key must not be empty".to_string(),
            });
        }
        if self.button_text.trim().is_empty() {
            return Err(blank("buttonText"));
        }
        if self.title_text.trim().is_empty() {
            return Err(blank("titleText"));
        }
        Ok(())
    }
}

/// Built-in element pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementPage {
    /// Text Box form
    TextBox,
    /// Web Tables grid
    WebTables,
    /// Web Tables with a heading that does not exist in the application.
    ///
    /// Negative fixture: `expect_visible` on this page must time out.
    WebTablesFix,
}

/// The closed set of built-in pages, in registry order
pub const ELEMENT_PAGES: [ElementPage; 3] = [
    ElementPage::TextBox,
    ElementPage::WebTables,
    ElementPage::WebTablesFix,
];

impl ElementPage {
    /// Stable string key
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TextBox => "textBox",
            Self::WebTables => "webTables",
            Self::WebTablesFix => "webTablesFIX",
        }
    }

    /// Menu label
    #[must_use]
    pub const fn button_text(self) -> &'static str {
        match self {
            Self::TextBox => "Text Box",
            Self::WebTables | Self::WebTablesFix => "Web Tables",
        }
    }

    /// Heading label
    #[must_use]
    pub const fn title_text(self) -> &'static str {
        match self {
            Self::TextBox => "Text Box",
            Self::WebTables => "Web Tables",
            Self::WebTablesFix => "Web Tables FIX",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// Build the config for this page
    #[must_use]
    pub fn config(self) -> ElementPageConfig {
        ElementPageConfig::new(self.key(), self.button_text(), self.title_text())
    }
}

impl fmt::Display for ElementPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ElementPage {
    type Err = PagewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ELEMENT_PAGES
            .into_iter()
            .find(|page| page.key() == s)
            .ok_or_else(|| PagewardError::unknown_key(s))
    }
}

/// Read-only registry of element pages
#[derive(Debug, Clone)]
pub struct ElementConfigRegistry {
    builtin: [ElementPageConfig; 3],
    extra: BTreeMap<String, ElementPageConfig>,
}

impl Default for ElementConfigRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ElementConfigRegistry {
    /// Registry with only the built-in pages
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            builtin: ELEMENT_PAGES.map(ElementPage::config),
            extra: BTreeMap::new(),
        }
    }

    /// Built-in pages plus `configs`.
    ///
    /// # Errors
    ///
    /// `InvalidRegistry` if a config has a blank field or reuses a key.
    pub fn with_pages(configs: impl IntoIterator<Item = ElementPageConfig>) -> PagewardResult<Self> {
        let mut registry = Self::builtin();
        for config in configs {
            config.validate()?;
            if registry.contains(&config.key) {
                return Err(PagewardError::InvalidRegistry {
                    message: format!("duplicate page key {:?}", config.key),
                });
            }
            let _ = registry.extra.insert(config.key.clone(), config);
        }
        Ok(registry)
    }

    /// Look up a page by string key
    ///
    /// # Errors
    ///
    /// `UnknownKey` if the key is not registered.
    pub fn lookup(&self, key: &str) -> PagewardResult<&ElementPageConfig> {
        if let Ok(page) = key.parse::<ElementPage>() {
            return Ok(self.page(page));
        }
        self.extra
            .get(key)
            .ok_or_else(|| PagewardError::unknown_key(key))
    }

    /// Look up a built-in page
    #[must_use]
    pub fn page(&self, page: ElementPage) -> &ElementPageConfig {
        &self.builtin[page.index()]
    }

    /// Check whether a key is registered
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_ok()
    }

    /// All configs, built-ins first
    pub fn iter(&self) -> impl Iterator<Item = &ElementPageConfig> {
        self.builtin.iter().chain(self.extra.values())
    }

    /// All registered keys
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|config| config.key.as_str()).collect()
    }

    /// Number of registered pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.builtin.len() + self.extra.len()
    }

    /// Always false; the built-in pages are always present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
