//! In-memory browser driver.
//!
//! [`MockDriver`] simulates the application under test: an elements listing
//! with a side menu, the Text Box form with its submission output, and the Web
//! Tables page. Selectors are resolved against a small element tree, so page
//! objects exercise the same locators they would use against a real browser.
//!
//! Supported CSS is a subset: descendant combinators and compound selectors of
//! tag, `#id` and `.class`, optionally comma separated.

use crate::config::DEFAULT_BASE_URL;
use crate::driver::{BrowserDriver, ElementHandle};
use crate::harness::DriverFactory;
use crate::locator::{Locator, Selector, DEFAULT_POLL_INTERVAL_MS};
use crate::result::{PagewardError, PagewardResult};
use crate::wait::{poll_until, WaitOptions};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// What clicking an element does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Load another page of the simulated application
    Navigate(String),
    /// Submit the Text Box form
    SubmitTextBox,
}

/// Element of a simulated page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Tag name
    pub tag: String,
    /// `id` attribute
    pub id: Option<String>,
    /// `class` list
    pub classes: Vec<String>,
    /// Own text content
    pub text: String,
    /// `placeholder` attribute
    pub placeholder: Option<String>,
    /// Input value
    pub value: String,
    /// Whether the element renders
    pub visible: bool,
    /// Click behaviour
    pub action: Option<ClickAction>,
    /// Child elements
    pub children: Vec<MockElement>,
}

impl MockElement {
    /// Create a visible element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            text: String::new(),
            placeholder: None,
            value: String::new(),
            visible: true,
            action: None,
            children: Vec::new(),
        }
    }

    /// Set the id
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the placeholder
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set click behaviour
    #[must_use]
    pub fn on_click(mut self, action: ClickAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Add a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    element: MockElement,
    parent: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(s: &str) -> Self {
        let mut compound = Self {
            tag: None,
            id: None,
            classes: Vec::new(),
        };
        let mut current = String::new();
        let mut kind = 't';
        let flush = |kind: char, token: &mut String, compound: &mut Self| {
            if token.is_empty() {
                return;
            }
            let value = std::mem::take(token);
            match kind {
                '#' => compound.id = Some(value),
                '.' => compound.classes.push(value),
                _ => compound.tag = Some(value),
            }
        };
        for c in s.chars() {
            if c == '#' || c == '.' {
                flush(kind, &mut current, &mut compound);
                kind = c;
            } else {
                current.push(c);
            }
        }
        flush(kind, &mut current, &mut compound);
        compound
    }

    fn matches(&self, element: &MockElement) -> bool {
        self.tag.as_ref().map_or(true, |tag| *tag == element.tag)
            && self
                .id
                .as_ref()
                .map_or(true, |id| element.id.as_ref() == Some(id))
            && self.classes.iter().all(|c| element.classes.contains(c))
    }
}

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Path of the elements listing
pub const ELEMENTS_PATH: &str = "/elements";
/// Path of the Text Box page
pub const TEXT_BOX_PATH: &str = "/text-box";
/// Path of the Web Tables page
pub const WEB_TABLES_PATH: &str = "/webtables";

/// In-memory driver simulating the application under test
#[derive(Debug, Clone)]
pub struct MockDriver {
    base_url: String,
    pages: HashMap<String, MockElement>,
    nodes: Vec<Node>,
    current_url: String,
    poll_interval_ms: u64,
    render_delay_polls: u32,
    polls_since_load: u32,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Driver serving the simulated elements application
    #[must_use]
    pub fn new() -> Self {
        let mut driver = Self::empty(DEFAULT_BASE_URL);
        driver.add_page(ELEMENTS_PATH, elements_listing());
        driver.add_page(TEXT_BOX_PATH, text_box_page());
        driver.add_page(WEB_TABLES_PATH, web_tables_page());
        driver
    }

    /// Driver with no pages
    #[must_use]
    pub fn empty(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pages: HashMap::new(),
            nodes: Vec::new(),
            current_url: "about:blank".to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            render_delay_polls: 0,
            polls_since_load: 0,
            call_history: Vec::new(),
        }
    }

    /// Serve the pages under another base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Number of visibility polls before a freshly loaded page renders
    #[must_use]
    pub const fn with_render_delay(mut self, polls: u32) -> Self {
        self.render_delay_polls = polls;
        self
    }

    /// Interval between visibility polls
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Register a page body under a path
    pub fn add_page(&mut self, path: impl Into<String>, body: MockElement) {
        let _ = self.pages.insert(path.into(), body);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Value of the first element matching `selector` on the current page
    #[must_use]
    pub fn value_of(&self, selector: &Selector) -> Option<&str> {
        self.resolve(selector)
            .first()
            .map(|&idx| self.nodes[idx].element.value.as_str())
    }

    fn load(&mut self, path: &str) -> bool {
        let Some(body) = self.pages.get(path).cloned() else {
            return false;
        };
        self.nodes.clear();
        self.flatten(body, None);
        self.current_url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        self.polls_since_load = 0;
        true
    }

    fn flatten(&mut self, mut element: MockElement, parent: Option<usize>) {
        let children = std::mem::take(&mut element.children);
        let idx = self.nodes.len();
        self.nodes.push(Node { element, parent });
        for child in children {
            self.flatten(child, Some(idx));
        }
    }

    fn path_of(&self, url: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = url.strip_prefix(base).unwrap_or(url);
        if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        }
    }

    fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes[idx].parent, move |&p| self.nodes[p].parent)
    }

    fn text_content(&self, idx: usize) -> String {
        let mut text = self.nodes[idx].element.text.clone();
        for (child, node) in self.nodes.iter().enumerate() {
            if node.parent == Some(idx) {
                text.push_str(&self.text_content(child));
            }
        }
        text
    }

    fn is_rendered(&self, idx: usize) -> bool {
        self.nodes[idx].element.visible
            && self.ancestors(idx).all(|a| self.nodes[a].element.visible)
    }

    fn matches_css(&self, css: &str, idx: usize) -> bool {
        css.split(',').any(|alternative| {
            let compounds: Vec<Compound> = alternative
                .split_whitespace()
                .map(Compound::parse)
                .collect();
            let Some((last, rest)) = compounds.split_last() else {
                return false;
            };
            if !last.matches(&self.nodes[idx].element) {
                return false;
            }
            let mut pending = rest.iter().rev().peekable();
            for ancestor in self.ancestors(idx) {
                if let Some(compound) = pending.peek() {
                    if compound.matches(&self.nodes[ancestor].element) {
                        let _ = pending.next();
                    }
                }
            }
            pending.peek().is_none()
        })
    }

    fn matches(&self, selector: &Selector, idx: usize) -> bool {
        let element = &self.nodes[idx].element;
        match selector {
            Selector::Css(css) => self.matches_css(css, idx),
            Selector::CssWithText { css, text } => {
                self.matches_css(css, idx) && self.text_content(idx).contains(text.as_str())
            }
            Selector::Role { role, name } => {
                let has_role = match role.as_str() {
                    "heading" => HEADING_TAGS.contains(&element.tag.as_str()),
                    "button" => element.tag == "button",
                    "textbox" => element.tag == "input" || element.tag == "textarea",
                    _ => false,
                };
                has_role && self.text_content(idx).trim() == name
            }
            Selector::Placeholder(p) => element.placeholder.as_deref() == Some(p.as_str()),
            Selector::Within { scope, inner } => {
                self.matches(inner, idx) && self.ancestors(idx).any(|a| self.matches(scope, a))
            }
        }
    }

    fn resolve(&self, selector: &Selector) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&idx| self.matches(selector, idx))
            .collect()
    }

    fn resolve_one(&self, handle: &ElementHandle) -> PagewardResult<usize> {
        let matches = self.resolve(handle.locator().selector());
        match matches.as_slice() {
            [] => Err(PagewardError::ElementNotFound {
                description: handle.description(),
            }),
            [idx] => Ok(*idx),
            _ => Err(PagewardError::driver(format!(
                "strict mode violation: {} resolved to {} elements",
                handle.description(),
                matches.len()
            ))),
        }
    }

    fn find(&self, tag: &str, id: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.element.tag == tag && n.element.id.as_deref() == Some(id))
    }

    fn submit_text_box(&mut self) {
        let inputs = [
            ("input", "userName", "name", "Name:"),
            ("input", "userEmail", "email", "Email:"),
            ("textarea", "currentAddress", "currentAddress", "Current Address :"),
            ("textarea", "permanentAddress", "permanentAddress", "Permananet Address :"),
        ];
        let Some(email_idx) = self.find("input", "userEmail") else {
            return;
        };
        let email = self.nodes[email_idx].element.value.clone();
        if !email.is_empty() && !looks_like_email(&email) {
            let classes = &mut self.nodes[email_idx].element.classes;
            if !classes.iter().any(|c| c == "field-error") {
                classes.push("field-error".to_string());
            }
            tracing::debug!(%email, "simulated form rejected email");
            return;
        }
        self.nodes[email_idx]
            .element
            .classes
            .retain(|c| c != "field-error");

        for (tag, input_id, output_id, label) in inputs {
            let value = self
                .find(tag, input_id)
                .map(|idx| self.nodes[idx].element.value.clone())
                .unwrap_or_default();
            if let Some(out) = self.find("p", output_id) {
                let node = &mut self.nodes[out].element;
                node.visible = !value.is_empty();
                node.text = format!("{label}{value}");
            }
        }
        if let Some(output) = self
            .nodes
            .iter()
            .position(|n| n.element.id.as_deref() == Some("output"))
        {
            self.nodes[output].element.visible = true;
        }
    }

    fn visible_matches(&self, selector: &Selector) -> usize {
        if self.polls_since_load < self.render_delay_polls {
            return 0;
        }
        self.resolve(selector)
            .into_iter()
            .filter(|&idx| self.is_rendered(idx))
            .count()
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain.split('.').filter(|p| !p.is_empty()).count() >= 2
    })
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate_to(&mut self, url: &str) -> PagewardResult<()> {
        self.call_history.push(format!("navigate:{url}"));
        let path = self.path_of(url);
        if self.load(&path) {
            Ok(())
        } else {
            Err(PagewardError::Navigation {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            })
        }
    }

    async fn locate(&mut self, locator: &Locator) -> PagewardResult<ElementHandle> {
        self.call_history
            .push(format!("locate:{}", locator.description()));
        Ok(ElementHandle::new(locator.clone()))
    }

    async fn click(&mut self, handle: &ElementHandle) -> PagewardResult<()> {
        self.call_history
            .push(format!("click:{}", handle.description()));
        let idx = self.resolve_one(handle)?;
        if !self.is_rendered(idx) {
            return Err(PagewardError::driver(format!(
                "{} is not visible",
                handle.description()
            )));
        }
        match self.nodes[idx].element.action.clone() {
            Some(ClickAction::Navigate(path)) => {
                let _ = self.load(&path);
            }
            Some(ClickAction::SubmitTextBox) => self.submit_text_box(),
            None => {}
        }
        Ok(())
    }

    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> PagewardResult<()> {
        self.call_history
            .push(format!("fill:{}", handle.description()));
        let idx = self.resolve_one(handle)?;
        let element = &mut self.nodes[idx].element;
        if element.tag != "input" && element.tag != "textarea" {
            return Err(PagewardError::driver(format!(
                "{} is a <{}>, not an input",
                handle.description(),
                element.tag
            )));
        }
        element.value = text.to_string();
        Ok(())
    }

    async fn assert_visible(
        &mut self,
        handle: &ElementHandle,
        timeout: Duration,
    ) -> PagewardResult<()> {
        self.call_history
            .push(format!("assert_visible:{}", handle.description()));
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let options = WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.poll_interval_ms);
        let selector = handle.locator().selector().clone();
        let mut strict_violation = 0;
        let result = poll_until(options, || {
            let count = self.visible_matches(&selector);
            self.polls_since_load = self.polls_since_load.saturating_add(1);
            if count > 1 {
                strict_violation = count;
            }
            async move { Ok(count >= 1) }
        })
        .await?;

        if strict_violation > 1 {
            return Err(PagewardError::driver(format!(
                "strict mode violation: {} resolved to {strict_violation} elements",
                handle.description()
            )));
        }
        if result.success {
            Ok(())
        } else {
            Err(PagewardError::VisibilityTimeout {
                description: handle.description(),
                timeout_ms,
            })
        }
    }

    async fn assert_has_value(
        &mut self,
        handle: &ElementHandle,
        expected: &str,
    ) -> PagewardResult<()> {
        self.call_history
            .push(format!("assert_has_value:{}", handle.description()));
        let idx = self.resolve_one(handle)?;
        let actual = &self.nodes[idx].element.value;
        if actual == expected {
            Ok(())
        } else {
            Err(PagewardError::ValueMismatch {
                description: handle.description(),
                expected: expected.to_string(),
                actual: actual.clone(),
            })
        }
    }

    async fn assert_contains_text(
        &mut self,
        handle: &ElementHandle,
        expected: &str,
    ) -> PagewardResult<()> {
        self.call_history
            .push(format!("assert_contains_text:{}", handle.description()));
        let idx = self.resolve_one(handle)?;
        let actual = self.text_content(idx);
        if actual.contains(expected) {
            Ok(())
        } else {
            Err(PagewardError::ValueMismatch {
                description: handle.description(),
                expected: expected.to_string(),
                actual,
            })
        }
    }

    async fn current_url(&self) -> PagewardResult<String> {
        Ok(self.current_url.clone())
    }
}

/// Each driver is a copy of this one with an empty history and no page loaded
#[async_trait]
impl DriverFactory for MockDriver {
    async fn new_driver(&self) -> PagewardResult<Box<dyn BrowserDriver>> {
        let mut driver = self.clone();
        driver.nodes.clear();
        driver.current_url = "about:blank".to_string();
        driver.call_history.clear();
        Ok(Box::new(driver))
    }
}

fn side_menu() -> MockElement {
    let item = |label: &str, path: &str| {
        MockElement::new("li").child(
            MockElement::new("span")
                .class("text")
                .text(label)
                .on_click(ClickAction::Navigate(path.to_string())),
        )
    };
    MockElement::new("ul")
        .class("menu-list")
        .child(item("Text Box", TEXT_BOX_PATH))
        .child(item("Check Box", "/checkbox"))
        .child(item("Radio Button", "/radio-button"))
        .child(item("Web Tables", WEB_TABLES_PATH))
}

fn elements_listing() -> MockElement {
    MockElement::new("body").child(side_menu())
}

fn text_box_page() -> MockElement {
    let output_line = |id: &str| MockElement::new("p").id(id).visible(false);
    MockElement::new("body")
        .child(side_menu())
        .child(MockElement::new("h1").class("text-center").text("Text Box"))
        .child(
            MockElement::new("form")
                .id("userForm")
                .child(
                    MockElement::new("input")
                        .id("userName")
                        .class("form-control")
                        .placeholder("Full Name"),
                )
                .child(
                    MockElement::new("input")
                        .id("userEmail")
                        .class("form-control")
                        .placeholder("name@example.com"),
                )
                .child(
                    MockElement::new("textarea")
                        .id("currentAddress")
                        .class("form-control")
                        .placeholder("Current Address"),
                )
                .child(
                    MockElement::new("textarea")
                        .id("permanentAddress")
                        .class("form-control"),
                )
                .child(
                    MockElement::new("button")
                        .id("submit")
                        .class("btn")
                        .text("Submit")
                        .on_click(ClickAction::SubmitTextBox),
                ),
        )
        .child(
            MockElement::new("div")
                .id("output")
                .child(output_line("name"))
                .child(output_line("email"))
                .child(output_line("currentAddress"))
                .child(output_line("permanentAddress")),
        )
}

fn web_tables_page() -> MockElement {
    MockElement::new("body")
        .child(side_menu())
        .child(MockElement::new("h1").class("text-center").text("Web Tables"))
        .child(MockElement::new("div").class("rt-table"))
}
