//! Abstract browser automation seam.
//!
//! Everything in this crate talks to the browser through [`BrowserDriver`].
//! Implementations:
//!
//! - [`MockDriver`](crate::MockDriver) - in-memory simulation of the
//!   application under test, used by unit tests and `pageward run --mock`
//! - `ChromiumDriver` - real Chromium over CDP (`browser` feature)

use crate::locator::Locator;
use crate::result::PagewardResult;
use async_trait::async_trait;
use std::time::Duration;

/// Lazily resolved element reference.
///
/// A handle is resolved again on every action, so it stays valid across
/// re-renders; a missing element surfaces when it is acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    locator: Locator,
}

impl ElementHandle {
    /// Create a handle for a locator
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self { locator }
    }

    /// The locator this handle resolves
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Human description for logs and errors
    #[must_use]
    pub fn description(&self) -> String {
        self.locator.description()
    }
}

/// Browser driver consumed by page objects.
///
/// Assertions report failures as errors; they never panic.
#[async_trait]
pub trait BrowserDriver: Send {
    /// Navigate to URL
    async fn navigate_to(&mut self, url: &str) -> PagewardResult<()>;

    /// Build a handle for a locator
    async fn locate(&mut self, locator: &Locator) -> PagewardResult<ElementHandle>;

    /// Click element
    async fn click(&mut self, handle: &ElementHandle) -> PagewardResult<()>;

    /// Replace the element's value with `text`
    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> PagewardResult<()>;

    /// Wait up to `timeout` for the element to be visible.
    ///
    /// Fails with `VisibilityTimeout` when the wait window elapses.
    async fn assert_visible(
        &mut self,
        handle: &ElementHandle,
        timeout: Duration,
    ) -> PagewardResult<()>;

    /// Assert the element's input value equals `expected`
    async fn assert_has_value(
        &mut self,
        handle: &ElementHandle,
        expected: &str,
    ) -> PagewardResult<()>;

    /// Assert the element's text content contains `expected`
    async fn assert_contains_text(
        &mut self,
        handle: &ElementHandle,
        expected: &str,
    ) -> PagewardResult<()>;

    /// Get current URL
    async fn current_url(&self) -> PagewardResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Selector;

    #[test]
    fn test_handle_description_from_locator() {
        let handle = ElementHandle::new(Locator::new("#submit").describe("Submit Button"));
        assert_eq!(handle.description(), "Submit Button");
    }

    #[test]
    fn test_handle_keeps_selector() {
        let locator = Locator::from_selector(Selector::role("heading", "Text Box"));
        let handle = ElementHandle::new(locator.clone());
        assert_eq!(handle.locator(), &locator);
    }
}
