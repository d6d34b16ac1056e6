//! Configuration-driven page resolution.
//!
//! [`PageResolver`] turns a page key into browser actions. Opening a page and
//! checking that it is visible are separate calls, so a test can assert the
//! outcome independently of the navigation that caused it.

use crate::config::{join_url, RunConfig, ELEMENTS_ROUTE};
use crate::driver::BrowserDriver;
use crate::locator::{Locator, Selector};
use crate::registry::{ElementConfigRegistry, ElementPageConfig};
use crate::result::PagewardResult;
use crate::step::step;
use std::time::Duration;

/// Locator of the menu entry that opens a page
#[must_use]
pub fn button_locator(config: &ElementPageConfig) -> Locator {
    Locator::from_selector(Selector::css_with_text("span.text", &config.button_text))
        .describe(format!("{} Button", config.button_text))
}

/// Locator of a page's heading
#[must_use]
pub fn title_locator(config: &ElementPageConfig) -> Locator {
    Locator::from_selector(Selector::role("heading", &config.title_text))
        .describe(format!("{} Title", config.title_text))
}

/// Opens element pages and checks their headings
#[derive(Debug)]
pub struct PageResolver<'a, D: BrowserDriver + ?Sized> {
    driver: &'a mut D,
    registry: &'a ElementConfigRegistry,
    config: &'a RunConfig,
}

impl<'a, D: BrowserDriver + ?Sized> PageResolver<'a, D> {
    /// Create a resolver over a driver
    pub fn new(driver: &'a mut D, registry: &'a ElementConfigRegistry, config: &'a RunConfig) -> Self {
        Self {
            driver,
            registry,
            config,
        }
    }

    /// The underlying driver
    pub fn driver(&mut self) -> &mut D {
        &mut *self.driver
    }

    /// Navigate to the page's entry point and click its menu button.
    ///
    /// Does not check the result; call [`expect_visible`](Self::expect_visible).
    ///
    /// # Errors
    ///
    /// `UnknownKey` for unregistered keys, otherwise driver errors.
    pub async fn open(&mut self, key: &str) -> PagewardResult<()> {
        let page = self.registry.lookup(key)?;
        let url = match &page.url {
            Some(path) => join_url(&self.config.base_url, path),
            None => self.config.route_url(ELEMENTS_ROUTE)?,
        };
        let button = button_locator(page);
        let driver = &mut *self.driver;
        step(&format!("Open {} Page", page.title_text), async move {
            driver.navigate_to(&url).await?;
            let handle = driver.locate(&button).await?;
            driver.click(&handle).await
        })
        .await
    }

    /// Assert the page heading is visible within the configured wait window.
    ///
    /// # Errors
    ///
    /// `UnknownKey` for unregistered keys, `VisibilityTimeout` if no heading
    /// with exactly the registered title appears in time.
    pub async fn expect_visible(&mut self, key: &str) -> PagewardResult<()> {
        let page = self.registry.lookup(key)?;
        let timeout = Duration::from_millis(self.config.visibility_timeout_ms);
        let title = title_locator(page).with_timeout(timeout);
        let handle = self.driver.locate(&title).await?;
        tracing::debug!(key, title = %page.title_text, "expecting heading");
        self.driver.assert_visible(&handle, title.timeout()).await
    }

    /// Open a page and assert its heading
    ///
    /// # Errors
    ///
    /// Any error from [`open`](Self::open) or
    /// [`expect_visible`](Self::expect_visible).
    pub async fn open_and_expect(&mut self, key: &str) -> PagewardResult<()> {
        self.open(key).await?;
        self.expect_visible(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use crate::registry::{ElementPage, ElementPageConfig};
    use crate::result::PagewardError;

    fn fast_config() -> RunConfig {
        RunConfig::new().with_visibility_timeout(30).with_poll_interval(1)
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_button_locator() {
            let locator = button_locator(&ElementPage::TextBox.config());
            assert_eq!(
                locator.selector(),
                &Selector::css_with_text("span.text", "Text Box")
            );
            assert_eq!(locator.description(), "Text Box Button");
        }

        #[test]
        fn test_title_locator() {
            let locator = title_locator(&ElementPage::WebTablesFix.config());
            assert_eq!(locator.selector(), &Selector::role("heading", "Web Tables FIX"));
            assert_eq!(locator.description(), "Web Tables FIX Title");
        }
    }

    mod open_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_text_box() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open("textBox").await.unwrap();

            assert_eq!(
                driver.history()[0],
                "navigate:https://demoqa.com/elements"
            );
            assert!(driver.was_called("click:Text Box Button"));
            assert!(!driver.was_called("assert_visible"));
            assert_eq!(
                driver.current_url().await.unwrap(),
                "https://demoqa.com/text-box"
            );
        }

        #[tokio::test]
        async fn test_open_unknown_key_touches_nothing() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            let err = resolver.open("checkBox").await.unwrap_err();

            assert!(matches!(err, PagewardError::UnknownKey { .. }));
            assert!(err.is_fatal());
            assert!(driver.history().is_empty());
        }

        #[tokio::test]
        async fn test_open_uses_direct_url() {
            let registry = ElementConfigRegistry::with_pages([ElementPageConfig::new(
                "tables",
                "Web Tables",
                "Web Tables",
            )
            .with_url("/text-box")])
            .unwrap();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open_and_expect("tables").await.unwrap();
            assert_eq!(driver.history()[0], "navigate:https://demoqa.com/text-box");
        }

        #[tokio::test]
        async fn test_open_after_partial_route_yaml() {
            let registry = ElementConfigRegistry::builtin();
            let config = RunConfig::from_yaml_str("routes:\n  textBox: /text-box\n")
                .unwrap()
                .with_visibility_timeout(30)
                .with_poll_interval(1);
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open_and_expect("textBox").await.unwrap();
            assert_eq!(driver.history()[0], "navigate:https://demoqa.com/elements");
        }

        #[tokio::test]
        async fn test_open_respects_base_url() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config().with_base_url("http://localhost:3000");
            let mut driver = MockDriver::new().with_base_url("http://localhost:3000");
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open("webTables").await.unwrap();
            assert_eq!(
                driver.current_url().await.unwrap(),
                "http://localhost:3000/webtables"
            );
        }
    }

    mod visibility_tests {
        use super::*;

        #[tokio::test]
        async fn test_expect_visible_after_open() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open("textBox").await.unwrap();
            resolver.expect_visible("textBox").await.unwrap();
        }

        #[tokio::test]
        async fn test_expect_visible_before_open_times_out() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            let err = resolver.expect_visible("textBox").await.unwrap_err();
            assert!(matches!(err, PagewardError::VisibilityTimeout { .. }));
        }

        #[tokio::test]
        async fn test_wrong_page_heading_does_not_match() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open("webTables").await.unwrap();
            let err = resolver.expect_visible("textBox").await.unwrap_err();
            assert!(matches!(err, PagewardError::VisibilityTimeout { .. }));
        }

        #[tokio::test]
        async fn test_fix_fixture_fails_with_visibility_timeout() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open("webTables").await.unwrap();
            resolver.expect_visible("webTables").await.unwrap();
            let err = resolver.expect_visible("webTablesFIX").await.unwrap_err();
            match err {
                PagewardError::VisibilityTimeout {
                    description,
                    timeout_ms,
                } => {
                    assert_eq!(description, "Web Tables FIX Title");
                    assert_eq!(timeout_ms, 30);
                }
                other => panic!("expected VisibilityTimeout, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_expect_visible_unknown_key() {
            let registry = ElementConfigRegistry::builtin();
            let config = fast_config();
            let mut driver = MockDriver::new();
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            let err = resolver.expect_visible("nope").await.unwrap_err();
            assert!(matches!(err, PagewardError::UnknownKey { .. }));
        }

        #[tokio::test]
        async fn test_slow_render_within_window() {
            let registry = ElementConfigRegistry::builtin();
            let config = RunConfig::new().with_visibility_timeout(1000);
            let mut driver = MockDriver::new().with_render_delay(2).with_poll_interval(1);
            let mut resolver = PageResolver::new(&mut driver, &registry, &config);

            resolver.open_and_expect("webTables").await.unwrap();
        }
    }
}
