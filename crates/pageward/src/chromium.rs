//! Real browser control over CDP.
//!
//! With the `browser` feature, [`ChromiumSession`] launches Chromium through
//! chromiumoxide and hands out one [`ChromiumDriver`] (a fresh tab) per
//! scenario attempt. Locators are evaluated in the page as JavaScript built by
//! [`Selector::to_candidates`](crate::Selector::to_candidates), with the same
//! strictness rules as the in-memory driver.

use serde::{Deserialize, Serialize};

/// Chromium launch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Run without a window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Interval between visibility polls
    pub poll_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            poll_interval_ms: crate::locator::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl DriverConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the visibility polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumSession};

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening)]
mod cdp {
    use super::DriverConfig;
    use crate::driver::{BrowserDriver, ElementHandle};
    use crate::harness::DriverFactory;
    use crate::locator::Locator;
    use crate::result::{PagewardError, PagewardResult};
    use crate::wait::{poll_until, WaitOptions};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    const VISIBLE_FILTER: &str = "el => { const r = el.getBoundingClientRect(); \
        const s = getComputedStyle(el); \
        return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }";

    #[derive(Debug, Deserialize)]
    struct Probe<T> {
        found: usize,
        value: Option<T>,
    }

    fn cdp_error(err: impl std::fmt::Display) -> PagewardError {
        PagewardError::driver(err.to_string())
    }

    fn js_string(value: &str) -> PagewardResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// A running Chromium instance
    #[derive(Debug)]
    pub struct ChromiumSession {
        config: DriverConfig,
        browser: Mutex<Browser>,
        handler: tokio::task::JoinHandle<()>,
    }

    impl ChromiumSession {
        /// Launch Chromium
        ///
        /// # Errors
        ///
        /// `Driver` if the browser cannot be started.
        pub async fn launch(config: DriverConfig) -> PagewardResult<Self> {
            let mut builder = BrowserConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder.build().map_err(PagewardError::driver)?;

            let (browser, mut handler) = Browser::launch(cdp_config).await.map_err(cdp_error)?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            tracing::info!(headless = config.headless, "chromium launched");

            Ok(Self {
                config,
                browser: Mutex::new(browser),
                handler,
            })
        }

        /// Open a blank tab
        ///
        /// # Errors
        ///
        /// `Driver` if the tab cannot be created.
        pub async fn new_tab(&self) -> PagewardResult<ChromiumDriver> {
            let browser = self.browser.lock().await;
            let page = browser.new_page("about:blank").await.map_err(cdp_error)?;
            Ok(ChromiumDriver {
                page: Mutex::new(page),
                poll_interval_ms: self.config.poll_interval_ms,
            })
        }

        /// Launch configuration
        #[must_use]
        pub const fn config(&self) -> &DriverConfig {
            &self.config
        }

        /// Close the browser
        ///
        /// # Errors
        ///
        /// `Driver` if the browser does not shut down cleanly.
        pub async fn close(self) -> PagewardResult<()> {
            let mut browser = self.browser.into_inner();
            let _ = browser.close().await.map_err(cdp_error)?;
            self.handler.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl DriverFactory for ChromiumSession {
        async fn new_driver(&self) -> PagewardResult<Box<dyn BrowserDriver>> {
            Ok(Box::new(self.new_tab().await?))
        }
    }

    /// One Chromium tab
    #[derive(Debug)]
    pub struct ChromiumDriver {
        page: Mutex<Page>,
        poll_interval_ms: u64,
    }

    impl ChromiumDriver {
        /// Evaluate `body` (an expression over `el`) on the single match
        async fn probe<T: DeserializeOwned>(
            &self,
            handle: &ElementHandle,
            body: &str,
        ) -> PagewardResult<T> {
            let candidates = handle.locator().selector().to_candidates("document");
            let js = format!(
                "(() => {{ const els = {candidates}; \
                 if (els.length !== 1) return {{ found: els.length, value: null }}; \
                 const el = els[0]; return {{ found: 1, value: ({body}) }}; }})()"
            );
            let page = self.page.lock().await;
            let probe: Probe<T> = page
                .evaluate(js)
                .await
                .map_err(cdp_error)?
                .into_value()?;
            match (probe.found, probe.value) {
                (0, _) => Err(PagewardError::ElementNotFound {
                    description: handle.description(),
                }),
                (1, Some(value)) => Ok(value),
                (1, None) => Err(PagewardError::driver(format!(
                    "{} returned no value",
                    handle.description()
                ))),
                (n, _) => Err(PagewardError::driver(format!(
                    "strict mode violation: {} resolved to {n} elements",
                    handle.description()
                ))),
            }
        }

        async fn visible_count(&self, locator: &Locator) -> PagewardResult<usize> {
            let js = format!(
                "{}.filter({VISIBLE_FILTER}).length",
                locator.selector().to_candidates("document")
            );
            let page = self.page.lock().await;
            Ok(page
                .evaluate(js)
                .await
                .map_err(cdp_error)?
                .into_value()?)
        }
    }

    #[async_trait]
    impl BrowserDriver for ChromiumDriver {
        async fn navigate_to(&mut self, url: &str) -> PagewardResult<()> {
            tracing::debug!(url, "navigate");
            let page = self.page.lock().await;
            let _ = page
                .goto(url)
                .await
                .map_err(|e| PagewardError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn locate(&mut self, locator: &Locator) -> PagewardResult<ElementHandle> {
            Ok(ElementHandle::new(locator.clone()))
        }

        async fn click(&mut self, handle: &ElementHandle) -> PagewardResult<()> {
            tracing::debug!(element = %handle.description(), "click");
            let clicked: bool = self.probe(handle, "(el.click(), true)").await?;
            if clicked {
                Ok(())
            } else {
                Err(PagewardError::driver(format!(
                    "{} could not be clicked",
                    handle.description()
                )))
            }
        }

        async fn fill(&mut self, handle: &ElementHandle, text: &str) -> PagewardResult<()> {
            tracing::debug!(element = %handle.description(), "fill");
            let body = format!(
                "(() => {{ \
                   const proto = Object.getPrototypeOf(el); \
                   const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
                   if (!desc || !desc.set) return false; \
                   el.focus(); desc.set.call(el, {}); \
                   el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                   el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                   return true; }})()",
                js_string(text)?
            );
            let filled: bool = self.probe(handle, &body).await?;
            if filled {
                Ok(())
            } else {
                Err(PagewardError::driver(format!(
                    "{} is not an input",
                    handle.description()
                )))
            }
        }

        async fn assert_visible(
            &mut self,
            handle: &ElementHandle,
            timeout: Duration,
        ) -> PagewardResult<()> {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            let options = WaitOptions::new()
                .with_timeout(timeout_ms)
                .with_poll_interval(self.poll_interval_ms);
            let this = &*self;
            let locator = handle.locator();
            let strict_violation = AtomicUsize::new(0);
            let strict = &strict_violation;
            let result = poll_until(options, move || async move {
                let count = this.visible_count(locator).await?;
                if count > 1 {
                    strict.store(count, Ordering::Relaxed);
                }
                Ok(count >= 1)
            })
            .await?;

            let strict_violation = strict_violation.into_inner();
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
            let actual: String = self.probe(handle, "el.value ?? ''").await?;
            if actual == expected {
                Ok(())
            } else {
                Err(PagewardError::ValueMismatch {
                    description: handle.description(),
                    expected: expected.to_string(),
                    actual,
                })
            }
        }

        async fn assert_contains_text(
            &mut self,
            handle: &ElementHandle,
            expected: &str,
        ) -> PagewardResult<()> {
            let actual: String = self.probe(handle, "el.textContent ?? ''").await?;
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
            let page = self.page.lock().await;
            Ok(page
                .url()
                .await
                .map_err(cdp_error)?
                .unwrap_or_else(|| "about:blank".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_config_defaults() {
        let config = DriverConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!(config.chromium_path, None);
    }

    #[test]
    fn test_driver_config_builder() {
        let config = DriverConfig::default()
            .with_viewport(800, 600)
            .with_headless(false)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox()
            .with_poll_interval(10);
        assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.poll_interval_ms, 10);
    }

    #[test]
    fn test_driver_config_partial_yaml() {
        let config: DriverConfig = serde_yaml_ng::from_str("sandbox: false").unwrap();
        assert!(!config.sandbox);
        assert!(config.headless);
    }
}
