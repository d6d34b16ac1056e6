//! Run configuration.
//!
//! A run is configured from an optional YAML file:
//!
//! ```yaml
//! base_url: https://demoqa.com
//! routes:
//!   elements: /elements
//! visibility_timeout_ms: 5000
//! retries: 1
//! pages:
//!   - key: checkBox
//!     buttonText: Check Box
//!     titleText: Check Box
//! ```
//!
//! Missing fields fall back to defaults. Entries under `routes` are layered
//! over the default table, so naming one route keeps the others.
//! `PAGEWARD_BASE_URL` overrides the
//! base URL when [`RunConfig::with_env_overrides`] is applied.

use crate::registry::{ElementConfigRegistry, ElementPageConfig};
use crate::result::{PagewardError, PagewardResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "PAGEWARD_BASE_URL";

/// Default application under test
pub const DEFAULT_BASE_URL: &str = "https://demoqa.com";

/// Route name of the elements listing
pub const ELEMENTS_ROUTE: &str = "elements";

/// Named destinations of the application under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: BTreeMap<String, String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new().with_route(ELEMENTS_ROUTE, "/elements")
    }
}

impl RouteTable {
    /// Create an empty route table
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Add or replace a route
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        let _ = self.routes.insert(name.into(), path.into());
        self
    }

    /// Get the path for a route
    #[must_use]
    pub fn path(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }

    /// Resolve a route name to an absolute URL
    ///
    /// # Errors
    ///
    /// `Config` if the route is not defined.
    pub fn url(&self, base_url: &str, name: &str) -> PagewardResult<String> {
        let path = self
            .path(name)
            .ok_or_else(|| PagewardError::config(format!("no route named {name:?}")))?;
        Ok(join_url(base_url, path))
    }

    /// Route names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    /// Layer `other` over this table; entries in `other` win
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.routes.extend(other.routes);
        self
    }
}

fn routes_over_defaults<'de, D>(deserializer: D) -> Result<RouteTable, D::Error>
where
    D: Deserializer<'de>,
{
    let user = RouteTable::deserialize(deserializer)?;
    Ok(RouteTable::default().merged(user))
}

/// Join a base URL and a path; absolute paths pass through
#[must_use]
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Configuration for one harness run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Named destinations, layered over the defaults
    #[serde(deserialize_with = "routes_over_defaults")]
    pub routes: RouteTable,
    /// Wait window for visibility assertions
    pub visibility_timeout_ms: u64,
    /// Polling interval for visibility assertions
    pub poll_interval_ms: u64,
    /// How many times a failed scenario is re-run
    pub retries: u32,
    /// Additional element pages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<ElementPageConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            routes: RouteTable::default(),
            visibility_timeout_ms: 5000,
            poll_interval_ms: 50,
            retries: 1,
            pages: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document
    ///
    /// # Errors
    ///
    /// `Yaml` if the document is malformed.
    pub fn from_yaml_str(yaml: &str) -> PagewardResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Yaml` if it is malformed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PagewardResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded run config");
        Ok(config)
    }

    /// Apply `PAGEWARD_BASE_URL` if set
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => self.with_base_url(url),
            _ => self,
        }
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// `Yaml` if serialization fails.
    pub fn to_yaml(&self) -> PagewardResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the visibility timeout
    #[must_use]
    pub const fn with_visibility_timeout(mut self, timeout_ms: u64) -> Self {
        self.visibility_timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the retry count
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Add an element page
    #[must_use]
    pub fn with_page(mut self, page: ElementPageConfig) -> Self {
        self.pages.push(page);
        self
    }

    /// Wait options for visibility assertions
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.visibility_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Absolute URL of a named route
    ///
    /// # Errors
    ///
    /// `Config` if the route is not defined.
    pub fn route_url(&self, name: &str) -> PagewardResult<String> {
        self.routes.url(&self.base_url, name)
    }

    /// Build and validate the element page registry
    ///
    /// # Errors
    ///
    /// `InvalidRegistry` if a configured page is invalid.
    pub fn registry(&self) -> PagewardResult<ElementConfigRegistry> {
        ElementConfigRegistry::with_pages(self.pages.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    mod route_table_tests {
        use super::*;

        #[test]
        fn test_default_routes() {
            let routes = RouteTable::default();
            assert_eq!(routes.path(ELEMENTS_ROUTE), Some("/elements"));
            assert_eq!(routes.names(), vec!["elements"]);
        }

        #[test]
        fn test_merged_keeps_unnamed_routes() {
            let routes = RouteTable::default().merged(
                RouteTable::new()
                    .with_route("textBox", "/x")
                    .with_route(ELEMENTS_ROUTE, "/all"),
            );
            assert_eq!(routes.path("textBox"), Some("/x"));
            assert_eq!(routes.path(ELEMENTS_ROUTE), Some("/all"));
        }

        #[test]
        fn test_url_joins_base() {
            let routes = RouteTable::default();
            assert_eq!(
                routes.url("https://demoqa.com/", "elements").unwrap(),
                "https://demoqa.com/elements"
            );
        }

        #[test]
        fn test_unknown_route() {
            let err = RouteTable::new().url(DEFAULT_BASE_URL, "forms").unwrap_err();
            assert!(matches!(err, PagewardError::Config { .. }));
        }

        #[test]
        fn test_join_url_absolute_path() {
            assert_eq!(
                join_url("https://a.test", "http://b.test/x"),
                "http://b.test/x"
            );
            assert_eq!(join_url("https://a.test", "x"), "https://a.test/x");
        }
    }

    mod run_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = RunConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.visibility_timeout_ms, 5000);
            assert_eq!(config.retries, 1);
            assert!(config.pages.is_empty());
        }

        #[test]
        fn test_builder() {
            let config = RunConfig::new()
                .with_base_url("http://localhost:3000")
                .with_visibility_timeout(100)
                .with_poll_interval(10)
                .with_retries(3);

            assert_eq!(config.route_url("elements").unwrap(), "http://localhost:3000/elements");
            assert_eq!(config.wait_options().timeout_ms, 100);
            assert_eq!(config.wait_options().poll_interval_ms, 10);
            assert_eq!(config.retries, 3);
        }

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = RunConfig::from_yaml_str("retries: 2\n").unwrap();
            assert_eq!(config.retries, 2);
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.routes, RouteTable::default());
        }

        #[test]
        fn test_yaml_routes_layer_over_defaults() {
            let config = RunConfig::from_yaml_str("routes:\n  textBox: /x\n").unwrap();
            assert_eq!(config.routes.names(), vec!["elements", "textBox"]);
            assert_eq!(
                config.route_url(ELEMENTS_ROUTE).unwrap(),
                "https://demoqa.com/elements"
            );
            assert_eq!(config.route_url("textBox").unwrap(), "https://demoqa.com/x");
        }

        #[test]
        fn test_yaml_routes_can_replace_elements() {
            let config =
                RunConfig::from_yaml_str("base_url: http://localhost:3000\nroutes:\n  elements: /catalog\n")
                    .unwrap();
            assert_eq!(
                config.route_url(ELEMENTS_ROUTE).unwrap(),
                "http://localhost:3000/catalog"
            );
        }

        #[test]
        fn test_yaml_pages_extend_registry() {
            let yaml = "pages:\n  - key: checkBox\n    buttonText: Check Box\n    titleText: Check Box\n    url: /checkbox\n";
            let config = RunConfig::from_yaml_str(yaml).unwrap();
            let registry = config.registry().unwrap();
            assert!(registry.contains("checkBox"));
            assert!(registry.contains("textBox"));
        }

        #[test]
        fn test_malformed_yaml() {
            let err = RunConfig::from_yaml_str("retries: [").unwrap_err();
            assert!(matches!(err, PagewardError::Yaml(_)));
        }

        #[test]
        fn test_from_yaml_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: http://127.0.0.1:8080").unwrap();
            writeln!(file, "visibility_timeout_ms: 250").unwrap();

            let config = RunConfig::from_yaml_file(file.path()).unwrap();
            assert_eq!(config.base_url, "http://127.0.0.1:8080");
            assert_eq!(config.visibility_timeout_ms, 250);
        }

        #[test]
        fn test_missing_file() {
            let err = RunConfig::from_yaml_file("/nonexistent/pageward.yaml").unwrap_err();
            assert!(matches!(err, PagewardError::Io(_)));
        }

        #[test]
        fn test_yaml_round_trip() {
            let config = RunConfig::new().with_retries(4);
            let yaml = config.to_yaml().unwrap();
            assert_eq!(RunConfig::from_yaml_str(&yaml).unwrap(), config);
        }
    }
}
