//! Result and error types for Pageward.

use thiserror::Error;

/// Result type for Pageward operations
pub type PagewardResult<T> = Result<T, PagewardError>;

/// Errors that can occur in Pageward
#[derive(Debug, Error)]
pub enum PagewardError {
    /// Key is not part of the element page registry
    #[error("Unknown element page key: {key}")]
    UnknownKey {
        /// The key that was looked up
        key: String,
    },

    /// Element did not become visible within the wait window
    #[error("{description} not visible after {timeout_ms}ms")]
    VisibilityTimeout {
        /// Human description of the element
        description: String,
        /// Wait window in milliseconds
        timeout_ms: u64,
    },

    /// Assertion on a filled or submitted value did not hold
    #[error("{description}: expected {expected:?}, found {actual:?}")]
    ValueMismatch {
        /// Human description of the element
        description: String,
        /// Expected value
        expected: String,
        /// Value observed in the page
        actual: String,
    },

    /// Raised by a retry-aware scenario on purpose
    #[error("Intentional failure on attempt {attempt}: {message}")]
    IntentionalFailure {
        /// Attempt number that failed
        attempt: u32,
        /// Error message
        message: String,
    },

    /// Scenario attempt exceeded its time limit
    #[error("Scenario {scenario} timed out after {timeout_ms}ms")]
    ScenarioTimeout {
        /// Scenario id
        scenario: String,
        /// Time limit in milliseconds
        timeout_ms: u64,
    },

    /// No element matched the locator
    #[error("Element not found: {description}")]
    ElementNotFound {
        /// Human description of the element
        description: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser driver error
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Registry failed start-up validation
    #[error("Invalid element page registry: {message}")]
    InvalidRegistry {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PagewardError {
    /// Create an unknown key error
    #[must_use]
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Programming errors that must abort the scenario
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey { .. } | Self::InvalidRegistry { .. } | Self::Config { .. }
        )
    }

    /// Failures a harness may re-run.
    ///
    /// `IntentionalFailure` is retryable exactly like a real failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !self.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_display() {
        let err = PagewardError::unknown_key("nope");
        assert_eq!(err.to_string(), "Unknown element page key: nope");
    }

    #[test]
    fn test_visibility_timeout_display() {
        let err = PagewardError::VisibilityTimeout {
            description: "Web Tables FIX Title".to_string(),
            timeout_ms: 5000,
        };
        assert!(err.to_string().contains("Web Tables FIX Title"));
        assert!(err.to_string().contains("5000ms"));
    }

    #[test]
    fn test_value_mismatch_display() {
        let err = PagewardError::ValueMismatch {
            description: "Email Input".to_string(),
            expected: "a@b.c".to_string(),
            actual: String::new(),
        };
        assert!(err.to_string().contains("\"a@b.c\""));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(PagewardError::unknown_key("x").is_fatal());
        assert!(PagewardError::config("bad").is_fatal());
        assert!(!PagewardError::driver("boom").is_fatal());
    }

    #[test]
    fn test_intentional_failure_is_retryable() {
        let err = PagewardError::IntentionalFailure {
            attempt: 1,
            message: "first run".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!PagewardError::unknown_key("x").is_retryable());
    }
}
