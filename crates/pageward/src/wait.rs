//! Bounded polling for eventually-visible UI state.
//!
//! Drivers use [`poll_until`] to implement auto-waiting assertions: the check
//! runs at least once, then every poll interval until it passes or the
//! timeout elapses.

use crate::locator::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::PagewardResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Whether the condition was met
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was checked
    pub polls: u32,
}

/// Poll `check` until it returns `true` or the timeout elapses.
///
/// Errors from `check` abort the wait immediately.
pub async fn poll_until<F, Fut>(options: WaitOptions, mut check: F) -> PagewardResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PagewardResult<bool>>,
{
    let start = Instant::now();
    let mut polls = 0;
    loop {
        polls += 1;
        if check().await? {
            return Ok(WaitResult {
                success: true,
                elapsed: start.elapsed(),
                polls,
            });
        }
        if start.elapsed() >= options.timeout() {
            return Ok(WaitResult {
                success: false,
                elapsed: start.elapsed(),
                polls,
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}
