//! Per-scenario attempt counters.
//!
//! An [`AttemptTracker`] records how many times each scenario id has been
//! invoked during one harness run. It is an ordinary value: the harness owns
//! one and hands clones to every scenario invocation through
//! [`RunContext`](crate::RunContext), so nothing leaks between runs.
//!
//! Clones share state. Increments on different ids touch different atomics;
//! increments on the same id are serialized by a compare-and-swap loop.
//! Counters saturate at `u32::MAX`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared scenario-id to attempt-count map
#[derive(Debug, Clone, Default)]
pub struct AttemptTracker {
    counters: Arc<RwLock<HashMap<String, Arc<AtomicU32>>>>,
}

impl AttemptTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation and return its 1-based attempt number
    pub fn increment(&self, scenario_id: &str) -> u32 {
        let counter = self.counter(scenario_id);
        match counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1)) {
            Ok(previous) => previous + 1,
            Err(saturated) => saturated,
        }
    }

    /// Attempts recorded so far, 0 if never invoked
    #[must_use]
    pub fn current(&self, scenario_id: &str) -> u32 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scenario_id)
            .map_or(0, |counter| counter.load(Ordering::SeqCst))
    }

    /// Scenario ids seen so far
    #[must_use]
    pub fn scenario_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    fn counter(&self, scenario_id: &str) -> Arc<AtomicU32> {
        if let Some(counter) = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scenario_id)
        {
            return Arc::clone(counter);
        }
        let mut counters = self
            .counters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(counters.entry(scenario_id.to_string()).or_default())
    }
}
