//! Test harness for running scenario suites.
//!
//! Every attempt gets a fresh driver from a [`DriverFactory`] and a
//! [`RunContext`] sharing one [`AttemptTracker`] across the whole run.
//! Retryable failures are re-run up to the [`RetryPolicy`] limit; fatal
//! errors (unknown keys, bad configuration) fail the scenario at once.

use crate::attempts::AttemptTracker;
use crate::config::RunConfig;
use crate::data::DataGenerator;
use crate::driver::BrowserDriver;
use crate::registry::ElementConfigRegistry;
use crate::resolver::PageResolver;
use crate::result::{PagewardError, PagewardResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::Instrument;

/// Default per-attempt time limit
pub const DEFAULT_SCENARIO_TIMEOUT_MS: u64 = 30_000;

/// What a scenario is expected to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    /// Must pass, possibly after retries
    #[default]
    Pass,
    /// Must fail; passing is reported as a problem
    Fail,
    /// Not run
    Skip,
}

/// One independent test case
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable scenario id, also the attempt-tracker key
    fn id(&self) -> &str;

    /// Expected result
    fn expectation(&self) -> Expectation {
        Expectation::Pass
    }

    /// Run one attempt against a fresh driver
    async fn run(&self, ctx: &RunContext, driver: &mut dyn BrowserDriver) -> PagewardResult<()>;
}

/// Source of fresh drivers, one per attempt
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Create a driver with no page loaded
    async fn new_driver(&self) -> PagewardResult<Box<dyn BrowserDriver>>;
}

/// State handed to every scenario attempt
#[derive(Debug, Clone)]
pub struct RunContext {
    config: Arc<RunConfig>,
    registry: Arc<ElementConfigRegistry>,
    generator: DataGenerator,
    attempts: AttemptTracker,
    attempt: u32,
}

impl RunContext {
    /// Build a context, validating the configured registry
    ///
    /// # Errors
    ///
    /// `InvalidRegistry` if a configured page is invalid.
    pub fn new(config: RunConfig) -> PagewardResult<Self> {
        let registry = config.registry()?;
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            generator: DataGenerator::new(),
            attempts: AttemptTracker::new(),
            attempt: 1,
        })
    }

    /// Same context for another harness attempt
    #[must_use]
    pub fn for_attempt(&self, attempt: u32) -> Self {
        Self {
            attempt,
            ..self.clone()
        }
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Element page registry
    #[must_use]
    pub fn registry(&self) -> &ElementConfigRegistry {
        &self.registry
    }

    /// Test data generator
    #[must_use]
    pub const fn generator(&self) -> &DataGenerator {
        &self.generator
    }

    /// Attempt tracker shared by the whole run
    #[must_use]
    pub const fn attempts(&self) -> &AttemptTracker {
        &self.attempts
    }

    /// Harness attempt number, starting at 1
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Page resolver over `driver`
    pub fn resolver<'a, D: BrowserDriver + ?Sized>(
        &'a self,
        driver: &'a mut D,
    ) -> PageResolver<'a, D> {
        PageResolver::new(driver, &self.registry, &self.config)
    }
}

/// How often failed scenarios are re-run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-runs after the first failure
    pub retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: 1 }
    }
}

impl RetryPolicy {
    /// Policy with `retries` re-runs
    #[must_use]
    pub const fn new(retries: u32) -> Self {
        Self { retries }
    }

    /// Never re-run
    #[must_use]
    pub const fn none() -> Self {
        Self { retries: 0 }
    }

    /// Upper bound on attempts per scenario
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Whether a failed `attempt` should be followed by another
    #[must_use]
    pub const fn should_retry(&self, attempt: u32, error: &PagewardError) -> bool {
        attempt < self.max_attempts() && error.is_retryable()
    }
}

/// Final state of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioOutcome {
    /// Passed on the first attempt
    Passed,
    /// Passed after at least one failed attempt
    Flaky,
    /// Every attempt failed
    Failed,
    /// Not run
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario id
    pub id: String,
    /// Final state
    pub outcome: ScenarioOutcome,
    /// Attempts made
    pub attempts: u32,
    /// Error of each failed attempt, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Scenario was expected to fail
    #[serde(default)]
    pub expected_failure: bool,
    /// Wall time over all attempts
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Report for a scenario that was not run
    #[must_use]
    pub fn skipped(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: ScenarioOutcome::Skipped,
            attempts: 0,
            errors: Vec::new(),
            expected_failure: false,
            duration_ms: 0,
        }
    }

    /// Whether the outcome matches the scenario's expectation
    #[must_use]
    pub fn is_ok(&self) -> bool {
        match self.outcome {
            ScenarioOutcome::Skipped => true,
            ScenarioOutcome::Failed => self.expected_failure,
            ScenarioOutcome::Passed | ScenarioOutcome::Flaky => !self.expected_failure,
        }
    }
}

/// Results from running a suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite_name: String,
    /// Scenarios passed on the first attempt
    pub passed: usize,
    /// Scenarios passed after a retry
    pub flaky: usize,
    /// Scenarios that failed every attempt
    pub failed: usize,
    /// Scenarios not run
    pub skipped: usize,
    /// Total wall time
    pub duration_ms: u64,
    /// Per-scenario reports in suite order
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    /// Summarize scenario reports
    #[must_use]
    pub fn new(suite_name: impl Into<String>, scenarios: Vec<ScenarioReport>, duration: Duration) -> Self {
        let count = |outcome| scenarios.iter().filter(|s| s.outcome == outcome).count();
        Self {
            suite_name: suite_name.into(),
            passed: count(ScenarioOutcome::Passed),
            flaky: count(ScenarioOutcome::Flaky),
            failed: count(ScenarioOutcome::Failed),
            skipped: count(ScenarioOutcome::Skipped),
            duration_ms: millis(duration),
            scenarios,
        }
    }

    /// Every scenario met its expectation
    #[must_use]
    pub fn success(&self) -> bool {
        self.scenarios.iter().all(ScenarioReport::is_ok)
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.scenarios.len()
    }

    /// Scenarios that did not meet their expectation
    #[must_use]
    pub fn problems(&self) -> Vec<&ScenarioReport> {
        self.scenarios.iter().filter(|s| !s.is_ok()).collect()
    }

    /// Look up a scenario report by id
    #[must_use]
    pub fn scenario(&self, id: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    ///
    /// `Json` if serialization fails.
    pub fn to_json(&self) -> PagewardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A named list of scenarios
#[derive(Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    scenarios: Vec<Arc<dyn Scenario>>,
}

impl std::fmt::Debug for TestSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSuite")
            .field("name", &self.name)
            .field("scenarios", &self.ids())
            .finish()
    }
}

impl TestSuite {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    /// Add a scenario
    pub fn add(&mut self, scenario: impl Scenario + 'static) {
        self.scenarios.push(Arc::new(scenario));
    }

    /// Add a scenario, builder style
    #[must_use]
    pub fn with(mut self, scenario: impl Scenario + 'static) -> Self {
        self.add(scenario);
        self
    }

    /// Scenario ids in suite order
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.id()).collect()
    }

    /// Keep only scenarios whose id contains `pattern`
    #[must_use]
    pub fn filter(mut self, pattern: &str) -> Self {
        self.scenarios.retain(|s| s.id().contains(pattern));
        self
    }

    /// Get the number of scenarios
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }
}

/// Runs suites with retries and bounded concurrency
#[derive(Debug, Clone)]
pub struct TestHarness {
    /// Retry policy
    pub retry: RetryPolicy,
    /// Time limit per attempt
    pub scenario_timeout: Duration,
    /// Scenarios run concurrently
    pub workers: usize,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            scenario_timeout: Duration::from_millis(DEFAULT_SCENARIO_TIMEOUT_MS),
            workers: 1,
        }
    }
}

impl TestHarness {
    /// Create a new test harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Harness using the configured retry count
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new().with_retry(RetryPolicy::new(config.retries))
    }

    /// Set the retry policy
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the per-attempt time limit
    #[must_use]
    pub const fn with_scenario_timeout(mut self, timeout: Duration) -> Self {
        self.scenario_timeout = timeout;
        self
    }

    /// Run up to `workers` scenarios at once
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Run every scenario in `suite`.
    ///
    /// Reports come back in suite order regardless of completion order.
    pub async fn run<F>(&self, suite: &TestSuite, factory: Arc<F>, ctx: &RunContext) -> SuiteReport
    where
        F: DriverFactory + ?Sized + 'static,
    {
        let start = Instant::now();
        tracing::info!(
            suite = %suite.name,
            scenarios = suite.scenario_count(),
            workers = self.workers,
            retries = self.retry.retries,
            "running suite"
        );

        let permits = Arc::new(Semaphore::new(self.workers));
        let handles: Vec<_> = suite
            .scenarios
            .iter()
            .map(|scenario| {
                let scenario = Arc::clone(scenario);
                let factory = Arc::clone(&factory);
                let permits = Arc::clone(&permits);
                let ctx = ctx.clone();
                let retry = self.retry;
                let timeout = self.scenario_timeout;
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok();
                    run_scenario(scenario.as_ref(), factory.as_ref(), &ctx, retry, timeout).await
                })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (scenario, handle) in suite.scenarios.iter().zip(handles) {
            let report = match handle.await {
                Ok(report) => report,
                Err(err) => ScenarioReport {
                    id: scenario.id().to_string(),
                    outcome: ScenarioOutcome::Failed,
                    attempts: 1,
                    errors: vec![format!("scenario task aborted: {err}")],
                    expected_failure: scenario.expectation() == Expectation::Fail,
                    duration_ms: 0,
                },
            };
            reports.push(report);
        }

        let report = SuiteReport::new(&suite.name, reports, start.elapsed());
        tracing::info!(
            suite = %report.suite_name,
            passed = report.passed,
            flaky = report.flaky,
            failed = report.failed,
            skipped = report.skipped,
            "suite finished"
        );
        report
    }
}

async fn run_scenario<F>(
    scenario: &dyn Scenario,
    factory: &F,
    ctx: &RunContext,
    retry: RetryPolicy,
    timeout: Duration,
) -> ScenarioReport
where
    F: DriverFactory + ?Sized,
{
    let id = scenario.id().to_string();
    let expected_failure = match scenario.expectation() {
        Expectation::Skip => {
            tracing::info!(scenario = %id, "skipped");
            return ScenarioReport::skipped(id);
        }
        Expectation::Fail => true,
        Expectation::Pass => false,
    };

    let start = Instant::now();
    let mut errors = Vec::new();
    let mut attempt = 0;
    let outcome = loop {
        attempt += 1;
        let attempt_ctx = ctx.for_attempt(attempt);
        let span = tracing::info_span!("scenario", id = %id, attempt);
        let result = run_attempt(scenario, factory, &attempt_ctx, timeout)
            .instrument(span)
            .await;
        match result {
            Ok(()) if attempt == 1 => break ScenarioOutcome::Passed,
            Ok(()) => break ScenarioOutcome::Flaky,
            Err(err) => {
                let again = !expected_failure && retry.should_retry(attempt, &err);
                tracing::warn!(scenario = %id, attempt, error = %err, retry = again, "attempt failed");
                errors.push(err.to_string());
                if !again {
                    break ScenarioOutcome::Failed;
                }
            }
        }
    };

    ScenarioReport {
        id,
        outcome,
        attempts: attempt,
        errors,
        expected_failure,
        duration_ms: millis(start.elapsed()),
    }
}

async fn run_attempt<F>(
    scenario: &dyn Scenario,
    factory: &F,
    ctx: &RunContext,
    timeout: Duration,
) -> PagewardResult<()>
where
    F: DriverFactory + ?Sized,
{
    let mut driver = factory.new_driver().await?;
    match tokio::time::timeout(timeout, scenario.run(ctx, driver.as_mut())).await {
        Ok(result) => result,
        Err(_) => Err(PagewardError::ScenarioTimeout {
            scenario: scenario.id().to_string(),
            timeout_ms: millis(timeout),
        }),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
