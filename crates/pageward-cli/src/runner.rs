//! Subcommand handlers.
//!
//! Handlers write their primary output to the given writer and log through
//! `tracing`, so they can be exercised against an in-memory buffer.

use crate::commands::{Cli, GenerateArgs, OutputFormat, PagesArgs, RunArgs};
use crate::error::{CliError, CliResult};
use pageward::{
    elements_suite, DataGenerator, ElementConfigRegistry, MockDriver, RunConfig,
    RunContext, ScenarioOutcome, SuiteReport, TestHarness, TextBoxOverrides,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Effective run configuration: file, then environment, then flags
pub fn load_run_config(cli: &Cli) -> CliResult<RunConfig> {
    let config = match &cli.config {
        Some(path) => RunConfig::from_yaml_file(path).map_err(|e| {
            CliError::config(format!("cannot load {}: {e}", path.display()))
        })?,
        None => RunConfig::new(),
    };
    let config = config.with_env_overrides();
    Ok(match &cli.base_url {
        Some(url) => config.with_base_url(url.clone()),
        None => config,
    })
}

/// `pageward pages`
pub fn run_pages(config: &RunConfig, args: &PagesArgs, out: &mut dyn Write) -> CliResult<()> {
    let registry: ElementConfigRegistry = config.registry()?;
    match args.format {
        OutputFormat::Json => {
            let pages: Vec<_> = registry.iter().collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&pages)?)?;
        }
        OutputFormat::Text => {
            for page in registry.iter() {
                write!(
                    out,
                    "{:<14} button={:?} title={:?}",
                    page.key, page.button_text, page.title_text
                )?;
                if let Some(url) = &page.url {
                    write!(out, " url={url}")?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// `pageward generate`
pub fn run_generate(args: &GenerateArgs, out: &mut dyn Write) -> CliResult<()> {
    if args.count == 0 {
        return Err(CliError::invalid_argument("--count must be at least 1"));
    }
    let overrides = overrides_from(args);
    let generator = DataGenerator::new();
    let records: Vec<_> = match args.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..args.count)
                .map(|_| generator.create_with_rng(overrides.clone(), &mut rng))
                .collect()
        }
        None => (0..args.count)
            .map(|_| generator.create(overrides.clone()))
            .collect(),
    };
    tracing::debug!(count = records.len(), seeded = args.seed.is_some(), "generated records");

    if let [record] = records.as_slice() {
        writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
    } else {
        writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
    }
    Ok(())
}

fn overrides_from(args: &GenerateArgs) -> TextBoxOverrides {
    let mut overrides = TextBoxOverrides::new();
    if let Some(v) = &args.full_name {
        overrides = overrides.full_name(v.clone());
    }
    if let Some(v) = &args.email {
        overrides = overrides.email(v.clone());
    }
    if let Some(v) = &args.current_address {
        overrides = overrides.current_address(v.clone());
    }
    if let Some(v) = &args.permanent_address {
        overrides = overrides.permanent_address(v.clone());
    }
    overrides
}

/// `pageward config`
pub fn run_config(config: &RunConfig, out: &mut dyn Write) -> CliResult<()> {
    write!(out, "{}", config.to_yaml()?)?;
    Ok(())
}

/// `pageward run`
///
/// Fails when any scenario misses its expectation.
pub async fn run_suite(config: RunConfig, args: &RunArgs, out: &mut dyn Write) -> CliResult<()> {
    let config = match args.retries {
        Some(retries) => config.with_retries(retries),
        None => config,
    };
    let ctx = RunContext::new(config)?;
    let harness = TestHarness::from_config(ctx.config())
        .with_workers(args.workers)
        .with_scenario_timeout(Duration::from_millis(args.timeout));

    let mut suite = elements_suite(args.include_skipped);
    if let Some(pattern) = &args.filter {
        suite = suite.filter(pattern);
    }
    if suite.scenario_count() == 0 {
        return Err(CliError::invalid_argument("no scenario matches the filter"));
    }

    let report = if args.browser {
        run_in_browser(&harness, &suite, &ctx, args).await?
    } else {
        let factory = Arc::new(
            MockDriver::new()
                .with_base_url(ctx.config().base_url.clone())
                .with_poll_interval(ctx.config().poll_interval_ms),
        );
        harness.run(&suite, factory, &ctx).await
    };

    if let Some(path) = &args.report {
        std::fs::write(path, report.to_json()?)?;
        tracing::info!(path = %path.display(), "report written");
    }
    match args.format {
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
        OutputFormat::Text => render_report(&report, out)?,
    }

    let problems = report.problems();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(CliError::test_execution(format!(
            "{} scenario(s) did not meet expectation",
            problems.len()
        )))
    }
}

#[cfg(feature = "browser")]
async fn run_in_browser(
    harness: &TestHarness,
    suite: &pageward::TestSuite,
    ctx: &RunContext,
    args: &RunArgs,
) -> CliResult<SuiteReport> {
    let mut driver_config = pageward::DriverConfig::default()
        .with_headless(!args.headed)
        .with_poll_interval(ctx.config().poll_interval_ms);
    if args.no_sandbox {
        driver_config = driver_config.with_no_sandbox();
    }
    if let Some(path) = &args.chromium_path {
        driver_config = driver_config.with_chromium_path(path.display().to_string());
    }
    let session = Arc::new(pageward::ChromiumSession::launch(driver_config).await?);
    let report = harness.run(suite, Arc::clone(&session), ctx).await;
    if let Ok(session) = Arc::try_unwrap(session) {
        session.close().await?;
    }
    Ok(report)
}

#[cfg(not(feature = "browser"))]
async fn run_in_browser(
    _harness: &TestHarness,
    _suite: &pageward::TestSuite,
    _ctx: &RunContext,
    _args: &RunArgs,
) -> CliResult<SuiteReport> {
    Err(CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}

fn outcome_label(outcome: ScenarioOutcome, expected_failure: bool) -> &'static str {
    match (outcome, expected_failure) {
        (ScenarioOutcome::Passed, false) => "PASS",
        (ScenarioOutcome::Flaky, false) => "FLAKY",
        (ScenarioOutcome::Failed, true) => "XFAIL",
        (ScenarioOutcome::Failed, false) => "FAIL",
        (ScenarioOutcome::Passed | ScenarioOutcome::Flaky, true) => "XPASS",
        (ScenarioOutcome::Skipped, _) => "SKIP",
    }
}

/// Human-readable report
pub fn render_report(report: &SuiteReport, out: &mut dyn Write) -> CliResult<()> {
    writeln!(out, "{}", report.suite_name)?;
    for scenario in &report.scenarios {
        writeln!(
            out,
            "  {:<6} {} ({} attempt(s), {}ms)",
            outcome_label(scenario.outcome, scenario.expected_failure),
            scenario.id,
            scenario.attempts,
            scenario.duration_ms
        )?;
        for error in &scenario.errors {
            writeln!(out, "         {error}")?;
        }
    }
    writeln!(
        out,
        "{} passed, {} flaky, {} failed, {} skipped in {}ms",
        report.passed, report.flaky, report.failed, report.skipped, report.duration_ms
    )?;
    Ok(())
}
