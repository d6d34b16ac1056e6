//! Elements scenario catalogue.
//!
//! Each scenario opens a page through the [`PageResolver`](crate::PageResolver),
//! drives the Text Box form with generated data, and leaves judgement to the
//! harness.

use crate::data::TextBoxOverrides;
use crate::driver::BrowserDriver;
use crate::harness::{Expectation, RunContext, Scenario, TestSuite};
use crate::registry::ElementPage;
use crate::result::{PagewardError, PagewardResult};
use crate::text_box::TextBoxPage;
use async_trait::async_trait;

/// Scenarios exercising the elements pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementsScenario {
    /// Open the Text Box page and check its heading
    OpenTextBox,
    /// Fill, validate, submit and check the echoed output
    SubmitValidTextBox,
    /// Submit a malformed email; must not raise
    InvalidEmail,
    /// Fails on its first attempt, passes on the retry
    FailFirstAttempt,
    /// Submit with an empty email. Skipped.
    EmptyForm,
    /// Open Web Tables but check the `webTablesFIX` heading. Expected to fail.
    OpenWebTables,
}

impl ElementsScenario {
    /// All scenarios in catalogue order
    pub const ALL: [Self; 6] = [
        Self::OpenTextBox,
        Self::SubmitValidTextBox,
        Self::InvalidEmail,
        Self::FailFirstAttempt,
        Self::EmptyForm,
        Self::OpenWebTables,
    ];

    /// Scenario id
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::OpenTextBox => "Should open and display Text Box page correctly",
            Self::SubmitValidTextBox => "Should successfully submit valid Text Box form data",
            Self::InvalidEmail => "Should handle invalid email format gracefully",
            Self::FailFirstAttempt => "Should fail first attempt and pass on second attempt",
            Self::EmptyForm => "Submit Text Box Form with empty form",
            Self::OpenWebTables => "Should open and display Web Tables page correctly",
        }
    }

    /// Expected result
    #[must_use]
    pub const fn expectation(self) -> Expectation {
        match self {
            Self::EmptyForm => Expectation::Skip,
            Self::OpenWebTables => Expectation::Fail,
            _ => Expectation::Pass,
        }
    }

    async fn execute(self, ctx: &RunContext, driver: &mut dyn BrowserDriver) -> PagewardResult<()> {
        let text_box = ElementPage::TextBox.key();
        let page = TextBoxPage::new();
        match self {
            Self::OpenTextBox => ctx.resolver(driver).open_and_expect(text_box).await,
            Self::SubmitValidTextBox => {
                ctx.resolver(driver).open_and_expect(text_box).await?;
                let data = ctx.generator().create(TextBoxOverrides::new());
                page.fill_form(driver, &data).await?;
                page.validate_form_data(driver, &data).await?;
                page.submit(driver).await?;
                page.validate_submitted_data(driver, &data).await
            }
            Self::InvalidEmail => {
                ctx.resolver(driver).open_and_expect(text_box).await?;
                let data = ctx
                    .generator()
                    .create(TextBoxOverrides::new().email("invalid-email"));
                page.fill_form(driver, &data).await?;
                page.submit(driver).await
            }
            Self::FailFirstAttempt => {
                let attempt = ctx.attempts().increment(self.id());
                ctx.resolver(driver).open_and_expect(text_box).await?;
                let data = ctx.generator().create(TextBoxOverrides::new());
                page.fill_form(driver, &data).await?;
                page.validate_form_data(driver, &data).await?;
                page.submit(driver).await?;
                if attempt == 1 {
                    return Err(PagewardError::IntentionalFailure {
                        attempt,
                        message: "this test should pass on retry".to_string(),
                    });
                }
                page.validate_submitted_data(driver, &data).await
            }
            Self::EmptyForm => {
                ctx.resolver(driver).open_and_expect(text_box).await?;
                let data = ctx.generator().create(TextBoxOverrides::new().email(""));
                page.fill_form(driver, &data).await?;
                page.submit(driver).await
            }
            Self::OpenWebTables => {
                let mut resolver = ctx.resolver(driver);
                resolver.open(ElementPage::WebTables.key()).await?;
                resolver.expect_visible(ElementPage::WebTablesFix.key()).await
            }
        }
    }
}

#[async_trait]
impl Scenario for ElementsScenario {
    fn id(&self) -> &str {
        ElementsScenario::id(*self)
    }

    fn expectation(&self) -> Expectation {
        ElementsScenario::expectation(*self)
    }

    async fn run(&self, ctx: &RunContext, driver: &mut dyn BrowserDriver) -> PagewardResult<()> {
        self.execute(ctx, driver).await
    }
}

/// Runs a normally skipped scenario
#[derive(Debug)]
struct Unskipped(ElementsScenario);

#[async_trait]
impl Scenario for Unskipped {
    fn id(&self) -> &str {
        self.0.id()
    }

    async fn run(&self, ctx: &RunContext, driver: &mut dyn BrowserDriver) -> PagewardResult<()> {
        self.0.execute(ctx, driver).await
    }
}

/// The elements catalogue as a suite
#[must_use]
pub fn elements_suite(include_skipped: bool) -> TestSuite {
    let mut suite = TestSuite::new("Elements Page Tests");
    for scenario in ElementsScenario::ALL {
        if include_skipped && scenario.expectation() == Expectation::Skip {
            suite.add(Unskipped(scenario));
        } else {
            suite.add(scenario);
        }
    }
    suite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::data::TextBoxField;
    use crate::harness::{RetryPolicy, ScenarioOutcome, TestHarness};
    use crate::mock::MockDriver;
    use std::sync::Arc;

    fn context() -> RunContext {
        RunContext::new(
            RunConfig::new()
                .with_visibility_timeout(25)
                .with_poll_interval(1),
        )
        .unwrap()
    }

    async fn run_one(scenario: ElementsScenario, ctx: &RunContext) -> PagewardResult<()> {
        let mut driver = MockDriver::new().with_poll_interval(1);
        scenario.run(ctx, &mut driver).await
    }

    mod catalogue_tests {
        use super::*;

        #[test]
        fn test_ids_unique() {
            let mut ids: Vec<_> = ElementsScenario::ALL.iter().map(|s| s.id()).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), ElementsScenario::ALL.len());
        }

        #[test]
        fn test_suite_order() {
            let suite = elements_suite(false);
            assert_eq!(suite.scenario_count(), 6);
            assert_eq!(
                suite.ids()[3],
                "Should fail first attempt and pass on second attempt"
            );
        }
    }

    mod direct_run_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_text_box() {
            run_one(ElementsScenario::OpenTextBox, &context())
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_submit_valid() {
            run_one(ElementsScenario::SubmitValidTextBox, &context())
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_invalid_email_is_graceful() {
            run_one(ElementsScenario::InvalidEmail, &context())
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_empty_form_runs_when_forced() {
            run_one(ElementsScenario::EmptyForm, &context())
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_fail_first_attempt_uses_tracker() {
            let ctx = context();
            let err = run_one(ElementsScenario::FailFirstAttempt, &ctx)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                PagewardError::IntentionalFailure { attempt: 1, .. }
            ));
            run_one(ElementsScenario::FailFirstAttempt, &ctx)
                .await
                .unwrap();
            assert_eq!(
                ctx.attempts()
                    .current(ElementsScenario::FailFirstAttempt.id()),
                2
            );
        }

        #[tokio::test]
        async fn test_first_attempt_fails_after_submit() {
            let ctx = context();
            let page = TextBoxPage::new();
            let mut driver = MockDriver::new().with_poll_interval(1);

            let err = ElementsScenario::FailFirstAttempt
                .run(&ctx, &mut driver)
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                PagewardError::IntentionalFailure { attempt: 1, .. }
            ));
            assert!(driver.was_called("click:Submit Button"));
            assert_eq!(
                driver.history().last().map(String::as_str),
                Some("click:Submit Button")
            );
            for field in TextBoxField::ALL {
                let typed = driver
                    .value_of(page.input(field).selector())
                    .unwrap()
                    .to_string();
                assert!(!typed.is_empty(), "{field} was not filled");
                let echoed = driver.locate(page.output(field)).await.unwrap();
                driver.assert_contains_text(&echoed, &typed).await.unwrap();
            }
        }

        #[tokio::test]
        async fn test_web_tables_fix_times_out() {
            let err = run_one(ElementsScenario::OpenWebTables, &context())
                .await
                .unwrap_err();
            assert!(matches!(err, PagewardError::VisibilityTimeout { .. }));
        }
    }

    mod suite_run_tests {
        use super::*;

        #[tokio::test]
        async fn test_full_catalogue() {
            let ctx = context();
            let factory = Arc::new(MockDriver::new().with_poll_interval(1));
            let report = TestHarness::from_config(ctx.config())
                .run(&elements_suite(false), factory, &ctx)
                .await;

            let outcome = |s: ElementsScenario| report.scenario(s.id()).unwrap().outcome;
            assert_eq!(outcome(ElementsScenario::OpenTextBox), ScenarioOutcome::Passed);
            assert_eq!(
                outcome(ElementsScenario::SubmitValidTextBox),
                ScenarioOutcome::Passed
            );
            assert_eq!(outcome(ElementsScenario::InvalidEmail), ScenarioOutcome::Passed);
            assert_eq!(
                outcome(ElementsScenario::FailFirstAttempt),
                ScenarioOutcome::Flaky
            );
            assert_eq!(outcome(ElementsScenario::EmptyForm), ScenarioOutcome::Skipped);
            assert_eq!(outcome(ElementsScenario::OpenWebTables), ScenarioOutcome::Failed);
            assert!(report.success());
        }

        #[tokio::test]
        async fn test_no_retries_fails_the_flaky_scenario() {
            let ctx = context();
            let factory = Arc::new(MockDriver::new().with_poll_interval(1));
            let report = TestHarness::new()
                .with_retry(RetryPolicy::none())
                .with_workers(3)
                .run(&elements_suite(true), factory, &ctx)
                .await;

            let retry = report
                .scenario(ElementsScenario::FailFirstAttempt.id())
                .unwrap();
            assert_eq!(retry.outcome, ScenarioOutcome::Failed);
            assert_eq!(
                report.scenario(ElementsScenario::EmptyForm.id()).unwrap().outcome,
                ScenarioOutcome::Passed
            );
            assert!(!report.success());
        }
    }
}
