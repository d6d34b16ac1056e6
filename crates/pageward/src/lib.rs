//! Pageward: configuration-driven page objects for browser UI tests
//!
//! Four small pieces cooperate through an abstract [`BrowserDriver`]:
//!
//! - [`ElementConfigRegistry`]: page key to button label and heading title
//! - [`PageResolver`]: opens a page by key and checks its heading separately
//! - [`DataGenerator`]: random Text Box records with verbatim overrides
//! - [`AttemptTracker`]: per-scenario attempt counters for retry-aware tests
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   ┌────────────────┐   ┌──────────────────────────┐
//! │ TestHarness   │──►│ Scenario       │──►│ PageResolver / TextBox   │
//! │ retry, report │   │ + RunContext   │   │ page objects             │
//! └───────────────┘   └────────────────┘   └────────────┬─────────────┘
//!                                                        │ BrowserDriver
//!                                          ┌─────────────┴─────────────┐
//!                                          │ MockDriver │ ChromiumDriver│
//!                                          └───────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pageward::{ElementConfigRegistry, MockDriver, PageResolver, RunConfig};
//!
//! # async fn demo() -> pageward::PagewardResult<()> {
//! let config = RunConfig::new();
//! let registry = ElementConfigRegistry::builtin();
//! let mut driver = MockDriver::new();
//! let mut resolver = PageResolver::new(&mut driver, &registry, &config);
//! resolver.open("textBox").await?;
//! resolver.expect_visible("textBox").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod attempts;
mod chromium;
mod config;
mod data;
mod driver;
mod harness;
mod locator;
mod mock;
mod registry;
mod resolver;
mod result;
mod scenarios;
mod step;
mod text_box;
mod wait;

pub use attempts::AttemptTracker;
pub use chromium::DriverConfig;
#[cfg(feature = "browser")]
pub use chromium::{ChromiumDriver, ChromiumSession};
pub use config::{join_url, RouteTable, RunConfig, BASE_URL_ENV, DEFAULT_BASE_URL, ELEMENTS_ROUTE};
pub use data::{DataGenerator, TextBoxData, TextBoxDataBuilder, TextBoxField, TextBoxOverrides};
pub use driver::{BrowserDriver, ElementHandle};
pub use harness::{
    DriverFactory, Expectation, RetryPolicy, RunContext, Scenario, ScenarioOutcome,
    ScenarioReport, SuiteReport, TestHarness, TestSuite, DEFAULT_SCENARIO_TIMEOUT_MS,
};
pub use locator::{Locator, Selector, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
pub use mock::{ClickAction, MockDriver, MockElement};
pub use registry::{ElementConfigRegistry, ElementPage, ElementPageConfig, ELEMENT_PAGES};
pub use resolver::{button_locator, title_locator, PageResolver};
pub use result::{PagewardError, PagewardResult};
pub use scenarios::{elements_suite, ElementsScenario};
pub use step::step;
pub use text_box::TextBoxPage;
pub use wait::{poll_until, WaitOptions, WaitResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::attempts::*;
    pub use super::config::*;
    pub use super::data::*;
    pub use super::driver::*;
    pub use super::harness::*;
    pub use super::locator::*;
    pub use super::mock::*;
    pub use super::registry::*;
    pub use super::resolver::*;
    pub use super::result::*;
    pub use super::text_box::*;
}
