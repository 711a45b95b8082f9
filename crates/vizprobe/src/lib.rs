//! vizprobe: page-object browser testing for algorithm demo pages
//!
//! A Rust harness that drives static educational HTML/JS pages (sorting
//! visualizers, graph demos, data-structure playgrounds) through their UI and
//! checks the DOM, console output, and dialogs against local oracles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    VIZPROBE Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ PageDriver │            │
//! │   │ Runner     │───►│ Object     │───►│ (chromium  │            │
//! │   │            │    │ + Session  │    │  / scripted)│           │
//! │   └─────▲──────┘    └────────────┘    └─────┬──────┘            │
//! │         │  ErrorProfile   ┌──────────────┐  │ console, errors,  │
//! │         └─────────────────┤EventCollector│◄─┘ dialogs           │
//! │                           └──────────────┘                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vizprobe::{catalog, ChromiumBrowser, HarnessConfig, ScenarioRunner};
//!
//! let config = HarnessConfig::default().with_env_overrides()?;
//! let browser = ChromiumBrowser::launch(config.browser.clone()).await?;
//! let runner = ScenarioRunner::new(browser, config);
//! let report = runner.run_all(&catalog(), Some("knapsack")).await;
//! assert!(report.all_passed());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![allow(clippy::module_name_repetitions, clippy::cast_possible_truncation)]

mod assertion;
mod browser;
mod collector;
mod config;
mod dialog;
mod driver;
mod element;
mod locator;
mod page_object;
mod profile;
mod reporter;
mod result;
mod scenario;
mod scripted;
mod session;

/// Local reference implementations used as test oracles
pub mod oracle;

/// Page objects for the demo pages
pub mod pages;

/// Scenario catalog
pub mod scenarios;

/// Bounded waits and stepping budgets
pub mod wait;

pub use assertion::{Assertion, AssertionResult};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumPage};
pub use collector::{
    CollectedEvent, ConsoleLevel, ConsoleRecord, DialogRecord, EventCollector, EventKind,
    EventLog, PageErrorRecord,
};
pub use config::{
    HarnessConfig, Timeouts, ENV_BASE_URL, ENV_CHROMIUM_PATH, ENV_HEADLESS,
};
pub use dialog::{DialogPolicy, DialogResponse, DialogType};
pub use driver::{DriverCall, DriverFactory, PageDriver};
pub use element::{extract_numbers, ElementSnapshot};
pub use locator::{Locator, LocatorMap, LocatorOptions, Selector};
pub use page_object::{PageObject, READY_LOCATOR};
pub use profile::{ErrorProfile, Expectation};
pub use reporter::{
    EventSummary, FailureMode, RunReport, ScenarioReport, ScenarioStatus, REPORT_FILE,
};
pub use result::{ErrorKind, ProbeError, ProbeResult};
pub use scenario::{matches_filter, Scenario, ScenarioContext, ScenarioList, ScenarioRunner};
pub use scenarios::{catalog, select};
pub use scripted::{DomState, PageBlueprint, ScriptedPage, ScriptedPageBuilder, ScriptedSite};
pub use session::PageSession;
pub use wait::{poll_until, step_until, wait_until, StepBudget, WaitOptions, WaitResult};

/// Prelude for scenario authors
pub mod prelude {
    pub use super::assertion::*;
    pub use super::collector::*;
    pub use super::dialog::*;
    pub use super::driver::*;
    pub use super::element::*;
    pub use super::locator::*;
    pub use super::oracle::{Order, Stepper};
    pub use super::page_object::*;
    pub use super::profile::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::session::*;
    pub use super::wait::*;
}
