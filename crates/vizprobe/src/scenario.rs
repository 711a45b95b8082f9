//! Scenarios and the runner that executes them.
//!
//! ```text
//! ScenarioRunner::run_one
//!   factory.new_page()
//!   driver.attach_collector ── collector.attach(policy)
//!   tokio::time::timeout(scenario.run(&mut ctx))
//!   collector.detach() ── profile.verify(&log)
//!   screenshot on failure ── driver.close()
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::collector::{EventCollector, EventLog};
use crate::config::HarnessConfig;
use crate::dialog::DialogPolicy;
use crate::driver::{DriverFactory, PageDriver};
use crate::profile::ErrorProfile;
use crate::reporter::{EventSummary, FailureMode, RunReport, ScenarioReport};
use crate::result::{ProbeError, ProbeResult};
use crate::session::PageSession;
use crate::wait::StepBudget;

/// One browser test against one page
#[async_trait]
pub trait Scenario<D: PageDriver>: Send + Sync {
    /// Unique name, `page/behaviour`
    fn name(&self) -> &str;

    /// Tags used for filtering
    fn tags(&self) -> &[&'static str] {
        &[]
    }

    /// How dialogs opened during the scenario are answered
    fn dialog_policy(&self) -> DialogPolicy {
        DialogPolicy::unhandled()
    }

    /// Which page and console errors the scenario expects
    fn error_profile(&self) -> ErrorProfile {
        ErrorProfile::clean()
    }

    /// Scenario body
    async fn run(&self, ctx: &mut ScenarioContext<D>) -> ProbeResult<()>;
}

/// A list of scenarios over driver `D`
pub type ScenarioList<D> = Vec<Box<dyn Scenario<D>>>;

/// Whether `scenario` is selected by `filter` (substring of name or a tag)
#[must_use]
pub fn matches_filter<D: PageDriver>(scenario: &dyn Scenario<D>, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| {
        scenario.name().contains(f) || scenario.tags().iter().any(|t| t.contains(f))
    })
}

/// Per-scenario state handed to the body
#[derive(Debug)]
pub struct ScenarioContext<D> {
    page: PageSession<D>,
    collector: EventCollector,
    config: Arc<HarnessConfig>,
}

impl<D: PageDriver> ScenarioContext<D> {
    /// Build a context around a page whose collector is already attached
    #[must_use]
    pub fn new(driver: D, collector: EventCollector, config: Arc<HarnessConfig>) -> Self {
        Self {
            page: PageSession::new(driver, config.clone()),
            collector,
            config,
        }
    }

    /// The page under test
    #[must_use]
    pub const fn page(&self) -> &PageSession<D> {
        &self.page
    }

    /// Event collector for this scenario
    #[must_use]
    pub const fn collector(&self) -> &EventCollector {
        &self.collector
    }

    /// Events collected so far
    #[must_use]
    pub fn events(&self) -> EventLog {
        self.collector.snapshot()
    }

    /// Harness configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Fresh budget for a stepping loop named `what`
    #[must_use]
    pub fn budget(&self, what: &str) -> StepBudget {
        StepBudget::new(
            what,
            self.config.max_step_iterations,
            self.config.timeouts.scenario(),
        )
    }

    fn into_page(self) -> PageSession<D> {
        self.page
    }
}

/// Runs scenarios on fresh pages from a [`DriverFactory`]
#[derive(Debug)]
pub struct ScenarioRunner<F> {
    factory: F,
    config: Arc<HarnessConfig>,
    mode: FailureMode,
}

impl<F: DriverFactory> ScenarioRunner<F> {
    /// Runner with the failure mode implied by `config.fail_fast`
    #[must_use]
    pub fn new(factory: F, config: HarnessConfig) -> Self {
        let mode = FailureMode::from_fail_fast(config.fail_fast);
        Self {
            factory,
            config: Arc::new(config),
            mode,
        }
    }

    /// Override the failure mode
    #[must_use]
    pub const fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.mode = mode;
        self
    }

    /// Harness configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one scenario on its own page
    pub async fn run_one(&self, scenario: &dyn Scenario<F::Driver>) -> ScenarioReport {
        let name = scenario.name();
        let tags = scenario.tags();
        let started = Instant::now();
        tracing::info!(scenario = name, driver = self.factory.name(), "scenario started");

        let driver = match self.factory.new_page().await {
            Ok(driver) => driver,
            Err(err) => {
                tracing::warn!(scenario = name, %err, "could not open page");
                return ScenarioReport::failed(
                    name,
                    tags,
                    started.elapsed(),
                    EventSummary::default(),
                    &err,
                );
            }
        };

        let collector = EventCollector::new();
        let attached = driver.attach_collector(collector.clone()).await;
        collector.attach(scenario.dialog_policy());
        let mut ctx = ScenarioContext::new(driver, collector.clone(), self.config.clone());

        let outcome = match attached {
            Err(err) => Err(err),
            Ok(()) => self.run_body(scenario, &mut ctx).await,
        };
        let log = collector.detach();
        let outcome = outcome.and_then(|()| scenario.error_profile().verify(&log));
        let events = EventSummary::from(&log);
        let page = ctx.into_page();

        let report = match outcome {
            Ok(()) => {
                tracing::info!(scenario = name, elapsed = ?started.elapsed(), "scenario passed");
                ScenarioReport::passed(name, tags, started.elapsed(), events)
            }
            Err(err) => {
                tracing::warn!(scenario = name, kind = %err.kind(), %err, "scenario failed");
                let report = ScenarioReport::failed(name, tags, started.elapsed(), events, &err);
                match self.capture_failure(name, &page).await {
                    Some(path) => report.with_screenshot(path),
                    None => report,
                }
            }
        };

        if let Err(err) = page.driver().close().await {
            tracing::debug!(scenario = name, %err, "page close failed");
        }
        report
    }

    async fn run_body(
        &self,
        scenario: &dyn Scenario<F::Driver>,
        ctx: &mut ScenarioContext<F::Driver>,
    ) -> ProbeResult<()> {
        let limit = self.config.timeouts.scenario();
        tokio::time::timeout(limit, scenario.run(ctx))
            .await
            .unwrap_or_else(|_| {
                Err(ProbeError::Timeout {
                    waited_for: format!("scenario {}", scenario.name()),
                    ms: self.config.timeouts.scenario_ms,
                })
            })
    }

    async fn capture_failure(
        &self,
        name: &str,
        page: &PageSession<F::Driver>,
    ) -> Option<PathBuf> {
        if !self.config.screenshot_on_failure {
            return None;
        }
        let path = screenshot_path(&self.config.artifacts_dir, name);
        let saved = async {
            let png = page.screenshot().await?;
            tokio::fs::create_dir_all(&self.config.artifacts_dir).await?;
            tokio::fs::write(&path, png).await?;
            ProbeResult::Ok(())
        }
        .await;
        match saved {
            Ok(()) => {
                tracing::info!(path = %path.display(), "saved failure screenshot");
                Some(path)
            }
            Err(err) => {
                tracing::warn!(scenario = name, %err, "failure screenshot not saved");
                None
            }
        }
    }

    /// Run every scenario selected by `filter`, in order
    pub async fn run_all(
        &self,
        scenarios: &[Box<dyn Scenario<F::Driver>>],
        filter: Option<&str>,
    ) -> RunReport {
        self.run_all_with(scenarios, filter, |_| {}).await
    }

    /// As [`ScenarioRunner::run_all`], calling `on_report` after each scenario
    pub async fn run_all_with<C>(
        &self,
        scenarios: &[Box<dyn Scenario<F::Driver>>],
        filter: Option<&str>,
        mut on_report: C,
    ) -> RunReport
    where
        C: FnMut(&ScenarioReport),
    {
        let mut run = RunReport::new(self.factory.name(), self.config.base_url.clone());
        let mut stopped = false;
        for scenario in scenarios
            .iter()
            .filter(|s| matches_filter(s.as_ref(), filter))
        {
            let report = if stopped {
                ScenarioReport::skipped(scenario.name(), scenario.tags())
            } else {
                self.run_one(scenario.as_ref()).await
            };
            if report.status.is_failed() && self.mode == FailureMode::StopOnFirst {
                stopped = true;
            }
            on_report(&report);
            run.record(report);
        }
        run.finish();
        tracing::info!("{}", run.summary());
        run
    }
}

/// `<artifacts>/<scenario name with path separators replaced>.png`
fn screenshot_path(dir: &Path, scenario: &str) -> PathBuf {
    let file: String = scenario
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    dir.join(format!("{file}.png"))
}
