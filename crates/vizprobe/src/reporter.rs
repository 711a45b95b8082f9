//! Run reports.
//!
//! Every scenario produces a [`ScenarioReport`]; a [`RunReport`] collects them
//! and is written as `report.json` in the artifacts directory.
//!
//! ```text
//! ┌────────────────────┐     ┌──────────────────────┐
//! │  FailureMode::     │     │  FailureMode::       │
//! │  StopOnFirst       │     │  CollectAll          │
//! │                    │     │                      │
//! │  remaining         │     │  every selected      │
//! │  scenarios are     │     │  scenario runs       │
//! │  reported skipped  │     │  (default)           │
//! └────────────────────┘     └──────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collector::EventLog;
use crate::result::{ErrorKind, ProbeError, ProbeResult};

/// File name of the JSON run report
pub const REPORT_FILE: &str = "report.json";

/// What to do after a scenario fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Skip every remaining scenario
    StopOnFirst,
    /// Keep running
    #[default]
    CollectAll,
}

impl FailureMode {
    /// Mode for the `fail_fast` setting
    #[must_use]
    pub const fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Self::StopOnFirst
        } else {
            Self::CollectAll
        }
    }
}

/// Scenario outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Body and error profile both passed
    Passed,
    /// Body or error profile failed
    Failed,
    /// Not run
    Skipped,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Counts of collected events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Console messages of any level
    pub console: usize,
    /// Console messages at error level
    pub console_errors: usize,
    /// Uncaught page exceptions
    pub page_errors: usize,
    /// Dialogs opened
    pub dialogs: usize,
    /// Dialogs without a configured response
    pub unhandled_dialogs: usize,
}

impl From<&EventLog> for EventSummary {
    fn from(log: &EventLog) -> Self {
        Self {
            console: log.console.len(),
            console_errors: log.console_errors().count(),
            page_errors: log.page_errors.len(),
            dialogs: log.dialogs.len(),
            unhandled_dialogs: log.unhandled_dialogs().count(),
        }
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Scenario tags
    pub tags: Vec<String>,
    /// Outcome
    pub status: ScenarioStatus,
    /// Wall-clock duration
    pub duration_ms: u64,
    /// Error classification when failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Error message when failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Collected events
    pub events: EventSummary,
    /// Failure screenshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl ScenarioReport {
    /// A passing scenario
    #[must_use]
    pub fn passed(name: &str, tags: &[&str], duration: Duration, events: EventSummary) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            status: ScenarioStatus::Passed,
            duration_ms: duration.as_millis() as u64,
            error_kind: None,
            error: None,
            events,
            screenshot: None,
        }
    }

    /// A failing scenario
    #[must_use]
    pub fn failed(
        name: &str,
        tags: &[&str],
        duration: Duration,
        events: EventSummary,
        error: &ProbeError,
    ) -> Self {
        Self {
            status: ScenarioStatus::Failed,
            error_kind: Some(error.kind()),
            error: Some(error.to_string()),
            ..Self::passed(name, tags, duration, events)
        }
    }

    /// A scenario that was not run
    #[must_use]
    pub fn skipped(name: &str, tags: &[&str]) -> Self {
        Self {
            status: ScenarioStatus::Skipped,
            ..Self::passed(name, tags, Duration::ZERO, EventSummary::default())
        }
    }

    /// Attach the failure screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot = Some(path);
        self
    }
}

/// Results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Driver that produced the pages
    pub driver: String,
    /// Origin the pages were served from
    pub base_url: String,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: Option<DateTime<Utc>>,
    /// Scenario results, in run order
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    /// Start a report
    #[must_use]
    pub fn new(driver: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            base_url: base_url.into(),
            started_at: Utc::now(),
            finished_at: None,
            scenarios: Vec::new(),
        }
    }

    /// Append a scenario result
    pub fn record(&mut self, report: ScenarioReport) {
        self.scenarios.push(report);
    }

    /// Stamp the end time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Get passed count
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Get failed count
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Get skipped count
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }

    /// True when nothing failed or was skipped
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.status.is_passed())
    }

    /// Sum of scenario durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.scenarios.iter().map(|s| s.duration_ms).sum())
    }

    /// Failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.scenarios
            .iter()
            .filter(|s| s.status.is_failed())
            .collect()
    }

    /// Look up a scenario by name
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped ({} total) in {:.2}s",
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.scenarios.len(),
            self.total_duration().as_secs_f64()
        )
    }

    /// Pretty JSON
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Json`] on serialization failure.
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `report.json` into `dir`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Io`] if the directory or file cannot be written.
    pub fn write_json(&self, dir: &Path) -> ProbeResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "wrote run report");
        Ok(path)
    }
}
