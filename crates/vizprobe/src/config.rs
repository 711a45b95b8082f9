//! Harness configuration.
//!
//! Loaded from YAML, then overridden by environment variables, then by CLI
//! flags. Every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::BrowserConfig;
use crate::locator::DEFAULT_TIMEOUT_MS;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{
    WaitOptions, DEFAULT_MAX_STEP_ITERATIONS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "VIZPROBE_BASE_URL";
/// Environment variable overriding `browser.headless`
pub const ENV_HEADLESS: &str = "VIZPROBE_HEADLESS";
/// Environment variable overriding `browser.chromium_path`
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Timeouts in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Locator auto-wait before an action or read
    pub action_ms: u64,
    /// Poll interval for all condition waits
    pub poll_interval_ms: u64,
    /// Explicit waits (`wait_for_count`, `wait_for_text`, ...)
    pub wait_ms: u64,
    /// Whole scenario body
    pub scenario_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            action_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wait_ms: DEFAULT_WAIT_TIMEOUT_MS,
            scenario_ms: 60_000,
        }
    }
}

impl Timeouts {
    /// Locator auto-wait
    #[must_use]
    pub const fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    /// Scenario budget
    #[must_use]
    pub const fn scenario(&self) -> Duration {
        Duration::from_millis(self.scenario_ms)
    }

    /// Options for explicit waits
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.wait_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

/// Top-level harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Origin serving the demo pages
    pub base_url: String,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Timeouts
    pub timeouts: Timeouts,
    /// Iteration cap for stepping loops
    pub max_step_iterations: usize,
    /// Directory for report.json and failure screenshots
    pub artifacts_dir: PathBuf,
    /// Capture a screenshot when a scenario fails
    pub screenshot_on_failure: bool,
    /// Stop at the first failing scenario
    pub fail_fast: bool,
    /// Page name → path overrides
    pub pages: BTreeMap<String, String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            max_step_iterations: DEFAULT_MAX_STEP_ITERATIONS,
            artifacts_dir: PathBuf::from("target/vizprobe"),
            screenshot_on_failure: true,
            fail_fast: false,
            pages: BTreeMap::new(),
        }
    }
}

fn parse_bool(name: &str, raw: &str) -> ProbeResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ProbeError::Config {
            message: format!("{name} must be a boolean, got {other:?}"),
        }),
    }
}

impl HarnessConfig {
    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Yaml`] for malformed input and
    /// [`ProbeError::Config`] for invalid values.
    pub fn from_yaml_str(text: &str) -> ProbeResult<Self> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Io`] if the file cannot be read, otherwise as
    /// [`HarnessConfig::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Yaml`] on serialization failure.
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply overrides from a variable lookup (usually the process environment)
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] for an unparseable boolean.
    pub fn with_overrides<F>(mut self, lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_HEADLESS) {
            self.browser.headless = parse_bool(ENV_HEADLESS, &raw)?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH) {
            self.browser.chromium_path = Some(path);
        }
        self.validate()?;
        Ok(self)
    }

    /// Apply overrides from the process environment
    ///
    /// # Errors
    ///
    /// As [`HarnessConfig::with_overrides`].
    pub fn with_env_overrides(self) -> ProbeResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Check invariants
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] describing the first invalid value.
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::Config {
                message: format!("base_url must be http(s), got {:?}", self.base_url),
            });
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(ProbeError::Config {
                message: "timeouts.poll_interval_ms must be > 0".into(),
            });
        }
        if self.max_step_iterations == 0 {
            return Err(ProbeError::Config {
                message: "max_step_iterations must be > 0".into(),
            });
        }
        for (name, path) in &self.pages {
            if !path.starts_with('/') {
                return Err(ProbeError::Config {
                    message: format!("pages.{name} must start with '/', got {path:?}"),
                });
            }
        }
        Ok(())
    }

    /// Path for page `name`, honoring overrides
    #[must_use]
    pub fn page_path<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.pages.get(name).map_or(default, String::as_str)
    }

    /// Absolute URL for `path`
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
