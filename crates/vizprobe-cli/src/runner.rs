//! Command implementations

use serde::Serialize;
use std::path::Path;
use vizprobe::{select, HarnessConfig, RunReport, ScriptedPage};

use crate::commands::{ConfigArgs, ListArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

/// One catalog entry as printed by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioEntry {
    /// Scenario name
    pub name: String,
    /// Tags
    pub tags: Vec<String>,
}

/// Catalog entries matching `filter`
///
/// Scenario names and tags do not depend on the driver, so the scripted
/// driver stands in for listing.
#[must_use]
pub fn catalog_entries(filter: Option<&str>) -> Vec<ScenarioEntry> {
    select::<ScriptedPage>(filter)
        .iter()
        .map(|s| ScenarioEntry {
            name: s.name().to_string(),
            tags: s.tags().iter().map(|t| (*t).to_string()).collect(),
        })
        .collect()
}

/// Config file (or defaults), then environment overrides
///
/// # Errors
///
/// Unreadable or invalid config file, or invalid environment values.
pub fn load_config(path: Option<&Path>) -> CliResult<HarnessConfig> {
    let config = match path {
        Some(path) => HarnessConfig::from_yaml_file(path)?,
        None => HarnessConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

/// Apply `run` flags on top of `config`
///
/// # Errors
///
/// The resulting configuration fails validation.
pub fn apply_run_args(mut config: HarnessConfig, args: &RunArgs) -> CliResult<HarnessConfig> {
    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }
    if args.headed {
        config.browser.headless = false;
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    if let Some(dir) = &args.artifacts_dir {
        config.artifacts_dir.clone_from(dir);
    }
    config.validate()?;
    Ok(config)
}

/// `vizprobe list`
///
/// # Errors
///
/// JSON serialization failure.
pub fn list_scenarios(args: &ListArgs) -> CliResult<()> {
    let entries = catalog_entries(args.filter.as_deref());
    if args.json {
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::config(format!("could not serialize catalog: {e}")))?;
        println!("{json}");
        return Ok(());
    }
    for entry in &entries {
        println!("{}  [{}]", entry.name, entry.tags.join(", "));
    }
    Ok(())
}

/// `vizprobe config`
///
/// # Errors
///
/// Config load errors, or failure to write `--write`.
pub fn show_config(args: &ConfigArgs) -> CliResult<()> {
    if let Some(path) = &args.write {
        let yaml = HarnessConfig::default().to_yaml()?;
        std::fs::write(path, yaml)?;
        println!("wrote {}", path.display());
        return Ok(());
    }
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

/// `vizprobe run`
///
/// # Errors
///
/// Configuration errors, no matching scenario, browser launch failure, or
/// [`CliError::ScenariosFailed`] when any scenario fails.
pub async fn run_scenarios(cli: CliConfig, args: &RunArgs) -> CliResult<RunReport> {
    let config = apply_run_args(load_config(args.config.as_deref())?, args)?;
    let filter = args.filter.as_deref();
    let selected = catalog_entries(filter).len();
    if selected == 0 {
        return Err(CliError::invalid_argument(format!(
            "no scenario matches {:?}",
            filter.unwrap_or_default()
        )));
    }

    let mut reporter =
        ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    reporter.info(&format!(
        "running {selected} scenario(s) against {}",
        config.base_url
    ));
    reporter.start_progress(selected as u64, "scenarios");
    let report = run_in_browser(config.clone(), filter, &reporter).await;
    reporter.finish();
    let report = report?;

    let path = report.write_json(&config.artifacts_dir)?;
    reporter.info(&format!("report written to {}", path.display()));
    if args.json {
        println!("{}", report.to_json()?);
    }
    reporter.summary(&report);

    if report.all_passed() {
        Ok(report)
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed_count(),
            total: report.scenarios.len(),
        })
    }
}

#[cfg(feature = "browser")]
async fn run_in_browser(
    config: HarnessConfig,
    filter: Option<&str>,
    reporter: &ProgressReporter,
) -> CliResult<RunReport> {
    use vizprobe::{catalog, ChromiumBrowser, ChromiumPage, ScenarioRunner};

    let browser = ChromiumBrowser::launch(config.browser.clone()).await?;
    let runner = ScenarioRunner::new(browser, config);
    let scenarios = catalog::<ChromiumPage>();
    Ok(runner
        .run_all_with(&scenarios, filter, |r| reporter.scenario(r))
        .await)
}

#[cfg(not(feature = "browser"))]
async fn run_in_browser(
    _config: HarnessConfig,
    _filter: Option<&str>,
    _reporter: &ProgressReporter,
) -> CliResult<RunReport> {
    Err(CliError::config(
        "built without the `browser` feature; rebuild with --features browser",
    ))
}
