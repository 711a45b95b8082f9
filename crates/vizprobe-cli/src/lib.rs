//! vizprobe CLI library
//!
//! Command-line interface for running the vizprobe scenario catalog.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{scenario_line, ProgressReporter};
pub use runner::{
    apply_run_args, catalog_entries, list_scenarios, load_config, run_scenarios, show_config,
    ScenarioEntry,
};
