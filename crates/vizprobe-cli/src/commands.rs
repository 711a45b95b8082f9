//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// vizprobe: drive algorithm demo pages through their UI and check them
/// against local oracles
#[derive(Parser, Debug)]
#[command(name = "vizprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the demo pages in Chromium
    Run(RunArgs),

    /// List catalog scenarios
    List(ListArgs),

    /// Print the effective configuration, or write a default config file
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Only scenarios whose name or tag contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Origin serving the demo pages
    #[arg(long)]
    pub base_url: Option<String>,

    /// YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Directory for report.json and failure screenshots
    #[arg(short, long)]
    pub artifacts_dir: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Only scenarios whose name or tag contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug, Default)]
pub struct ConfigArgs {
    /// YAML config file to load before environment overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the default configuration to this path
    #[arg(long)]
    pub write: Option<PathBuf>,
}

/// Color output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_command() {
            let cli = Cli::parse_from(["vizprobe", "run"]);
            assert!(matches!(cli.command, Commands::Run(_)));
        }

        #[test]
        fn test_parse_run_with_options() {
            let cli = Cli::parse_from([
                "vizprobe",
                "run",
                "--filter",
                "knapsack",
                "--base-url",
                "http://localhost:9000",
                "--headed",
                "--fail-fast",
                "--json",
                "-a",
                "out",
            ]);
            if let Commands::Run(args) = cli.command {
                assert_eq!(args.filter.as_deref(), Some("knapsack"));
                assert_eq!(args.base_url.as_deref(), Some("http://localhost:9000"));
                assert!(args.headed);
                assert!(args.fail_fast);
                assert!(args.json);
                assert_eq!(args.artifacts_dir, Some(PathBuf::from("out")));
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_list_command() {
            let cli = Cli::parse_from(["vizprobe", "list", "-f", "sorting"]);
            if let Commands::List(args) = cli.command {
                assert_eq!(args.filter.as_deref(), Some("sorting"));
                assert!(!args.json);
            } else {
                panic!("expected List command");
            }
        }

        #[test]
        fn test_parse_config_write() {
            let cli = Cli::parse_from(["vizprobe", "config", "--write", "vizprobe.yaml"]);
            if let Commands::Config(args) = cli.command {
                assert_eq!(args.write, Some(PathBuf::from("vizprobe.yaml")));
            } else {
                panic!("expected Config command");
            }
        }
    }

    mod global_flag_tests {
        use super::*;

        #[test]
        fn test_verbose_count() {
            let cli = Cli::parse_from(["vizprobe", "-vv", "list"]);
            assert_eq!(cli.verbose, 2);
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::parse_from(["vizprobe", "list", "--quiet", "--color", "never"]);
            assert!(cli.quiet);
            assert!(matches!(cli.color, ColorArg::Never));
        }

        #[test]
        fn test_color_conversion() {
            use crate::config::ColorChoice;
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
        }
    }
}
