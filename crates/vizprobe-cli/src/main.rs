//! vizprobe CLI: run page-object scenarios against the algorithm demo pages
//!
//! ## Usage
//!
//! ```bash
//! vizprobe list                              # Show the scenario catalog
//! vizprobe run                               # Run everything headless
//! vizprobe run --filter knapsack --headed    # One page, visible browser
//! vizprobe config --write vizprobe.yaml      # Start a config file
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vizprobe_cli::{Cli, CliConfig, CliResult, Commands, Verbosity};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into());
    init_tracing(config.verbosity);

    match run(config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(config: CliConfig, command: Commands) -> CliResult<()> {
    match command {
        Commands::Run(args) => vizprobe_cli::run_scenarios(config, &args).await.map(|_| ()),
        Commands::List(args) => vizprobe_cli::list_scenarios(&args),
        Commands::Config(args) => vizprobe_cli::show_config(&args),
    }
}
