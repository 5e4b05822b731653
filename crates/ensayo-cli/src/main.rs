//! Ensayador: command-line runner for Ensayo suites
//!
//! ## Usage
//!
//! ```bash
//! ensayador validate suites/hackathon.yaml            # Check suite and fixtures
//! ensayador list suites/hackathon.yaml --filter Login # Show expanded scenarios
//! ensayador run suites/hackathon.yaml --format junit -o report.xml
//! ```

use clap::Parser;
use ensayo_cli::{Cli, CliConfig, CliResult, ColorChoice, Commands, SuiteRunner, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();

    let config = CliConfig::new().with_verbosity(verbosity).with_color(color);
    match cli.command {
        Commands::Run(ref args) => config
            .with_fixtures_dir(args.suite.fixtures.clone())
            .with_snapshot_dir(args.snapshots.clone())
            .with_update_snapshots(args.update_snapshots)
            .with_jobs(args.jobs)
            .with_timeout_ms(args.timeout)
            .with_settle_ms(args.settle),
        Commands::Validate(ref args) | Commands::List(ref args) => {
            config.with_fixtures_dir(args.fixtures.clone())
        }
    }
}

fn run(command: Commands, config: CliConfig) -> CliResult<()> {
    match command {
        Commands::Validate(args) => SuiteRunner::new(config).validate(&args).map(|_| ()),
        Commands::List(args) => SuiteRunner::new(config).list(&args).map(|_| ()),
        Commands::Run(args) => run_suite(config, &args),
    }
}

#[cfg(feature = "browser")]
fn run_suite(config: CliConfig, args: &ensayo_cli::RunArgs) -> CliResult<()> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        ensayo_cli::CliError::config(format!("Failed to create runtime: {e}"))
    })?;

    let mut runner = SuiteRunner::new(config);
    let run = rt.block_on(runner.run(args))?;
    runner.emit_report(&run, args)?;
    SuiteRunner::verdict(&run)
}

#[cfg(not(feature = "browser"))]
fn run_suite(config: CliConfig, args: &ensayo_cli::RunArgs) -> CliResult<()> {
    // Catch suite mistakes before reporting the missing capability.
    let _ = SuiteRunner::new(config).load(
        &args.suite.suite,
        args.suite.filter.as_deref(),
        args.base_url.as_deref(),
    )?;
    Err(ensayo_cli::CliError::feature_disabled("run", "browser"))
}
