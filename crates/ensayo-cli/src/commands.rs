//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Ensayador: run declarative, data-driven UI scenario suites
#[derive(Parser, Debug)]
#[command(name = "ensayador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
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
    /// Run every scenario of a suite in a browser
    Run(RunArgs),

    /// Check a suite file and its fixtures without running anything
    Validate(SuiteArgs),

    /// List the scenarios a suite expands to
    List(SuiteArgs),
}

/// Arguments shared by commands that read a suite
#[derive(Parser, Debug, Clone)]
pub struct SuiteArgs {
    /// Suite YAML file
    pub suite: PathBuf,

    /// Directory holding fixture datasets
    #[arg(long, default_value = "fixtures")]
    pub fixtures: PathBuf,

    /// Only scenarios whose name or group contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Suite selection
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Override the suite's base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-step timeout in milliseconds
    #[arg(long, default_value = "10000")]
    pub timeout: u64,

    /// Default pause in milliseconds
    #[arg(long, default_value = "500")]
    pub settle: u64,

    /// Scenarios run at once, each on its own page
    #[arg(short = 'j', long, default_value = "1")]
    pub jobs: usize,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory holding snapshot baselines
    #[arg(long, default_value = "__snapshots__")]
    pub snapshots: PathBuf,

    /// Overwrite snapshot baselines
    #[arg(long)]
    pub update_snapshots: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the chromium binary
    #[arg(long)]
    pub chromium: Option<PathBuf>,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON
    Json,
    /// JUnit XML
    Junit,
}

impl From<FormatArg> for ensayo::ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
            FormatArg::Junit => Self::Junit,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic detection
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
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_verify_cli() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }

        #[test]
        fn test_run_defaults() {
            let cli = Cli::try_parse_from(["ensayador", "run", "suites/hackathon.yaml"]).unwrap();
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.suite.suite, PathBuf::from("suites/hackathon.yaml"));
            assert_eq!(args.suite.fixtures, PathBuf::from("fixtures"));
            assert_eq!(args.timeout, 10_000);
            assert_eq!(args.settle, 500);
            assert_eq!(args.jobs, 1);
            assert_eq!(args.format, FormatArg::Text);
            assert!(!args.update_snapshots);
        }

        #[test]
        fn test_run_flags() {
            let cli = Cli::try_parse_from([
                "ensayador",
                "-vv",
                "--color",
                "never",
                "run",
                "suite.yaml",
                "--base-url",
                "http://localhost:8080/",
                "--jobs",
                "4",
                "--format",
                "junit",
                "--output",
                "report.xml",
                "--update-snapshots",
                "--headed",
                "--chromium",
                "/usr/bin/chromium",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.color, ColorArg::Never);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.base_url.as_deref(), Some("http://localhost:8080/"));
            assert_eq!(args.jobs, 4);
            assert_eq!(args.format, FormatArg::Junit);
            assert_eq!(args.output, Some(PathBuf::from("report.xml")));
            assert!(args.update_snapshots);
            assert!(args.headed);
        }

        #[test]
        fn test_list_filter() {
            let cli =
                Cli::try_parse_from(["ensayador", "list", "suite.yaml", "--filter", "Login"])
                    .unwrap();
            let Commands::List(args) = cli.command else {
                panic!("expected list");
            };
            assert_eq!(args.filter.as_deref(), Some("Login"));
        }

        #[test]
        fn test_suite_is_required() {
            assert!(Cli::try_parse_from(["ensayador", "validate"]).is_err());
        }
    }

    mod conversion_tests {
        use super::*;
        use crate::config::ColorChoice;

        #[test]
        fn test_format_conversion() {
            assert_eq!(
                ensayo::ReportFormat::from(FormatArg::Json),
                ensayo::ReportFormat::Json
            );
            assert_eq!(
                ensayo::ReportFormat::from(FormatArg::Junit),
                ensayo::ReportFormat::Junit
            );
        }

        #[test]
        fn test_color_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
        }
    }
}
