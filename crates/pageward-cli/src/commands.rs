//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pageward: page objects, test data and retry-aware runs for browser UI tests
#[derive(Parser, Debug)]
#[command(name = "pageward")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Run configuration file (YAML)
    #[arg(short, long, global = true, env = "PAGEWARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the application under test
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered element pages
    Pages(PagesArgs),

    /// Generate Text Box test records
    Generate(GenerateArgs),

    /// Show the effective run configuration
    Config,

    /// Run the elements suite
    Run(RunArgs),
}

/// Output format for listings and reports
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Arguments for the pages command
#[derive(Parser, Debug)]
pub struct PagesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Use this full name verbatim
    #[arg(long)]
    pub full_name: Option<String>,

    /// Use this email verbatim (may be malformed or empty)
    #[arg(long)]
    pub email: Option<String>,

    /// Use this current address verbatim
    #[arg(long)]
    pub current_address: Option<String>,

    /// Use this permanent address verbatim
    #[arg(long)]
    pub permanent_address: Option<String>,

    /// Number of records
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Seed for reproducible records
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Only run scenarios whose id contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Re-runs after a failed attempt (overrides the config file)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Scenarios run concurrently
    #[arg(short = 'j', long, default_value = "1")]
    pub workers: usize,

    /// Per-attempt time limit in milliseconds
    #[arg(long, default_value = "30000")]
    pub timeout: u64,

    /// Also run scenarios that are skipped by default
    #[arg(long)]
    pub include_skipped: bool,

    /// Drive a real Chromium instead of the in-memory simulation
    #[arg(long)]
    pub browser: bool,

    /// Show the browser window
    #[arg(long, requires = "browser")]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long, requires = "browser")]
    pub no_sandbox: bool,

    /// Path to the Chromium binary
    #[arg(long, requires = "browser")]
    pub chromium_path: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_overrides() {
        let cli = Cli::parse_from([
            "pageward",
            "generate",
            "--email",
            "invalid-email",
            "-n",
            "3",
            "--seed",
            "7",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.email.as_deref(), Some("invalid-email"));
                assert_eq!(args.count, 3);
                assert_eq!(args.seed, Some(7));
                assert!(args.full_name.is_none());
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_override() {
        let cli = Cli::parse_from(["pageward", "generate", "--email", ""]);
        match cli.command {
            Commands::Generate(args) => assert_eq!(args.email.as_deref(), Some("")),
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::parse_from(["pageward", "-vv", "run"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.workers, 1);
                assert_eq!(args.retries, None);
                assert!(!args.browser);
                assert_eq!(args.format, OutputFormat::Text);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_headed_requires_browser() {
        assert!(Cli::try_parse_from(["pageward", "run", "--headed"]).is_err());
    }
}
