//! Pageward CLI
//!
//! ## Usage
//!
//! ```bash
//! pageward pages                          # List element pages
//! pageward generate --email invalid-email # One record with an override
//! pageward config -c pageward.yaml        # Effective configuration
//! pageward run --filter "Text Box"        # Run part of the elements suite
//! ```

use clap::Parser;
use pageward_cli::{
    logging::init_tracing,
    runner::{load_run_config, run_config, run_generate, run_pages, run_suite},
    Cli, CliConfig, CliError, CliResult, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    let run_config_value = load_run_config(&cli)?;
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Commands::Pages(args) => run_pages(&run_config_value, args, &mut stdout),
        Commands::Generate(args) => run_generate(args, &mut stdout),
        Commands::Config => run_config(&run_config_value, &mut stdout),
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| CliError::config(format!("cannot start runtime: {e}")))?;
            if config.verbosity.is_quiet() {
                let mut sink = std::io::sink();
                runtime.block_on(run_suite(run_config_value, args, &mut sink))
            } else {
                runtime.block_on(run_suite(run_config_value, args, &mut stdout))
            }
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_json_logs(cli.json_logs)
}
