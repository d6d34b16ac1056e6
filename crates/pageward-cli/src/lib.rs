//! Pageward CLI Library
//!
//! Command-line interface for listing element pages, generating Text Box
//! records and running the elements suite.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod logging;
pub mod runner;

pub use commands::{Cli, Commands, GenerateArgs, OutputFormat, PagesArgs, RunArgs};
pub use config::{CliConfig, Verbosity};
pub use error::{CliError, CliResult};
