//! Command-line interface for seeding and querying an InterestConnect
//! database.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod error;
mod query;
mod seed;

pub use error::CliError;

use query::{MatchesArgs, RecommendArgs, run_matches_with, run_recommend_with};
use seed::{SeedArgs, run_seed_with};

pub(crate) const ARG_DATASET: &str = "dataset";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ENV_SEED_DATASET: &str = "CONNECT_CMDS_SEED_DATASET";
pub(crate) const ENV_MATCHES_USER: &str = "CONNECT_CMDS_MATCHES_USER";
pub(crate) const ENV_RECOMMEND_USER: &str = "CONNECT_CMDS_RECOMMEND_USER";

/// Database file used when no `--database` is configured.
pub const DEFAULT_DATABASE: &str = "interest-connect.db";

/// Install the stderr log formatter.
///
/// `RUST_LOG` selects the level (default `info`); records emitted through
/// the `log` facade by the library crates are captured as well. Calling it
/// twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration merging or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Seed(args) => run_seed_with(args, writer),
        Command::Matches(args) => run_matches_with(args, writer),
        Command::Recommend(args) => run_recommend_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "interest-connect",
    about = "Seed and query an InterestConnect community database",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import users and groups from a JSON dataset.
    Seed(SeedArgs),
    /// Print the users who best match a user.
    Matches(MatchesArgs),
    /// Print the groups recommended to a user.
    Recommend(RecommendArgs),
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
