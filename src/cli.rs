//! CLI command implementations for Gridball.

pub(crate) mod init;
pub(crate) mod preflight;
pub(crate) mod rate;
pub(crate) mod validate;
pub(crate) mod verify;

mod output;

use clap::ValueEnum;
use gridball::ledger::LedgerError;
use gridball::{MatchOutcome, Rules, RulesError, Team};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Output format for commands that print results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Team selector on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TeamArg {
    /// TEAM1, attacking towards the right.
    Team1,
    /// TEAM2, attacking towards the left.
    Team2,
}

impl From<TeamArg> for Team {
    fn from(arg: TeamArg) -> Self {
        match arg {
            TeamArg::Team1 => Team::Team1,
            TeamArg::Team2 => Team::Team2,
        }
    }
}

/// Final result selector for `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutcomeArg {
    /// TEAM1 won.
    Team1,
    /// TEAM2 won.
    Team2,
    /// Level score.
    Draw,
}

impl From<OutcomeArg> for MatchOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Team1 => MatchOutcome::Team1Win,
            OutcomeArg::Team2 => MatchOutcome::Team2Win,
            OutcomeArg::Draw => MatchOutcome::Draw,
        }
    }
}

/// Where clash draws come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntropySource {
    /// Local xorshift stream from a seed.
    Seed(u64),
    /// Value revealed by the ledger.
    Ledger(u64),
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<RulesError> for CliError {
    fn from(e: RulesError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        Self::new(e.to_string())
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over the verbosity flag when set. Called once at startup.
pub(crate) fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

/// Load rules from a file, or the defaults.
fn load_rules(path: Option<&Path>) -> Result<Rules, CliError> {
    match path {
        Some(path) => Ok(Rules::load(path)?),
        None => {
            let rules = Rules::default();
            rules.validate()?;
            Ok(rules)
        }
    }
}

/// Read and parse a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::new(format!("Failed to parse {}: {e}", path.display())))
}

/// Serialize a value as pretty JSON.
fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))
}
