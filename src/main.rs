//! Gridball CLI - resolve, pre-flight and reconcile turns from the command line.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Gridball - a deterministic tactical-board football engine
#[derive(Parser, Debug)]
#[command(name = "gridball")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log verbosity (-v info, -vv debug, -vvv trace); `RUST_LOG` overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the kickoff snapshot as JSON
    Init {
        /// Rules file (JSON); defaults apply to missing fields
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Resolve one turn from a snapshot and both sealed batches
    Validate {
        /// Pre-turn snapshot (JSON)
        #[arg(long)]
        state: PathBuf,

        /// TEAM1 batch (JSON array of actions)
        #[arg(long)]
        team1: PathBuf,

        /// TEAM2 batch (JSON array of actions)
        #[arg(long)]
        team2: PathBuf,

        /// Fixed seed for clash draws
        #[arg(long, conflicts_with = "ledger_value", required_unless_present = "ledger_value")]
        seed: Option<u64>,

        /// Randomness value revealed by the ledger for this turn
        #[arg(long)]
        ledger_value: Option<u64>,

        /// Rules file (JSON)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Check one team's batch against a snapshot without resolving
    Preflight {
        /// Current snapshot (JSON)
        #[arg(long)]
        state: PathBuf,

        /// Submitting team
        #[arg(long)]
        team: cli::TeamArg,

        /// Batch to check (JSON array of actions)
        #[arg(long)]
        batch: PathBuf,

        /// Rules file (JSON)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Reconcile a JSON Lines log of ledger-confirmed turns
    Verify {
        /// Turn log (one record per line)
        #[arg(long)]
        log: PathBuf,

        /// Rules file (JSON)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Apply the post-game rating update
    Rate {
        /// TEAM1 pre-game rating
        #[arg(long, default_value_t = gridball::rating::DEFAULT_RATING)]
        team1: u32,

        /// TEAM2 pre-game rating
        #[arg(long, default_value_t = gridball::rating::DEFAULT_RATING)]
        team2: u32,

        /// Final result
        #[arg(long)]
        outcome: cli::OutcomeArg,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_logging(args.verbose);

    let result = match args.command {
        Commands::Init { rules } => cli::init::execute(rules.as_deref()),

        Commands::Validate {
            state,
            team1,
            team2,
            seed,
            ledger_value,
            rules,
            format,
        } => {
            let entropy = match ledger_value {
                Some(value) => cli::EntropySource::Ledger(value),
                None => cli::EntropySource::Seed(seed.unwrap_or_default()),
            };
            cli::validate::execute(&state, &team1, &team2, entropy, rules.as_deref(), format)
        }

        Commands::Preflight {
            state,
            team,
            batch,
            rules,
            format,
        } => cli::preflight::execute(&state, team.into(), &batch, rules.as_deref(), format),

        Commands::Verify {
            log,
            rules,
            threads,
            progress,
            format,
        } => cli::verify::execute(&log, rules.as_deref(), threads, progress, format),

        Commands::Rate {
            team1,
            team2,
            outcome,
        } => cli::rate::execute(team1, team2, outcome.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
