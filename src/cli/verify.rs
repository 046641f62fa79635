//! Verify command implementation.

use super::output::{format_verify_text, JsonVerifyReport};
use super::{load_rules, to_json, CliError, OutputFormat};
use gridball::ledger::{reconcile_all_with, TurnLog};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;

/// Execute the verify command.
///
/// # Errors
///
/// Returns an error if the log cannot be loaded, the chain is broken, or any
/// turn fails to reconcile.
pub(crate) fn execute(
    log: &Path,
    rules: Option<&Path>,
    threads: Option<usize>,
    progress: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let rules = load_rules(rules)?;
    let turn_log = TurnLog::load(log)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", log.display())))?;
    let chain_error = turn_log.verify_chain().err().map(|e| e.to_string());
    let records = turn_log.to_vec();

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(records.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} turns ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let verdicts = reconcile_all_with(&rules, &records, |_| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    });
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    let matched = verdicts.iter().filter(|v| v.is_match()).count();

    match format {
        OutputFormat::Text => {
            print!(
                "{}",
                format_verify_text(&records, &verdicts, chain_error.as_deref())
            );
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let report = JsonVerifyReport::new(&records, &verdicts, chain_error.clone());
            println!("{}", to_json(&report)?);
        }
    }

    if let Some(chain) = chain_error {
        return Err(CliError::new(chain));
    }
    if matched != records.len() {
        return Err(CliError::new(format!(
            "{} of {} turn(s) did not reconcile",
            records.len() - matched,
            records.len()
        )));
    }
    Ok(())
}
