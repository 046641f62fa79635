//! Init command implementation.

use super::{load_rules, to_json, CliError};
use gridball::GameState;
use std::path::Path;

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the rules file cannot be loaded.
pub(crate) fn execute(rules: Option<&Path>) -> Result<(), CliError> {
    let rules = load_rules(rules)?;
    let state = GameState::kickoff(&rules);
    println!("{}", to_json(&state)?);
    Ok(())
}
