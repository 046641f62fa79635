//! Preflight command implementation.

use super::{load_rules, read_json, to_json, CliError, OutputFormat};
use gridball::{Game, GameAction, GameState, Team};
use serde::Serialize;
use std::path::Path;

/// JSON-serializable preflight result.
#[derive(Debug, Serialize)]
struct JsonPreflight<'a> {
    ok: bool,
    error: Option<&'a gridball::ValidationError>,
}

/// Execute the preflight command.
///
/// # Errors
///
/// Returns an error if inputs cannot be loaded or the batch is illegal.
pub(crate) fn execute(
    state: &Path,
    team: Team,
    batch: &Path,
    rules: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let rules = load_rules(rules)?;
    let snapshot: GameState = read_json(state)?;
    let actions: Vec<GameAction> = read_json(batch)?;

    let game = Game::from_state(rules, snapshot)
        .map_err(|e| CliError::new(format!("Invalid snapshot {}: {e}", state.display())))?;
    let result = game.preflight(team, &actions);

    match format {
        OutputFormat::Text => match &result {
            Ok(()) => println!("{team}: {} action(s) OK", actions.len()),
            Err(error) => println!("{team}: {error}"),
        },
        OutputFormat::Json => {
            let report = JsonPreflight {
                ok: result.is_ok(),
                error: result.as_ref().err(),
            };
            println!("{}", to_json(&report)?);
        }
    }

    result.map_err(|_| CliError::new("batch rejected"))
}
