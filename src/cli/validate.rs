//! Validate command implementation.

use super::output::{render_board, JsonTurnResult};
use super::{load_rules, read_json, to_json, CliError, EntropySource, OutputFormat};
use gridball::game::{LedgerEntropy, SeededStream};
use gridball::{Game, GameAction, GameState, Reason, Team, ValidationError};
use std::path::Path;

/// Execute the validate command.
///
/// Runs the full accumulate, commit and validate cycle against the given
/// snapshot and prints the resolved snapshot or the rejection.
///
/// # Errors
///
/// Returns an error if inputs cannot be loaded or the batches are rejected.
pub(crate) fn execute(
    state: &Path,
    team1: &Path,
    team2: &Path,
    entropy: EntropySource,
    rules: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let rules = load_rules(rules)?;
    let snapshot: GameState = read_json(state)?;
    let batches: [Vec<GameAction>; 2] = [read_json(team1)?, read_json(team2)?];

    let mut game = Game::from_state(rules, snapshot)
        .map_err(|e| CliError::new(format!("Invalid snapshot {}: {e}", state.display())))?;

    let outcome = run_turn(&mut game, &batches, entropy);

    match (&outcome, format) {
        (Ok(()), OutputFormat::Text) => print!("{}", render_board(game.state(), game.rules())),
        (Ok(()), OutputFormat::Json) => println!("{}", to_json(&JsonTurnResult::accepted(game.state()))?),
        (Err(error), OutputFormat::Text) => println!("Rejected: {error}"),
        (Err(error), OutputFormat::Json) => println!("{}", to_json(&JsonTurnResult::rejected(error))?),
    }

    outcome.map_err(|_| CliError::new("batch rejected"))
}

fn run_turn(
    game: &mut Game,
    batches: &[Vec<GameAction>; 2],
    entropy: EntropySource,
) -> Result<(), ValidationError> {
    for (team, batch) in Team::ALL.into_iter().zip(batches) {
        // Each file is one team's submission.
        if let Some(foreign) = batch.iter().find(|a| a.team != team) {
            return Err(ValidationError::for_action(foreign, Reason::TeamMismatch));
        }
        for action in batch {
            game.do_player_move(
                action.player(),
                action.move_type,
                action.old_position,
                action.new_position,
            )?;
        }
        game.commit_move(team)?;
    }

    match entropy {
        EntropySource::Seed(seed) => game.validate_moves(SeededStream::new(seed)).map(|_| ()),
        EntropySource::Ledger(value) => game.validate_moves(LedgerEntropy::new(value)).map(|_| ()),
    }
}
