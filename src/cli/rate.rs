//! Rate command implementation.

use super::CliError;
use gridball::{MatchOutcome, RatingCalculator};

/// Execute the rate command.
///
/// # Errors
///
/// Never fails; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn execute(team1: u32, team2: u32, outcome: MatchOutcome) -> Result<(), CliError> {
    let (new1, new2) = RatingCalculator::new().apply(team1, team2, outcome);
    println!("TEAM1: {team1} -> {new1}");
    println!("TEAM2: {team2} -> {new2}");
    Ok(())
}
