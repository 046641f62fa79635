//! Output formatting utilities for CLI.

use gridball::ledger::{TurnRecord, Verdict};
use gridball::{GameState, Position, Rules, Team, ValidationError};
use serde::Serialize;

/// JSON-serializable turn outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JsonTurnResult<'a> {
    /// Whether the batch was accepted.
    pub(super) ok: bool,
    /// Resulting snapshot (null on rejection).
    pub(super) state: Option<&'a GameState>,
    /// Snapshot fingerprint as hex (null on rejection).
    pub(super) fingerprint: Option<String>,
    /// Rejection (null on success).
    pub(super) error: Option<&'a ValidationError>,
}

impl<'a> JsonTurnResult<'a> {
    /// Accepted turn.
    pub(super) fn accepted(state: &'a GameState) -> Self {
        Self {
            ok: true,
            state: Some(state),
            fingerprint: Some(format!("{:016x}", state.fingerprint())),
            error: None,
        }
    }

    /// Rejected turn.
    pub(super) fn rejected(error: &'a ValidationError) -> Self {
        Self {
            ok: false,
            state: None,
            fingerprint: None,
            error: Some(error),
        }
    }
}

/// JSON-serializable verdict for one record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JsonRecordVerdict<'a> {
    /// Turn index.
    pub(super) turn_index: u32,
    /// Reconciliation verdict.
    #[serde(flatten)]
    pub(super) verdict: &'a Verdict,
}

/// JSON-serializable reconciliation report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JsonVerifyReport<'a> {
    /// Records checked.
    pub(super) records: usize,
    /// Records that matched.
    pub(super) matched: usize,
    /// Chain error, if the log is not a consecutive chain.
    pub(super) chain_error: Option<String>,
    /// Per-record verdicts.
    pub(super) results: Vec<JsonRecordVerdict<'a>>,
}

impl<'a> JsonVerifyReport<'a> {
    /// Build the report from records and their verdicts.
    pub(super) fn new(
        records: &[TurnRecord],
        verdicts: &'a [Verdict],
        chain_error: Option<String>,
    ) -> Self {
        Self {
            records: records.len(),
            matched: verdicts.iter().filter(|v| v.is_match()).count(),
            chain_error,
            results: records
                .iter()
                .zip(verdicts)
                .map(|(record, verdict)| JsonRecordVerdict {
                    turn_index: record.turn_index,
                    verdict,
                })
                .collect(),
        }
    }
}

/// Format reconciliation verdicts as human-readable text.
pub(super) fn format_verify_text(
    records: &[TurnRecord],
    verdicts: &[Verdict],
    chain_error: Option<&str>,
) -> String {
    let mut output = String::new();
    let matched = verdicts.iter().filter(|v| v.is_match()).count();

    output.push_str(&format!(
        "Reconciled {} turn(s): {matched} match, {} differ\n",
        records.len(),
        records.len() - matched
    ));
    if let Some(chain) = chain_error {
        output.push_str(&format!("  Chain: {chain}\n"));
    }

    for (record, verdict) in records.iter().zip(verdicts) {
        match verdict {
            Verdict::Match => {}
            Verdict::Diverged { fields, clash } => {
                output.push_str(&format!(
                    "  Turn {}: diverged in {}\n",
                    record.turn_index,
                    fields.join(", ")
                ));
                if let Some(clash) = clash {
                    output.push_str(&format!("    {clash}\n"));
                }
            }
            Verdict::Rejected { error } => {
                output.push_str(&format!(
                    "  Turn {}: rejected locally: {error}\n",
                    record.turn_index
                ));
            }
            Verdict::CorruptSnapshot { violations } => {
                output.push_str(&format!(
                    "  Turn {}: corrupt pre-state ({} violation(s))\n",
                    record.turn_index,
                    violations.len()
                ));
                for violation in violations {
                    output.push_str(&format!("    {}\n", violation.message));
                }
            }
        }
    }

    output
}

/// Render a snapshot as an ASCII board.
///
/// Output format:
/// ```text
/// Turn 3  [TEAM1 0 - 1 TEAM2]  IN_PLAY
///   . . . . . . . . . . . . . . .
///   . . . 2 . . . . . . . b . . .
///  |1 . . . . 5 * e . . . . . a|
///   ...
/// Ball: (6,4) loose
/// ```
///
/// TEAM1 players show as digits, TEAM2 players as letters (`a` = id 1).
/// The goal mouth rows carry `|` on both goal lines.
pub(super) fn render_board(state: &GameState, rules: &Rules) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Turn {}  [TEAM1 {} - {} TEAM2]  {}\n",
        state.turn,
        state.score.team1,
        state.score.team2,
        tag_name(state)
    ));

    for y in 0..rules.height {
        let in_goal = y >= rules.goal_row_start && y <= rules.goal_row_end;
        output.push(if in_goal { '|' } else { ' ' });
        for x in 0..rules.width {
            if x > 0 {
                output.push(' ');
            }
            output.push(cell_glyph(state, Position::new(x, y)));
        }
        output.push(if in_goal { '|' } else { ' ' });
        output.push('\n');
    }

    match state.ball_holder() {
        Some(holder) => output.push_str(&format!(
            "Ball: {} held by {holder}\n",
            state.ball_position
        )),
        None => output.push_str(&format!("Ball: {} loose\n", state.ball_position)),
    }

    if !state.clash_random_results.is_empty() {
        output.push_str("Clashes:\n");
        for clash in &state.clash_random_results {
            output.push_str(&format!(
                "  {:?} at {}: {} contender(s), draw {:#x}, winner {}\n",
                clash.kind,
                clash.cell,
                clash.contenders.len(),
                clash.draw,
                clash.winner
            ));
        }
    }

    output
}

fn cell_glyph(state: &GameState, cell: Position) -> char {
    match state.occupant(cell) {
        Some(player) => player_glyph(player.team, player.player_id),
        None if state.ball_position == cell => '*',
        None => '.',
    }
}

fn player_glyph(team: Team, id: u32) -> char {
    let base = match team {
        Team::Team1 => b'0',
        Team::Team2 => b'a' - 1,
    };
    u8::try_from(id)
        .ok()
        .and_then(|id| base.checked_add(id))
        .filter(u8::is_ascii_alphanumeric)
        .map_or('?', char::from)
}

fn tag_name(state: &GameState) -> String {
    serde_json::to_value(state.state_tag)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}
