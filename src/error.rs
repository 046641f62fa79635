//! Error types for the board engine.
//!
//! Every legality failure surfaces as a [`ValidationError`] naming the team,
//! the player, the offending action, and a [`Reason`] from a closed taxonomy.

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

use crate::game::{GameAction, InvariantViolation, PlayerId, Team};

/// Why an action, batch, or lifecycle step was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// The player id is not on the named team's roster.
    PlayerNotFound,
    /// The move kind is not enabled by the rules.
    IllegalMoveType,
    /// The target position lies outside the board.
    OutOfBounds,
    /// Distance or line pattern is not allowed for the move kind.
    IllegalRange,
    /// A pass or shot was issued by a player not holding the ball.
    BallPossessionRequired,
    /// An action references a player of the other team.
    TeamMismatch,
    /// The team already sealed its batch this turn.
    AlreadyCommitted,
    /// The team tried to commit without any pending action.
    EmptyBatch,
    /// The action's old position disagrees with the snapshot.
    PositionMismatch,
    /// A tackle targets a cell without an opposing ball holder.
    NoTackleTarget,
    /// A player already has an action in this batch.
    DuplicateAction,
    /// Validation was requested before both teams committed.
    BatchNotCommitted,
    /// The game is finished and accepts no more turns.
    GameFinished,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::PlayerNotFound => "player not found in roster",
            Reason::IllegalMoveType => "move type not allowed",
            Reason::OutOfBounds => "target position out of bounds",
            Reason::IllegalRange => "illegal distance or pattern for move type",
            Reason::BallPossessionRequired => "acting player does not hold the ball",
            Reason::TeamMismatch => "action references the other team",
            Reason::AlreadyCommitted => "team already committed this turn",
            Reason::EmptyBatch => "cannot commit an empty batch",
            Reason::PositionMismatch => "old position does not match snapshot",
            Reason::NoTackleTarget => "no opposing ball holder at tackle target",
            Reason::DuplicateAction => "player already has an action this turn",
            Reason::BatchNotCommitted => "both teams must commit before validation",
            Reason::GameFinished => "game is finished",
        };
        f.write_str(text)
    }
}

/// A structured legality failure.
///
/// Serializes as `{team, playerId, action, reason, message}`; `message` is
/// derived from the other fields and ignored when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{team} player {}: {reason}", player_label(.player_id))]
pub struct ValidationError {
    /// Team the failure is attributed to.
    pub team: Team,
    /// Offending player, when the failure concerns one.
    pub player_id: Option<PlayerId>,
    /// Offending action, when the failure concerns one.
    pub action: Option<GameAction>,
    /// Failure category.
    pub reason: Reason,
}

fn player_label(player_id: &Option<PlayerId>) -> String {
    player_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

impl ValidationError {
    /// Failure tied to a specific action.
    #[must_use]
    pub fn for_action(action: &GameAction, reason: Reason) -> Self {
        Self {
            team: action.team,
            player_id: Some(action.player_id),
            action: Some(*action),
            reason,
        }
    }

    /// Failure tied to a whole team batch or lifecycle step.
    #[must_use]
    pub const fn for_team(team: Team, reason: Reason) -> Self {
        Self {
            team,
            player_id: None,
            action: None,
            reason,
        }
    }

    /// Human-readable message, as carried on the wire.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut wire = serializer.serialize_struct("ValidationError", 5)?;
        wire.serialize_field("team", &self.team)?;
        wire.serialize_field("playerId", &self.player_id)?;
        wire.serialize_field("action", &self.action)?;
        wire.serialize_field("reason", &self.reason)?;
        wire.serialize_field("message", &self.message())?;
        wire.end()
    }
}

/// Rejected rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// Board must be at least 3x3 so each side has a goal line.
    #[error("board {width}x{height} is too small (minimum 3x3)")]
    BoardTooSmall {
        /// Configured width.
        width: i32,
        /// Configured height.
        height: i32,
    },
    /// Roster must hold at least one player.
    #[error("roster size must be at least 1")]
    EmptyRoster,
    /// The formation does not list one in-bounds cell per roster slot.
    #[error("formation invalid: {0}")]
    Formation(String),
    /// Goal rows fall outside the board.
    #[error("goal rows {start}..={end} outside board height {height}")]
    GoalRows {
        /// First goal row.
        start: i32,
        /// Last goal row.
        end: i32,
        /// Board height.
        height: i32,
    },
    /// Tackle success must be expressed in basis points (0..=10000).
    #[error("tackle success {0} bps exceeds 10000")]
    TackleOdds(u32),
    /// The rules file could not be read or parsed.
    #[error("cannot load rules: {0}")]
    Load(String),
}

/// A snapshot that violates board invariants.
#[derive(Debug, Clone, Error)]
#[error("snapshot violates {} invariant(s): {}", .0.len(), summary(.0))]
pub struct SnapshotError(pub Vec<InvariantViolation>);

fn summary(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A game could not be set up from the given rules and snapshot.
#[derive(Debug, Clone, Error)]
pub enum SetupError {
    /// The rules are inconsistent.
    #[error(transparent)]
    Rules(#[from] RulesError),
    /// The snapshot breaks board invariants under those rules.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
