//! Snapshot invariants.
//!
//! A snapshot produced by [`resolve_turn`](crate::game::resolve_turn) always
//! satisfies these; a violation means either a bug or a corrupted snapshot
//! loaded from outside.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::game::{GameState, Position, Rules, Team};

/// A broken snapshot invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all snapshot invariants.
///
/// Returns every violation found, or an empty list if the snapshot is sound.
#[must_use]
pub fn check_invariants(state: &GameState, rules: &Rules) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut occupied: BTreeSet<Position> = BTreeSet::new();

    for team in Team::ALL {
        let roster = state.roster(team);

        if roster.len() != rules.roster_size as usize {
            violations.push(InvariantViolation::new(format!(
                "{team} has {} players, expected {}",
                roster.len(),
                rules.roster_size
            )));
        }

        let mut ids = BTreeSet::new();
        for entry in roster {
            if !ids.insert(entry.player_id) {
                violations.push(InvariantViolation::new(format!(
                    "{team} lists player {} twice",
                    entry.player_id
                )));
            }
            if entry.player_id == 0 || entry.player_id > rules.roster_size {
                violations.push(InvariantViolation::new(format!(
                    "{team} player id {} outside 1..={}",
                    entry.player_id, rules.roster_size
                )));
            }

            let cell = entry.position();
            if !rules.in_bounds(cell) {
                violations.push(InvariantViolation::new(format!(
                    "{team} player {} at {cell} is off the board",
                    entry.player_id
                )));
            }
            if !occupied.insert(cell) {
                violations.push(InvariantViolation::new(format!(
                    "{team} player {} shares cell {cell}",
                    entry.player_id
                )));
            }
        }
    }

    if !rules.in_bounds(state.ball_position) {
        violations.push(InvariantViolation::new(format!(
            "ball at {} is off the board",
            state.ball_position
        )));
    }

    if let Some(team) = state.ball_owner.team().filter(|_| state.ball_holder().is_none()) {
        violations.push(InvariantViolation::new(format!(
            "ball owned by {team} but no {team} player stands on {}",
            state.ball_position
        )));
    }

    violations
}

/// Assert all snapshot invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics listing every violation.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState, rules: &Rules) {
    let violations = check_invariants(state, rules);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Snapshot invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState, _rules: &Rules) {}
