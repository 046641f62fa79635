//! Rule parameters shared with the ledger contract.
//!
//! The engine hard-codes no geometry: board size, move ranges, goal mouth,
//! formation and clash odds all come from a [`Rules`] value, which can be
//! loaded from the contract's published rules file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::game::{DistanceMetric, MoveType, PlayerId, PlayerPosition, Position, Team};

/// Basis-point denominator for probability parameters.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Complete rule set for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rules {
    /// Board width in cells.
    pub width: i32,
    /// Board height in cells.
    pub height: i32,
    /// Players per team.
    pub roster_size: u32,
    /// Distance metric for every range check.
    pub metric: DistanceMetric,
    /// Maximum MOVE distance.
    pub move_range: u32,
    /// Maximum PASS distance.
    pub pass_range: u32,
    /// Maximum SHOT distance.
    pub shot_range: u32,
    /// Maximum TACKLE distance.
    pub tackle_range: u32,
    /// Enabled move kinds.
    pub allowed_moves: Vec<MoveType>,
    /// First row of the goal mouth (inclusive).
    pub goal_row_start: i32,
    /// Last row of the goal mouth (inclusive).
    pub goal_row_end: i32,
    /// Turn limit; the game finishes once reached.
    pub max_turns: u32,
    /// Goals that end the game early, if any.
    pub goals_to_win: Option<u32>,
    /// Chance, in basis points, that a tackle takes the ball.
    pub tackle_success_bps: u32,
    /// TEAM1 starting cells; entry `i` belongs to player id `i + 1`.
    /// TEAM2 uses the horizontal mirror.
    pub formation: Vec<Position>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            width: 15,
            height: 9,
            roster_size: 5,
            metric: DistanceMetric::Chebyshev,
            move_range: 1,
            pass_range: 4,
            shot_range: 6,
            tackle_range: 1,
            allowed_moves: MoveType::ALL.to_vec(),
            goal_row_start: 3,
            goal_row_end: 5,
            max_turns: 40,
            goals_to_win: Some(3),
            tackle_success_bps: 5_000,
            formation: vec![
                Position::new(1, 4),
                Position::new(3, 1),
                Position::new(3, 7),
                Position::new(5, 3),
                Position::new(6, 4),
            ],
        }
    }
}

impl Rules {
    /// Parse rules from JSON, filling unspecified fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Load`] on malformed JSON, or the first failed
    /// consistency check.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(json).map_err(|e| RulesError::Load(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Load`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| RulesError::Load(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Check that the parameters describe a playable board.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.width < 3 || self.height < 3 {
            return Err(RulesError::BoardTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.roster_size == 0 {
            return Err(RulesError::EmptyRoster);
        }
        if self.goal_row_start < 0
            || self.goal_row_end >= self.height
            || self.goal_row_start > self.goal_row_end
        {
            return Err(RulesError::GoalRows {
                start: self.goal_row_start,
                end: self.goal_row_end,
                height: self.height,
            });
        }
        if self.tackle_success_bps > BPS_DENOMINATOR {
            return Err(RulesError::TackleOdds(self.tackle_success_bps));
        }
        if self.formation.len() != self.roster_size as usize {
            return Err(RulesError::Formation(format!(
                "{} cells for a roster of {}",
                self.formation.len(),
                self.roster_size
            )));
        }

        let mut occupied = HashSet::new();
        for team in Team::ALL {
            for entry in self.formation_for(team) {
                let cell = entry.position();
                if !self.in_bounds(cell) {
                    return Err(RulesError::Formation(format!("{cell} is off the board")));
                }
                if !occupied.insert(cell) {
                    return Err(RulesError::Formation(format!("{cell} is used twice")));
                }
            }
        }

        Ok(())
    }

    /// Whether a cell lies on the board.
    #[must_use]
    pub const fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.width && position.y < self.height
    }

    /// Whether a move kind is enabled.
    #[must_use]
    pub fn allows(&self, move_type: MoveType) -> bool {
        self.allowed_moves.contains(&move_type)
    }

    /// Maximum distance for a move kind.
    #[must_use]
    pub const fn range_for(&self, move_type: MoveType) -> u32 {
        match move_type {
            MoveType::Move => self.move_range,
            MoveType::Pass => self.pass_range,
            MoveType::Shot => self.shot_range,
            MoveType::Tackle => self.tackle_range,
        }
    }

    /// Centre cell where the ball is placed at kickoff.
    #[must_use]
    pub const fn kickoff_ball(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    /// Goal line column that `team` attacks.
    #[must_use]
    pub const fn attacking_goal_line(&self, team: Team) -> i32 {
        match team {
            Team::Team1 => self.width - 1,
            Team::Team2 => 0,
        }
    }

    /// Whether a shot by `team` landing on `target` is a goal.
    #[must_use]
    pub const fn is_goal(&self, team: Team, target: Position) -> bool {
        target.x == self.attacking_goal_line(team)
            && target.y >= self.goal_row_start
            && target.y <= self.goal_row_end
    }

    /// Starting roster for a team.
    #[must_use]
    pub fn formation_for(&self, team: Team) -> Vec<PlayerPosition> {
        self.formation
            .iter()
            .zip(1..)
            .map(|(cell, id): (&Position, PlayerId)| {
                let cell = match team {
                    Team::Team1 => *cell,
                    Team::Team2 => Position::new(self.width - 1 - cell.x, cell.y),
                };
                PlayerPosition::new(id, cell)
            })
            .collect()
    }
}
