//! Player actions submitted in a team batch.

use serde::{Deserialize, Serialize};

use crate::game::{PlayerId, PlayerRef, Position, Team};

/// Kind of intended move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveType {
    /// Relocate the player.
    Move,
    /// Send the ball to a cell.
    Pass,
    /// Shoot the ball, scoring when the target is in the opponent goal.
    Shot,
    /// Challenge the opposing ball holder for possession.
    Tackle,
}

impl MoveType {
    /// Every move kind, in contract code order.
    pub const ALL: [MoveType; 4] = [MoveType::Move, MoveType::Pass, MoveType::Shot, MoveType::Tackle];

    /// Whether the move needs the acting player to hold the ball.
    #[must_use]
    pub const fn requires_ball(self) -> bool {
        matches!(self, MoveType::Pass | MoveType::Shot)
    }
}

impl std::fmt::Display for MoveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MoveType::Move => "MOVE",
            MoveType::Pass => "PASS",
            MoveType::Shot => "SHOT",
            MoveType::Tackle => "TACKLE",
        };
        f.write_str(name)
    }
}

/// One intended move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAction {
    /// Acting player.
    pub player_id: PlayerId,
    /// Team the acting player belongs to.
    #[serde(rename = "teamEnum")]
    pub team: Team,
    /// Kind of move.
    pub move_type: MoveType,
    /// Where the player stands before the turn.
    pub old_position: Position,
    /// Target cell: destination, pass or shot target, or tackled holder.
    pub new_position: Position,
}

impl GameAction {
    /// Create a new action.
    #[must_use]
    pub const fn new(
        player_id: PlayerId,
        team: Team,
        move_type: MoveType,
        old_position: Position,
        new_position: Position,
    ) -> Self {
        Self {
            player_id,
            team,
            move_type,
            old_position,
            new_position,
        }
    }

    /// The acting player.
    #[must_use]
    pub const fn player(&self) -> PlayerRef {
        PlayerRef::new(self.team, self.player_id)
    }
}

impl std::fmt::Display for GameAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} -> {}",
            self.player(),
            self.move_type,
            self.old_position,
            self.new_position
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_format() {
        let action = GameAction::new(
            3,
            Team::Team1,
            MoveType::Move,
            Position::new(2, 2),
            Position::new(2, 3),
        );
        let json = serde_json::to_value(action).unwrap();
        assert_eq!(json["playerId"], 3);
        assert_eq!(json["teamEnum"], "TEAM1");
        assert_eq!(json["moveType"], "MOVE");
        assert_eq!(json["newPosition"]["y"], 3);

        let back: GameAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_unknown_move_type_rejected_by_parser() {
        let json = r#"{"playerId":1,"teamEnum":"TEAM2","moveType":"DRIBBLE",
            "oldPosition":{"x":0,"y":0},"newPosition":{"x":1,"y":0}}"#;
        assert!(serde_json::from_str::<GameAction>(json).is_err());
    }

    #[test]
    fn test_requires_ball() {
        assert!(MoveType::Pass.requires_ball());
        assert!(MoveType::Shot.requires_ball());
        assert!(!MoveType::Move.requires_ball());
        assert!(!MoveType::Tackle.requires_ball());
    }
}
