//! Teams, rosters, and ball ownership.

use serde::{Deserialize, Serialize};

use crate::game::Position;

/// Identifier of a player within its team's roster.
pub type PlayerId = u32;

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Home side, attacks towards the right-hand goal line.
    #[serde(rename = "TEAM1")]
    Team1,
    /// Away side, attacks towards the left-hand goal line.
    #[serde(rename = "TEAM2")]
    Team2,
}

impl Team {
    /// Both teams in evaluation order.
    pub const ALL: [Team; 2] = [Team::Team1, Team::Team2];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Team::Team1 => Team::Team2,
            Team::Team2 => Team::Team1,
        }
    }

    /// Zero-based slot, used to index per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Team::Team1 => 0,
            Team::Team2 => 1,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Team1 => f.write_str("TEAM1"),
            Team::Team2 => f.write_str("TEAM2"),
        }
    }
}

/// Which team, if any, holds the ball.
///
/// Travels on the wire as the contract's integer code: 0 = unowned,
/// 1 = TEAM1, 2 = TEAM2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BallOwner {
    /// Loose ball.
    #[default]
    None,
    /// Held by a player of the given team.
    Team(Team),
}

impl BallOwner {
    /// The owning team, if any.
    #[must_use]
    pub const fn team(self) -> Option<Team> {
        match self {
            BallOwner::None => None,
            BallOwner::Team(team) => Some(team),
        }
    }
}

impl From<BallOwner> for u8 {
    fn from(owner: BallOwner) -> Self {
        match owner {
            BallOwner::None => 0,
            BallOwner::Team(Team::Team1) => 1,
            BallOwner::Team(Team::Team2) => 2,
        }
    }
}

impl TryFrom<u8> for BallOwner {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BallOwner::None),
            1 => Ok(BallOwner::Team(Team::Team1)),
            2 => Ok(BallOwner::Team(Team::Team2)),
            other => Err(format!("ball owner code {other} is not 0, 1 or 2")),
        }
    }
}

/// Fully qualified reference to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    /// Team the player belongs to.
    pub team: Team,
    /// Roster id within that team.
    pub player_id: PlayerId,
}

impl PlayerRef {
    /// Create a new player reference.
    #[must_use]
    pub const fn new(team: Team, player_id: PlayerId) -> Self {
        Self { team, player_id }
    }
}

impl std::fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.team, self.player_id)
    }
}

/// A roster entry as stored in the snapshot: `{playerId, x, y}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPosition {
    /// Roster id.
    pub player_id: PlayerId,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl PlayerPosition {
    /// Create a roster entry at a position.
    #[must_use]
    pub const fn new(player_id: PlayerId, position: Position) -> Self {
        Self {
            player_id,
            x: position.x,
            y: position.y,
        }
    }

    /// The cell the player stands on.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Team::Team1.opponent(), Team::Team2);
        assert_eq!(Team::Team2.opponent(), Team::Team1);
    }

    #[test]
    fn test_ball_owner_wire_codes() {
        assert_eq!(serde_json::to_string(&BallOwner::None).unwrap(), "0");
        assert_eq!(
            serde_json::to_string(&BallOwner::Team(Team::Team2)).unwrap(),
            "2"
        );
        let owner: BallOwner = serde_json::from_str("1").unwrap();
        assert_eq!(owner, BallOwner::Team(Team::Team1));
        assert!(serde_json::from_str::<BallOwner>("3").is_err());
    }

    #[test]
    fn test_team_wire_name() {
        assert_eq!(serde_json::to_string(&Team::Team1).unwrap(), "\"TEAM1\"");
    }

    #[test]
    fn test_player_position_json() {
        let entry = PlayerPosition::new(4, Position::new(2, 7));
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"playerId":4,"x":2,"y":7}"#);
    }
}
