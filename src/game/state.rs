//! Board snapshot.
//!
//! A [`GameState`] is an immutable value: each resolved turn produces a new
//! one, and a failed turn leaves the previous one untouched.

use serde::{Deserialize, Serialize};

use crate::game::{
    BallOwner, ClashResult, GameAction, PlayerPosition, PlayerRef, Position, Rules, Team,
};

/// Phase marker carried by every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateTag {
    /// Formation in place, ball at the centre spot.
    #[default]
    Kickoff,
    /// Regular play after a resolved turn.
    InPlay,
    /// TEAM1 scored this turn; formations were reset.
    GoalTeam1,
    /// TEAM2 scored this turn; formations were reset.
    GoalTeam2,
    /// No further turns are accepted.
    Finished,
}

impl StateTag {
    /// Tag for a goal scored by `team`.
    #[must_use]
    pub const fn goal(team: Team) -> Self {
        match team {
            Team::Team1 => StateTag::GoalTeam1,
            Team::Team2 => StateTag::GoalTeam2,
        }
    }
}

/// Goals scored so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Score {
    /// TEAM1 goals.
    pub team1: u32,
    /// TEAM2 goals.
    pub team2: u32,
}

impl Score {
    /// Goals for one team.
    #[must_use]
    pub const fn of(&self, team: Team) -> u32 {
        match team {
            Team::Team1 => self.team1,
            Team::Team2 => self.team2,
        }
    }

    /// Credit a goal to `team`.
    pub fn add_goal(&mut self, team: Team) {
        match team {
            Team::Team1 => self.team1 = self.team1.saturating_add(1),
            Team::Team2 => self.team2 = self.team2.saturating_add(1),
        }
    }
}

/// Complete board state at one point in the turn sequence.
///
/// Only the rosters and the ball are required when parsing; a bare
/// `BoardState` document deserializes with empty move lists and no clashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// TEAM1 roster with positions.
    pub team1_player_positions: Vec<PlayerPosition>,
    /// TEAM2 roster with positions.
    pub team2_player_positions: Vec<PlayerPosition>,
    /// Ball cell.
    pub ball_position: Position,
    /// Team holding the ball, if any.
    pub ball_owner: BallOwner,
    /// TEAM1 batch applied to reach this snapshot.
    #[serde(default, rename = "team1Moves")]
    pub applied_team1_moves: Vec<GameAction>,
    /// TEAM2 batch applied to reach this snapshot.
    #[serde(default, rename = "team2Moves")]
    pub applied_team2_moves: Vec<GameAction>,
    /// Phase marker.
    #[serde(default)]
    pub state_tag: StateTag,
    /// Contest outcomes in resolution order.
    #[serde(default)]
    pub clash_random_results: Vec<ClashResult>,
    /// Number of resolved turns.
    #[serde(default)]
    pub turn: u32,
    /// Goals so far.
    #[serde(default)]
    pub score: Score,
}

impl GameState {
    /// Kickoff snapshot built from the rules' formation.
    #[must_use]
    pub fn kickoff(rules: &Rules) -> Self {
        Self {
            team1_player_positions: rules.formation_for(Team::Team1),
            team2_player_positions: rules.formation_for(Team::Team2),
            ball_position: rules.kickoff_ball(),
            ball_owner: BallOwner::None,
            applied_team1_moves: Vec::new(),
            applied_team2_moves: Vec::new(),
            state_tag: StateTag::Kickoff,
            clash_random_results: Vec::new(),
            turn: 0,
            score: Score::default(),
        }
    }

    /// Roster of one team.
    #[must_use]
    pub fn roster(&self, team: Team) -> &[PlayerPosition] {
        match team {
            Team::Team1 => &self.team1_player_positions,
            Team::Team2 => &self.team2_player_positions,
        }
    }

    /// Mutable roster of one team.
    pub fn roster_mut(&mut self, team: Team) -> &mut Vec<PlayerPosition> {
        match team {
            Team::Team1 => &mut self.team1_player_positions,
            Team::Team2 => &mut self.team2_player_positions,
        }
    }

    /// Batch applied by one team to reach this snapshot.
    #[must_use]
    pub fn applied_moves(&self, team: Team) -> &[GameAction] {
        match team {
            Team::Team1 => &self.applied_team1_moves,
            Team::Team2 => &self.applied_team2_moves,
        }
    }

    /// Current cell of a player, if on the roster.
    #[must_use]
    pub fn position_of(&self, player: PlayerRef) -> Option<Position> {
        self.roster(player.team)
            .iter()
            .find(|p| p.player_id == player.player_id)
            .map(PlayerPosition::position)
    }

    /// Player standing on a cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: Position) -> Option<PlayerRef> {
        Team::ALL.into_iter().find_map(|team| {
            self.roster(team)
                .iter()
                .find(|p| p.position() == cell)
                .map(|p| PlayerRef::new(team, p.player_id))
        })
    }

    /// Player currently holding the ball.
    #[must_use]
    pub fn ball_holder(&self) -> Option<PlayerRef> {
        let team = self.ball_owner.team()?;
        self.roster(team)
            .iter()
            .find(|p| p.position() == self.ball_position)
            .map(|p| PlayerRef::new(team, p.player_id))
    }

    /// Iterate over every player with their team, TEAM1 first.
    pub fn players(&self) -> impl Iterator<Item = (PlayerRef, Position)> + '_ {
        Team::ALL.into_iter().flat_map(move |team| {
            self.roster(team)
                .iter()
                .map(move |p| (PlayerRef::new(team, p.player_id), p.position()))
        })
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state_tag == StateTag::Finished
    }

    /// Stable 64-bit FNV-1a digest over a canonical encoding.
    ///
    /// Two snapshots have equal fingerprints exactly when every field,
    /// including the ordered clash results, is identical (up to hash
    /// collisions). Rosters are hashed in stored order.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Fnv1a::new();
        for team in Team::ALL {
            let roster = self.roster(team);
            hasher.write_len(roster.len());
            for p in roster {
                hasher.write_u32(p.player_id);
                hasher.write_i32(p.x);
                hasher.write_i32(p.y);
            }
        }
        hasher.write_position(self.ball_position);
        hasher.write_u8(self.ball_owner.into());
        for team in Team::ALL {
            let moves = self.applied_moves(team);
            hasher.write_len(moves.len());
            for action in moves {
                hasher.write_u32(action.player_id);
                hasher.write_u8(team_code(action.team));
                hasher.write_u8(move_code(action.move_type));
                hasher.write_position(action.old_position);
                hasher.write_position(action.new_position);
            }
        }
        hasher.write_u8(self.state_tag as u8);
        hasher.write_len(self.clash_random_results.len());
        for clash in &self.clash_random_results {
            hasher.write_position(clash.cell);
            hasher.write_u8(clash.kind as u8);
            hasher.write_len(clash.contenders.len());
            for contender in &clash.contenders {
                hasher.write_u8(team_code(contender.team));
                hasher.write_u32(contender.player_id);
            }
            hasher.write_u64(clash.draw);
            hasher.write_u8(team_code(clash.winner.team));
            hasher.write_u32(clash.winner.player_id);
        }
        hasher.write_u32(self.turn);
        hasher.write_u32(self.score.team1);
        hasher.write_u32(self.score.team2);
        hasher.finish()
    }
}

const fn team_code(team: Team) -> u8 {
    match team {
        Team::Team1 => 1,
        Team::Team2 => 2,
    }
}

const fn move_code(move_type: crate::game::MoveType) -> u8 {
    use crate::game::MoveType;
    match move_type {
        MoveType::Move => 0,
        MoveType::Pass => 1,
        MoveType::Shot => 2,
        MoveType::Tackle => 3,
    }
}

/// 64-bit FNV-1a.
struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    const fn new() -> Self {
        Self(Self::OFFSET)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    fn write_len(&mut self, len: usize) {
        self.write_u64(len as u64);
    }

    fn write_position(&mut self, p: Position) {
        self.write_i32(p.x);
        self.write_i32(p.y);
    }

    const fn finish(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kickoff_snapshot() {
        let rules = Rules::default();
        let state = GameState::kickoff(&rules);
        assert_eq!(state.team1_player_positions.len(), 5);
        assert_eq!(state.team2_player_positions.len(), 5);
        assert_eq!(state.ball_position, Position::new(7, 4));
        assert_eq!(state.ball_owner, BallOwner::None);
        assert_eq!(state.state_tag, StateTag::Kickoff);
        assert!(state.ball_holder().is_none());
    }

    #[test]
    fn test_occupant_and_holder() {
        let rules = Rules::default();
        let mut state = GameState::kickoff(&rules);
        state.ball_position = Position::new(6, 4);
        state.ball_owner = BallOwner::Team(Team::Team1);

        assert_eq!(
            state.occupant(Position::new(8, 4)),
            Some(PlayerRef::new(Team::Team2, 5))
        );
        assert_eq!(state.ball_holder(), Some(PlayerRef::new(Team::Team1, 5)));

        // Ball owned by a team with nobody on the ball cell has no holder.
        state.ball_owner = BallOwner::Team(Team::Team2);
        assert_eq!(state.ball_holder(), None);
    }

    #[test]
    fn test_fingerprint_stable_and_sensitive() {
        let rules = Rules::default();
        let a = GameState::kickoff(&rules);
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = a.clone();
        c.turn = 1;
        assert_ne!(a.fingerprint(), c.fingerprint());

        let mut d = a.clone();
        d.team1_player_positions[0].x += 1;
        assert_ne!(a.fingerprint(), d.fingerprint());
    }

    #[test]
    fn test_board_state_document_parses() {
        let json = r#"{
            "team1PlayerPositions": [{"playerId": 1, "x": 1, "y": 1}],
            "team2PlayerPositions": [{"playerId": 1, "x": 5, "y": 1}],
            "ballPosition": {"x": 1, "y": 1},
            "ballOwner": 1
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        assert_eq!(state.ball_holder(), Some(PlayerRef::new(Team::Team1, 1)));
        assert!(state.clash_random_results.is_empty());
        assert_eq!(state.state_tag, StateTag::Kickoff);
    }

    #[test]
    fn test_score_add_goal() {
        let mut score = Score::default();
        score.add_goal(Team::Team2);
        assert_eq!(score.of(Team::Team2), 1);
        assert_eq!(score.of(Team::Team1), 0);
    }
}
