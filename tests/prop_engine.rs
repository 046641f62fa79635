//! Property-based tests for turn resolution.
//!
//! Batches are generated around a live snapshot so that legal and illegal
//! actions, contested cells and tackles all occur.
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use gridball::game::{check_batch, check_invariants, resolve_turn, SeededStream};
use gridball::{
    BallOwner, Game, GameAction, GameState, MoveType, PlayerRef, Position, Rules, Team,
};

/// Kickoff with TEAM1 player 5 on the ball and TEAM2 player 5 adjacent.
fn live_snapshot(rules: &Rules) -> GameState {
    let mut state = GameState::kickoff(rules);
    state.team2_player_positions[4] = gridball::game::PlayerPosition::new(5, Position::new(7, 4));
    state.ball_position = Position::new(6, 4);
    state.ball_owner = BallOwner::Team(Team::Team1);
    state
}

/// Raw action: (player id, move kind index, dx, dy, stale old position).
type RawAction = (u32, usize, i32, i32, bool);

fn raw_batch() -> impl Strategy<Value = Vec<RawAction>> {
    prop::collection::vec((1u32..=6, 0usize..4, -2i32..=2, -2i32..=2, prop::bool::weighted(0.05)), 0..6)
}

fn build_batch(state: &GameState, team: Team, raw: &[RawAction]) -> Vec<GameAction> {
    raw.iter()
        .map(|&(id, kind, dx, dy, stale)| {
            let from = state
                .position_of(PlayerRef::new(team, id))
                .unwrap_or(Position::new(0, 0));
            let old = if stale { Position::new(from.x + 1, from.y) } else { from };
            GameAction::new(
                id,
                team,
                MoveType::ALL[kind],
                old,
                Position::new(from.x + dx, from.y + dy),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Same snapshot, batches and randomness give the same result.
    #[test]
    fn prop_resolution_deterministic(
        raw1 in raw_batch(),
        raw2 in raw_batch(),
        seed in any::<u64>()
    ) {
        let rules = Rules::default();
        let state = live_snapshot(&rules);
        let b1 = build_batch(&state, Team::Team1, &raw1);
        let b2 = build_batch(&state, Team::Team2, &raw2);

        let first = resolve_turn(&state, &b1, &b2, &rules, &mut SeededStream::new(seed));
        let second = resolve_turn(&state, &b1, &b2, &rules, &mut SeededStream::new(seed));
        prop_assert_eq!(&first, &second);
        if let (Ok(a), Ok(b)) = (&first, &second) {
            prop_assert_eq!(a.fingerprint(), b.fingerprint());
        }
    }

    /// A resolved snapshot keeps positions unique, in bounds and the ball
    /// with a consistent owner.
    #[test]
    fn prop_resolved_snapshot_sound(
        raw1 in raw_batch(),
        raw2 in raw_batch(),
        seed in any::<u64>()
    ) {
        let rules = Rules::default();
        let state = live_snapshot(&rules);
        let b1 = build_batch(&state, Team::Team1, &raw1);
        let b2 = build_batch(&state, Team::Team2, &raw2);

        if let Ok(next) = resolve_turn(&state, &b1, &b2, &rules, &mut SeededStream::new(seed)) {
            prop_assert!(check_invariants(&next, &rules).is_empty());
            prop_assert_eq!(next.turn, state.turn + 1);
            // Roster composition is constant.
            for team in Team::ALL {
                let before: Vec<u32> = state.roster(team).iter().map(|p| p.player_id).collect();
                let after: Vec<u32> = next.roster(team).iter().map(|p| p.player_id).collect();
                prop_assert_eq!(before, after);
            }
        }
    }

    /// A rejected validation leaves the stored snapshot untouched.
    #[test]
    fn prop_rejection_does_not_mutate(
        raw1 in raw_batch(),
        raw2 in raw_batch(),
        seed in any::<u64>()
    ) {
        let rules = Rules::default();
        let state = live_snapshot(&rules);
        let mut game = Game::from_state(rules, state.clone()).unwrap();

        let b1 = build_batch(&state, Team::Team1, &raw1);
        let b2 = build_batch(&state, Team::Team2, &raw2);
        let mut queued = true;
        for action in b1.iter().chain(&b2) {
            queued &= game
                .do_player_move(action.player(), action.move_type, action.old_position, action.new_position)
                .is_ok();
        }
        queued &= game.commit_move(Team::Team1).is_ok();
        queued &= game.commit_move(Team::Team2).is_ok();
        if !queued {
            // Local fail-fast rejections are covered elsewhere.
            return Ok(());
        }

        if game.validate_moves(SeededStream::new(seed)).is_err() {
            prop_assert_eq!(game.state(), &state);
        }
    }

    /// The reported error is the first illegal action: TEAM1 before TEAM2,
    /// lowest player id first.
    #[test]
    fn prop_evaluation_order(
        raw1 in raw_batch(),
        raw2 in raw_batch(),
        seed in any::<u64>()
    ) {
        let rules = Rules::default();
        let state = live_snapshot(&rules);
        let b1 = build_batch(&state, Team::Team1, &raw1);
        let b2 = build_batch(&state, Team::Team2, &raw2);

        if let Err(err) = resolve_turn(&state, &b1, &b2, &rules, &mut SeededStream::new(seed)) {
            match err.team {
                Team::Team1 => {
                    let failing = err.player_id.unwrap();
                    let earlier: Vec<GameAction> =
                        b1.iter().copied().filter(|a| a.player_id < failing).collect();
                    prop_assert!(check_batch(Team::Team1, &earlier, &state, &rules).is_ok());
                }
                Team::Team2 => {
                    prop_assert!(check_batch(Team::Team1, &b1, &state, &rules).is_ok());
                }
            }
        }
    }
}
