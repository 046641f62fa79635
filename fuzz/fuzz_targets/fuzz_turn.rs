#![no_main]

//! Multi-turn resolution fuzzer.
//!
//! Drives the game aggregate through several accumulate, commit and validate
//! cycles with arbitrary actions and randomness, checking after each turn
//! that:
//! 1. A rejected turn leaves the snapshot untouched
//! 2. An accepted turn yields a snapshot that passes every invariant
//! 3. Resolution is reproducible from the same inputs

use arbitrary::Arbitrary;
use gridball::game::{check_invariants, resolve_turn, SeededStream};
use gridball::{Game, GameAction, MoveType, PlayerRef, Position, Rules, Team};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated action, relative to the player's current cell.
#[derive(Arbitrary, Debug, Clone, Copy)]
struct FuzzAction {
    player_id: u8,
    kind: u8,
    dx: i8,
    dy: i8,
}

/// One turn of input.
#[derive(Arbitrary, Debug)]
struct FuzzTurn {
    team1: Vec<FuzzAction>,
    team2: Vec<FuzzAction>,
    seed: u64,
}

fn to_action(game: &Game, team: Team, raw: FuzzAction) -> GameAction {
    let id = u32::from(raw.player_id % 7);
    let from = game
        .state()
        .position_of(PlayerRef::new(team, id))
        .unwrap_or(Position::new(0, 0));
    let target = Position::new(from.x + i32::from(raw.dx % 8), from.y + i32::from(raw.dy % 8));
    GameAction::new(id, team, MoveType::ALL[usize::from(raw.kind % 4)], from, target)
}

fuzz_target!(|turns: Vec<FuzzTurn>| {
    let Ok(mut game) = Game::new(Rules::default()) else {
        return;
    };

    for turn in turns.into_iter().take(20) {
        let team1: Vec<GameAction> = turn.team1.iter().take(8).map(|a| to_action(&game, Team::Team1, *a)).collect();
        let team2: Vec<GameAction> = turn.team2.iter().take(8).map(|a| to_action(&game, Team::Team2, *a)).collect();

        let before = game.save_state();
        let replay = resolve_turn(&before, &team1, &team2, game.rules(), &mut SeededStream::new(turn.seed));

        let mut queued = true;
        for action in team1.iter().chain(&team2) {
            queued &= game
                .do_player_move(action.player(), action.move_type, action.old_position, action.new_position)
                .is_ok();
        }
        queued &= game.commit_move(Team::Team1).is_ok();
        queued &= game.commit_move(Team::Team2).is_ok();
        if !queued {
            assert!(game.restore_state(before).is_ok());
            continue;
        }

        match game.validate_moves(SeededStream::new(turn.seed)) {
            Ok(next) => {
                assert!(check_invariants(next, &Rules::default()).is_empty());
                assert_eq!(Ok(next), replay.as_ref());
            }
            Err(_) => assert_eq!(game.state(), &before),
        }

        if game.is_finished() {
            break;
        }
    }
});
