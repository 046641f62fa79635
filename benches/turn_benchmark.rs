//! Benchmarks for turn resolution and reconciliation.
//!
//! Turn resolution is the hot path: it runs once per pre-flight and once per
//! reconciled ledger turn.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use gridball::game::{resolve_turn, LedgerEntropy, SeededStream};
use gridball::ledger::{TurnRecord, reconcile_all};
use gridball::{GameAction, GameState, MoveType, Position, Rules, Team};

/// Every player steps one cell towards the centre column.
fn full_batches(state: &GameState) -> (Vec<GameAction>, Vec<GameAction>) {
    let batch = |team: Team, dx: i32| -> Vec<GameAction> {
        state
            .roster(team)
            .iter()
            .map(|p| {
                let from = p.position();
                GameAction::new(p.player_id, team, MoveType::Move, from, Position::new(from.x + dx, from.y))
            })
            .collect()
    };
    (batch(Team::Team1, 1), batch(Team::Team2, -1))
}

fn bench_single_turn(c: &mut Criterion) {
    let rules = Rules::default();
    let state = GameState::kickoff(&rules);
    let (team1, team2) = full_batches(&state);

    c.bench_function("resolve_turn_full_rosters", |b| {
        b.iter(|| {
            let result = resolve_turn(
                black_box(&state),
                black_box(&team1),
                black_box(&team2),
                &rules,
                &mut SeededStream::new(42),
            );
            black_box(result)
        });
    });
}

fn bench_reconcile_batch(c: &mut Criterion) {
    let rules = Rules::default();
    let state = GameState::kickoff(&rules);
    let (team1_moves, team2_moves) = full_batches(&state);

    let records: Vec<TurnRecord> = (0..256u32)
        .map(|i| {
            let randomness = u64::from(i);
            let confirmed_state = resolve_turn(
                &state,
                &team1_moves,
                &team2_moves,
                &rules,
                &mut LedgerEntropy::new(randomness),
            )
            .unwrap();
            TurnRecord {
                turn_index: i,
                pre_state: state.clone(),
                team1_moves: team1_moves.clone(),
                team2_moves: team2_moves.clone(),
                randomness,
                confirmed_state,
                confirmed_fingerprint: None,
            }
        })
        .collect();

    c.bench_function("reconcile_256_turns_parallel", |b| {
        b.iter(|| black_box(reconcile_all(&rules, black_box(&records))));
    });
}

criterion_group!(benches, bench_single_turn, bench_reconcile_batch);
criterion_main!(benches);
