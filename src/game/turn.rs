//! Turn resolution.
//!
//! [`resolve_turn`] is a pure function of `(snapshot, batches, rules,
//! randomness)`: it either rejects the batches with the first
//! [`ValidationError`] in evaluation order, or returns the next snapshot.
//! The input snapshot is never modified, so the same call both pre-flights
//! a batch and recomputes a ledger-confirmed turn.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use crate::error::{Reason, ValidationError};
use crate::game::clash::{ClashKind, ClashResolver, Contest, Randomness};
use crate::game::{
    check, BallOwner, GameAction, GameState, MoveType, PlayerRef, Position, Rules, StateTag, Team,
};

/// A batch in evaluation order: ascending player id, stable for ties.
#[must_use]
pub fn evaluation_order(batch: &[GameAction]) -> Vec<GameAction> {
    let mut sorted = batch.to_vec();
    sorted.sort_by_key(|a| a.player_id);
    sorted
}

/// Check one team's batch against a snapshot.
///
/// Actions are checked in ascending player id; the first failure stops the
/// pass.
///
/// # Errors
///
/// `TeamMismatch` for an action of the other team, `DuplicateAction` for a
/// second action of the same player, or any single-action failure.
pub fn check_batch(
    team: Team,
    batch: &[GameAction],
    state: &GameState,
    rules: &Rules,
) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for action in evaluation_order(batch) {
        if action.team != team {
            return Err(ValidationError::for_action(&action, Reason::TeamMismatch));
        }
        if !seen.insert(action.player_id) {
            return Err(ValidationError::for_action(&action, Reason::DuplicateAction));
        }
        check(&action, state, rules)?;
    }
    Ok(())
}

/// Where the ball is while the turn is applied.
#[derive(Debug, Clone, Copy)]
enum Ball {
    /// Held by a player; follows them when they move.
    Carried(PlayerRef),
    /// Lying on a cell; picked up by whoever ends there.
    Loose(Position),
}

/// Validate both batches and, if legal, produce the next snapshot.
///
/// # Errors
///
/// Returns the first illegal action, TEAM1 ascending player id before
/// TEAM2, or `GameFinished` if the snapshot is final.
#[instrument(skip_all, fields(turn = state.turn, team1 = team1.len(), team2 = team2.len()))]
pub fn resolve_turn<R: Randomness>(
    state: &GameState,
    team1: &[GameAction],
    team2: &[GameAction],
    rules: &Rules,
    rng: &mut R,
) -> Result<GameState, ValidationError> {
    if state.is_finished() {
        return Err(ValidationError::for_team(Team::Team1, Reason::GameFinished));
    }
    check_batch(Team::Team1, team1, state, rules)?;
    check_batch(Team::Team2, team2, state, rules)?;

    let team1 = evaluation_order(team1);
    let team2 = evaluation_order(team2);
    let actions: Vec<GameAction> = team1.iter().chain(team2.iter()).copied().collect();

    let holder = state.ball_holder();
    let contests = collect_contests(state, holder, &actions);
    let clashes = ClashResolver::new(rules.tackle_success_bps).resolve(contests, rng);

    // Possession first: a successful tackle voids the holder's ball action.
    let mut ball = holder.map_or(Ball::Loose(state.ball_position), Ball::Carried);
    let mut tackled = false;
    for clash in clashes.iter().filter(|c| c.kind == ClashKind::Possession) {
        tackled = clash.winner != clash.contenders[0];
        ball = Ball::Carried(clash.winner);
    }

    let mut goal = None;
    if let (Some(holder), false) = (holder, tackled) {
        let ball_action = actions
            .iter()
            .find(|a| a.player() == holder && a.move_type.requires_ball());
        if let Some(action) = ball_action {
            if action.move_type == MoveType::Shot && rules.is_goal(holder.team, action.new_position) {
                goal = Some(holder.team);
            } else {
                ball = Ball::Loose(action.new_position);
            }
        }
    }

    let losers: BTreeSet<PlayerRef> = clashes
        .iter()
        .filter(|c| c.kind == ClashKind::Destination)
        .flat_map(|c| c.contenders.iter().copied().filter(move |p| *p != c.winner))
        .collect();
    let mut next = state.clone();
    apply_movement(&mut next, state, &actions, losers);

    match ball {
        Ball::Carried(player) => {
            if let Some(cell) = next.position_of(player) {
                next.ball_position = cell;
                next.ball_owner = BallOwner::Team(player.team);
            }
        }
        Ball::Loose(cell) => {
            next.ball_position = cell;
            next.ball_owner = next
                .occupant(cell)
                .map_or(BallOwner::None, |p| BallOwner::Team(p.team));
        }
    }

    if let Some(scorer) = goal {
        next.score.add_goal(scorer);
        next.team1_player_positions = rules.formation_for(Team::Team1);
        next.team2_player_positions = rules.formation_for(Team::Team2);
        next.ball_position = rules.kickoff_ball();
        next.ball_owner = BallOwner::None;
        next.state_tag = StateTag::goal(scorer);
        debug!(%scorer, score1 = next.score.team1, score2 = next.score.team2, "goal");
    } else {
        next.state_tag = StateTag::InPlay;
    }

    next.applied_team1_moves = team1;
    next.applied_team2_moves = team2;
    next.clash_random_results = clashes;
    next.turn = state.turn.saturating_add(1);

    let goal_limit_reached = rules
        .goals_to_win
        .is_some_and(|limit| next.score.team1 >= limit || next.score.team2 >= limit);
    if next.turn >= rules.max_turns || goal_limit_reached {
        next.state_tag = StateTag::Finished;
    }

    debug!(
        clashes = next.clash_random_results.len(),
        tag = ?next.state_tag,
        "turn resolved"
    );
    Ok(next)
}

/// Enumerate possession and destination contests (unsorted).
fn collect_contests(
    state: &GameState,
    holder: Option<PlayerRef>,
    actions: &[GameAction],
) -> Vec<Contest> {
    let mut contests = Vec::new();

    if let Some(holder) = holder {
        let tacklers: Vec<PlayerRef> = actions
            .iter()
            .filter(|a| a.move_type == MoveType::Tackle && a.new_position == state.ball_position)
            .map(GameAction::player)
            .collect();
        if !tacklers.is_empty() {
            let mut contenders = vec![holder];
            contenders.extend(tacklers);
            contests.push(Contest {
                cell: state.ball_position,
                kind: ClashKind::Possession,
                contenders,
            });
        }
    }

    // BTreeMap keeps claimants in evaluation order per cell.
    let mut claims: BTreeMap<(i32, i32), (Position, Vec<PlayerRef>)> = BTreeMap::new();
    for action in actions.iter().filter(|a| a.move_type == MoveType::Move) {
        claims
            .entry(action.new_position.row_major())
            .or_insert_with(|| (action.new_position, Vec::new()))
            .1
            .push(action.player());
    }
    for (cell, contenders) in claims.into_values() {
        if contenders.len() >= 2 {
            contests.push(Contest {
                cell,
                kind: ClashKind::Destination,
                contenders,
            });
        }
    }

    contests
}

/// Move every mover that won its cell and is not blocked.
///
/// Clash losers stay put. A mover whose target is held by a staying player
/// bounces back; bouncing repeats until nothing changes. Swaps are allowed.
fn apply_movement(
    next: &mut GameState,
    before: &GameState,
    actions: &[GameAction],
    mut staying: BTreeSet<PlayerRef>,
) {
    let movers: Vec<&GameAction> = actions
        .iter()
        .filter(|a| a.move_type == MoveType::Move)
        .collect();
    let moving: BTreeSet<PlayerRef> = movers.iter().map(|a| a.player()).collect();

    loop {
        let occupied: BTreeSet<Position> = before
            .players()
            .filter(|(p, _)| !moving.contains(p) || staying.contains(p))
            .map(|(_, cell)| cell)
            .collect();

        let mut changed = false;
        for mover in &movers {
            let player = mover.player();
            if !staying.contains(&player) && occupied.contains(&mover.new_position) {
                staying.insert(player);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    for mover in movers {
        let player = mover.player();
        if staying.contains(&player) {
            continue;
        }
        if let Some(entry) = next
            .roster_mut(player.team)
            .iter_mut()
            .find(|p| p.player_id == player.player_id)
        {
            entry.x = mover.new_position.x;
            entry.y = mover.new_position.y;
        }
    }
}
