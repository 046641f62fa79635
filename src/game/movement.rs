//! Single-action legality rules.
//!
//! Checks never mutate the snapshot. The order of checks is fixed so that
//! the first failing rule is the one reported, matching the contract.

use crate::error::{Reason, ValidationError};
use crate::game::{GameAction, GameState, MoveType, Rules};

fn reject(action: &GameAction, reason: Reason) -> Result<(), ValidationError> {
    Err(ValidationError::for_action(action, reason))
}

/// Checks that need no snapshot: enabled move kind and target in bounds.
///
/// Used to fail fast while a batch is still being accumulated.
///
/// # Errors
///
/// Returns `IllegalMoveType` or `OutOfBounds`.
pub fn check_local(action: &GameAction, rules: &Rules) -> Result<(), ValidationError> {
    if !rules.allows(action.move_type) {
        return reject(action, Reason::IllegalMoveType);
    }
    if !rules.in_bounds(action.new_position) {
        return reject(action, Reason::OutOfBounds);
    }
    Ok(())
}

/// Full legality check of one action against a snapshot.
///
/// In order: roster membership, old position, move kind, bounds,
/// distance and pattern, ball possession, tackle target.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first failed rule.
pub fn check(action: &GameAction, state: &GameState, rules: &Rules) -> Result<(), ValidationError> {
    let Some(current) = state.position_of(action.player()) else {
        return reject(action, Reason::PlayerNotFound);
    };
    if current != action.old_position {
        return reject(action, Reason::PositionMismatch);
    }

    check_local(action, rules)?;

    let target = action.new_position;
    let distance = current.distance(target, rules.metric);
    if distance == 0 || distance > rules.range_for(action.move_type) {
        return reject(action, Reason::IllegalRange);
    }
    if action.move_type.requires_ball() && !current.is_straight_line(target) {
        return reject(action, Reason::IllegalRange);
    }

    if action.move_type.requires_ball() && state.ball_holder() != Some(action.player()) {
        return reject(action, Reason::BallPossessionRequired);
    }

    if action.move_type == MoveType::Tackle {
        match state.occupant(target) {
            Some(other) if other.team == action.team => {
                return reject(action, Reason::TeamMismatch);
            }
            Some(other) if state.ball_holder() == Some(other) => {}
            _ => return reject(action, Reason::NoTackleTarget),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BallOwner, PlayerPosition, Position, Team};

    fn small_state() -> GameState {
        let rules = Rules::default();
        let mut state = GameState::kickoff(&rules);
        state.team1_player_positions = vec![
            PlayerPosition::new(1, Position::new(1, 1)),
            PlayerPosition::new(3, Position::new(2, 2)),
        ];
        state.team2_player_positions = vec![
            PlayerPosition::new(5, Position::new(3, 1)),
            PlayerPosition::new(6, Position::new(3, 2)),
        ];
        state.ball_position = Position::new(2, 2);
        state.ball_owner = BallOwner::Team(Team::Team1);
        state
    }

    fn action(id: u32, team: Team, kind: MoveType, from: (i32, i32), to: (i32, i32)) -> GameAction {
        GameAction::new(
            id,
            team,
            kind,
            Position::new(from.0, from.1),
            Position::new(to.0, to.1),
        )
    }

    fn reason_of(result: Result<(), ValidationError>) -> Reason {
        result.unwrap_err().reason
    }

    #[test]
    fn test_legal_move() {
        let state = small_state();
        let rules = Rules::default();
        let a = action(3, Team::Team1, MoveType::Move, (2, 2), (2, 3));
        assert!(check(&a, &state, &rules).is_ok());
    }

    #[test]
    fn test_unknown_player() {
        let state = small_state();
        let rules = Rules::default();
        let a = action(9, Team::Team1, MoveType::Move, (2, 2), (2, 3));
        let err = check(&a, &state, &rules).unwrap_err();
        assert_eq!(err.reason, Reason::PlayerNotFound);
        assert_eq!(err.player_id, Some(9));
    }

    #[test]
    fn test_player_on_other_roster_not_found() {
        let state = small_state();
        let rules = Rules::default();
        // Player 5 exists, but only on TEAM2.
        let a = action(5, Team::Team1, MoveType::Move, (3, 1), (3, 0));
        assert_eq!(reason_of(check(&a, &state, &rules)), Reason::PlayerNotFound);
    }

    #[test]
    fn test_stale_old_position() {
        let state = small_state();
        let rules = Rules::default();
        let a = action(3, Team::Team1, MoveType::Move, (2, 1), (2, 3));
        assert_eq!(reason_of(check(&a, &state, &rules)), Reason::PositionMismatch);
    }

    #[test]
    fn test_disabled_move_type() {
        let state = small_state();
        let rules = Rules {
            allowed_moves: vec![MoveType::Move, MoveType::Pass, MoveType::Shot],
            ..Rules::default()
        };
        let a = action(6, Team::Team2, MoveType::Tackle, (3, 2), (2, 2));
        assert_eq!(reason_of(check(&a, &state, &rules)), Reason::IllegalMoveType);
    }

    #[test]
    fn test_out_of_bounds_before_range() {
        let state = small_state();
        let rules = Rules::default();
        let a = action(1, Team::Team1, MoveType::Move, (1, 1), (-5, 1));
        assert_eq!(reason_of(check(&a, &state, &rules)), Reason::OutOfBounds);
    }

    #[test]
    fn test_move_too_far_or_zero() {
        let state = small_state();
        let rules = Rules::default();
        let far = action(1, Team::Team1, MoveType::Move, (1, 1), (3, 1));
        assert_eq!(reason_of(check(&far, &state, &rules)), Reason::IllegalRange);
        let stay = action(1, Team::Team1, MoveType::Move, (1, 1), (1, 1));
        assert_eq!(reason_of(check(&stay, &state, &rules)), Reason::IllegalRange);
    }

    #[test]
    fn test_pass_must_be_straight() {
        let state = small_state();
        let rules = Rules::default();
        let bent = action(3, Team::Team1, MoveType::Pass, (2, 2), (4, 3));
        assert_eq!(reason_of(check(&bent, &state, &rules)), Reason::IllegalRange);
        let straight = action(3, Team::Team1, MoveType::Pass, (2, 2), (5, 5));
        assert!(check(&straight, &state, &rules).is_ok());
    }

    #[test]
    fn test_pass_without_ball() {
        let state = small_state();
        let rules = Rules::default();
        let a = action(1, Team::Team1, MoveType::Pass, (1, 1), (1, 4));
        let err = check(&a, &state, &rules).unwrap_err();
        assert_eq!(err.reason, Reason::BallPossessionRequired);
        assert_eq!(err.player_id, Some(1));
        assert_eq!(err.action, Some(a));
    }

    #[test]
    fn test_tackle_targets() {
        let state = small_state();
        let rules = Rules::default();

        let ok = action(6, Team::Team2, MoveType::Tackle, (3, 2), (2, 2));
        assert!(check(&ok, &state, &rules).is_ok());

        let teammate = action(1, Team::Team1, MoveType::Tackle, (1, 1), (2, 2));
        assert_eq!(reason_of(check(&teammate, &state, &rules)), Reason::TeamMismatch);

        let empty = action(6, Team::Team2, MoveType::Tackle, (3, 2), (4, 2));
        assert_eq!(reason_of(check(&empty, &state, &rules)), Reason::NoTackleTarget);

        let no_ball = action(5, Team::Team2, MoveType::Tackle, (3, 1), (2, 1));
        assert_eq!(reason_of(check(&no_ball, &state, &rules)), Reason::NoTackleTarget);
    }

    #[test]
    fn test_check_does_not_mutate() {
        let state = small_state();
        let before = state.clone();
        let rules = Rules::default();
        let a = action(1, Team::Team1, MoveType::Shot, (1, 1), (6, 1));
        let _ = check(&a, &state, &rules);
        assert_eq!(state, before);
    }

    #[test]
    fn test_manhattan_range_from_corrupt_cell() {
        let mut state = small_state();
        state.team1_player_positions[0] = PlayerPosition::new(1, Position::new(i32::MIN, i32::MIN));
        let rules = Rules {
            metric: crate::game::DistanceMetric::Manhattan,
            ..Rules::default()
        };
        let a = action(1, Team::Team1, MoveType::Move, (i32::MIN, i32::MIN), (14, 8));
        assert_eq!(reason_of(check(&a, &state, &rules)), Reason::IllegalRange);
    }

    #[test]
    fn test_manhattan_metric_rejects_diagonal_step() {
        let state = small_state();
        let rules = Rules {
            metric: crate::game::DistanceMetric::Manhattan,
            ..Rules::default()
        };
        let diag = action(1, Team::Team1, MoveType::Move, (1, 1), (2, 0));
        assert_eq!(reason_of(check(&diag, &state, &rules)), Reason::IllegalRange);
    }
}
