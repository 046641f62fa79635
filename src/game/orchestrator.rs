//! The `Game` aggregate: current snapshot plus per-team pending batches.
//!
//! A turn runs accumulate → commit → validate. Nothing touches the snapshot
//! until [`Game::validate_moves`] succeeds, at which point the resolved
//! snapshot replaces it wholesale.

use tracing::{debug, info, instrument, warn};

use crate::error::{Reason, SetupError, SnapshotError, ValidationError};
use crate::game::clash::Randomness;
use crate::game::invariants::{assert_invariants, check_invariants};
use crate::game::movement::check_local;
use crate::game::turn::{check_batch, resolve_turn};
use crate::game::{GameAction, GameState, MoveType, PlayerRef, Position, Rules, Team};
use crate::rating::{MatchOutcome, RatingCalculator};

/// Where the current turn stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Both teams may still add actions.
    Accumulating,
    /// TEAM1 has sealed its batch.
    Team1Committed,
    /// TEAM2 has sealed its batch.
    Team2Committed,
    /// Both batches sealed; ready to validate.
    BothCommitted,
    /// The game is over.
    Finished,
}

/// One game: rules, authoritative snapshot, and the turn in progress.
#[derive(Debug, Clone)]
pub struct Game {
    rules: Rules,
    state: GameState,
    pending: [Vec<GameAction>; 2],
    committed: [bool; 2],
}

impl Game {
    /// Start a game from the kickoff formation.
    ///
    /// # Errors
    ///
    /// Returns the rules' first inconsistency.
    pub fn new(rules: Rules) -> Result<Self, SetupError> {
        rules.validate()?;
        let state = GameState::kickoff(&rules);
        Ok(Self::with_state(rules, state))
    }

    /// Resume a game from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the rules are inconsistent or the snapshot breaks invariants.
    pub fn from_state(rules: Rules, state: GameState) -> Result<Self, SetupError> {
        rules.validate()?;
        let violations = check_invariants(&state, &rules);
        if !violations.is_empty() {
            return Err(SnapshotError(violations).into());
        }
        Ok(Self::with_state(rules, state))
    }

    fn with_state(rules: Rules, state: GameState) -> Self {
        Self {
            rules,
            state,
            pending: [Vec::new(), Vec::new()],
            committed: [false, false],
        }
    }

    /// Rules in force.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Authoritative snapshot.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Actions accumulated so far by one team this turn.
    #[must_use]
    pub fn pending(&self, team: Team) -> &[GameAction] {
        &self.pending[team.index()]
    }

    /// Whether a team has sealed its batch this turn.
    #[must_use]
    pub const fn is_committed(&self, team: Team) -> bool {
        self.committed[team.index()]
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.state.is_finished() {
            return Phase::Finished;
        }
        match self.committed {
            [false, false] => Phase::Accumulating,
            [true, false] => Phase::Team1Committed,
            [false, true] => Phase::Team2Committed,
            [true, true] => Phase::BothCommitted,
        }
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Queue one action for the player's team.
    ///
    /// Only checks that need no snapshot run here; everything else waits
    /// for [`validate_moves`](Self::validate_moves).
    ///
    /// # Errors
    ///
    /// `GameFinished`, `AlreadyCommitted`, `IllegalMoveType` or `OutOfBounds`.
    pub fn do_player_move(
        &mut self,
        player: PlayerRef,
        move_type: MoveType,
        old_position: Position,
        new_position: Position,
    ) -> Result<(), ValidationError> {
        let action = GameAction::new(
            player.player_id,
            player.team,
            move_type,
            old_position,
            new_position,
        );
        if self.is_finished() {
            return Err(ValidationError::for_action(&action, Reason::GameFinished));
        }
        if self.is_committed(player.team) {
            return Err(ValidationError::for_action(&action, Reason::AlreadyCommitted));
        }
        check_local(&action, &self.rules)?;

        debug!(%action, "action queued");
        self.pending[player.team.index()].push(action);
        Ok(())
    }

    /// Seal a team's batch for this turn.
    ///
    /// # Errors
    ///
    /// `GameFinished`, `AlreadyCommitted`, or `EmptyBatch`.
    pub fn commit_move(&mut self, team: Team) -> Result<(), ValidationError> {
        if self.is_finished() {
            return Err(ValidationError::for_team(team, Reason::GameFinished));
        }
        if self.is_committed(team) {
            return Err(ValidationError::for_team(team, Reason::AlreadyCommitted));
        }
        if self.pending(team).is_empty() {
            return Err(ValidationError::for_team(team, Reason::EmptyBatch));
        }

        self.committed[team.index()] = true;
        info!(%team, actions = self.pending(team).len(), phase = ?self.phase(), "batch committed");
        Ok(())
    }

    /// Copy of the authoritative snapshot.
    #[must_use]
    pub fn save_state(&self) -> GameState {
        self.state.clone()
    }

    /// Replace the authoritative snapshot and drop the turn in progress.
    ///
    /// # Errors
    ///
    /// Returns the violations if the snapshot breaks invariants under the
    /// game's rules; the current snapshot and pending batches are kept.
    pub fn restore_state(&mut self, snapshot: GameState) -> Result<(), SnapshotError> {
        let violations = check_invariants(&snapshot, &self.rules);
        if !violations.is_empty() {
            warn!(violations = violations.len(), "restore rejected");
            return Err(SnapshotError(violations));
        }
        self.state = snapshot;
        self.clear_pending();
        Ok(())
    }

    /// Resolve the sealed batches against the current snapshot.
    ///
    /// On success the new snapshot becomes authoritative and is returned.
    /// On rejection the snapshot is untouched and both batches are dropped so
    /// corrected ones can be submitted.
    ///
    /// # Errors
    ///
    /// `GameFinished`, `BatchNotCommitted` naming the first uncommitted team,
    /// or the first illegal action in evaluation order.
    #[instrument(skip(self, rng), fields(turn = self.state.turn))]
    pub fn validate_moves<R: Randomness>(
        &mut self,
        mut rng: R,
    ) -> Result<&GameState, ValidationError> {
        if self.is_finished() {
            return Err(ValidationError::for_team(Team::Team1, Reason::GameFinished));
        }
        if let Some(team) = Team::ALL.into_iter().find(|t| !self.is_committed(*t)) {
            return Err(ValidationError::for_team(team, Reason::BatchNotCommitted));
        }

        let outcome = resolve_turn(
            &self.state,
            &self.pending[Team::Team1.index()],
            &self.pending[Team::Team2.index()],
            &self.rules,
            &mut rng,
        );
        self.clear_pending();

        match outcome {
            Ok(next) => {
                assert_invariants(&next, &self.rules);
                self.state = next;
                info!(
                    turn = self.state.turn,
                    tag = ?self.state.state_tag,
                    clashes = self.state.clash_random_results.len(),
                    "turn validated"
                );
                Ok(&self.state)
            }
            Err(err) => {
                warn!(%err, "batch rejected");
                Err(err)
            }
        }
    }

    /// Check one team's batch against the current snapshot without queuing
    /// it.
    ///
    /// # Errors
    ///
    /// `GameFinished` or the first illegal action of the batch.
    pub fn preflight(&self, team: Team, batch: &[GameAction]) -> Result<(), ValidationError> {
        if self.is_finished() {
            return Err(ValidationError::for_team(team, Reason::GameFinished));
        }
        if batch.is_empty() {
            return Err(ValidationError::for_team(team, Reason::EmptyBatch));
        }
        check_batch(team, batch, &self.state, &self.rules)
    }

    /// Final result, once the game is over.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.is_finished()
            .then(|| MatchOutcome::from_score(self.state.score))
    }

    /// New `(team1, team2)` ratings from the pre-game ones, once the game is
    /// over.
    #[must_use]
    pub fn apply_ratings(&self, team1: u32, team2: u32) -> Option<(u32, u32)> {
        let outcome = self.outcome()?;
        Some(RatingCalculator::new().apply(team1, team2, outcome))
    }

    fn clear_pending(&mut self) {
        for batch in &mut self.pending {
            batch.clear();
        }
        self.committed = [false, false];
    }
}
