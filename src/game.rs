//! Board engine.
//!
//! Implements the tactical football rules:
//! - Board geometry, rosters and the ball
//! - Single-action legality checks
//! - Clash resolution against injected randomness
//! - Pure turn resolution over immutable snapshots
//! - The accumulate → commit → validate game aggregate

mod action;
mod clash;
mod invariants;
mod movement;
mod orchestrator;
mod position;
mod rules;
mod state;
mod team;
mod turn;

pub use action::{GameAction, MoveType};
pub use clash::{
    verify_clash_results, ClashKind, ClashMismatch, ClashResolver, ClashResult, Contest,
    LedgerEntropy, Randomness, SeededStream,
};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use movement::{check, check_local};
pub use orchestrator::{Game, Phase};
pub use position::{DistanceMetric, Position};
pub use rules::{Rules, BPS_DENOMINATOR};
pub use state::{GameState, Score, StateTag};
pub use team::{BallOwner, PlayerId, PlayerPosition, PlayerRef, Team};
pub use turn::{check_batch, evaluation_order, resolve_turn};
