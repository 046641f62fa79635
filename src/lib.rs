// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Gridball: a deterministic tactical-board football engine.
//!
//! Two teams submit sealed batches of actions each turn; the engine checks
//! them against the current snapshot, resolves contested cells and tackles
//! with randomness revealed by the ledger contract, and produces the next
//! snapshot. The same pure turn function pre-flights batches before a ledger
//! transaction and reconciles turns the ledger has already confirmed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Ledger reconciliation (rayon)     │
//! ├─────────────────────────────────────┤
//! │   Game aggregate (commit/validate)  │
//! ├─────────────────────────────────────┤
//! │   Pure turn resolution + clashes    │
//! ├─────────────────────────────────────┤
//! │   Snapshot, rules, legality checks  │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod ledger;
pub mod rating;

pub use error::{Reason, RulesError, SetupError, SnapshotError, ValidationError};

// Re-export key game types at crate root for convenience
pub use game::{
    BallOwner, Game, GameAction, GameState, MoveType, Phase, PlayerId, PlayerRef, Position,
    Rules, Team,
};
pub use rating::{MatchOutcome, RatingCalculator};
