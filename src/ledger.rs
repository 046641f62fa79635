//! Reconciliation against ledger-confirmed turns.
//!
//! The ledger contract is the authority; the engine re-runs each confirmed
//! turn as a pure function of `(pre_state, batches, randomness)` and checks
//! that it lands on the same snapshot. Because a turn is fully determined
//! by its record, the relay may deliver a record any number of times.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::ValidationError;
use crate::game::{
    check_invariants, resolve_turn, verify_clash_results, ClashMismatch, GameAction, GameState,
    InvariantViolation, LedgerEntropy, Rules,
};

/// One confirmed turn as reported by the event relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    /// Zero-based turn index within the game.
    pub turn_index: u32,
    /// Snapshot the turn was played against.
    pub pre_state: GameState,
    /// TEAM1 sealed batch.
    pub team1_moves: Vec<GameAction>,
    /// TEAM2 sealed batch.
    pub team2_moves: Vec<GameAction>,
    /// Randomness value revealed by the ledger for this turn.
    pub randomness: u64,
    /// Snapshot the ledger confirmed.
    pub confirmed_state: GameState,
    /// Fingerprint the ledger reported for the confirmed snapshot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_fingerprint: Option<u64>,
}

/// Result of re-running one confirmed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum Verdict {
    /// The local snapshot equals the confirmed one.
    Match,
    /// The local snapshot differs from the confirmed one.
    Diverged {
        /// Wire names of the differing snapshot fields.
        fields: Vec<&'static str>,
        /// First differing clash result, if the clash sequences differ.
        clash: Option<ClashMismatch>,
    },
    /// The engine rejects a batch the ledger accepted.
    Rejected {
        /// The local rejection.
        error: ValidationError,
    },
    /// The reported pre-turn snapshot breaks board invariants, so the turn
    /// cannot be replayed.
    CorruptSnapshot {
        /// Every violated invariant.
        violations: Vec<InvariantViolation>,
    },
}

impl Verdict {
    /// Whether the turn reconciled cleanly.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Verdict::Match)
    }
}

/// Re-run a confirmed turn with the ledger's randomness and compare.
///
/// A `pre_state` that breaks snapshot invariants is reported as
/// [`Verdict::CorruptSnapshot`] and never replayed.
#[must_use]
#[instrument(skip_all, fields(turn = record.turn_index))]
pub fn reconcile(rules: &Rules, record: &TurnRecord) -> Verdict {
    let violations = check_invariants(&record.pre_state, rules);
    if !violations.is_empty() {
        warn!(violations = violations.len(), "ledger pre-state is corrupt");
        return Verdict::CorruptSnapshot { violations };
    }

    let mut entropy = LedgerEntropy::new(record.randomness);
    let local = match resolve_turn(
        &record.pre_state,
        &record.team1_moves,
        &record.team2_moves,
        rules,
        &mut entropy,
    ) {
        Ok(local) => local,
        Err(error) => {
            warn!(%error, "ledger-confirmed batch rejected locally");
            return Verdict::Rejected { error };
        }
    };

    let mut fields = differing_fields(&record.confirmed_state, &local);
    if record
        .confirmed_fingerprint
        .is_some_and(|reported| reported != local.fingerprint())
    {
        fields.push("fingerprint");
    }
    if fields.is_empty() {
        debug!(fingerprint = local.fingerprint(), "turn reconciled");
        return Verdict::Match;
    }

    let clash = verify_clash_results(
        &record.confirmed_state.clash_random_results,
        &local.clash_random_results,
    )
    .err();
    warn!(?fields, "turn diverged from ledger");
    Verdict::Diverged { fields, clash }
}

/// Reconcile independent records in parallel; verdicts keep input order.
#[must_use]
pub fn reconcile_all(rules: &Rules, records: &[TurnRecord]) -> Vec<Verdict> {
    reconcile_all_with(rules, records, |_| {})
}

/// [`reconcile_all`] with a callback run after each record, for progress
/// reporting. The callback may run on any worker thread.
#[must_use]
pub fn reconcile_all_with<F>(rules: &Rules, records: &[TurnRecord], on_done: F) -> Vec<Verdict>
where
    F: Fn(&Verdict) + Sync,
{
    records
        .par_iter()
        .map(|record| {
            let verdict = reconcile(rules, record);
            on_done(&verdict);
            verdict
        })
        .collect()
}

fn differing_fields(expected: &GameState, actual: &GameState) -> Vec<&'static str> {
    let mut fields = Vec::new();
    let mut compare = |name: &'static str, same: bool| {
        if !same {
            fields.push(name);
        }
    };
    compare(
        "team1PlayerPositions",
        expected.team1_player_positions == actual.team1_player_positions,
    );
    compare(
        "team2PlayerPositions",
        expected.team2_player_positions == actual.team2_player_positions,
    );
    compare("ballPosition", expected.ball_position == actual.ball_position);
    compare("ballOwner", expected.ball_owner == actual.ball_owner);
    compare(
        "team1Moves",
        expected.applied_team1_moves == actual.applied_team1_moves,
    );
    compare(
        "team2Moves",
        expected.applied_team2_moves == actual.applied_team2_moves,
    );
    compare("stateTag", expected.state_tag == actual.state_tag);
    compare(
        "clashRandomResults",
        expected.clash_random_results == actual.clash_random_results,
    );
    compare("turn", expected.turn == actual.turn);
    compare("score", expected.score == actual.score);
    fields
}

/// Errors from storing or loading a turn log.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A different record is already stored for this turn.
    #[error("conflicting record for turn {turn}")]
    Conflict {
        /// Turn index.
        turn: u32,
    },
    /// Turn indices are not consecutive.
    #[error("turn log jumps from turn {previous} to turn {next}")]
    Gap {
        /// Last index before the gap.
        previous: u32,
        /// First index after the gap.
        next: u32,
    },
    /// A record's pre-state is not the previous confirmed state.
    #[error("turn {turn} does not start from the previous confirmed snapshot")]
    BrokenChain {
        /// Turn index.
        turn: u32,
    },
    /// A log line is not a valid record.
    #[error("line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },
    /// Reading or writing the log failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Confirmed turns of one game, keyed by turn index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnLog {
    records: BTreeMap<u32, TurnRecord>,
}

impl TurnLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record.
    ///
    /// Returns `true` if it was new and `false` if an identical record was
    /// already present.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Conflict`] if a different record holds the same index.
    pub fn insert(&mut self, record: TurnRecord) -> Result<bool, LedgerError> {
        let turn = record.turn_index;
        match self.records.get(&turn) {
            Some(existing) if *existing == record => {
                debug!(turn, "duplicate record ignored");
                Ok(false)
            }
            Some(_) => Err(LedgerError::Conflict { turn }),
            None => {
                self.records.insert(turn, record);
                Ok(true)
            }
        }
    }

    /// Record for a turn.
    #[must_use]
    pub fn get(&self, turn: u32) -> Option<&TurnRecord> {
        self.records.get(&turn)
    }

    /// Number of stored turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no turns are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in turn order.
    pub fn iter(&self) -> impl Iterator<Item = &TurnRecord> {
        self.records.values()
    }

    /// Records in turn order, as an owned list for parallel reconciliation.
    #[must_use]
    pub fn to_vec(&self) -> Vec<TurnRecord> {
        self.records.values().cloned().collect()
    }

    /// Check that turns are consecutive and each starts from the previous
    /// confirmed snapshot.
    ///
    /// # Errors
    ///
    /// The first gap or broken link.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        let records: Vec<&TurnRecord> = self.records.values().collect();
        for pair in records.windows(2) {
            let (previous, next) = (pair[0], pair[1]);
            if previous.turn_index.checked_add(1) != Some(next.turn_index) {
                return Err(LedgerError::Gap {
                    previous: previous.turn_index,
                    next: next.turn_index,
                });
            }
            if next.pre_state != previous.confirmed_state {
                return Err(LedgerError::BrokenChain {
                    turn: next.turn_index,
                });
            }
        }
        Ok(())
    }

    /// Read a JSON Lines log. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// I/O failures, malformed lines, or conflicting records.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, LedgerError> {
        let mut log = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TurnRecord =
                serde_json::from_str(&line).map_err(|e| LedgerError::Parse {
                    line: index + 1,
                    message: e.to_string(),
                })?;
            log.insert(record)?;
        }
        Ok(log)
    }

    /// Write the log as JSON Lines, in turn order.
    ///
    /// # Errors
    ///
    /// I/O or serialization failures.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), LedgerError> {
        for record in self.records.values() {
            serde_json::to_writer(&mut writer, record).map_err(io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load a JSON Lines log from disk.
    ///
    /// # Errors
    ///
    /// See [`read_from`](Self::read_from).
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        Self::read_from(BufReader::new(File::open(path)?))
    }

    /// Save the log to disk as JSON Lines.
    ///
    /// # Errors
    ///
    /// See [`write_to`](Self::write_to).
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        self.write_to(BufWriter::new(File::create(path)?))
    }
}
