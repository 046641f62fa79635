//! Clash resolution.
//!
//! A clash is a cell claimed by two or more movers, or a ball holder
//! challenged by one or more tacklers. Each clash consumes exactly one draw
//! from an injected [`Randomness`] source; the engine never generates its own
//! entropy, so a ledger-revealed value reproduces the ledger's outcome.

// Draw values are reduced modulo small contender counts before indexing.
#![allow(clippy::cast_possible_truncation)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::game::rules::BPS_DENOMINATOR;
use crate::game::{PlayerRef, Position};

/// Source of clash draws.
pub trait Randomness {
    /// Next 64-bit draw.
    fn next_draw(&mut self) -> u64;
}

impl<R: Randomness + ?Sized> Randomness for &mut R {
    fn next_draw(&mut self) -> u64 {
        (**self).next_draw()
    }
}

/// Deterministic xorshift64 stream from a fixed seed, for tests and
/// offline simulation.
#[derive(Debug, Clone, Copy)]
pub struct SeededStream {
    state: u64,
}

impl SeededStream {
    /// Create a stream from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        // xorshift has a fixed point at zero
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }
}

impl Randomness for SeededStream {
    fn next_draw(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Draws derived from a single ledger-revealed randomness value.
///
/// Draw `i` is `mix(value + i)`, so both sides only need the revealed
/// value and the contest order to agree on every outcome.
#[derive(Debug, Clone, Copy)]
pub struct LedgerEntropy {
    value: u64,
    index: u64,
}

impl LedgerEntropy {
    /// Create a draw sequence from a revealed value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self { value, index: 0 }
    }

    /// Draw at a given index without advancing.
    #[must_use]
    pub const fn draw_at(&self, index: u64) -> u64 {
        mix(self.value, index)
    }
}

impl Randomness for LedgerEntropy {
    fn next_draw(&mut self) -> u64 {
        let draw = mix(self.value, self.index);
        self.index = self.index.wrapping_add(1);
        draw
    }
}

/// Finalizer from `MurmurHash3`, applied to `seed + index`.
const fn mix(seed: u64, index: u64) -> u64 {
    let mut x = seed.wrapping_add(index);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// What a clash is about.
///
/// Declaration order is the tie-break when two clashes share a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClashKind {
    /// Tacklers challenge the ball holder.
    Possession,
    /// Several movers claim the same cell.
    Destination,
}

/// A clash awaiting a draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    /// Contested cell (the holder's cell for possession).
    pub cell: Position,
    /// What is contested.
    pub kind: ClashKind,
    /// Participants. Destination: TEAM1 ascending then TEAM2 ascending.
    /// Possession: the holder first, then tacklers ascending.
    pub contenders: Vec<PlayerRef>,
}

/// A resolved clash as recorded in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClashResult {
    /// Contested cell.
    pub cell: Position,
    /// What was contested.
    pub kind: ClashKind,
    /// Participants in draw order.
    pub contenders: Vec<PlayerRef>,
    /// Raw draw consumed.
    pub draw: u64,
    /// Winning participant.
    pub winner: PlayerRef,
}

/// Settles contests against a randomness source.
#[derive(Debug, Clone, Copy)]
pub struct ClashResolver {
    tackle_success_bps: u32,
}

impl ClashResolver {
    /// Create a resolver with the given tackle odds in basis points.
    #[must_use]
    pub const fn new(tackle_success_bps: u32) -> Self {
        Self { tackle_success_bps }
    }

    /// Resolve all contests of a turn.
    ///
    /// Contests are sorted row-major by cell (possession before destination
    /// on the same cell) and each consumes exactly one draw in that order.
    /// Contests with fewer than two participants are dropped without a draw.
    pub fn resolve<R: Randomness>(&self, mut contests: Vec<Contest>, rng: &mut R) -> Vec<ClashResult> {
        contests.retain(|c| c.contenders.len() >= 2);
        contests.sort_by_key(|c| (c.cell.row_major(), c.kind));

        contests
            .into_iter()
            .map(|contest| {
                let draw = rng.next_draw();
                let winner = self.pick_winner(&contest, draw);
                debug!(
                    cell = %contest.cell,
                    kind = ?contest.kind,
                    contenders = contest.contenders.len(),
                    draw,
                    %winner,
                    "clash resolved"
                );
                ClashResult {
                    cell: contest.cell,
                    kind: contest.kind,
                    contenders: contest.contenders,
                    draw,
                    winner,
                }
            })
            .collect()
    }

    /// Winner of a single contest for a given draw.
    #[must_use]
    pub fn pick_winner(&self, contest: &Contest, draw: u64) -> PlayerRef {
        let contenders = &contest.contenders;
        match contest.kind {
            ClashKind::Destination => contenders[(draw % contenders.len() as u64) as usize],
            ClashKind::Possession => {
                let roll = draw % u64::from(BPS_DENOMINATOR);
                let tacklers = &contenders[1..];
                if roll >= u64::from(self.tackle_success_bps) || tacklers.is_empty() {
                    contenders[0]
                } else {
                    let pick = (draw / u64::from(BPS_DENOMINATOR)) % tacklers.len() as u64;
                    tacklers[pick as usize]
                }
            }
        }
    }
}

/// Disagreement between ledger-emitted and locally computed clash results.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("clash result {index} differs: ledger {expected:?}, local {actual:?}")]
pub struct ClashMismatch {
    /// Position in the ordered clash sequence.
    pub index: usize,
    /// Ledger entry, absent if the ledger recorded fewer clashes.
    pub expected: Option<ClashResult>,
    /// Local entry, absent if fewer clashes were computed.
    pub actual: Option<ClashResult>,
}

/// Check ledger-emitted clash results against locally computed ones.
///
/// # Errors
///
/// Returns the first position where the sequences differ.
pub fn verify_clash_results(
    expected: &[ClashResult],
    actual: &[ClashResult],
) -> Result<(), ClashMismatch> {
    let len = expected.len().max(actual.len());
    for index in 0..len {
        let e = expected.get(index);
        let a = actual.get(index);
        if e != a {
            return Err(ClashMismatch {
                index,
                expected: e.cloned(),
                actual: a.cloned(),
            });
        }
    }
    Ok(())
}
