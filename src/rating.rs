//! Post-game ELO rating update.
//!
//! All arithmetic is integer fixed point with nine decimal places so that
//! every implementation of the rule lands on the same rating. The power
//! `10^(d/400)` is built from a table of `10^(2^k/400)` factors, one per bit
//! of `d`, each product rounded half-up back to the scale.

use serde::{Deserialize, Serialize};

use crate::game::{Score, Team};

/// Rating step per game.
pub const K_FACTOR: i64 = 32;

/// Largest rating difference fed into the expected-score curve.
pub const MAX_ELO_DIFFERENCE: i64 = 400;

/// Rating of a team with no history.
pub const DEFAULT_RATING: u32 = 100;

/// Fixed-point scale: `SCALE` represents 1.0.
pub const SCALE: u128 = 1_000_000_000;

/// `10^(2^k / 400)` scaled by [`SCALE`], for `k` in `0..=8`.
const POW10_BITS: [u128; 9] = [
    1_005_773_063,
    1_011_579_454,
    1_023_292_992,
    1_047_128_548,
    1_096_478_196,
    1_202_264_435,
    1_445_439_771,
    2_089_296_131,
    4_365_158_322,
];

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOutcome {
    /// TEAM1 scored more goals.
    Team1Win,
    /// TEAM2 scored more goals.
    Team2Win,
    /// Level score.
    Draw,
}

impl MatchOutcome {
    /// Outcome implied by a final score.
    #[must_use]
    pub const fn from_score(score: Score) -> Self {
        if score.team1 > score.team2 {
            MatchOutcome::Team1Win
        } else if score.team2 > score.team1 {
            MatchOutcome::Team2Win
        } else {
            MatchOutcome::Draw
        }
    }

    /// Result of the game from one team's point of view.
    #[must_use]
    pub const fn result_for(self, team: Team) -> GameResult {
        match (self, team) {
            (MatchOutcome::Draw, _) => GameResult::Draw,
            (MatchOutcome::Team1Win, Team::Team1) | (MatchOutcome::Team2Win, Team::Team2) => {
                GameResult::Win
            }
            _ => GameResult::Loss,
        }
    }
}

/// Result of a game for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// Actual score 1.
    Win,
    /// Actual score 1/2.
    Draw,
    /// Actual score 0.
    Loss,
}

impl GameResult {
    /// Actual score scaled by [`SCALE`].
    #[must_use]
    pub const fn actual(self) -> u128 {
        match self {
            GameResult::Win => SCALE,
            GameResult::Draw => SCALE / 2,
            GameResult::Loss => 0,
        }
    }
}

/// Fixed-point ELO calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingCalculator {
    k_factor: i64,
    max_difference: i64,
}

impl Default for RatingCalculator {
    fn default() -> Self {
        Self {
            k_factor: K_FACTOR,
            max_difference: MAX_ELO_DIFFERENCE,
        }
    }
}

impl RatingCalculator {
    /// Calculator with the standard parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expected score of `rating` against `opponent`, scaled by [`SCALE`].
    #[must_use]
    pub fn expected_score(&self, rating: u32, opponent: u32) -> u128 {
        let diff = (i64::from(opponent) - i64::from(rating))
            .clamp(-self.max_difference, self.max_difference);
        let power = pow10_over_400(diff.unsigned_abs());
        let denominator = SCALE + power;
        let numerator = if diff >= 0 { SCALE * SCALE } else { SCALE * power };
        (numerator + denominator / 2) / denominator
    }

    /// New rating after a game, floored at zero.
    #[must_use]
    pub fn new_rating(&self, rating: u32, opponent: u32, result: GameResult) -> u32 {
        let expected = self.expected_score(rating, opponent);
        let gap = to_signed(result.actual()) - to_signed(expected);
        let delta = round_scaled(i128::from(self.k_factor) * gap);
        let updated = (i64::from(rating) + delta).max(0);
        u32::try_from(updated).unwrap_or(u32::MAX)
    }

    /// Update both teams from their pre-game ratings.
    ///
    /// Returns `(team1, team2)`.
    #[must_use]
    pub fn apply(&self, team1: u32, team2: u32, outcome: MatchOutcome) -> (u32, u32) {
        (
            self.new_rating(team1, team2, outcome.result_for(Team::Team1)),
            self.new_rating(team2, team1, outcome.result_for(Team::Team2)),
        )
    }
}

/// `10^(n/400)` scaled by [`SCALE`], for `n <= 511`.
fn pow10_over_400(n: u64) -> u128 {
    let mut acc = SCALE;
    for (bit, factor) in POW10_BITS.iter().enumerate() {
        if n & (1 << bit) != 0 {
            acc = (acc * factor + SCALE / 2) / SCALE;
        }
    }
    acc
}

// Scaled scores never exceed `SCALE * SCALE`.
fn to_signed(value: u128) -> i128 {
    i128::try_from(value).unwrap_or(i128::MAX)
}

/// Divide a scaled value by [`SCALE`], rounding half away from zero.
fn round_scaled(value: i128) -> i64 {
    let scale = to_signed(SCALE);
    let half = scale / 2;
    let rounded = if value >= 0 {
        (value + half) / scale
    } else {
        (value - half) / scale
    };
    i64::try_from(rounded).unwrap_or(if value >= 0 { i64::MAX } else { i64::MIN })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_table_endpoints() {
        assert_eq!(pow10_over_400(0), SCALE);
        assert_eq!(pow10_over_400(400), 10 * SCALE);
    }

    #[test]
    fn test_expected_scores() {
        let calc = RatingCalculator::new();
        assert_eq!(calc.expected_score(100, 100), SCALE / 2);
        assert_eq!(calc.expected_score(100, 600), 90_909_091);
        assert_eq!(calc.expected_score(1200, 1000), 759_746_927);
    }

    #[test]
    fn test_equal_ratings_symmetric() {
        let calc = RatingCalculator::new();
        assert_eq!(
            calc.apply(DEFAULT_RATING, DEFAULT_RATING, MatchOutcome::Team1Win),
            (116, 84)
        );
        assert_eq!(
            calc.apply(DEFAULT_RATING, DEFAULT_RATING, MatchOutcome::Team2Win),
            (84, 116)
        );
        assert_eq!(calc.apply(100, 100, MatchOutcome::Draw), (100, 100));
    }

    #[test]
    fn test_difference_clamped() {
        let calc = RatingCalculator::new();
        // 500 and 1900 points apart both use the 400 cap.
        assert_eq!(calc.new_rating(100, 600, GameResult::Win), 129);
        assert_eq!(calc.new_rating(100, 2000, GameResult::Win), 129);
        assert_eq!(calc.new_rating(100, 600, GameResult::Loss), 97);
        assert_eq!(calc.new_rating(600, 100, GameResult::Win), 603);
        assert_eq!(calc.new_rating(600, 100, GameResult::Loss), 571);
        assert_eq!(calc.new_rating(2000, 100, GameResult::Loss), 1971);
    }

    #[test]
    fn test_uneven_ratings() {
        let calc = RatingCalculator::new();
        assert_eq!(calc.apply(1200, 1000, MatchOutcome::Team1Win), (1208, 992));
        assert_eq!(calc.apply(1200, 1000, MatchOutcome::Draw), (1192, 1008));
    }

    #[test]
    fn test_floor_at_zero() {
        let calc = RatingCalculator::new();
        assert_eq!(calc.new_rating(5, 400, GameResult::Loss), 2);
        assert_eq!(calc.new_rating(10, 10, GameResult::Loss), 0);
        assert_eq!(calc.new_rating(0, 0, GameResult::Loss), 0);
    }

    #[test]
    fn test_outcome_from_score() {
        let score = Score { team1: 2, team2: 1 };
        assert_eq!(MatchOutcome::from_score(score), MatchOutcome::Team1Win);
        assert_eq!(
            MatchOutcome::from_score(Score::default()),
            MatchOutcome::Draw
        );
        assert_eq!(
            MatchOutcome::Team2Win.result_for(Team::Team1),
            GameResult::Loss
        );
    }
}
