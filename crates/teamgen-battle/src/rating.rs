use std::fmt;

use serde::{Deserialize, Serialize};

/// Converts battle outcomes into ratings and ratings into win probabilities.
pub trait RatingSystem: fmt::Debug + Send + Sync {
    /// Rating after one battle against an opponent rated `opponent_rating`.
    fn update_rating(&self, rating: f64, opponent_rating: f64, won: bool) -> f64;

    /// Probability in `[0, 1]` that a team rated `rating` wins.
    fn win_probability(&self, rating: f64) -> f64;
}

/// Logistic Elo rating.
///
/// The win probability of a rating is its expected score against a
/// hypothetical opponent rated `reference_rating`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloRating {
    pub k_factor: f64,
    pub reference_rating: f64,
}

impl Default for EloRating {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            reference_rating: 1500.0,
        }
    }
}

impl EloRating {
    /// Expected score of `rating` against `opponent_rating`.
    ///
    /// ```
    /// # use teamgen_battle::EloRating;
    /// assert_eq!(EloRating::expected_score(1500.0, 1500.0), 0.5);
    /// assert!(EloRating::expected_score(1900.0, 1500.0) > 0.9);
    /// ```
    #[must_use]
    pub fn expected_score(rating: f64, opponent_rating: f64) -> f64 {
        1.0 / (1.0 + 10_f64.powf((opponent_rating - rating) / 400.0))
    }
}

impl RatingSystem for EloRating {
    fn update_rating(&self, rating: f64, opponent_rating: f64, won: bool) -> f64 {
        let score = if won { 1.0 } else { 0.0 };
        rating + self.k_factor * (score - Self::expected_score(rating, opponent_rating))
    }

    fn win_probability(&self, rating: f64) -> f64 {
        Self::expected_score(rating, self.reference_rating)
    }
}
