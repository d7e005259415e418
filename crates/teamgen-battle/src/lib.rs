//! Fitness oracle collaborators: battles and ratings.
//!
//! The optimizer scores a team by battling it against rated opponents and
//! folding the outcomes into a rating. Both halves are traits so the
//! optimizer can be driven by any battle simulator or rating formula:
//!
//! - [`BattleEngine`] decides the winner of one battle between two teams,
//!   driving each team's battle state (`switch`, `damage_current`, ...)
//! - [`RatingSystem`] updates a rating after a battle and converts a final
//!   rating into a win probability
//!
//! Reference implementations are provided for running the optimizer end to
//! end: [`DuelBattleEngine`], a counter-driven one-on-one damage race, and
//! [`EloRating`], the classic logistic Elo model.
//!
//! # Usage
//!
//! ```rust,no_run
//! use teamgen_battle::{DuelBattleEngine, EloRating, RatingSystem as _};
//!
//! let _engine = DuelBattleEngine::default();
//! let elo = EloRating::default();
//! let rating = elo.update_rating(1000.0, 1200.0, true);
//! assert!(rating > 1000.0);
//! ```

pub use self::{battle_engine::*, rating::*};

mod battle_engine;
mod rating;
