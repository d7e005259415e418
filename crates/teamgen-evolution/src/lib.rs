//! Genetic optimization of team compositions.
//!
//! This crate drives the search: it owns the population, scores every team
//! with a Monte-Carlo fitness oracle and breeds the next generation.
//!
//! # Algorithm Overview
//!
//! 1. **Initialize** - Build `population_size` random valid teams
//! 2. **Sample Opponents** - Draw `matches` rated norms, with replacement
//! 3. **Evaluate Fitness** - Each team battles every sampled norm in turn,
//!    updating a rating that starts at `starting_elo`; fitness is the win
//!    probability of the final rating
//! 4. **Elite Selection** - The `elite_count` fittest teams are copied unchanged
//! 5. **Reproduction** - The rest of the next generation are offspring of two
//!    parents drawn with probability proportional to fitness
//! 6. **Repeat** for `num_generations`, then run a final evaluation
//!
//! # Key Components
//!
//! - [`EvolutionParams`] - run parameters, loadable from JSON
//! - [`Population`] / [`FitnessMap`] - a generation and its fitness
//! - [`Evolution`] - the engine itself
//!
//! # Failure Modes
//!
//! A reproduction that cannot find a valid offspring within the timeout
//! aborts the run with [`EvolutionError::Reproduction`]; it usually means
//! the gene pools cannot satisfy the team rules. A failed battle aborts the
//! evaluation of the whole generation.
//!
//! # Example
//!
//! ```rust,no_run
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//! use teamgen_battle::{DuelBattleEngine, EloRating};
//! use teamgen_data::GameData;
//! use teamgen_evolution::{Evolution, EvolutionParams};
//!
//! # fn run(data: GameData) -> Result<(), teamgen_evolution::EvolutionError> {
//! let engine = DuelBattleEngine::default();
//! let elo = EloRating::default();
//! let evolution = Evolution::new(&data, &engine, &elo, EvolutionParams::default())?;
//! let outcome = evolution.run(&mut Pcg64::seed_from_u64(0))?;
//! for (team, fitness) in outcome.best(10) {
//!     println!("{team} => {fitness:.3}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Current Limitations
//!
//! - **Single-trial final evaluation**: `final_trials` is recorded but only
//!   one trial per team is run
//! - **Fitness-proportionate selection only**: no tournament or rank
//!   selection
//! - **One thread per team**: fitness evaluation spawns a scoped thread for
//!   every team of the population

use teamgen_team::{BattleError, ReproductionError};

pub use self::{evolution::*, params::*, population::*};

mod evolution;
mod params;
mod population;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolutionError {
    #[display("invalid parameters: {_0}")]
    Params(ParamsError),
    #[display("reproduction failed: {_0}")]
    Reproduction(ReproductionError),
    #[display("battle failed: {_0}")]
    Battle(BattleError),
    #[display("game data has no rated opponents")]
    #[from(skip)]
    NoNorms,
}
