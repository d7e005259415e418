//! Static metagame tables for team optimization.
//!
//! This crate holds everything the optimizer treats as fixed input for a run:
//!
//! - [`Moveset`] - a concrete build of a species, the unit a team is made of
//! - [`GameData`] - moveset table, usage weights, the counters relation,
//!   per-position core candidate pools, per-member mutation alternatives and
//!   the rated opponent teams ([`Norm`])
//! - [`schema`] - the JSON file format the tables are loaded from
//!
//! All tables are resolved to dense ids at load time and never change
//! afterwards, so a single [`GameData`] can be shared across threads.

pub use self::{game_data::*, moveset::*};

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
mod game_data;
mod moveset;
pub mod schema;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DataError {
    #[display("failed to parse game data: {_0}")]
    #[from]
    Json(serde_json::Error),
    #[display("duplicate moveset name `{name}`")]
    DuplicateMoveset { name: String },
    #[display("unknown moveset `{name}` referenced from {context}")]
    UnknownMoveset { name: String, context: String },
    #[display("moveset `{name}` has invalid usage {usage}")]
    InvalidUsage { name: String, usage: f64 },
    #[display("core pool {position} has no candidates")]
    EmptyCorePool { position: usize },
    #[display("norm `{name}` has no members")]
    EmptyNorm { name: String },
    #[display("norm `{name}` has invalid rating {rating}")]
    InvalidRating { name: String, rating: f64 },
    #[display("too many movesets")]
    TooManyMovesets,
    #[display("no moveset has positive usage")]
    NoUsage,
}
