//! Genetic representation of a team and the state it carries into a battle.
//!
//! A [`Team`] is built from two gene groups:
//!
//! - [`Core`] - fixed-size, position-sensitive genes drawn from per-position
//!   candidate pools (single-point crossover, per-gene pool mutation)
//! - [`Suggestion`] - filler genes treated as a set (intersection-preserving
//!   crossover, per-member mutation followed by a shuffle)
//!
//! Both implement [`GeneGroup`], whose `reproduce` retries crossover and
//! mutation until the offspring is structurally valid or a shared
//! [`Deadline`] passes. [`Team::reproduce`] owns that deadline and turns its
//! expiry into a fatal [`ReproductionError::Timeout`].
//!
//! # Validity
//!
//! A team is valid when it has [`TEAM_SIZE`] members whose base species are
//! pairwise distinct, at most one of which is a Mega form, and none of which
//! belongs to a banned species.

use std::time::Duration;

pub use self::{core_genes::*, gene_group::*, suggestion::*, team::*};

mod core_genes;
mod gene_group;
mod suggestion;
mod team;

pub use teamgen_data::DataError;

/// Number of members in a complete team.
pub const TEAM_SIZE: usize = 6;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("no valid offspring after {attempts} attempts")]
pub struct DeadlineExceeded {
    pub attempts: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From, derive_more::IsVariant)]
pub enum ReproductionError {
    #[display(
        "reproduction took longer than {elapsed:?}\n  parent 1: {first_parent}\n  parent 2: {second_parent}\n  last attempt: {}",
        last_attempt.as_deref().unwrap_or("<none>")
    )]
    Timeout {
        elapsed: Duration,
        first_parent: String,
        second_parent: String,
        last_attempt: Option<String>,
    },
    #[display("no valid random team found within {elapsed:?}")]
    GenerationTimeout { elapsed: Duration },
    #[from]
    Data(DataError),
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum BattleError {
    #[display("invalid damage amount {amount}")]
    InvalidDamage { amount: f64 },
    #[display("no active member")]
    NoActiveMember,
    #[display("no living members to switch in")]
    NoLivingMembers,
}
