use std::{fmt, sync::Arc};

use rand::{Rng, seq::IndexedRandom as _};
use teamgen_data::Member;

use crate::{GeneGroup, ReproductionContext, gene_group::fmt_members};

/// Mandatory team members, one per core position.
///
/// Position matters: crossover keeps genes in place and mutation draws a
/// replacement from the candidate pool of the gene's own position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Core {
    members: Vec<Member>,
}

impl Core {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Single-point crossover at `point`: `first[..point]` followed by `second[point..]`.
    #[must_use]
    pub fn crossover_at(first: &Self, second: &Self, point: usize) -> Self {
        let len = first.len();
        let point = point.min(len);
        let members = first.members[..point]
            .iter()
            .chain(second.members.iter().skip(point).take(len - point))
            .cloned()
            .collect();
        Self { members }
    }
}

impl GeneGroup for Core {
    fn from_members(members: Vec<Member>) -> Self {
        Self { members }
    }

    fn members(&self) -> &[Member] {
        &self.members
    }

    fn crossover<R>(first: &Self, second: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let len = first.len();
        let point = if len > 0 { rng.random_range(0..len) } else { 0 };
        Self::crossover_at(first, second, point)
    }

    fn mutate<R>(&mut self, ctx: &ReproductionContext<'_>, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for (position, gene) in self.members.iter_mut().enumerate() {
            if !rng.random_bool(ctx.mutation_prob) {
                continue;
            }
            if let Some(candidate) = ctx.data.core_pool(position).choose(rng) {
                *gene = Arc::clone(candidate);
            }
        }
    }
}

impl fmt::Display for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_members(&self.members, f)
    }
}
