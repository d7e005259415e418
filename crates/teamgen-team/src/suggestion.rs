use std::{collections::BTreeSet, fmt};

use rand::{
    Rng,
    seq::{IndexedRandom as _, SliceRandom as _},
};
use teamgen_data::{Member, MovesetId};

use crate::{GeneGroup, ReproductionContext, gene_group::fmt_members};

/// Optional filler members, treated as a set during crossover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    members: Vec<Member>,
}

impl Suggestion {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members present in both parents, in `first`'s order.
    #[must_use]
    pub fn intersection(first: &Self, second: &Self) -> Vec<Member> {
        let in_second = ids(&second.members);
        let mut seen = BTreeSet::new();
        first
            .members
            .iter()
            .filter(|m| in_second.contains(&m.id()) && seen.insert(m.id()))
            .cloned()
            .collect()
    }
}

fn ids(members: &[Member]) -> BTreeSet<MovesetId> {
    members.iter().map(|m| m.id()).collect()
}

impl GeneGroup for Suggestion {
    fn from_members(members: Vec<Member>) -> Self {
        Self { members }
    }

    fn members(&self) -> &[Member] {
        &self.members
    }

    /// Keeps the shared members and fills the remaining slots with a sample,
    /// without replacement, of the members only one parent has.
    ///
    /// When nothing is left to sample the offspring is just the intersection
    /// and may be shorter than its parents.
    fn crossover<R>(first: &Self, second: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut members = Self::intersection(first, second);
        let mut seen = ids(&members);
        let difference = first
            .members
            .iter()
            .chain(&second.members)
            .filter(|m| seen.insert(m.id()))
            .cloned()
            .collect::<Vec<_>>();
        let needed = first.len().saturating_sub(members.len());
        members.extend(difference.choose_multiple(rng, needed).cloned());
        Self { members }
    }

    fn mutate<R>(&mut self, ctx: &ReproductionContext<'_>, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for member in &mut self.members {
            *member = ctx.data.mutate_member(member, rng);
        }
        self.members.shuffle(rng);
    }

    /// Undersized offspring are rejected along with non-unique ones.
    fn is_valid_offspring(&self, parent: &Self) -> bool {
        self.len() == parent.len() && self.check_unique()
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_members(&self.members, f)
    }
}
