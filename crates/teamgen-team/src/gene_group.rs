use std::{
    collections::HashSet,
    fmt,
    time::{Duration, Instant},
};

use rand::Rng;
use teamgen_data::{GameData, Member};

use crate::DeadlineExceeded;

/// Wall-clock budget shared by every retry of one reproduction request.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    /// Starts a deadline that expires `limit` from now.
    #[must_use]
    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.elapsed() > self.limit
    }
}

/// Collaborators the genetic operators draw from.
#[derive(Debug, Clone, Copy)]
pub struct ReproductionContext<'a> {
    pub data: &'a GameData,
    /// Per-position probability of replacing a core gene with a pool draw.
    pub mutation_prob: f64,
}

/// Returns `true` if no two members share a base species and at most one is a Mega.
#[must_use]
pub fn members_unique(members: &[Member]) -> bool {
    let mut seen = HashSet::with_capacity(members.len());
    let distinct = members.iter().all(|m| seen.insert(m.base_species()));
    distinct && members.iter().filter(|m| m.is_mega()).count() <= 1
}

/// Common contract of the gene groups a team is assembled from.
pub trait GeneGroup: Clone + fmt::Display + Sized {
    fn from_members(members: Vec<Member>) -> Self;

    fn members(&self) -> &[Member];

    /// Species distinctness and the single-Mega rule over this group's own members.
    fn check_unique(&self) -> bool {
        members_unique(self.members())
    }

    /// Combines two parents into one unmutated offspring.
    fn crossover<R>(first: &Self, second: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized;

    /// Perturbs a freshly produced offspring in place.
    fn mutate<R>(&mut self, ctx: &ReproductionContext<'_>, rng: &mut R)
    where
        R: Rng + ?Sized;

    /// Acceptance test applied to every offspring in [`GeneGroup::reproduce`].
    fn is_valid_offspring(&self, _parent: &Self) -> bool {
        self.check_unique()
    }

    /// Produces one valid offspring of `first` and `second`.
    ///
    /// Each attempt is crossover followed by mutation, regenerated from the
    /// same parents until [`GeneGroup::is_valid_offspring`] accepts it.
    fn reproduce<R>(
        first: &Self,
        second: &Self,
        ctx: &ReproductionContext<'_>,
        deadline: &Deadline,
        rng: &mut R,
    ) -> Result<Self, DeadlineExceeded>
    where
        R: Rng + ?Sized,
    {
        let mut attempts = 0;
        loop {
            let mut attempt = Self::crossover(first, second, rng);
            attempt.mutate(ctx, rng);
            attempts += 1;
            if attempt.is_valid_offspring(first) {
                return Ok(attempt);
            }
            if deadline.is_expired() {
                log::debug!("gave up on offspring of [{first}] x [{second}] after {attempts} attempts");
                return Err(DeadlineExceeded { attempts });
            }
        }
    }
}

pub(crate) fn fmt_members(members: &[Member], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{member}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use teamgen_data::fixture;

    use super::*;

    fn pick(data: &GameData, names: &[&str]) -> Vec<Member> {
        names
            .iter()
            .map(|name| Arc::clone(data.find(name).unwrap()))
            .collect()
    }

    #[test]
    fn test_members_unique_rejects_shared_base_species() {
        let data = fixture::game_data();
        assert!(!members_unique(&pick(&data, &["Rotom-Wash", "Rotom-Heat"])));
        assert!(!members_unique(&pick(&data, &["Garchomp Scarf", "Garchomp SD"])));
        assert!(members_unique(&pick(&data, &["Rotom-Wash", "Garchomp SD"])));
    }

    #[test]
    fn test_members_unique_allows_single_mega() {
        let data = fixture::game_data();
        assert!(members_unique(&pick(&data, &["Charizard-Mega-X", "Toxapex"])));
        assert!(!members_unique(&pick(
            &data,
            &["Charizard-Mega-X", "Metagross-Mega"]
        )));
    }

    #[test]
    fn test_deadline_expiry() {
        let deadline = Deadline::after(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(deadline.is_expired());
        assert!(!Deadline::after(Duration::from_secs(60)).is_expired());
    }
}
