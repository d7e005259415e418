use std::{
    collections::{BTreeSet, HashMap, hash_map::Entry},
    io::Read,
    sync::Arc,
};

use rand::{Rng, seq::IndexedRandom as _};

use crate::{
    DataError, Member, Moveset, MovesetId,
    schema::{GameDataFile, NormEntry},
};

/// A rated opponent team used as a fitness benchmark.
#[derive(Debug, Clone)]
pub struct Norm {
    name: String,
    members: Vec<Member>,
    rating: f64,
}

impl Norm {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Fixed rating of this opponent. Never updated during a run.
    #[must_use]
    pub fn rating(&self) -> f64 {
        self.rating
    }
}

/// Immutable metagame tables consumed by the optimizer.
///
/// Built once from a [`GameDataFile`] and shared read-only for the whole run.
#[derive(Debug, Clone)]
pub struct GameData {
    movesets: Vec<Member>,
    by_name: HashMap<String, MovesetId>,
    counters: Vec<BTreeSet<MovesetId>>,
    variants: Vec<Vec<MovesetId>>,
    core_pools: Vec<Vec<Member>>,
    norms: Vec<Norm>,
    banned_species: BTreeSet<String>,
}

impl GameData {
    /// Parses a JSON document in the [`GameDataFile`] format.
    pub fn from_reader<R>(reader: R) -> Result<Self, DataError>
    where
        R: Read,
    {
        let file: GameDataFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    /// Resolves every name reference of `file` into a ready-to-use table set.
    pub fn from_file(file: GameDataFile) -> Result<Self, DataError> {
        let mut movesets = Vec::with_capacity(file.movesets.len());
        let mut by_name = HashMap::with_capacity(file.movesets.len());
        for entry in file.movesets {
            if !entry.usage.is_finite() || entry.usage < 0.0 {
                return Err(DataError::InvalidUsage {
                    name: entry.name,
                    usage: entry.usage,
                });
            }
            let id = MovesetId(u32::try_from(movesets.len()).map_err(|_| DataError::TooManyMovesets)?);
            match by_name.entry(entry.name.clone()) {
                Entry::Occupied(_) => return Err(DataError::DuplicateMoveset { name: entry.name }),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            movesets.push(Arc::new(Moveset::new(
                id,
                entry.name,
                entry.species,
                entry.base_species,
                entry.usage,
            )));
        }

        let resolve = |name: &str, context: &str| -> Result<MovesetId, DataError> {
            by_name
                .get(name)
                .copied()
                .ok_or_else(|| DataError::UnknownMoveset {
                    name: name.to_owned(),
                    context: context.to_owned(),
                })
        };

        let mut counters = vec![BTreeSet::new(); movesets.len()];
        for (target, names) in &file.counters {
            let target_id = resolve(target, "counters")?;
            for name in names {
                let context = format!("counters of `{target}`");
                counters[target_id.index()].insert(resolve(name, &context)?);
            }
        }

        let core_pools = file
            .core_pools
            .iter()
            .enumerate()
            .map(|(position, names)| {
                if names.is_empty() {
                    return Err(DataError::EmptyCorePool { position });
                }
                let context = format!("core pool {position}");
                names
                    .iter()
                    .map(|name| Ok(Arc::clone(&movesets[resolve(name, &context)?.index()])))
                    .collect::<Result<Vec<_>, DataError>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let norms = file
            .norms
            .into_iter()
            .map(|NormEntry { name, members, rating }| {
                if members.is_empty() {
                    return Err(DataError::EmptyNorm { name });
                }
                if !rating.is_finite() {
                    return Err(DataError::InvalidRating { name, rating });
                }
                let context = format!("norm `{name}`");
                let members = members
                    .iter()
                    .map(|member| Ok(Arc::clone(&movesets[resolve(member, &context)?.index()])))
                    .collect::<Result<Vec<_>, DataError>>()?;
                Ok(Norm {
                    name,
                    members,
                    rating,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_species: HashMap<&str, Vec<MovesetId>> = HashMap::new();
        for set in &movesets {
            by_species.entry(set.species()).or_default().push(set.id());
        }
        let variants = movesets
            .iter()
            .map(|set| by_species[set.species()].clone())
            .collect();

        Ok(Self {
            movesets,
            by_name,
            counters,
            variants,
            core_pools,
            norms,
            banned_species: file.banned_species.into_iter().collect(),
        })
    }

    #[must_use]
    pub fn movesets(&self) -> &[Member] {
        &self.movesets
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this table.
    #[must_use]
    pub fn moveset(&self, id: MovesetId) -> &Member {
        &self.movesets[id.index()]
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Member> {
        self.by_name.get(name).map(|id| self.moveset(*id))
    }

    /// Number of positions in a core.
    #[must_use]
    pub fn core_len(&self) -> usize {
        self.core_pools.len()
    }

    /// Candidates for the given core position; empty past the last position.
    #[must_use]
    pub fn core_pool(&self, position: usize) -> &[Member] {
        self.core_pools.get(position).map_or(&[], Vec::as_slice)
    }

    /// Movesets that counter `member`.
    #[must_use]
    pub fn counters(&self, member: &Moveset) -> &BTreeSet<MovesetId> {
        &self.counters[member.id().index()]
    }

    /// Returns `true` if `candidate` is registered as a counter to `target`.
    #[must_use]
    pub fn is_counter(&self, candidate: &Moveset, target: &Moveset) -> bool {
        self.counters(target).contains(&candidate.id())
    }

    #[must_use]
    pub fn norms(&self) -> &[Norm] {
        &self.norms
    }

    #[must_use]
    pub fn is_banned(&self, member: &Moveset) -> bool {
        self.banned_species.contains(member.base_species())
            || self.banned_species.contains(member.species())
    }

    /// Per-member mutation: a uniformly chosen moveset of the same species,
    /// possibly `member` itself.
    pub fn mutate_member<R>(&self, member: &Member, rng: &mut R) -> Member
    where
        R: Rng + ?Sized,
    {
        self.variants[member.id().index()]
            .choose(rng)
            .map_or_else(|| Arc::clone(member), |id| Arc::clone(self.moveset(*id)))
    }

    /// Draws one moveset with probability proportional to its usage.
    pub fn weighted_sample<R>(&self, rng: &mut R) -> Result<Member, DataError>
    where
        R: Rng + ?Sized,
    {
        let total: f64 = self.movesets.iter().map(|set| set.usage()).sum();
        if total <= 0.0 {
            return Err(DataError::NoUsage);
        }
        let target = rng.random_range(0.0..=total);
        let mut runner = 0.0;
        for set in &self.movesets {
            if runner + set.usage() >= target {
                return Ok(Arc::clone(set));
            }
            runner += set.usage();
        }
        // rounding can leave `target` a hair above the running sum
        self.movesets
            .iter()
            .rev()
            .find(|set| set.usage() > 0.0)
            .map(Arc::clone)
            .ok_or(DataError::NoUsage)
    }
}
