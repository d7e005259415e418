use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

/// Dense index of a moveset inside [`GameData`](crate::GameData).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct MovesetId(pub(crate) u32);

impl MovesetId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A concrete build of a species: the unit a team is made of.
///
/// Two movesets are the same member iff they have the same [`MovesetId`];
/// the remaining fields are descriptive.
#[derive(Debug, Clone)]
pub struct Moveset {
    id: MovesetId,
    name: String,
    species: String,
    base_species: String,
    usage: f64,
}

/// Shared handle to a moveset.
///
/// Gene groups hold members by this handle so they can be printed and
/// compared without access to the data tables.
pub type Member = Arc<Moveset>;

impl Moveset {
    pub(crate) fn new(
        id: MovesetId,
        name: String,
        species: String,
        base_species: Option<String>,
        usage: f64,
    ) -> Self {
        let base_species = base_species.unwrap_or_else(|| base_species_of(&species).to_owned());
        Self {
            id,
            name,
            species,
            base_species,
            usage,
        }
    }

    #[must_use]
    pub fn id(&self) -> MovesetId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full species name including any form suffix (e.g. `Charizard-Mega-X`).
    #[must_use]
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Species identity independent of form (e.g. `Charizard`).
    #[must_use]
    pub fn base_species(&self) -> &str {
        &self.base_species
    }

    /// Relative usage weight in the metagame.
    #[must_use]
    pub fn usage(&self) -> f64 {
        self.usage
    }

    /// Returns `true` if the species carries the Mega form designation.
    #[must_use]
    pub fn is_mega(&self) -> bool {
        self.species.contains("Mega")
    }
}

/// Strips the form suffix from a species name.
///
/// ```
/// # use teamgen_data::base_species_of;
/// assert_eq!(base_species_of("Charizard-Mega-X"), "Charizard");
/// assert_eq!(base_species_of("Ferrothorn"), "Ferrothorn");
/// ```
#[must_use]
pub fn base_species_of(species: &str) -> &str {
    species.split('-').next().unwrap_or(species)
}

impl fmt::Display for Moveset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Moveset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Moveset {}

impl PartialOrd for Moveset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Moveset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Moveset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
