//! Small hand-written metagame shared by the workspace's tests.

use std::collections::BTreeMap;

use crate::{
    GameData,
    schema::{GameDataFile, MovesetEntry, NormEntry},
};

const MOVESETS: &[(&str, &str, f64)] = &[
    ("Garchomp Scarf", "Garchomp", 0.30),
    ("Garchomp SD", "Garchomp", 0.20),
    ("Ferrothorn", "Ferrothorn", 0.25),
    ("Rotom-Wash", "Rotom-Wash", 0.22),
    ("Rotom-Heat", "Rotom-Heat", 0.10),
    ("Charizard-Mega-X", "Charizard-Mega-X", 0.12),
    ("Charizard-Mega-Y", "Charizard-Mega-Y", 0.10),
    ("Metagross-Mega", "Metagross-Mega", 0.15),
    ("Tapu Koko", "Tapu Koko", 0.20),
    ("Landorus-Therian", "Landorus-Therian", 0.28),
    ("Toxapex", "Toxapex", 0.18),
    ("Heatran", "Heatran", 0.17),
    ("Clefable", "Clefable", 0.16),
    ("Ditto", "Ditto", 0.05),
    ("Tornadus-Therian", "Tornadus-Therian", 0.09),
    ("Magearna", "Magearna", 0.12),
];

const COUNTERS: &[(&str, &[&str])] = &[
    ("Ferrothorn", &["Heatran", "Charizard-Mega-X", "Charizard-Mega-Y"]),
    ("Garchomp Scarf", &["Clefable", "Tornadus-Therian"]),
    ("Garchomp SD", &["Clefable", "Toxapex"]),
    ("Tapu Koko", &["Garchomp Scarf", "Landorus-Therian"]),
    ("Heatran", &["Garchomp SD", "Landorus-Therian", "Rotom-Wash"]),
    ("Toxapex", &["Metagross-Mega", "Tapu Koko"]),
];

const CORE_POOLS: &[&[&str]] = &[
    &["Garchomp Scarf", "Garchomp SD", "Landorus-Therian"],
    &["Ferrothorn", "Heatran", "Metagross-Mega"],
];

const NORMS: &[(&str, &[&str], f64)] = &[
    (
        "balance",
        &["Landorus-Therian", "Ferrothorn", "Toxapex", "Tapu Koko", "Clefable", "Rotom-Wash"],
        1200.0,
    ),
    (
        "offense",
        &["Garchomp Scarf", "Charizard-Mega-Y", "Tapu Koko", "Magearna", "Heatran", "Tornadus-Therian"],
        1100.0,
    ),
    (
        "stall",
        &["Toxapex", "Clefable", "Heatran", "Ferrothorn", "Rotom-Wash", "Landorus-Therian"],
        1000.0,
    ),
];

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|&name| name.to_owned()).collect()
}

#[must_use]
pub fn game_data_file() -> GameDataFile {
    GameDataFile {
        movesets: MOVESETS
            .iter()
            .map(|&(name, species, usage)| MovesetEntry {
                name: name.to_owned(),
                species: species.to_owned(),
                base_species: None,
                usage,
            })
            .collect(),
        counters: COUNTERS
            .iter()
            .map(|&(target, counters)| (target.to_owned(), names(counters)))
            .collect::<BTreeMap<_, _>>(),
        core_pools: CORE_POOLS.iter().map(|pool| names(pool)).collect(),
        norms: NORMS
            .iter()
            .map(|&(name, members, rating)| NormEntry {
                name: name.to_owned(),
                members: names(members),
                rating,
            })
            .collect(),
        banned_species: vec!["Ditto".to_owned()],
    }
}

/// # Panics
///
/// Panics if the built-in tables are inconsistent.
#[must_use]
pub fn game_data() -> GameData {
    GameData::from_file(game_data_file()).expect("fixture tables are consistent")
}
