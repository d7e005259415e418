//! On-disk JSON format of the game data tables.
//!
//! Every cross reference is by moveset name; [`GameData::from_file`](crate::GameData::from_file)
//! resolves names to ids and rejects dangling references.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameDataFile {
    pub movesets: Vec<MovesetEntry>,
    /// Moveset name -> names of the movesets that counter it.
    #[serde(default)]
    pub counters: BTreeMap<String, Vec<String>>,
    /// Candidate moveset names for each core position.
    pub core_pools: Vec<Vec<String>>,
    #[serde(default)]
    pub norms: Vec<NormEntry>,
    #[serde(default = "default_banned_species")]
    pub banned_species: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovesetEntry {
    pub name: String,
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_species: Option<String>,
    pub usage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormEntry {
    pub name: String,
    pub members: Vec<String>,
    pub rating: f64,
}

fn default_banned_species() -> Vec<String> {
    vec!["Ditto".to_owned()]
}
