use serde::{Deserialize, Serialize};
use teamgen_battle::{DuelParams, EloRating};
use teamgen_evolution::EvolutionParams;

/// Contents of a `--config` file. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub evolution: EvolutionParams,
    pub elo: EloRating,
    pub duel: DuelParams,
}
