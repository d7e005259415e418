use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamgen_evolution::{EvolutionOutcome, FitnessSummary, GenerationRecord};
use teamgen_team::{GeneGroup as _, Team};

use super::config::RunConfig;

/// JSON document written at the end of `evolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub created_at: DateTime<Utc>,
    pub seed: u64,
    pub config: RunConfig,
    pub history: Vec<GenerationEntry>,
    /// Lowest final fitness first
    pub worst: Vec<RankedTeam>,
    /// Highest final fitness first
    pub best: Vec<RankedTeam>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationEntry {
    pub generation: usize,
    #[serde(flatten)]
    pub fitness: FitnessSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTeam {
    pub core: Vec<String>,
    pub suggestion: Vec<String>,
    pub fitness: f64,
}

impl RankedTeam {
    fn new(team: &Team, fitness: f64) -> Self {
        let names = |members: &[teamgen_data::Member]| {
            members
                .iter()
                .map(|m| m.name().to_owned())
                .collect::<Vec<_>>()
        };
        Self {
            core: names(team.core().members()),
            suggestion: names(team.suggestion().members()),
            fitness,
        }
    }
}

impl EvolutionReport {
    pub fn new(seed: u64, config: RunConfig, outcome: &EvolutionOutcome) -> Self {
        let count = config.evolution.report_count;
        let ranked = |teams: Vec<(&Team, f64)>| {
            teams
                .into_iter()
                .map(|(team, fitness)| RankedTeam::new(team, fitness))
                .collect::<Vec<_>>()
        };
        Self {
            created_at: Utc::now(),
            seed,
            history: outcome
                .history
                .iter()
                .map(|&GenerationRecord { generation, fitness }| GenerationEntry {
                    generation,
                    fitness,
                })
                .collect(),
            worst: ranked(outcome.worst(count)),
            best: ranked(outcome.best(count)),
            config,
        }
    }
}
