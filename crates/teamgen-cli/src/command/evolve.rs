use std::path::PathBuf;

use anyhow::Context as _;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use teamgen_battle::DuelBattleEngine;
use teamgen_evolution::Evolution;

use crate::{
    schema::{config::RunConfig, report::EvolutionReport},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvolveArg {
    /// Game data file (JSON)
    #[arg(long)]
    data: PathBuf,
    /// Run configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of teams per generation
    #[arg(long)]
    population: Option<usize>,
    /// Number of generations
    #[arg(long)]
    generations: Option<usize>,
    /// Opponents sampled per generation
    #[arg(long)]
    matches: Option<usize>,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl EvolveArg {
    fn apply_overrides(&self, config: &mut RunConfig) {
        let params = &mut config.evolution;
        if let Some(population) = self.population {
            params.population_size = population;
        }
        if let Some(generations) = self.generations {
            params.num_generations = generations;
        }
        if let Some(matches) = self.matches {
            params.matches = matches;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
    }
}

pub(crate) fn run(arg: &EvolveArg) -> anyhow::Result<()> {
    let data = util::read_game_data(&arg.data)?;
    let mut config = match &arg.config {
        Some(path) => util::read_json_file::<RunConfig, _>("config", path)?,
        None => RunConfig::default(),
    };
    arg.apply_overrides(&mut config);
    log::debug!("Run configuration: {config:?}");

    let engine = DuelBattleEngine::new(config.duel).context("Invalid duel parameters")?;
    let seed = config.evolution.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64::seed_from_u64(seed);
    let evolution = Evolution::new(&data, &engine, &config.elo, config.evolution.clone())?;

    let params = evolution.params();
    eprintln!(
        "Evolving {} teams for {} generations against {} sampled norms (seed {seed})",
        params.population_size, params.num_generations, params.matches
    );
    let outcome = evolution.run(&mut rng)?;

    eprintln!("Generations:");
    for record in &outcome.history {
        eprintln!(
            "  {:3}: min {:.3} / mean {:.3} / median {:.3} / max {:.3}",
            record.generation,
            record.fitness.min,
            record.fitness.mean,
            record.fitness.median,
            record.fitness.max,
        );
    }

    let count = params.report_count;
    eprintln!("Final report ({count} lowest fitness):");
    for (team, fitness) in outcome.worst(count) {
        eprintln!("  {team} => {fitness:.3}");
    }
    eprintln!("Best teams:");
    for (team, fitness) in outcome.best(count) {
        eprintln!("  {team} => {fitness:.3}");
    }

    let report = EvolutionReport::new(seed, config, &outcome);
    Output::save_json(&report, arg.output.clone())?;

    eprintln!();
    eprintln!("Report saved");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Created at: {}", report.created_at);
    eprintln!("  Generations: {}", report.history.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use teamgen_battle::EloRating;
    use teamgen_data::fixture;
    use teamgen_team::GeneGroup as _;

    use super::*;

    #[test]
    fn test_flags_override_config() {
        let arg = EvolveArg {
            population: Some(8),
            seed: Some(99),
            ..EvolveArg::default()
        };
        let mut config = RunConfig::default();
        config.evolution.num_generations = 3;
        arg.apply_overrides(&mut config);
        assert_eq!(config.evolution.population_size, 8);
        assert_eq!(config.evolution.num_generations, 3);
        assert_eq!(config.evolution.seed, Some(99));
    }

    #[test]
    fn test_report_lists_both_ends() {
        let data = fixture::game_data();
        let mut config = RunConfig::default();
        config.evolution.population_size = 6;
        config.evolution.num_generations = 2;
        config.evolution.matches = 3;
        config.evolution.report_count = 4;
        let engine = DuelBattleEngine::default();
        let elo = EloRating::default();
        let evolution = Evolution::new(&data, &engine, &elo, config.evolution.clone()).unwrap();
        let outcome = evolution.run(&mut Pcg64::seed_from_u64(5)).unwrap();

        let report = EvolutionReport::new(5, config, &outcome);
        assert_eq!(report.history.len(), 2);
        assert_eq!(report.worst.len(), 4);
        assert_eq!(report.best.len(), 4);
        assert!(report.worst.is_sorted_by(|a, b| a.fitness <= b.fitness));
        assert!(report.best.is_sorted_by(|a, b| a.fitness >= b.fitness));
        let core_len = outcome.population.teams()[0].core().members().len();
        assert!(report.best.iter().all(|t| t.core.len() == core_len));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["history"][0]["mean"].is_number());
    }
}
