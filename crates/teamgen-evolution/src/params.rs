use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid `{field}`: {reason}")]
pub struct ParamsError {
    pub field: &'static str,
    pub reason: &'static str,
}

/// Controls a whole optimization run.
///
/// Every field has a default, so a configuration file only needs to name
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Number of teams in every generation
    pub population_size: usize,
    /// Number of generations before the final evaluation
    pub num_generations: usize,
    /// Opponents sampled (with replacement) per generation
    pub matches: usize,
    /// Rating every team starts from before its first battle of a generation
    pub starting_elo: f64,
    /// Number of top teams carried over unchanged
    pub elite_count: usize,
    /// Per-position probability of a core gene being redrawn from its pool
    pub mutation_prob: f64,
    /// Wall-clock budget for a single reproduction, in seconds
    pub reproduction_timeout_secs: f64,
    /// Trials requested per team in the final evaluation
    pub final_trials: usize,
    /// Number of teams listed in each side of the final report
    pub report_count: usize,
    /// Seed of the run's random generator; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            num_generations: 100,
            matches: 50,
            starting_elo: 1000.0,
            elite_count: 10,
            mutation_prob: 0.1,
            reproduction_timeout_secs: 10.0,
            final_trials: 50,
            report_count: 10,
            seed: None,
        }
    }
}

impl EvolutionParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        let fail = |field, reason| Err(ParamsError { field, reason });
        if self.population_size == 0 {
            return fail("population_size", "must be at least 1");
        }
        if self.matches == 0 {
            return fail("matches", "must be at least 1");
        }
        if !self.starting_elo.is_finite() {
            return fail("starting_elo", "must be finite");
        }
        if !(0.0..=1.0).contains(&self.mutation_prob) {
            return fail("mutation_prob", "must be within [0, 1]");
        }
        if !(self.reproduction_timeout_secs.is_finite() && self.reproduction_timeout_secs > 0.0) {
            return fail("reproduction_timeout_secs", "must be a positive number of seconds");
        }
        if self.final_trials == 0 {
            return fail("final_trials", "must be at least 1");
        }
        Ok(())
    }

    #[must_use]
    pub fn reproduction_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.reproduction_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = EvolutionParams::default();
        params.validate().unwrap();
        assert_eq!(params.reproduction_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let params: EvolutionParams =
            serde_json::from_str(r#"{ "population_size": 12, "seed": 3 }"#).unwrap();
        assert_eq!(params.population_size, 12);
        assert_eq!(params.seed, Some(3));
        assert_eq!(params.elite_count, 10);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let cases = [
            ("population_size", EvolutionParams { population_size: 0, ..Default::default() }),
            ("matches", EvolutionParams { matches: 0, ..Default::default() }),
            ("mutation_prob", EvolutionParams { mutation_prob: 1.5, ..Default::default() }),
            (
                "reproduction_timeout_secs",
                EvolutionParams { reproduction_timeout_secs: 0.0, ..Default::default() },
            ),
            ("final_trials", EvolutionParams { final_trials: 0, ..Default::default() }),
        ];
        for (field, params) in cases {
            assert_eq!(params.validate().unwrap_err().field, field);
        }
    }
}
