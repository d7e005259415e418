use std::thread;

use rand::{
    Rng, RngCore, SeedableRng as _,
    distr::{Distribution as _, weighted::WeightedIndex},
    seq::IndexedRandom as _,
};
use rand_pcg::Pcg64;
use teamgen_battle::{BattleEngine, RatingSystem};
use teamgen_data::{GameData, Norm};
use teamgen_team::{BattleError, Deadline, ReproductionContext, Team};

use crate::{EvolutionError, EvolutionParams, FitnessMap, FitnessSummary, Population};

/// Per-generation record kept by [`Evolution::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRecord {
    pub generation: usize,
    pub fitness: FitnessSummary,
}

/// Final state of a run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Population after the last generation
    pub population: Population,
    /// Fitness of `population` from the final evaluation
    pub fitness: FitnessMap,
    pub history: Vec<GenerationRecord>,
}

impl EvolutionOutcome {
    /// The `count` lowest-fitness teams, lowest first.
    ///
    /// This is the list the final report has always printed, even though
    /// elitism during the run keeps the highest-fitness teams.
    #[must_use]
    pub fn worst(&self, count: usize) -> Vec<(&Team, f64)> {
        self.ranked(self.fitness.ranking_ascending(), count)
    }

    /// The `count` highest-fitness teams, highest first.
    #[must_use]
    pub fn best(&self, count: usize) -> Vec<(&Team, f64)> {
        self.ranked(self.fitness.ranking_descending(), count)
    }

    fn ranked(&self, order: Vec<usize>, count: usize) -> Vec<(&Team, f64)> {
        order
            .into_iter()
            .take(count)
            .map(|i| (&self.population.teams()[i], self.fitness.values()[i]))
            .collect()
    }
}

/// Genetic optimizer over teams.
///
/// Fitness of a team is the win probability of the rating it ends with
/// after battling a sample of rated opponents one after another. Each
/// generation keeps the `elite_count` fittest teams unchanged and fills the
/// rest with offspring of fitness-proportionally selected parents.
#[derive(Debug)]
pub struct Evolution<'a, B, S>
where
    B: BattleEngine + ?Sized,
    S: RatingSystem + ?Sized,
{
    data: &'a GameData,
    battle_engine: &'a B,
    rating_system: &'a S,
    params: EvolutionParams,
}

impl<'a, B, S> Evolution<'a, B, S>
where
    B: BattleEngine + ?Sized,
    S: RatingSystem + ?Sized,
{
    pub fn new(
        data: &'a GameData,
        battle_engine: &'a B,
        rating_system: &'a S,
        params: EvolutionParams,
    ) -> Result<Self, EvolutionError> {
        params.validate()?;
        if data.norms().is_empty() {
            return Err(EvolutionError::NoNorms);
        }
        Ok(Self {
            data,
            battle_engine,
            rating_system,
            params,
        })
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    fn reproduction_context(&self) -> ReproductionContext<'a> {
        ReproductionContext {
            data: self.data,
            mutation_prob: self.params.mutation_prob,
        }
    }

    /// Builds `population_size` random valid teams.
    pub fn initial_population<R>(&self, rng: &mut R) -> Result<Population, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let teams = (0..self.params.population_size)
            .map(|_| {
                let deadline = Deadline::after(self.params.reproduction_timeout());
                Team::random(self.data, &deadline, rng)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Population::new(teams))
    }

    /// Draws `matches` opponents uniformly, with replacement.
    pub fn sample_norms<R>(&self, rng: &mut R) -> Vec<&'a Norm>
    where
        R: Rng + ?Sized,
    {
        let norms = self.data.norms();
        (0..self.params.matches)
            .filter_map(|_| norms.choose(rng))
            .collect()
    }

    /// Battles `team` against every norm in order and returns the win
    /// probability of the resulting rating.
    pub fn team_fitness(
        &self,
        team: &mut Team,
        norms: &[&Norm],
        rng: &mut dyn RngCore,
    ) -> Result<f64, BattleError> {
        let mut rating = self.params.starting_elo;
        for norm in norms {
            let mut opponent = Team::from(*norm);
            let winner = self
                .battle_engine
                .battle(team, &mut opponent, self.data, rng)?;
            rating = self
                .rating_system
                .update_rating(rating, norm.rating(), winner.is_first());
        }
        Ok(self.rating_system.win_probability(rating))
    }

    /// Computes the fitness of every team in parallel.
    ///
    /// Each team battles on its own thread with its own generator seeded from
    /// `rng`, and every battle gets a fresh copy of the opponent, so no
    /// battle state is shared. Any failed battle fails the whole evaluation.
    pub fn evaluate<R>(
        &self,
        population: &mut Population,
        norms: &[&Norm],
        rng: &mut R,
    ) -> Result<FitnessMap, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let seeds = (0..population.len())
            .map(|_| rng.random::<u64>())
            .collect::<Vec<_>>();
        let mut outcomes = vec![Ok(0.0); population.len()];
        thread::scope(|s| {
            for ((team, outcome), seed) in population
                .teams_mut()
                .iter_mut()
                .zip(&mut outcomes)
                .zip(seeds)
            {
                s.spawn(move || {
                    let mut rng = Pcg64::seed_from_u64(seed);
                    *outcome = self.team_fitness(team, norms, &mut rng);
                });
            }
        });
        let values = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
        Ok(FitnessMap::new(values))
    }

    /// Clean copies of the `elite_count` fittest teams, fittest first.
    #[must_use]
    pub fn elites(&self, population: &Population, fitness: &FitnessMap) -> Vec<Team> {
        fitness
            .ranking_descending()
            .into_iter()
            .take(self.params.elite_count)
            .map(|i| population.teams()[i].get_elite())
            .collect()
    }

    /// Draws two parent indices independently, with probability proportional
    /// to fitness.
    ///
    /// When no team has positive fitness both parents are drawn uniformly.
    pub fn select_parents<R>(&self, fitness: &FitnessMap, rng: &mut R) -> (usize, usize)
    where
        R: Rng + ?Sized,
    {
        match WeightedIndex::<f64>::new(fitness.values()) {
            Ok(weights) => (weights.sample(rng), weights.sample(rng)),
            Err(err) => {
                log::debug!("falling back to uniform parent selection: {err}");
                let n = fitness.len();
                (rng.random_range(0..n), rng.random_range(0..n))
            }
        }
    }

    /// Builds the next generation from an evaluated population.
    pub fn evolve<R>(
        &self,
        population: &Population,
        fitness: &FitnessMap,
        rng: &mut R,
    ) -> Result<Population, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let ctx = self.reproduction_context();
        let timeout = self.params.reproduction_timeout();
        let mut next = self.elites(population, fitness);
        while next.len() < self.params.population_size {
            let (first, second) = self.select_parents(fitness, rng);
            let child = Team::reproduce(
                &population.teams()[first],
                &population.teams()[second],
                &ctx,
                timeout,
                rng,
            )?;
            next.push(child);
        }
        Ok(Population::new(next))
    }

    /// Scores the final population against one fresh opponent sample.
    ///
    /// `final_trials` trials are requested per team, but only the first one
    /// is ever run: the result is a single-trial fitness.
    pub fn final_evaluation<R>(
        &self,
        population: &mut Population,
        rng: &mut R,
    ) -> Result<FitnessMap, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let norms = self.sample_norms(rng);
        self.evaluate(population, &norms, rng)
    }

    /// Runs `num_generations` generations followed by the final evaluation.
    pub fn run<R>(&self, rng: &mut R) -> Result<EvolutionOutcome, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        log::info!("generating {} teams", self.params.population_size);
        let mut population = self.initial_population(rng)?;
        let mut history = Vec::with_capacity(self.params.num_generations);

        for generation in 0..self.params.num_generations {
            let norms = self.sample_norms(rng);
            let fitness = self.evaluate(&mut population, &norms, rng)?;
            if let Some(summary) = fitness.summary() {
                log::info!(
                    "generation #{generation}: fitness min {:.3} / mean {:.3} / max {:.3}",
                    summary.min,
                    summary.mean,
                    summary.max,
                );
                history.push(GenerationRecord {
                    generation,
                    fitness: summary,
                });
            }
            population = self.evolve(&population, &fitness, rng)?;
        }

        log::info!("final evaluation of {} teams", population.len());
        let fitness = self.final_evaluation(&mut population, rng)?;
        Ok(EvolutionOutcome {
            population,
            fitness,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng as _;
    use teamgen_battle::{DuelBattleEngine, EloRating, Side};
    use teamgen_data::fixture;
    use teamgen_team::{Core, GeneGroup as _, Suggestion};

    use super::*;

    /// Always declares the first team the winner.
    #[derive(Debug)]
    struct FirstWins;

    impl BattleEngine for FirstWins {
        fn battle(
            &self,
            first: &mut Team,
            second: &mut Team,
            _data: &GameData,
            _rng: &mut dyn RngCore,
        ) -> Result<Side, BattleError> {
            first.heal();
            second.heal();
            Ok(Side::First)
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl BattleEngine for Broken {
        fn battle(
            &self,
            first: &mut Team,
            _second: &mut Team,
            data: &GameData,
            rng: &mut dyn RngCore,
        ) -> Result<Side, BattleError> {
            first.heal();
            first.switch(None, data, rng)?;
            first.damage_current(f64::NAN)?;
            Ok(Side::First)
        }
    }

    fn params(population_size: usize) -> EvolutionParams {
        EvolutionParams {
            population_size,
            num_generations: 1,
            matches: 2,
            seed: Some(0),
            ..EvolutionParams::default()
        }
    }

    fn team(data: &GameData, core: &[&str], suggestion: &[&str]) -> Team {
        let pick = |names: &[&str]| {
            names
                .iter()
                .map(|name| Arc::clone(data.find(name).unwrap()))
                .collect::<Vec<_>>()
        };
        Team::new(
            Core::from_members(pick(core)),
            Suggestion::from_members(pick(suggestion)),
        )
    }

    #[test]
    fn test_requires_norms() {
        let mut file = fixture::game_data_file();
        file.norms.clear();
        let data = GameData::from_file(file).unwrap();
        let elo = EloRating::default();
        let err = Evolution::new(&data, &FirstWins, &elo, params(4)).unwrap_err();
        assert!(matches!(err, EvolutionError::NoNorms));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let bad = EvolutionParams {
            mutation_prob: -0.1,
            ..params(4)
        };
        let err = Evolution::new(&data, &FirstWins, &elo, bad).unwrap_err();
        assert!(matches!(err, EvolutionError::Params(_)));
    }

    #[test]
    fn test_initial_population_is_valid() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution =
            Evolution::new(&data, &FirstWins, &elo, params(30)).unwrap();
        let population = evolution
            .initial_population(&mut Pcg64::seed_from_u64(40))
            .unwrap();
        assert_eq!(population.len(), 30);
        assert!(population.teams().iter().all(|t| t.check_unique(&data)));
    }

    #[test]
    fn test_sample_norms_draws_matches_with_replacement() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution = Evolution::new(
            &data,
            &FirstWins,
            &elo,
            EvolutionParams {
                matches: 20,
                ..params(4)
            },
        )
        .unwrap();
        let norms = evolution.sample_norms(&mut Pcg64::seed_from_u64(41));
        assert_eq!(norms.len(), 20);
        // 3 distinct norms, 20 draws
        assert!(norms.iter().any(|a| norms.iter().filter(|b| a.name() == b.name()).count() > 1));
    }

    #[test]
    fn test_deterministic_battles_rank_all_teams_equally() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution = Evolution::new(&data, &FirstWins, &elo, params(4)).unwrap();
        let mut rng = Pcg64::seed_from_u64(42);

        let mut population = evolution.initial_population(&mut rng).unwrap();
        let norms = evolution.sample_norms(&mut rng);
        assert_eq!(norms.len(), 2);
        let fitness = evolution.evaluate(&mut population, &norms, &mut rng).unwrap();

        let mut rating = 1000.0;
        for norm in &norms {
            rating = elo.update_rating(rating, norm.rating(), true);
        }
        let expected = elo.win_probability(rating);
        assert_eq!(fitness.len(), 4);
        assert!(fitness.values().iter().all(|f| (f - expected).abs() < 1e-12));

        let elites = evolution.elites(&population, &fitness);
        assert_eq!(elites.len(), 4);
        for (elite, original) in elites.iter().zip(population.teams()) {
            assert!(elite.same_genes(original));
        }

        let next = evolution.evolve(&population, &fitness, &mut rng).unwrap();
        assert_eq!(next.len(), 4);
        for (carried, original) in next.teams().iter().zip(population.teams()) {
            assert!(carried.same_genes(original));
        }
    }

    #[test]
    fn test_run_end_to_end() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution =
            Evolution::new(&data, &FirstWins, &elo, params(4)).unwrap();
        let outcome = evolution.run(&mut Pcg64::seed_from_u64(43)).unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.population.len(), 4);
        assert_eq!(outcome.fitness.len(), 4);
        assert_eq!(outcome.worst(10).len(), 4);
        let best = outcome.best(2);
        assert_eq!(best.len(), 2);
        assert!(best[0].1 >= best[1].1);
    }

    #[test]
    fn test_elites_carry_over_unchanged() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let engine = DuelBattleEngine::default();
        let evolution = Evolution::new(
            &data,
            &engine,
            &elo,
            EvolutionParams {
                matches: 6,
                ..params(14)
            },
        )
        .unwrap();
        let mut rng = Pcg64::seed_from_u64(44);
        let mut population = evolution.initial_population(&mut rng).unwrap();
        let norms = evolution.sample_norms(&mut rng);
        let fitness = evolution.evaluate(&mut population, &norms, &mut rng).unwrap();
        let next = evolution.evolve(&population, &fitness, &mut rng).unwrap();

        assert_eq!(next.len(), 14);
        for (slot, index) in fitness.ranking_descending().into_iter().take(10).enumerate() {
            assert!(next.teams()[slot].same_genes(&population.teams()[index]));
            assert!(next.teams()[slot].current().is_none());
        }
        assert!(next.teams().iter().all(|t| t.check_unique(&data)));
    }

    #[test]
    fn test_selection_follows_fitness_weights() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution =
            Evolution::new(&data, &FirstWins, &elo, params(4)).unwrap();
        let fitness = FitnessMap::new(vec![0.0, 0.4, 0.0, 0.2]);
        let mut rng = Pcg64::seed_from_u64(45);
        let mut counts = [0_u32; 4];
        for _ in 0..20_000 {
            let (a, b) = evolution.select_parents(&fitness, &mut rng);
            counts[a] += 1;
            counts[b] += 1;
        }
        assert_eq!(counts[0], 0);
        assert_eq!(counts[2], 0);
        let ratio = f64::from(counts[1]) / f64::from(counts[3]);
        assert!((ratio - 2.0).abs() < 0.1, "ratio = {ratio}");
    }

    #[test]
    fn test_zero_fitness_selects_uniformly() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution =
            Evolution::new(&data, &FirstWins, &elo, params(4)).unwrap();
        let fitness = FitnessMap::new(vec![0.0; 4]);
        let mut rng = Pcg64::seed_from_u64(46);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let (a, b) = evolution.select_parents(&fitness, &mut rng);
            seen[a] = true;
            seen[b] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_battle_error_fails_evaluation() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution = Evolution::new(&data, &Broken, &elo, params(3)).unwrap();
        let mut rng = Pcg64::seed_from_u64(47);
        let mut population = evolution.initial_population(&mut rng).unwrap();
        let norms = evolution.sample_norms(&mut rng);
        let err = evolution
            .evaluate(&mut population, &norms, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Battle(BattleError::InvalidDamage { .. })
        ));
    }

    #[test]
    fn test_unsatisfiable_population_times_out() {
        let data = fixture::game_data();
        let elo = EloRating::default();
        let evolution = Evolution::new(
            &data,
            &FirstWins,
            &elo,
            EvolutionParams {
                elite_count: 1,
                mutation_prob: 0.0,
                reproduction_timeout_secs: 0.05,
                ..params(3)
            },
        )
        .unwrap();
        let stuck = team(
            &data,
            &["Garchomp Scarf", "Garchomp SD"],
            &["Toxapex", "Tapu Koko", "Clefable", "Rotom-Wash"],
        );
        let population = Population::new(vec![stuck.clone(), stuck.clone(), stuck]);
        let fitness = FitnessMap::new(vec![0.5, 0.3, 0.2]);
        let err = evolution
            .evolve(&population, &fitness, &mut Pcg64::seed_from_u64(48))
            .unwrap_err();
        assert!(matches!(err, EvolutionError::Reproduction(ref e) if e.is_timeout()));
    }
}
