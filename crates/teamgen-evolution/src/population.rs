use serde::{Deserialize, Serialize};
use teamgen_team::Team;

/// One generation of teams, in a fixed order.
///
/// Fitness values live in a separate [`FitnessMap`] indexed by position in
/// this population.
#[derive(Debug, Clone, Default)]
pub struct Population {
    teams: Vec<Team>,
}

impl Population {
    #[must_use]
    pub fn new(teams: Vec<Team>) -> Self {
        Self { teams }
    }

    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub(crate) fn teams_mut(&mut self) -> &mut [Team] {
        &mut self.teams
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// Fitness of every team of a population, aligned by index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitnessMap {
    values: Vec<f64>,
}

impl FitnessMap {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Team indices from the highest fitness to the lowest.
    ///
    /// Teams with equal fitness keep their population order.
    #[must_use]
    pub fn ranking_descending(&self) -> Vec<usize> {
        let mut order = (0..self.values.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| self.values[b].total_cmp(&self.values[a]));
        order
    }

    /// Team indices from the lowest fitness to the highest.
    ///
    /// Teams with equal fitness keep their population order.
    #[must_use]
    pub fn ranking_ascending(&self) -> Vec<usize> {
        let mut order = (0..self.values.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        order
    }

    #[must_use]
    pub fn summary(&self) -> Option<FitnessSummary> {
        FitnessSummary::new(self.values.iter().copied())
    }
}

/// Distribution of fitness over one population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl FitnessSummary {
    /// Returns `None` for an empty population.
    ///
    /// ```
    /// # use teamgen_evolution::FitnessSummary;
    /// let summary = FitnessSummary::new([0.2, 0.8, 0.5]).unwrap();
    /// assert_eq!(summary.min, 0.2);
    /// assert_eq!(summary.median, 0.5);
    /// assert!(FitnessSummary::new([0.0; 0]).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let min = *values.first()?;
        let max = *values.last()?;
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let median = values[values.len() / 2];
        Some(Self {
            min,
            max,
            mean,
            median,
        })
    }
}
