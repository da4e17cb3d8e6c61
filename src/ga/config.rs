//! Genetic optimizer parameters.
//!
//! [`GeneticParams`] holds every knob of the evolutionary loop. Ranges are
//! checked by [`GeneticParams::validate`] before a run starts.

use serde::{Deserialize, Serialize};
use u_metaheur::ga::Selection;

use crate::error::ConfigError;

/// Parent selection.
///
/// All strategies assume **minimization** (lower fitness = better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Sample `size` individuals uniformly with replacement, keep the best.
    Tournament { size: usize },
    /// Pick with weight `max - f`, where `f` is the scalar fitness.
    RouletteWheel,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::Tournament { size: 3 }
    }
}

impl From<SelectionStrategy> for Selection {
    fn from(strategy: SelectionStrategy) -> Self {
        match strategy {
            SelectionStrategy::Tournament { size } => Selection::Tournament(size),
            SelectionStrategy::RouletteWheel => Selection::Roulette,
        }
    }
}

/// Recombination over the open-cell sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverStrategy {
    /// Each open cell inherits from either parent with probability 0.5.
    #[default]
    Uniform,
    /// Prefix from one parent, suffix from the other.
    SinglePoint,
}

/// Mutation of open cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStrategy {
    /// Replace the occupant with a different eligible candidate.
    #[default]
    Swap,
}

/// Configuration for the genetic optimizer.
///
/// # Defaults
///
/// ```
/// use duty_roster::ga::GeneticParams;
///
/// let params = GeneticParams::default();
/// assert_eq!(params.population_size, 50);
/// assert_eq!(params.max_generations, 100);
/// assert!(params.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use duty_roster::ga::{GeneticParams, SelectionStrategy};
///
/// let params = GeneticParams::default()
///     .with_population_size(20)
///     .with_max_generations(10)
///     .with_selection(SelectionStrategy::RouletteWheel)
///     .with_seed(7);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    /// Individuals per generation (10..=200).
    pub population_size: usize,
    /// Generation cap (10..=500).
    pub max_generations: usize,
    /// Probability that an offspring is produced by crossover rather than
    /// cloned from a parent.
    pub crossover_rate: f64,
    /// Per-open-cell mutation probability.
    pub mutation_rate: f64,
    /// Fittest individuals carried unchanged into the next generation
    /// (0..=10, below the population size).
    pub elite_count: usize,
    pub selection: SelectionStrategy,
    pub crossover: CrossoverStrategy,
    pub mutation: MutationStrategy,
    /// Per-open-cell probability of reassignment when deriving the
    /// initial population from the greedy seed.
    pub perturbation_rate: f64,
    /// Stop after this many generations without a new best.
    ///
    /// `None` disables early stopping (the default).
    pub stagnation_limit: Option<usize>,
    /// Random seed for reproducibility. `None` draws one.
    pub seed: Option<u64>,
    /// Evaluate each generation on the rayon pool.
    pub parallel: bool,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            crossover_rate: 0.9,
            mutation_rate: 0.05,
            elite_count: 2,
            selection: SelectionStrategy::default(),
            crossover: CrossoverStrategy::default(),
            mutation: MutationStrategy::default(),
            perturbation_rate: 0.1,
            stagnation_limit: None,
            seed: None,
            parallel: true,
        }
    }
}

impl GeneticParams {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation cap.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the per-gene mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the number of elites.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the parent selection strategy.
    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the crossover operator.
    pub fn with_crossover(mut self, crossover: CrossoverStrategy) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the mutation operator.
    pub fn with_mutation(mut self, mutation: MutationStrategy) -> Self {
        self.mutation = mutation;
        self
    }

    /// Sets the perturbation rate of the initial population.
    pub fn with_perturbation_rate(mut self, rate: f64) -> Self {
        self.perturbation_rate = rate;
        self
    }

    /// Enables early stopping after `generations` without improvement.
    pub fn with_stagnation_limit(mut self, generations: usize) -> Self {
        self.stagnation_limit = Some(generations);
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks every parameter range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10..=200).contains(&self.population_size) {
            return Err(ConfigError::PopulationSize(self.population_size));
        }
        if !(10..=500).contains(&self.max_generations) {
            return Err(ConfigError::MaxGenerations(self.max_generations));
        }
        if !is_probability(self.crossover_rate) {
            return Err(ConfigError::CrossoverRate(self.crossover_rate));
        }
        if !is_probability(self.mutation_rate) {
            return Err(ConfigError::MutationRate(self.mutation_rate));
        }
        if !is_probability(self.perturbation_rate) {
            return Err(ConfigError::PerturbationRate(self.perturbation_rate));
        }
        if self.elite_count > 10 || self.elite_count >= self.population_size {
            return Err(ConfigError::EliteCount {
                elite: self.elite_count,
                population: self.population_size,
            });
        }
        if let SelectionStrategy::Tournament { size } = self.selection {
            if !(2..=self.population_size).contains(&size) {
                return Err(ConfigError::TournamentSize {
                    size,
                    population: self.population_size,
                });
            }
        }
        if self.stagnation_limit == Some(0) {
            return Err(ConfigError::StagnationLimit);
        }
        Ok(())
    }
}

fn is_probability(rate: f64) -> bool {
    (0.0..=1.0).contains(&rate)
}
