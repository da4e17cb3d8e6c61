//! Evolutionary loop.
//!
//! [`GeneticOptimizer`] maps [`GeneticParams`] onto a `u_metaheur` GA
//! configuration and drives `GaRunner` over a [`RosterProblem`] built from
//! the greedy seed. The runner keeps the best individual ever seen, and the
//! seed is always in the initial population, so the result never scores
//! worse than the seed.

use u_metaheur::ga::{GaConfig, GaProblem, GaRunner};

use super::chromosome::RosterChromosome;
use super::config::GeneticParams;
use super::problem::RosterProblem;
use crate::error::ConfigError;
use crate::feasibility::{FeasibilityTensor, PersonIdx};
use crate::fitness::{Fitness, Scorer};
use crate::progress::{CancellationToken, NullSink, ProgressScale};

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct GeneticOutcome {
    /// Best individual found during the entire run.
    pub best: RosterChromosome,
    /// Fitness of the greedy seed.
    pub seed_fitness: Fitness,
    /// Generations completed.
    pub generations: usize,
    /// Stopped by the stagnation limit.
    pub stagnated: bool,
    /// Stopped by the cancellation token.
    pub cancelled: bool,
    /// Scalar best fitness after initialization and after each generation.
    pub history: Vec<f64>,
}

impl GeneticOutcome {
    /// Fitness of the best individual.
    pub fn best_fitness(&self) -> Fitness {
        self.best.fitness
    }
}

/// Genetic refinement of a seed roster.
///
/// # Usage
///
/// ```ignore
/// let optimizer = GeneticOptimizer::new(&tensor, Scorer::new(&tensor, &set), &params);
/// let outcome = optimizer.run(&greedy.roster)?;
/// assert!(outcome.best_fitness() <= outcome.seed_fitness);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GeneticOptimizer<'a> {
    tensor: &'a FeasibilityTensor,
    scorer: Scorer<'a>,
    params: &'a GeneticParams,
}

impl<'a> GeneticOptimizer<'a> {
    /// Creates an optimizer over `tensor`, scoring with `scorer`.
    pub fn new(tensor: &'a FeasibilityTensor, scorer: Scorer<'a>, params: &'a GeneticParams) -> Self {
        Self {
            tensor,
            scorer,
            params,
        }
    }

    /// Runs to completion without progress reporting.
    pub fn run(&self, seed: &[Option<PersonIdx>]) -> Result<GeneticOutcome, ConfigError> {
        let scale = ProgressScale::new(&NullSink, 0.0, 100.0, 0);
        self.run_with(seed, &scale, &CancellationToken::new())
    }

    /// Runs, reporting after each generation and checking `cancel` at the
    /// start of each one.
    pub(crate) fn run_with(
        &self,
        seed: &[Option<PersonIdx>],
        progress: &ProgressScale<'_>,
        cancel: &CancellationToken,
    ) -> Result<GeneticOutcome, ConfigError> {
        self.params.validate()?;
        let config = ga_config(self.params);
        let problem =
            RosterProblem::new(self.tensor, self.scorer, seed, self.params).with_progress(progress);
        let seed_fitness = problem.evaluate(problem.seed());

        let result = GaRunner::run_with_cancel(&problem, &config, Some(cancel.flag()));
        Ok(GeneticOutcome {
            best: result.best,
            seed_fitness,
            generations: result.generations,
            stagnated: result.stagnated,
            cancelled: result.cancelled,
            history: result.fitness_history,
        })
    }
}

/// Runner configuration for validated `params`.
///
/// Mutation is applied per gene inside the problem, so the runner mutates
/// every offspring.
fn ga_config(params: &GeneticParams) -> GaConfig {
    let population = params.population_size;
    // The runner floors `population * ratio`; the half keeps it exact.
    let elite_ratio = (params.elite_count as f64 + 0.5) / population as f64;
    let config = GaConfig::default()
        .with_population_size(population)
        .with_max_generations(params.max_generations)
        .with_selection(params.selection.into())
        .with_elite_ratio(elite_ratio)
        .with_crossover_rate(params.crossover_rate)
        .with_mutation_rate(1.0)
        .with_stagnation_limit(params.stagnation_limit.unwrap_or(0))
        .with_parallel(params.parallel);
    match params.seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}
