//! Roster GA problem definition.
//!
//! Implements `u_metaheur::ga::GaProblem` for roster refinement: decodes
//! chromosomes, evaluates them and derives the initial population from the
//! greedy seed.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;
use u_metaheur::ga::GaProblem;

use super::chromosome::RosterChromosome;
use super::config::{CrossoverStrategy, GeneticParams, MutationStrategy};
use super::operators::swap_mutation;
use crate::feasibility::{FeasibilityTensor, PersonIdx};
use crate::fitness::{Fitness, Scorer};
use crate::progress::{ProgressScale, Stage};

/// Problem instance shared (read-only) by all evaluation workers.
///
/// The first individual created is the seed itself; every later one is the
/// seed with each gene reassigned with probability `perturbation_rate`.
///
/// # Usage
///
/// ```ignore
/// use u_metaheur::ga::{GaConfig, GaRunner};
///
/// let problem = RosterProblem::new(&tensor, Scorer::new(&tensor, &set), &greedy, &params);
/// let result = GaRunner::run(&problem, &GaConfig::default().with_mutation_rate(1.0));
/// ```
pub struct RosterProblem<'a> {
    tensor: &'a FeasibilityTensor,
    scorer: Scorer<'a>,
    seed: RosterChromosome,
    seed_assigned: usize,
    crossover: CrossoverStrategy,
    mutation: MutationStrategy,
    mutation_rate: f64,
    perturbation_rate: f64,
    max_generations: usize,
    created: AtomicUsize,
    progress: Option<&'a ProgressScale<'a>>,
}

impl<'a> RosterProblem<'a> {
    /// Creates a problem seeded with a dense roster.
    pub fn new(
        tensor: &'a FeasibilityTensor,
        scorer: Scorer<'a>,
        seed: &[Option<PersonIdx>],
        params: &GeneticParams,
    ) -> Self {
        Self {
            tensor,
            scorer,
            seed: RosterChromosome::from_roster(tensor, seed),
            seed_assigned: seed.iter().filter(|o| o.is_some()).count(),
            crossover: params.crossover,
            mutation: params.mutation,
            mutation_rate: params.mutation_rate,
            perturbation_rate: params.perturbation_rate,
            max_generations: params.max_generations,
            created: AtomicUsize::new(0),
            progress: None,
        }
    }

    /// Reports one [`Stage::Generation`] event per completed generation.
    pub(crate) fn with_progress(mut self, progress: &'a ProgressScale<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Returns the tensor chromosomes are decoded against.
    pub fn tensor(&self) -> &'a FeasibilityTensor {
        self.tensor
    }

    /// The unperturbed seed chromosome.
    pub fn seed(&self) -> &RosterChromosome {
        &self.seed
    }
}

impl GaProblem for RosterProblem<'_> {
    type Individual = RosterChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> RosterChromosome {
        let mut individual = self.seed.clone();
        if self.created.fetch_add(1, Ordering::Relaxed) > 0 {
            swap_mutation(&mut individual.genes, self.tensor, self.perturbation_rate, rng);
        }
        individual
    }

    fn evaluate(&self, individual: &RosterChromosome) -> Fitness {
        self.scorer.evaluate(&individual.decode(self.tensor))
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &RosterChromosome,
        parent2: &RosterChromosome,
        rng: &mut R,
    ) -> Vec<RosterChromosome> {
        vec![self.crossover.apply(parent1, parent2, rng)]
    }

    /// Per-gene mutation; the runner is expected to call this for every
    /// offspring.
    fn mutate<R: Rng>(&self, individual: &mut RosterChromosome, rng: &mut R) {
        self.mutation
            .apply(individual, self.tensor, self.mutation_rate, rng);
    }

    fn on_generation(&self, generation: usize, best_fitness: Fitness) {
        tracing::debug!(generation, best = %best_fitness, "generation complete");
        if let Some(progress) = self.progress {
            progress.emit(
                Stage::Generation {
                    index: generation,
                    of: self.max_generations,
                },
                generation as f32 / self.max_generations.max(1) as f32,
                self.seed_assigned,
                None,
            );
        }
    }
}
