//! GA-based roster refinement.
//!
//! Starts from the greedy roster and evolves a population of open-cell
//! assignments with `u_metaheur::ga::GaRunner`. Pinned cells are never
//! encoded, so manual assignments survive every operator unchanged.
//!
//! # Encoding
//!
//! - One gene per open cell (see [`RosterChromosome`]), holding the
//!   assigned person or `None`.
//! - Mutation only draws from the cell's eligible list, so ineligible
//!   assignments cannot appear. Double booking can, and is penalized by
//!   the scorer.
//!
//! # Submodules
//!
//! - [`operators`]: crossover and mutation
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod chromosome;
mod config;
pub mod operators;
mod problem;
mod runner;

pub use chromosome::RosterChromosome;
pub use config::{CrossoverStrategy, GeneticParams, MutationStrategy, SelectionStrategy};
pub use operators::{single_point_crossover, swap_mutation, uniform_crossover};
pub use problem::RosterProblem;
pub use runner::{GeneticOptimizer, GeneticOutcome};
