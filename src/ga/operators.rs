//! Roster crossover and mutation.
//!
//! Each strategy enum dispatches by exhaustive `match`; the operator set is
//! closed. Parent selection is delegated to `u_metaheur::ga::Selection`.
//!
//! # Reference
//! Syswerda (1989), "Uniform Crossover in Genetic Algorithms"

use rand::prelude::IndexedRandom;
use rand::Rng;

use super::chromosome::RosterChromosome;
use super::config::{CrossoverStrategy, MutationStrategy};
use crate::feasibility::{FeasibilityTensor, PersonIdx};

impl CrossoverStrategy {
    /// Produces one child from two parents of equal length.
    pub fn apply<R: Rng>(
        &self,
        a: &RosterChromosome,
        b: &RosterChromosome,
        rng: &mut R,
    ) -> RosterChromosome {
        let genes = match self {
            CrossoverStrategy::Uniform => uniform_crossover(&a.genes, &b.genes, rng),
            CrossoverStrategy::SinglePoint => single_point_crossover(&a.genes, &b.genes, rng),
        };
        RosterChromosome::new(genes)
    }
}

impl MutationStrategy {
    /// Mutates each gene independently with probability `rate`.
    pub fn apply<R: Rng>(
        &self,
        chromosome: &mut RosterChromosome,
        tensor: &FeasibilityTensor,
        rate: f64,
        rng: &mut R,
    ) {
        match self {
            MutationStrategy::Swap => swap_mutation(&mut chromosome.genes, tensor, rate, rng),
        }
    }
}

/// Each gene from `a` or `b` with probability 0.5.
pub fn uniform_crossover<R: Rng>(
    a: &[Option<PersonIdx>],
    b: &[Option<PersonIdx>],
    rng: &mut R,
) -> Vec<Option<PersonIdx>> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| if rng.random_bool(0.5) { x } else { y })
        .collect()
}

/// Prefix of `a` up to a random cut, suffix of `b` after it.
pub fn single_point_crossover<R: Rng>(
    a: &[Option<PersonIdx>],
    b: &[Option<PersonIdx>],
    rng: &mut R,
) -> Vec<Option<PersonIdx>> {
    let n = a.len().min(b.len());
    if n < 2 {
        return a.to_vec();
    }
    let cut = rng.random_range(1..n);
    a[..cut].iter().chain(&b[cut..n]).copied().collect()
}

/// Per gene with probability `rate`: reassign to a uniformly chosen
/// eligible candidate, other than the current occupant when possible.
pub fn swap_mutation<R: Rng>(
    genes: &mut [Option<PersonIdx>],
    tensor: &FeasibilityTensor,
    rate: f64,
    rng: &mut R,
) {
    if rate <= 0.0 {
        return;
    }
    for (gene, &cell) in genes.iter_mut().zip(tensor.open_cells()) {
        if !rng.random_bool(rate) {
            continue;
        }
        *gene = reassign(*gene, tensor.eligible(cell), rng);
    }
}

fn reassign<R: Rng>(
    current: Option<PersonIdx>,
    eligible: &[PersonIdx],
    rng: &mut R,
) -> Option<PersonIdx> {
    match current {
        Some(occupant) if eligible.len() > 1 => {
            let others: Vec<PersonIdx> = eligible.iter().copied().filter(|&p| p != occupant).collect();
            others.choose(rng).copied().or(current)
        }
        _ => eligible.choose(rng).copied().or(current),
    }
}
