//! Open-cell chromosome.
//!
//! # Encoding
//!
//! One gene per open cell of the tensor, in ascending cell order. A gene
//! holds the assigned person or `None`. Pinned cells are not encoded;
//! they are shared constants filled in when a chromosome is decoded.

use u_metaheur::ga::{Fitness as GaFitness, Individual};

use crate::feasibility::{FeasibilityTensor, PersonIdx};
use crate::fitness::Fitness;
use crate::scheduler::Roster;

/// Individual of the genetic optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterChromosome {
    /// Occupant per open cell (`tensor.open_cells()[i]`).
    pub genes: Vec<Option<PersonIdx>>,
    /// Fitness, valid once evaluated.
    pub fitness: Fitness,
}

impl Individual for RosterChromosome {
    type Fitness = Fitness;

    fn fitness(&self) -> Fitness {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: Fitness) {
        self.fitness = fitness;
    }
}

impl RosterChromosome {
    /// Creates an unevaluated chromosome.
    pub fn new(genes: Vec<Option<PersonIdx>>) -> Self {
        Self {
            genes,
            fitness: Fitness::worst(),
        }
    }

    /// Extracts the open-cell genes of a full roster.
    pub fn from_roster(tensor: &FeasibilityTensor, roster: &[Option<PersonIdx>]) -> Self {
        Self::new(
            tensor
                .open_cells()
                .iter()
                .map(|&cell| roster.get(cell).copied().flatten())
                .collect(),
        )
    }

    /// Expands into a full roster, pinned cells included.
    pub fn decode(&self, tensor: &FeasibilityTensor) -> Roster {
        let mut roster: Roster = (0..tensor.cell_count()).map(|c| tensor.pinned(c)).collect();
        for (&cell, &gene) in tensor.open_cells().iter().zip(&self.genes) {
            roster[cell] = gene;
        }
        roster
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether there are no open cells.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
