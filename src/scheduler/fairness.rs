//! Run-local fairness counters.

use crate::feasibility::PersonIdx;
use crate::models::{Personnel, TimeSlot, SLOTS_PER_DAY};

/// Running assignment counters per person, overall and per slot of day.
///
/// Seeded from the personnel records and then updated as the run assigns
/// cells. The records themselves are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FairnessTable {
    totals: Vec<u32>,
    per_slot: Vec<[u32; SLOTS_PER_DAY]>,
}

impl FairnessTable {
    /// Copies the counters of `personnel`, indexed in the same order.
    pub fn from_personnel(personnel: &[Personnel]) -> Self {
        Self {
            totals: personnel.iter().map(|p| p.interval_count).collect(),
            per_slot: personnel.iter().map(|p| p.slot_counts).collect(),
        }
    }

    /// A table of zeros.
    pub fn zeros(personnel: usize) -> Self {
        Self {
            totals: vec![0; personnel],
            per_slot: vec![[0; SLOTS_PER_DAY]; personnel],
        }
    }

    /// Records one assignment.
    pub fn record(&mut self, person: PersonIdx, slot: TimeSlot) {
        let p = person as usize;
        self.totals[p] += 1;
        self.per_slot[p][slot.index()] += 1;
    }

    /// Overall count.
    pub fn total(&self, person: PersonIdx) -> u32 {
        self.totals[person as usize]
    }

    /// Count at one slot of day.
    pub fn slot_count(&self, person: PersonIdx, slot: TimeSlot) -> u32 {
        self.per_slot[person as usize][slot.index()]
    }

    /// Ordering key: lower is preferred.
    #[inline]
    pub fn key(&self, person: PersonIdx, slot: TimeSlot) -> (u32, u32) {
        (self.total(person), self.slot_count(person, slot))
    }

    /// Number of people tracked.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether the table tracks nobody.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
