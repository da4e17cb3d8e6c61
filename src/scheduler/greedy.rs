//! Fairness-driven greedy assigner.
//!
//! # Algorithm
//!
//! For each (date, slot) in chronological order:
//! 1. Apply the pinned cells and mark their personnel busy.
//! 2. Order the open cells by eligible-candidate count (fewest first,
//!    position order breaks ties).
//! 3. For each cell pick the free eligible candidate with the lowest
//!    `(total, slot-of-day count, id)` and record the assignment in the
//!    run-local [`FairnessTable`].
//!
//! Candidates come from the tensor's per-cell eligible lists, so the cost
//! is O(cells × avg eligible), not a tensor scan per cell.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use tracing::trace;

use super::{FairnessTable, Roster};
use crate::error::{EngineError, Result};
use crate::feasibility::{CellId, FeasibilityTensor};
use crate::models::Personnel;
use crate::progress::{CancellationToken, NullSink, ProgressScale, Stage};

/// Result of a greedy pass.
#[derive(Debug, Clone)]
pub struct GreedyOutcome {
    /// Occupant per cell, pinned cells included.
    pub roster: Roster,
    /// Open cells left empty, ascending.
    pub unassigned: Vec<CellId>,
    /// Counters after the pass.
    pub fairness: FairnessTable,
}

/// Deterministic greedy assigner.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use duty_roster::feasibility::{ConstraintSet, TensorBuilder};
/// use duty_roster::models::{DateRange, Personnel, Position};
/// use duty_roster::scheduler::GreedyAssigner;
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
/// let set = ConstraintSet::new(
///     DateRange::single(day),
///     vec![Personnel::new("P1"), Personnel::new("P2")],
///     vec![Position::new("Gate")],
/// );
/// let tensor = TensorBuilder::new(&set).build().unwrap();
/// let outcome = GreedyAssigner::new(&tensor, &set.personnel).assign();
/// assert!(outcome.unassigned.is_empty());
/// assert_eq!(outcome.fairness.total(0), 6);
/// assert_eq!(outcome.fairness.total(1), 6);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyAssigner<'a> {
    tensor: &'a FeasibilityTensor,
    personnel: &'a [Personnel],
    check_interval: usize,
}

impl<'a> GreedyAssigner<'a> {
    /// Creates an assigner. `personnel` must be in tensor order.
    pub fn new(tensor: &'a FeasibilityTensor, personnel: &'a [Personnel]) -> Self {
        Self {
            tensor,
            personnel,
            check_interval: 256,
        }
    }

    /// Checks for cancellation every `cells` processed cells.
    pub fn with_check_interval(mut self, cells: usize) -> Self {
        self.check_interval = cells.max(1);
        self
    }

    /// Runs the pass without progress or cancellation.
    pub fn assign(&self) -> GreedyOutcome {
        let token = CancellationToken::new();
        let scale = ProgressScale::new(&NullSink, 0.0, 100.0, self.tensor.cell_count());
        self.run(&scale, &token)
            .unwrap_or_else(|_| unreachable!("a fresh token is never cancelled"))
    }

    /// Runs the pass, reporting once per day and honoring `cancel`.
    ///
    /// # Errors
    /// [`EngineError::Cancelled`] when the token fires.
    pub(crate) fn run(
        &self,
        progress: &ProgressScale<'_>,
        cancel: &CancellationToken,
    ) -> Result<GreedyOutcome> {
        let t = self.tensor;
        let mut roster: Roster = vec![None; t.cell_count()];
        let mut unassigned = Vec::new();
        let mut fairness = FairnessTable::from_personnel(self.personnel);
        // busy[p] == time + 1 when p already works at `time`.
        let mut busy = vec![0usize; t.personnel_count()];
        let mut processed = 0usize;
        let mut assigned = 0usize;
        let mut open = Vec::with_capacity(t.position_count());
        let total_times = t.time_count().max(1);

        for time in 0..t.time_count() {
            let stamp = time + 1;
            open.clear();
            for cell in t.cells_at_time(time) {
                match t.pinned(cell) {
                    Some(p) => {
                        roster[cell] = Some(p);
                        busy[p as usize] = stamp;
                        fairness.record(p, t.slot_of(cell));
                        assigned += 1;
                    }
                    None => open.push(cell),
                }
            }
            open.sort_by_key(|&cell| (t.eligible(cell).len(), cell));

            for &cell in &open {
                processed += 1;
                if processed % self.check_interval == 0 && cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }
                let slot = t.slot_of(cell);
                let chosen = t
                    .eligible(cell)
                    .iter()
                    .copied()
                    .filter(|&p| busy[p as usize] != stamp)
                    .min_by(|&a, &b| {
                        fairness
                            .key(a, slot)
                            .cmp(&fairness.key(b, slot))
                            .then_with(|| t.personnel_id(a).cmp(t.personnel_id(b)))
                    });
                match chosen {
                    Some(p) => {
                        roster[cell] = Some(p);
                        busy[p as usize] = stamp;
                        fairness.record(p, slot);
                        assigned += 1;
                    }
                    None => {
                        trace!(cell = %t.cell_ref(cell), "no free candidate");
                        unassigned.push(cell);
                    }
                }
            }

            if (time + 1) % crate::models::SLOTS_PER_DAY == 0 {
                let last = t.cells_at_time(time).end.saturating_sub(1);
                progress.emit(
                    Stage::Greedy,
                    (time + 1) as f32 / total_times as f32,
                    assigned,
                    Some(t.cell_ref(last)),
                );
            }
        }

        unassigned.sort_unstable();
        Ok(GreedyOutcome {
            roster,
            unassigned,
            fairness,
        })
    }
}
