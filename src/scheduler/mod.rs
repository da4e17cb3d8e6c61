//! Greedy construction, fairness tracking and schedule statistics.
//!
//! # Algorithm
//!
//! `GreedyAssigner` walks the open cells in (date, slot, scarcity) order
//! and staffs each with the fairest free candidate. It is deterministic
//! and near-linear in the number of cells, and serves both as the fast
//! mode and as the genetic seed.
//!
//! # Statistics
//!
//! `ScheduleStats` summarizes a schedule per person (totals, slot-of-day
//! counts, rest-day duties) and per position (fill and coverage).
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review"

mod fairness;
mod greedy;
mod stats;

pub use fairness::FairnessTable;
pub use greedy::{GreedyAssigner, GreedyOutcome};
pub use stats::{PersonnelStats, PositionStats, ScheduleStats};

pub(crate) use stats::population_variance;

use crate::feasibility::{CellId, FeasibilityTensor, PersonIdx};
use crate::models::{Schedule, Shift};

/// Dense assignment over every cell of a tensor (`roster[cell]`).
pub type Roster = Vec<Option<PersonIdx>>;

/// Materializes a roster as a [`Schedule`], shifts in cell order.
pub fn roster_to_schedule(tensor: &FeasibilityTensor, roster: &[Option<PersonIdx>]) -> Schedule {
    let mut schedule = Schedule::new(tensor.horizon());
    for (cell, occupant) in roster.iter().enumerate() {
        let r = tensor.cell_ref(cell);
        let mut shift = Shift::new(r.position_id, r.date, r.slot);
        if let Some(p) = occupant {
            shift = shift.with_personnel(tensor.personnel_id(*p));
        }
        if tensor.pinned(cell).is_some() {
            shift = shift.pinned();
        }
        schedule.add_shift(shift);
    }
    schedule
}

/// Projection of a [`Schedule`] onto a tensor.
#[derive(Debug, Clone, Default)]
pub struct RosterProjection {
    /// Occupant per cell.
    pub roster: Roster,
    /// Staffed shifts whose person or cell lies outside the run.
    pub unknown: usize,
    /// Cells listed more than once (later entries win).
    pub duplicate_cells: Vec<CellId>,
}

/// Projects a schedule onto the tensor's cells. Missing cells are empty.
pub fn schedule_to_roster(tensor: &FeasibilityTensor, schedule: &Schedule) -> RosterProjection {
    let mut projection = RosterProjection {
        roster: vec![None; tensor.cell_count()],
        ..RosterProjection::default()
    };
    let mut seen = vec![false; tensor.cell_count()];
    for shift in &schedule.shifts {
        let Some(cell) = tensor.find_cell(&shift.position_id, shift.date, shift.slot) else {
            if shift.is_assigned() {
                projection.unknown += 1;
            }
            continue;
        };
        if seen[cell] {
            projection.duplicate_cells.push(cell);
        }
        seen[cell] = true;
        projection.roster[cell] = match shift.personnel_id.as_deref() {
            None => None,
            Some(id) => match tensor.personnel_idx(id) {
                Some(p) => Some(p),
                None => {
                    projection.unknown += 1;
                    None
                }
            },
        };
    }
    projection
}
