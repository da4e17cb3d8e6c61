//! Schedule → conflict list.

use std::collections::BTreeMap;

use crate::config::RestDayPolicy;
use crate::error::Result;
use crate::feasibility::{
    explain_ineligibility, ConstraintSet, FeasibilityTensor, PersonIdx, TensorBuilder,
};
use crate::models::{Conflict, ConflictSubtype, Schedule};
use crate::scheduler::{schedule_to_roster, Roster};

/// Derives conflicts from a schedule.
///
/// Detection is a pure function of (schedule, constraint set): nothing is
/// cached between calls and the output is sorted by conflict id, so two
/// calls on the same schedule return identical lists. Schedules edited by
/// hand are accepted as-is; unknown people or cells become hard conflicts.
///
/// # Emitted conflicts
///
/// | Subtype | Type | When |
/// |---------|------|------|
/// | `DoubleBooking` | hard | one person in two cells at one (date, slot) |
/// | `UnknownReference` | hard | person or cell outside the run |
/// | `InvalidInput` | hard | one cell listed twice |
/// | `ManualAssignmentNotHonored` | hard | forced cell empty or staffed by another |
/// | `IneligibleAssignment` | hard | person not eligible for the cell |
/// | `ManualOverride` | info | forced person is ineligible under the rules |
/// | `RestInterval` | soft | fewer than `min_rest_slots` idle slots between duties |
/// | `WorkloadImbalance` | soft | total deviates from the mean beyond tolerance |
/// | `RestDayDuty` | soft | duty on a rest day under the soft policy |
/// | `NoCandidates` / `Unfilled` | unassigned | empty open cell |
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'a> {
    set: &'a ConstraintSet,
    tensor: &'a FeasibilityTensor,
}

impl<'a> ConflictDetector<'a> {
    /// Creates a detector. The tensor must have been built from `set`.
    pub fn new(set: &'a ConstraintSet, tensor: &'a FeasibilityTensor) -> Self {
        Self { set, tensor }
    }

    /// All conflicts of `schedule`, sorted by id.
    pub fn detect(&self, schedule: &Schedule) -> Vec<Conflict> {
        let projection = schedule_to_roster(self.tensor, schedule);
        let mut out = Vec::new();

        self.reference_conflicts(schedule, &mut out);
        for &cell in &projection.duplicate_cells {
            out.push(
                Conflict::new(ConflictSubtype::InvalidInput, "Cell listed more than once")
                    .with_cell(self.tensor.cell_ref(cell)),
            );
        }
        self.double_bookings(schedule, &mut out);
        self.cell_conflicts(&projection.roster, &mut out);
        self.rest_intervals(&projection.roster, &mut out);
        self.workload_imbalance(&projection.roster, &mut out);

        out.sort_by(|a, b| a.id.cmp(&b.id));
        out.dedup_by(|a, b| a.id == b.id);
        out
    }

    fn reference_conflicts(&self, schedule: &Schedule, out: &mut Vec<Conflict>) {
        for shift in &schedule.shifts {
            let Some(pid) = shift.personnel_id.as_deref() else {
                continue;
            };
            if self.tensor.find_cell(&shift.position_id, shift.date, shift.slot).is_none() {
                out.push(
                    Conflict::new(
                        ConflictSubtype::UnknownReference,
                        format!("Shift {} lies outside the run's positions or horizon", shift.id),
                    )
                    .with_shift(shift.id.clone()),
                );
            }
            if self.tensor.personnel_idx(pid).is_none() {
                out.push(
                    Conflict::new(
                        ConflictSubtype::UnknownReference,
                        format!("Shift {} is staffed by unknown personnel '{pid}'", shift.id),
                    )
                    .with_shift(shift.id.clone())
                    .with_personnel(pid),
                );
            }
        }
    }

    fn double_bookings(&self, schedule: &Schedule, out: &mut Vec<Conflict>) {
        for ((date, slot, pid), shifts) in schedule.occupancy() {
            if shifts.len() < 2 {
                continue;
            }
            let mut conflict = Conflict::new(
                ConflictSubtype::DoubleBooking,
                format!("{pid} is booked {} times on {date} {slot}", shifts.len()),
            )
            .with_personnel(pid);
            for shift in shifts {
                conflict = conflict.with_shift(shift.id.clone());
            }
            out.push(conflict);
        }
    }

    fn cell_conflicts(&self, roster: &[Option<PersonIdx>], out: &mut Vec<Conflict>) {
        let t = self.tensor;
        let soft_rest_days = self.set.config.rest_day_policy == RestDayPolicy::Soft;
        let builder = TensorBuilder::new(self.set);

        for (cell, &occupant) in roster.iter().enumerate() {
            let cell_ref = t.cell_ref(cell);

            if let Some(forced) = t.pinned(cell) {
                let forced_id = t.personnel_id(forced);
                if occupant != Some(forced) {
                    out.push(
                        Conflict::new(
                            ConflictSubtype::ManualAssignmentNotHonored,
                            format!("{cell_ref} is assigned to {forced_id} by a manual assignment"),
                        )
                        .with_cell(cell_ref.clone())
                        .with_personnel(forced_id),
                    );
                } else if let Some(reason) = builder.rule_reason(
                    forced as usize,
                    t.position_of(cell),
                    t.is_rest_day(t.day_of(cell)),
                    t.slot_of(cell),
                ) {
                    out.push(
                        Conflict::new(
                            ConflictSubtype::ManualOverride,
                            format!("Manual assignment of {forced_id} to {cell_ref} overrides: {reason}"),
                        )
                        .with_cell(cell_ref.clone())
                        .with_personnel(forced_id),
                    );
                }
            }

            let Some(p) = occupant else {
                if t.pinned(cell).is_none() {
                    let subtype = if t.eligible(cell).is_empty() {
                        ConflictSubtype::NoCandidates
                    } else {
                        ConflictSubtype::Unfilled
                    };
                    let message = match subtype {
                        ConflictSubtype::NoCandidates => format!("No eligible personnel for {cell_ref}"),
                        _ => format!("{cell_ref} is unassigned"),
                    };
                    out.push(Conflict::new(subtype, message).with_cell(cell_ref));
                }
                continue;
            };
            let pid = t.personnel_id(p);

            // A pinned cell staffed by someone else is already reported.
            if t.pinned(cell).is_none() || t.pinned(cell) == Some(p) {
                if let Some(reason) = explain_ineligibility(self.set, t, p, cell) {
                    out.push(
                        Conflict::new(
                            ConflictSubtype::IneligibleAssignment,
                            format!("{pid} may not staff {cell_ref}: {reason}"),
                        )
                        .with_cell(cell_ref.clone())
                        .with_personnel(pid),
                    );
                }
            }

            if soft_rest_days
                && self.set.personnel[p as usize].observes_rest_days()
                && t.is_rest_day(t.day_of(cell))
            {
                out.push(
                    Conflict::new(
                        ConflictSubtype::RestDayDuty,
                        format!("{pid} is on duty on rest day {}", cell_ref.date),
                    )
                    .with_cell(cell_ref)
                    .with_personnel(pid),
                );
            }
        }
    }

    fn rest_intervals(&self, roster: &[Option<PersonIdx>], out: &mut Vec<Conflict>) {
        let min_rest = self.set.config.min_rest_slots as usize;
        if min_rest == 0 {
            return;
        }
        let t = self.tensor;
        // Last (time, cell) each person worked.
        let mut last: Vec<Option<(usize, usize)>> = vec![None; t.personnel_count()];
        for (cell, occupant) in roster.iter().enumerate() {
            let Some(p) = *occupant else { continue };
            let time = t.time_of(cell);
            let entry = &mut last[p as usize];
            match *entry {
                Some((prev_time, _)) if prev_time == time => continue,
                Some((prev_time, prev_cell)) if time - prev_time - 1 < min_rest => {
                    let pid = t.personnel_id(p);
                    out.push(
                        Conflict::new(
                            ConflictSubtype::RestInterval,
                            format!(
                                "{pid} rests {} slot(s) between {} and {}, minimum is {min_rest}",
                                time - prev_time - 1,
                                t.cell_ref(prev_cell),
                                t.cell_ref(cell)
                            ),
                        )
                        .with_shift(t.cell_ref(prev_cell).shift_id())
                        .with_shift(t.cell_ref(cell).shift_id())
                        .with_personnel(pid),
                    );
                }
                _ => {}
            }
            *entry = Some((time, cell));
        }
    }

    fn workload_imbalance(&self, roster: &Roster, out: &mut Vec<Conflict>) {
        let t = self.tensor;
        let mut shifts = vec![0usize; t.personnel_count()];
        for p in roster.iter().flatten() {
            shifts[*p as usize] += 1;
        }
        // Totals include the workload carried in from earlier rosters.
        let counted: BTreeMap<usize, usize> = shifts
            .iter()
            .enumerate()
            .filter(|&(p, &n)| n > 0 || self.set.personnel[p].is_active())
            .map(|(p, &n)| (p, n + self.set.personnel[p].interval_count as usize))
            .collect();
        if counted.len() < 2 {
            return;
        }
        let mean = counted.values().sum::<usize>() as f64 / counted.len() as f64;
        let tolerance = self.set.config.imbalance_tolerance;
        for (&p, &n) in &counted {
            let deviation = n as f64 - mean;
            if deviation.abs() > tolerance {
                let pid = t.personnel_id(p as PersonIdx);
                out.push(
                    Conflict::new(
                        ConflictSubtype::WorkloadImbalance,
                        format!("{pid} has {n} shift(s) in total, mean is {mean:.1}"),
                    )
                    .with_personnel(pid),
                );
            }
        }
    }
}

/// Builds the tensor for `set` and detects the conflicts of `schedule`.
///
/// # Errors
/// Propagates tensor construction failures (invalid manual assignments,
/// starved positions).
pub fn detect_conflicts(set: &ConstraintSet, schedule: &Schedule) -> Result<Vec<Conflict>> {
    let tensor = TensorBuilder::new(set).build()?;
    Ok(ConflictDetector::new(set, &tensor).detect(schedule))
}
