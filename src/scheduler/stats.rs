//! Schedule statistics.
//!
//! Summarizes a finished schedule against the run's constraint set.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total | Shifts staffed by one person |
//! | Per-slot | Shifts per slot of day |
//! | Rest-day shifts | Shifts on rest days (personnel subject to them) |
//! | Coverage | filled / cells, per position |
//! | Fill rate | staffed / cells, whole horizon |
//! | Workload variance | Population variance of per-person totals |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::feasibility::ConstraintSet;
use crate::models::{Schedule, SLOTS_PER_DAY};

/// Per-person summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonnelStats {
    pub personnel_id: String,
    /// Shifts in this schedule.
    pub total: u32,
    /// Shifts per slot of day.
    pub per_slot: [u32; SLOTS_PER_DAY],
    /// Shifts served on rest days.
    pub rest_day_shifts: u32,
}

/// Per-position summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    pub position_id: String,
    pub filled: u32,
    pub unfilled: u32,
    /// filled / (filled + unfilled), 0.0..=1.0.
    pub coverage: f64,
}

/// Schedule-wide statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// One entry per run personnel, in run order.
    pub personnel: Vec<PersonnelStats>,
    /// One entry per run position, in run order.
    pub positions: Vec<PositionStats>,
    /// Cells in the schedule.
    pub total_cells: usize,
    /// Staffed cells.
    pub assigned_cells: usize,
    /// assigned / total, 0.0..=1.0.
    pub fill_rate: f64,
    /// Variance of per-person totals.
    pub workload_variance: f64,
}

impl ScheduleStats {
    /// Computes statistics for a schedule.
    ///
    /// Shifts of positions or personnel outside the run count towards the
    /// horizon totals only.
    pub fn calculate(schedule: &Schedule, set: &ConstraintSet) -> Self {
        let person_index: HashMap<&str, usize> = set
            .personnel
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.as_str(), i))
            .collect();
        let position_index: HashMap<&str, usize> = set
            .positions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.as_str(), i))
            .collect();

        let mut personnel: Vec<PersonnelStats> = set
            .personnel
            .iter()
            .map(|p| PersonnelStats {
                personnel_id: p.id.clone(),
                total: 0,
                per_slot: [0; SLOTS_PER_DAY],
                rest_day_shifts: 0,
            })
            .collect();
        let mut filled = vec![0u32; set.positions.len()];
        let mut unfilled = vec![0u32; set.positions.len()];

        for shift in &schedule.shifts {
            if let Some(&q) = position_index.get(shift.position_id.as_str()) {
                if shift.is_assigned() {
                    filled[q] += 1;
                } else {
                    unfilled[q] += 1;
                }
            }
            let Some(pid) = shift.personnel_id.as_deref() else {
                continue;
            };
            let Some(&p) = person_index.get(pid) else {
                continue;
            };
            let entry = &mut personnel[p];
            entry.total += 1;
            entry.per_slot[shift.slot.index()] += 1;
            let rest_day = set
                .holidays
                .as_ref()
                .is_some_and(|h| h.is_rest_day(shift.date));
            if rest_day && set.personnel[p].observes_rest_days() {
                entry.rest_day_shifts += 1;
            }
        }

        let positions = set
            .positions
            .iter()
            .enumerate()
            .map(|(q, pos)| {
                let cells = filled[q] + unfilled[q];
                PositionStats {
                    position_id: pos.id.clone(),
                    filled: filled[q],
                    unfilled: unfilled[q],
                    coverage: if cells == 0 {
                        0.0
                    } else {
                        filled[q] as f64 / cells as f64
                    },
                }
            })
            .collect();

        let totals: Vec<f64> = personnel.iter().map(|p| p.total as f64).collect();
        let total_cells = schedule.shift_count();
        let assigned_cells = schedule.assigned_count();

        Self {
            personnel,
            positions,
            total_cells,
            assigned_cells,
            fill_rate: if total_cells == 0 {
                0.0
            } else {
                assigned_cells as f64 / total_cells as f64
            },
            workload_variance: population_variance(&totals),
        }
    }

    /// Statistics of one person.
    pub fn for_personnel(&self, id: &str) -> Option<&PersonnelStats> {
        self.personnel.iter().find(|p| p.personnel_id == id)
    }

    /// Statistics of one position.
    pub fn for_position(&self, id: &str) -> Option<&PositionStats> {
        self.positions.iter().find(|q| q.position_id == id)
    }
}

/// Population variance; 0.0 for fewer than two values.
pub(crate) fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}
