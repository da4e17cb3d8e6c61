//! Schedule scoring.
//!
//! Every candidate schedule is scored as a [`Fitness`] pair
//! `(hard, soft)` compared lexicographically: any hard violation
//! outweighs every soft penalty.
//!
//! # Hard violations
//! - a person in two cells of the same (date, slot)
//! - a person in a cell they are not eligible for
//! - a forced cell that is empty or staffed by someone else
//! - shifts referencing people or cells outside the run
//!
//! # Soft penalty
//! ```text
//! soft = w_var · Var(interval_count + shifts)
//!      + w_rest · rest-interval violations
//!      + w_open · empty open cells
//!      + w_rd · rest-day duties        (soft rest-day policy only)
//! ```
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering", §4

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use u_metaheur::ga::Fitness as GaFitness;

use crate::config::{RestDayPolicy, ScoringWeights};
use crate::feasibility::{ConstraintSet, FeasibilityTensor, PersonIdx};
use crate::models::Schedule;
use crate::scheduler::{population_variance, schedule_to_roster, FairnessTable};

/// Lexicographic schedule fitness. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Fitness {
    /// Hard-violation count.
    pub hard: u32,
    /// Weighted soft penalty.
    pub soft: f64,
}

impl Fitness {
    /// Creates a fitness from its two components.
    pub fn new(hard: u32, soft: f64) -> Self {
        Self { hard, soft }
    }

    /// Whether the schedule has no hard violations.
    pub fn is_feasible(&self) -> bool {
        self.hard == 0
    }

    /// Total order: hard count first, then soft penalty.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.hard
            .cmp(&other.hard)
            .then_with(|| self.soft.total_cmp(&other.soft))
    }

}

/// Scalar view for the evolutionary runner: one hard violation weighs
/// `1e6`. Ordering stays lexicographic through `PartialOrd`.
impl GaFitness for Fitness {
    fn worst() -> Self {
        Fitness::new(u32::MAX, f64::INFINITY)
    }

    fn to_f64(self) -> f64 {
        self.hard as f64 * 1e6 + self.soft
    }
}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(hard={}, soft={:.3})", self.hard, self.soft)
    }
}

/// Raw violation counts behind a [`Fitness`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub double_bookings: u32,
    pub ineligible: u32,
    pub forced_unmet: u32,
    pub unknown_references: u32,
    pub workload_variance: f64,
    pub rest_interval_violations: u32,
    pub unassigned_open: u32,
    pub rest_day_duties: u32,
}

impl ScoreBreakdown {
    /// Hard-violation count.
    pub fn hard(&self) -> u32 {
        self.double_bookings + self.ineligible + self.forced_unmet + self.unknown_references
    }

    /// Weighted soft penalty.
    pub fn soft(&self, weights: &ScoringWeights) -> f64 {
        weights.workload_variance * self.workload_variance
            + weights.rest_interval * self.rest_interval_violations as f64
            + weights.unassigned * self.unassigned_open as f64
            + weights.rest_day_duty * self.rest_day_duties as f64
    }

    /// Combined fitness.
    pub fn fitness(&self, weights: &ScoringWeights) -> Fitness {
        Fitness::new(self.hard(), self.soft(weights))
    }
}

/// Scores rosters against one tensor and constraint set.
///
/// Holds only shared references and is `Sync`, so one scorer serves all
/// evaluation workers.
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    tensor: &'a FeasibilityTensor,
    set: &'a ConstraintSet,
}

impl<'a> Scorer<'a> {
    /// Creates a scorer. The tensor must have been built from `set`.
    pub fn new(tensor: &'a FeasibilityTensor, set: &'a ConstraintSet) -> Self {
        Self { tensor, set }
    }

    /// Fitness of a dense roster.
    pub fn evaluate(&self, roster: &[Option<PersonIdx>]) -> Fitness {
        self.breakdown(roster).fitness(&self.set.config.weights)
    }

    /// Fitness of a schedule, possibly edited by hand.
    pub fn score_schedule(&self, schedule: &Schedule) -> Fitness {
        let projection = schedule_to_roster(self.tensor, schedule);
        let mut breakdown = self.breakdown(&projection.roster);
        breakdown.unknown_references +=
            (projection.unknown + projection.duplicate_cells.len()) as u32;
        breakdown.fitness(&self.set.config.weights)
    }

    /// Violation counts of a dense roster.
    pub fn breakdown(&self, roster: &[Option<PersonIdx>]) -> ScoreBreakdown {
        let t = self.tensor;
        let config = &self.set.config;
        let people = t.personnel_count();
        let mut out = ScoreBreakdown::default();

        // Workload carried in from earlier rosters plus this one.
        let mut workload = FairnessTable::from_personnel(&self.set.personnel);
        let mut worked = vec![false; people];
        // Last time index each person worked, offset by one (0 = never).
        let mut last_time = vec![0usize; people];
        let soft_rest_days = config.rest_day_policy == RestDayPolicy::Soft;

        // Cells are time-major, so each person's times arrive ascending.
        for (cell, occupant) in roster.iter().enumerate().take(t.cell_count()) {
            let pinned = t.pinned(cell);
            if pinned.is_some() && *occupant != pinned {
                out.forced_unmet += 1;
            }
            let Some(p) = *occupant else {
                if pinned.is_none() {
                    out.unassigned_open += 1;
                }
                continue;
            };
            if p as usize >= people {
                out.unknown_references += 1;
                continue;
            }
            if !t.is_eligible(p, cell) {
                out.ineligible += 1;
            }
            let time = t.time_of(cell);
            let pi = p as usize;
            if last_time[pi] == time + 1 {
                out.double_bookings += 1;
            } else {
                if last_time[pi] > 0 {
                    let gap = time - last_time[pi];
                    if (gap as u32) < config.min_rest_slots {
                        out.rest_interval_violations += 1;
                    }
                }
                last_time[pi] = time + 1;
            }
            workload.record(p, t.slot_of(cell));
            worked[pi] = true;
            if soft_rest_days
                && self.set.personnel[pi].observes_rest_days()
                && t.is_rest_day(t.day_of(cell))
            {
                out.rest_day_duties += 1;
            }
        }

        let counted: Vec<f64> = (0..people)
            .filter(|&p| worked[p] || self.set.personnel[p].is_active())
            .map(|p| workload.total(p as PersonIdx) as f64)
            .collect();
        out.workload_variance = population_variance(&counted);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::feasibility::TensorBuilder;
    use crate::models::{
        DateRange, HolidayConfig, ManualAssignment, Personnel, Position, ShiftId, TimeSlot,
    };
    use crate::scheduler::{roster_to_schedule, GreedyAssigner};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn slot(i: u8) -> TimeSlot {
        TimeSlot::new(i).unwrap()
    }

    fn sample_set() -> ConstraintSet {
        ConstraintSet::new(
            DateRange::single(day()),
            vec![Personnel::new("P1"), Personnel::new("P2"), Personnel::new("P3")],
            vec![Position::new("A"), Position::new("B")],
        )
    }

    #[test]
    fn test_fitness_ordering() {
        let a = Fitness::new(0, 100.0);
        let b = Fitness::new(1, 0.0);
        let c = Fitness::new(0, 5.0);
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a.total_cmp(&a), Ordering::Equal);
        assert!(c.to_f64() < a.to_f64());
        assert!(a.to_f64() < b.to_f64());
        assert!(Fitness::worst() > b);
    }

    #[test]
    fn test_greedy_roster_is_feasible() {
        let set = sample_set();
        let t = TensorBuilder::new(&set).build().unwrap();
        let roster = GreedyAssigner::new(&t, &set.personnel).assign().roster;
        let b = Scorer::new(&t, &set).breakdown(&roster);
        assert_eq!(b.hard(), 0);
        assert_eq!(b.unassigned_open, 0);
        // 24 cells over 3 people.
        assert!(b.workload_variance.abs() < 1e-12);
    }

    #[test]
    fn test_variance_counts_carried_workload() {
        let set = ConstraintSet::new(
            DateRange::single(day()),
            vec![Personnel::new("P1").with_interval_count(10), Personnel::new("P2")],
            vec![Position::new("A")],
        )
        .with_config(EngineConfig::default().with_min_rest_slots(0));
        let t = TensorBuilder::new(&set).build().unwrap();
        let scorer = Scorer::new(&t, &set);
        let cells: Vec<_> = (0..12).map(|s| t.find_cell("A", day(), slot(s)).unwrap()).collect();

        // 1 + 10 and 11 + 0.
        let mut catch_up = vec![None; t.cell_count()];
        for (i, &cell) in cells.iter().enumerate() {
            catch_up[cell] = Some(if i == 0 { 0 } else { 1 });
        }
        // 6 + 10 and 6 + 0.
        let mut even = vec![None; t.cell_count()];
        for (i, &cell) in cells.iter().enumerate() {
            even[cell] = Some((i % 2) as PersonIdx);
        }
        assert!(scorer.breakdown(&catch_up).workload_variance.abs() < 1e-12);
        assert!((scorer.breakdown(&even).workload_variance - 25.0).abs() < 1e-12);
        assert!(scorer.evaluate(&catch_up) < scorer.evaluate(&even));

        let greedy = GreedyAssigner::new(&t, &set.personnel).assign().roster;
        assert_eq!(scorer.evaluate(&greedy), scorer.evaluate(&catch_up));
    }

    #[test]
    fn test_double_booking_and_ineligible_are_hard() {
        let mut set = sample_set();
        set.positions[1] = Position::new("B").with_allowed("P2");
        let t = TensorBuilder::new(&set).build().unwrap();
        let mut roster = vec![None; t.cell_count()];
        let a0 = t.find_cell("A", day(), slot(0)).unwrap();
        let b0 = t.find_cell("B", day(), slot(0)).unwrap();
        roster[a0] = Some(0);
        roster[b0] = Some(0);
        let b = Scorer::new(&t, &set).breakdown(&roster);
        assert_eq!(b.double_bookings, 1);
        assert_eq!(b.ineligible, 1);
        assert_eq!(b.hard(), 2);
        assert_eq!(b.unassigned_open, 22);
    }

    #[test]
    fn test_forced_cell_unmet() {
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P3", "A", day(), slot(5)));
        let t = TensorBuilder::new(&set).build().unwrap();
        let mut roster = GreedyAssigner::new(&t, &set.personnel).assign().roster;
        let forced = t.find_cell("A", day(), slot(5)).unwrap();
        assert_eq!(Scorer::new(&t, &set).evaluate(&roster).hard, 0);

        roster[forced] = None;
        let b = Scorer::new(&t, &set).breakdown(&roster);
        assert_eq!(b.forced_unmet, 1);
        // An empty forced cell is not an open-cell coverage gap.
        assert_eq!(b.unassigned_open, 0);
    }

    #[test]
    fn test_rest_interval() {
        let set = sample_set().with_config(EngineConfig::default().with_min_rest_slots(2));
        let t = TensorBuilder::new(&set).build().unwrap();
        let mut roster = vec![None; t.cell_count()];
        // P1 at slots 0, 2 (gap 1) and 5 (gap 2).
        for s in [0, 2, 5] {
            roster[t.find_cell("A", day(), slot(s)).unwrap()] = Some(0);
        }
        let b = Scorer::new(&t, &set).breakdown(&roster);
        assert_eq!(b.rest_interval_violations, 1);
    }

    #[test]
    fn test_soft_rest_day_duty() {
        // Saturday.
        let sat = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        let mut set = sample_set().with_holidays(HolidayConfig::new("H"));
        set.horizon = DateRange::single(sat);
        set.personnel[1] = Personnel::new("P2").exempt_from_rest_days();
        let t = TensorBuilder::new(&set).build().unwrap();
        let mut roster = vec![None; t.cell_count()];
        roster[t.find_cell("A", sat, slot(0)).unwrap()] = Some(0);
        roster[t.find_cell("B", sat, slot(0)).unwrap()] = Some(1);
        let b = Scorer::new(&t, &set).breakdown(&roster);
        assert_eq!(b.rest_day_duties, 1);

        let set = set.with_config(EngineConfig::default().with_rest_day_policy(RestDayPolicy::Ignore));
        let t = TensorBuilder::new(&set).build().unwrap();
        assert_eq!(Scorer::new(&t, &set).breakdown(&roster).rest_day_duties, 0);
    }

    #[test]
    fn test_score_schedule_counts_unknown_ids() {
        let set = sample_set();
        let t = TensorBuilder::new(&set).build().unwrap();
        let roster = GreedyAssigner::new(&t, &set.personnel).assign().roster;
        let mut schedule = roster_to_schedule(&t, &roster);
        let scorer = Scorer::new(&t, &set);
        assert_eq!(scorer.score_schedule(&schedule), scorer.evaluate(&roster));

        schedule.assign(&ShiftId::for_cell("A", day(), slot(0)), "Ghost");
        assert_eq!(scorer.score_schedule(&schedule).hard, 1);
    }
}
