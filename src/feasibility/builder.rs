//! Tensor construction and constraint application.

use tracing::{debug, warn};

use super::{CellId, CellState, ConstraintSet, FeasibilityTensor, IneligibleReason, PersonIdx};
use crate::config::RestDayPolicy;
use crate::error::{EngineError, Result};
use crate::models::{Conflict, ConflictSubtype, Personnel, Position, TimeSlot};
use crate::validation::{validate_constraints, ValidationError};

/// Builds a [`FeasibilityTensor`] from a [`ConstraintSet`].
///
/// # Algorithm
/// 1. Validate the constraint set. Conflicting or double-booking manual
///    assignments abort here, before any cell is computed.
/// 2. For every (person, position, day, slot): base eligibility, then
///    fixed-rule narrowing, then the hard rest-day policy.
/// 3. Overlay manual assignments (forced / forbidden).
/// 4. Index eligible personnel per cell and partition pinned/open cells.
/// 5. Reject positions for which nobody is ever eligible.
///
/// Cost is O(P × Q × D × 12) for the state fill, plus O(M × Q) for the
/// overlay.
#[derive(Debug, Clone, Copy)]
pub struct TensorBuilder<'a> {
    set: &'a ConstraintSet,
}

impl<'a> TensorBuilder<'a> {
    /// Creates a builder over a constraint set.
    pub fn new(set: &'a ConstraintSet) -> Self {
        Self { set }
    }

    /// Builds the tensor.
    ///
    /// # Errors
    /// [`EngineError::DataIntegrity`] for invalid manual assignments or
    /// positions without eligible personnel.
    pub fn build(&self) -> Result<FeasibilityTensor> {
        validate_constraints(self.set).map_err(|errors| {
            EngineError::DataIntegrity(errors.iter().map(ValidationError::to_conflict).collect())
        })?;

        let set = self.set;
        let mut tensor = FeasibilityTensor::empty(
            set.horizon,
            set.personnel.iter().map(|p| p.id.clone()).collect(),
            set.positions.iter().map(|q| q.id.clone()).collect(),
        );

        if let Some(holidays) = &set.holidays {
            for (day, date) in set.horizon.dates().enumerate() {
                tensor.rest_days[day] = holidays.is_rest_day(date);
            }
        }

        self.fill_states(&mut tensor);
        self.overlay_manual(&mut tensor)?;
        tensor.index_cells();

        debug!(
            cells = tensor.cell_count(),
            pinned = tensor.pinned_cells().len(),
            open = tensor.open_cells().len(),
            "feasibility tensor built"
        );

        let starved = self.starved_positions(&tensor);
        if !starved.is_empty() {
            return Err(EngineError::DataIntegrity(starved));
        }
        Ok(tensor)
    }

    /// Reason the person may not staff (position, day, slot) under the
    /// rules alone, ignoring manual assignments. `None` means eligible.
    pub fn rule_reason(
        &self,
        person: usize,
        position: usize,
        rest_day: bool,
        slot: TimeSlot,
    ) -> Option<IneligibleReason> {
        let personnel = &self.set.personnel[person];
        let pos = &self.set.positions[position];
        if let Some(reason) = self.base_reason(personnel, pos) {
            return Some(reason);
        }
        if let Some(reason) = self.fixed_rule_reason(personnel, pos, slot) {
            return Some(reason);
        }
        if rest_day
            && personnel.observes_rest_days()
            && self.set.config.rest_day_policy == RestDayPolicy::Hard
        {
            return Some(IneligibleReason::RestDay);
        }
        None
    }

    fn base_reason(&self, personnel: &Personnel, position: &Position) -> Option<IneligibleReason> {
        if personnel.retired {
            return Some(IneligibleReason::Retired);
        }
        if !personnel.available {
            return Some(IneligibleReason::Unavailable);
        }
        if self.set.config.skill_matching {
            let missing: Vec<String> = position
                .required_skills
                .iter()
                .filter(|s| !personnel.has_skill(s))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Some(IneligibleReason::MissingSkills(missing));
            }
        }
        if !position.allows(&personnel.id) {
            return Some(IneligibleReason::NotAllowListed);
        }
        None
    }

    /// Enabled rules of one person combine as a union: a cell is admitted
    /// when any rule admits it.
    fn fixed_rule_reason(
        &self,
        personnel: &Personnel,
        position: &Position,
        slot: TimeSlot,
    ) -> Option<IneligibleReason> {
        let mut rule_ids = Vec::new();
        for rule in self.set.fixed_rules_for(&personnel.id) {
            if rule.admits(&position.id, slot) {
                return None;
            }
            rule_ids.push(rule.id.clone());
        }
        if rule_ids.is_empty() {
            None
        } else {
            Some(IneligibleReason::FixedRule(rule_ids))
        }
    }

    fn fill_states(&self, tensor: &mut FeasibilityTensor) {
        for (p, _) in self.set.personnel.iter().enumerate() {
            for (q, _) in self.set.positions.iter().enumerate() {
                for day in 0..tensor.day_count() {
                    let rest_day = tensor.is_rest_day(day);
                    for slot in TimeSlot::all() {
                        if self.rule_reason(p, q, rest_day, slot).is_none() {
                            let cell = tensor.cell_id(q, day, slot);
                            tensor.set_state(p, cell, CellState::Allowed);
                        }
                    }
                }
            }
        }
    }

    fn overlay_manual(&self, tensor: &mut FeasibilityTensor) -> Result<()> {
        for manual in self.set.enabled_manual_assignments() {
            let Some(day) = tensor.horizon().day_index(manual.date) else {
                warn!(
                    manual_assignment = %manual.id,
                    date = %manual.date,
                    "manual assignment outside the horizon ignored"
                );
                continue;
            };
            let (Some(person), Some(position)) = (
                tensor.personnel_idx(&manual.personnel_id),
                tensor.position_idx(&manual.position_id),
            ) else {
                return Err(EngineError::Internal(format!(
                    "manual assignment '{}' references ids outside the run",
                    manual.id
                )));
            };
            let person = person as usize;
            let cell = tensor.checked_cell_id(position, day, manual.slot)?;
            for other in 0..tensor.personnel_count() {
                tensor.set_state(other, cell, CellState::Forbidden);
            }
            tensor.set_state(person, cell, CellState::Forced);
            for sibling in tensor.cells_at_time(tensor.time_of(cell)) {
                if sibling != cell {
                    tensor.set_state(person, sibling, CellState::Forbidden);
                }
            }
        }
        Ok(())
    }

    fn starved_positions(&self, tensor: &FeasibilityTensor) -> Vec<Conflict> {
        let q_count = tensor.position_count();
        let mut ever_eligible = vec![false; q_count];
        for cell in 0..tensor.cell_count() {
            if !tensor.eligible(cell).is_empty() {
                ever_eligible[tensor.position_of(cell)] = true;
            }
        }
        ever_eligible
            .iter()
            .enumerate()
            .filter(|&(_, &ok)| !ok)
            .map(|(q, _)| {
                let id = tensor.position_id(q);
                Conflict::new(
                    ConflictSubtype::NoEligiblePersonnel,
                    format!("No personnel is ever eligible for position '{id}'"),
                )
                // Cell q is (day 0, slot 0, position q).
                .with_cell(tensor.cell_ref(q))
            })
            .collect()
    }
}

/// Explains why `person` may not staff `cell` in a built tensor.
///
/// Returns `None` when the person is eligible (or forced).
pub fn explain_ineligibility(
    set: &ConstraintSet,
    tensor: &FeasibilityTensor,
    person: PersonIdx,
    cell: CellId,
) -> Option<IneligibleReason> {
    if tensor.is_eligible(person, cell) {
        return None;
    }
    if let Some(other) = tensor.pinned(cell) {
        if other != person {
            return Some(IneligibleReason::PinnedToOther(tensor.personnel_id(other).to_string()));
        }
    }
    for sibling in tensor.cells_at_time(tensor.time_of(cell)) {
        if sibling != cell && tensor.pinned(sibling) == Some(person) {
            let position = tensor.position_id(tensor.position_of(sibling));
            return Some(IneligibleReason::PinnedElsewhere(position.to_string()));
        }
    }
    TensorBuilder::new(set).rule_reason(
        person as usize,
        tensor.position_of(cell),
        tensor.is_rest_day(tensor.day_of(cell)),
        tensor.slot_of(cell),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{
        ConflictSubtype, DateRange, FixedPositionRule, HolidayConfig, ManualAssignment,
    };
    use chrono::NaiveDate;

    // 2024-05-06 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn slot(i: u8) -> TimeSlot {
        TimeSlot::new(i).unwrap()
    }

    fn sample_set() -> ConstraintSet {
        ConstraintSet::new(
            DateRange::single(monday()),
            vec![
                Personnel::new("P1").with_skill("guard"),
                Personnel::new("P2").with_skill("guard").with_skill("medic"),
                Personnel::new("P3"),
            ],
            vec![
                Position::new("A").with_required_skill("guard"),
                Position::new("B").with_required_skill("medic"),
                Position::new("C"),
            ],
        )
    }

    fn cell(t: &FeasibilityTensor, position: &str, s: u8) -> CellId {
        t.find_cell(position, monday(), slot(s)).unwrap()
    }

    #[test]
    fn test_base_eligibility_by_skill() {
        let set = sample_set();
        let t = TensorBuilder::new(&set).build().unwrap();
        assert_eq!(t.eligible(cell(&t, "A", 0)), &[0, 1]);
        assert_eq!(t.eligible(cell(&t, "B", 0)), &[1]);
        assert_eq!(t.eligible(cell(&t, "C", 0)), &[0, 1, 2]);
        assert!(t.pinned_cells().is_empty());
        assert_eq!(t.open_cells().len(), t.cell_count());
    }

    #[test]
    fn test_skill_matching_disabled() {
        let set = sample_set().with_config(EngineConfig::default().with_skill_matching(false));
        let t = TensorBuilder::new(&set).build().unwrap();
        assert_eq!(t.eligible(cell(&t, "B", 0)), &[0, 1, 2]);
    }

    #[test]
    fn test_unavailable_retired_and_allow_list() {
        let mut set = sample_set();
        set.personnel[0].available = false;
        set.personnel[2] = Personnel::new("P3").retired();
        set.positions[2] = Position::new("C").with_allowed("P2");
        let t = TensorBuilder::new(&set).build().unwrap();
        assert_eq!(t.eligible(cell(&t, "A", 0)), &[1]);
        assert_eq!(t.eligible(cell(&t, "C", 0)), &[1]);

        let c = cell(&t, "C", 0);
        assert_eq!(explain_ineligibility(&set, &t, 0, c), Some(IneligibleReason::Unavailable));
        assert_eq!(explain_ineligibility(&set, &t, 2, c), Some(IneligibleReason::Retired));
        assert_eq!(explain_ineligibility(&set, &t, 1, c), None);
    }

    #[test]
    fn test_fixed_rule_narrows_horizon_wide() {
        let set = sample_set()
            .with_fixed_rule(FixedPositionRule::new("R1", "P1").with_position("A").with_slot(slot(4)));
        let t = TensorBuilder::new(&set).build().unwrap();
        for s in TimeSlot::all() {
            let expected_a = s == slot(4);
            assert_eq!(t.is_eligible(0, cell(&t, "A", s.index() as u8)), expected_a);
            assert!(!t.is_eligible(0, cell(&t, "C", s.index() as u8)));
        }
        assert_eq!(
            explain_ineligibility(&set, &t, 0, cell(&t, "C", 0)),
            Some(IneligibleReason::FixedRule(vec!["R1".into()]))
        );
    }

    #[test]
    fn test_fixed_rules_combine_as_union() {
        let set = sample_set()
            .with_fixed_rule(FixedPositionRule::new("R1", "P1").with_position("A"))
            .with_fixed_rule(FixedPositionRule::new("R2", "P1").with_position("C"))
            .with_fixed_rule(FixedPositionRule::new("R3", "P3").with_position("A").with_enabled(false));
        let t = TensorBuilder::new(&set).build().unwrap();
        assert!(t.is_eligible(0, cell(&t, "A", 0)));
        assert!(t.is_eligible(0, cell(&t, "C", 0)));
        // Disabled rule has no effect.
        assert!(t.is_eligible(2, cell(&t, "C", 0)));
    }

    #[test]
    fn test_manual_overlay() {
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P3", "A", monday(), slot(2)));
        let t = TensorBuilder::new(&set).build().unwrap();
        let a = cell(&t, "A", 2);

        assert_eq!(t.state(2, a), CellState::Forced);
        assert_eq!(t.state(0, a), CellState::Forbidden);
        assert_eq!(t.pinned(a), Some(2));
        assert_eq!(t.pinned_cells(), &[a]);
        assert!(!t.open_cells().contains(&a));
        // Forced personnel is excluded elsewhere at the same time.
        assert!(!t.is_eligible(2, cell(&t, "C", 2)));
        assert!(t.is_eligible(2, cell(&t, "C", 3)));

        assert_eq!(
            explain_ineligibility(&set, &t, 0, a),
            Some(IneligibleReason::PinnedToOther("P3".into()))
        );
        assert_eq!(
            explain_ineligibility(&set, &t, 2, cell(&t, "C", 2)),
            Some(IneligibleReason::PinnedElsewhere("A".into()))
        );
    }

    #[test]
    fn test_manual_outside_horizon_ignored() {
        let later = monday().succ_opt().unwrap();
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P3", "A", later, slot(2)));
        let t = TensorBuilder::new(&set).build().unwrap();
        assert!(t.pinned_cells().is_empty());
    }

    #[test]
    fn test_conflicting_manual_fails_before_build() {
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P1", "A", monday(), slot(0)))
            .with_manual_assignment(ManualAssignment::new("M2", "P2", "A", monday(), slot(0)));
        match TensorBuilder::new(&set).build() {
            Err(EngineError::DataIntegrity(conflicts)) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].subtype, ConflictSubtype::ConflictingManualAssignments);
            }
            other => panic!("expected data integrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_position_without_eligible_personnel() {
        let mut set = sample_set();
        set.positions.push(Position::new("D").with_required_skill("pilot"));
        match TensorBuilder::new(&set).build() {
            Err(EngineError::DataIntegrity(conflicts)) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].subtype, ConflictSubtype::NoEligiblePersonnel);
                assert_eq!(conflicts[0].cell.as_ref().unwrap().position_id, "D");
            }
            other => panic!("expected data integrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_hard_rest_day_policy() {
        // Saturday and Sunday.
        let saturday = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        let horizon = DateRange::new(monday(), saturday);
        let mut set = sample_set().with_holidays(HolidayConfig::new("H").with_weekend_rest(true));
        set.horizon = horizon;
        set.personnel[1] = Personnel::new("P2")
            .with_skill("guard")
            .with_skill("medic")
            .exempt_from_rest_days();

        let soft = TensorBuilder::new(&set).build().unwrap();
        let sat_a = soft.find_cell("A", saturday, slot(0)).unwrap();
        assert!(soft.is_rest_day(5));
        assert!(!soft.is_rest_day(0));
        assert!(soft.is_eligible(0, sat_a));

        let set = set.with_config(EngineConfig::default().with_rest_day_policy(RestDayPolicy::Hard));
        let hard = TensorBuilder::new(&set).build().unwrap();
        assert!(!hard.is_eligible(0, sat_a));
        assert!(hard.is_eligible(1, sat_a));
        assert!(hard.is_eligible(0, hard.find_cell("A", monday(), slot(0)).unwrap()));
        assert_eq!(explain_ineligibility(&set, &hard, 0, sat_a), Some(IneligibleReason::RestDay));
    }
}
