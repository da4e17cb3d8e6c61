//! Input validation for duty-roster runs.
//!
//! Checks the integrity of a request and of the resolved constraint set
//! before any tensor is built. Detects:
//! - Duplicate IDs
//! - Unknown personnel, position, rule, assignment and calendar references
//! - Ambiguous holiday-calendar selection
//! - An empty horizon
//! - Manual assignments that pin two people to one cell, or one person to
//!   two cells at the same time
//!
//! Every problem is collected; validation never stops at the first error.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::{DomainStore, SchedulingRequest};
use crate::feasibility::ConstraintSet;
use crate::models::{CellRef, Conflict, ConflictSubtype, ManualAssignment, TimeSlot};
use chrono::NaiveDate;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Cell involved, if any.
    pub cell: Option<CellRef>,
    /// Person involved, if any.
    pub personnel_id: Option<String>,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A personnel id does not resolve.
    UnknownPersonnel,
    /// A position id does not resolve.
    UnknownPosition,
    /// A fixed-rule id does not resolve.
    UnknownFixedRule,
    /// A manual-assignment id does not resolve.
    UnknownManualAssignment,
    /// A holiday-config id does not resolve.
    UnknownHolidayConfig,
    /// No calendar was selected and several are active.
    AmbiguousHolidayConfig,
    /// The horizon ends before it starts.
    EmptyHorizon,
    /// Two enabled manual assignments pin different people to one cell.
    ConflictingManualAssignments,
    /// Enabled manual assignments pin one person to two cells at once.
    ManualDoubleBooking,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cell: None,
            personnel_id: None,
        }
    }

    fn with_cell(mut self, cell: CellRef) -> Self {
        self.cell = Some(cell);
        self
    }

    fn with_personnel(mut self, personnel_id: impl Into<String>) -> Self {
        self.personnel_id = Some(personnel_id.into());
        self
    }

    /// Converts into a hard data-integrity conflict.
    pub fn to_conflict(&self) -> Conflict {
        let subtype = match self.kind {
            ValidationErrorKind::ConflictingManualAssignments => {
                ConflictSubtype::ConflictingManualAssignments
            }
            ValidationErrorKind::ManualDoubleBooking => ConflictSubtype::ManualDoubleBooking,
            _ => ConflictSubtype::InvalidInput,
        };
        let mut conflict = Conflict::new(subtype, self.message.clone());
        if let Some(cell) = &self.cell {
            conflict = conflict.with_cell(cell.clone());
        }
        if let Some(p) = &self.personnel_id {
            conflict = conflict.with_personnel(p.clone());
        }
        conflict
    }
}

/// Validates a resolved constraint set.
///
/// Checks:
/// 1. Non-empty horizon
/// 2. No duplicate personnel or position IDs
/// 3. Enabled manual assignments reference personnel and positions in the run
/// 4. At most one person per manually pinned cell
/// 5. No person manually pinned to two cells in the same (date, slot)
///
/// Checks 4 and 5 only consider assignments inside the horizon.
pub fn validate_constraints(set: &ConstraintSet) -> ValidationResult {
    let mut errors = Vec::new();

    if set.horizon.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyHorizon,
            format!("Horizon {} to {} contains no days", set.horizon.start, set.horizon.end),
        ));
    }

    let mut personnel_ids = HashSet::new();
    for p in &set.personnel {
        if !personnel_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate personnel ID: {}", p.id),
            ));
        }
    }
    let mut position_ids = HashSet::new();
    for q in &set.positions {
        if !position_ids.insert(q.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate position ID: {}", q.id),
            ));
        }
    }

    for m in set.enabled_manual_assignments() {
        if !personnel_ids.contains(m.personnel_id.as_str()) {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::UnknownPersonnel,
                    format!(
                        "Manual assignment '{}' references personnel '{}' outside the run",
                        m.id, m.personnel_id
                    ),
                )
                .with_personnel(m.personnel_id.clone()),
            );
        }
        if !position_ids.contains(m.position_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownPosition,
                format!(
                    "Manual assignment '{}' references position '{}' outside the run",
                    m.id, m.position_id
                ),
            ));
        }
    }

    check_manual_cells(set, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_manual_cells(set: &ConstraintSet, errors: &mut Vec<ValidationError>) {
    let in_horizon: Vec<&ManualAssignment> = set
        .enabled_manual_assignments()
        .filter(|m| set.horizon.contains(m.date))
        .collect();

    // (position, date, slot) → distinct personnel
    let mut by_cell: BTreeMap<CellRef, BTreeSet<&str>> = BTreeMap::new();
    // (date, slot, personnel) → distinct positions
    let mut by_time: BTreeMap<(NaiveDate, TimeSlot, &str), BTreeSet<&str>> = BTreeMap::new();
    for m in &in_horizon {
        by_cell
            .entry(CellRef::new(m.position_id.clone(), m.date, m.slot))
            .or_default()
            .insert(m.personnel_id.as_str());
        by_time
            .entry((m.date, m.slot, m.personnel_id.as_str()))
            .or_default()
            .insert(m.position_id.as_str());
    }

    for (cell, people) in by_cell {
        if people.len() > 1 {
            let names: Vec<&str> = people.into_iter().collect();
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::ConflictingManualAssignments,
                    format!(
                        "Manual assignments pin {} to {cell}",
                        names.join(" and ")
                    ),
                )
                .with_cell(cell),
            );
        }
    }

    for ((date, slot, person), positions) in by_time {
        if positions.len() > 1 {
            let names: Vec<&str> = positions.into_iter().collect();
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::ManualDoubleBooking,
                    format!(
                        "Manual assignments pin '{person}' to {} on {date} {slot}",
                        names.join(" and ")
                    ),
                )
                .with_personnel(person),
            );
        }
    }
}

/// Resolves a request against a store into a validated [`ConstraintSet`].
///
/// Disabled rules and assignments named by the request are skipped.
/// Fixed rules for personnel outside the run are skipped. Identical
/// manual assignments (same person and cell) are kept once.
pub fn resolve_request(
    request: &SchedulingRequest,
    store: &dyn DomainStore,
    config: &EngineConfig,
) -> Result<ConstraintSet, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    let mut personnel = Vec::new();
    for id in &request.personnel_ids {
        if !seen.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Personnel '{id}' listed twice"),
            ));
            continue;
        }
        match store.personnel(id) {
            Some(p) => personnel.push(p.clone()),
            None => errors.push(
                ValidationError::new(
                    ValidationErrorKind::UnknownPersonnel,
                    format!("Unknown personnel ID: {id}"),
                )
                .with_personnel(id.clone()),
            ),
        }
    }

    let mut seen = HashSet::new();
    let mut positions = Vec::new();
    for id in &request.position_ids {
        if !seen.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Position '{id}' listed twice"),
            ));
            continue;
        }
        match store.position(id) {
            Some(q) => positions.push(q.clone()),
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownPosition,
                format!("Unknown position ID: {id}"),
            )),
        }
    }

    let in_run: HashSet<&str> = request.personnel_ids.iter().map(String::as_str).collect();
    let mut fixed_rules = Vec::new();
    for id in &request.fixed_rule_ids {
        match store.fixed_rule(id) {
            Some(rule) if !rule.enabled => debug!(rule = %id, "disabled fixed rule skipped"),
            Some(rule) if !in_run.contains(rule.personnel_id.as_str()) => {
                debug!(rule = %id, personnel = %rule.personnel_id, "fixed rule for personnel outside the run skipped")
            }
            Some(rule) => fixed_rules.push(rule.clone()),
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownFixedRule,
                format!("Unknown fixed rule ID: {id}"),
            )),
        }
    }

    let mut manual: Vec<ManualAssignment> = Vec::new();
    let stored = request.manual_assignment_ids.iter().filter_map(|id| {
        let found = store.manual_assignment(id);
        if found.is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownManualAssignment,
                format!("Unknown manual assignment ID: {id}"),
            ));
        }
        found
    });
    let candidates: Vec<&ManualAssignment> =
        stored.chain(request.inline_manual_assignments.iter()).collect();
    for m in candidates {
        if !m.enabled {
            debug!(manual_assignment = %m.id, "disabled manual assignment skipped");
            continue;
        }
        let duplicate = manual
            .iter()
            .any(|kept| kept.same_cell(m) && kept.personnel_id == m.personnel_id);
        if !duplicate {
            manual.push(m.clone());
        }
    }

    let holidays = match &request.holiday_config_id {
        Some(id) => match store.holiday_config(id) {
            Some(h) => Some(h.clone()),
            None => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownHolidayConfig,
                    format!("Unknown holiday config ID: {id}"),
                ));
                None
            }
        },
        None => {
            let active = store.active_holiday_configs();
            match active.as_slice() {
                [] => None,
                [only] => Some((*only).clone()),
                many => {
                    let ids: Vec<&str> = many.iter().map(|h| h.id.as_str()).collect();
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AmbiguousHolidayConfig,
                        format!("Several holiday configs are active: {}", ids.join(", ")),
                    ));
                    None
                }
            }
        }
    };

    let set = ConstraintSet {
        horizon: request.horizon,
        personnel,
        positions,
        fixed_rules,
        manual_assignments: manual,
        holidays,
        config: config.clone(),
    };

    if let Err(mut more) = validate_constraints(&set) {
        if !errors.is_empty() {
            // Unresolved ids already explain the missing run members.
            more.retain(|e| {
                !matches!(
                    e.kind,
                    ValidationErrorKind::UnknownPersonnel | ValidationErrorKind::UnknownPosition
                )
            });
        }
        errors.append(&mut more);
    }

    if errors.is_empty() {
        Ok(set)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DomainSnapshot;
    use crate::models::{DateRange, FixedPositionRule, HolidayConfig, Personnel, Position};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn slot(i: u8) -> TimeSlot {
        TimeSlot::new(i).unwrap()
    }

    fn sample_set() -> ConstraintSet {
        ConstraintSet::new(
            DateRange::single(day()),
            vec![Personnel::new("P1"), Personnel::new("P2")],
            vec![Position::new("A"), Position::new("B")],
        )
    }

    fn sample_store() -> DomainSnapshot {
        DomainSnapshot::new()
            .with_personnel(Personnel::new("P1"))
            .with_personnel(Personnel::new("P2"))
            .with_position(Position::new("A"))
            .with_position(Position::new("B"))
            .with_fixed_rule(FixedPositionRule::new("R1", "P1").with_position("A"))
            .with_fixed_rule(FixedPositionRule::new("R2", "P2").with_enabled(false))
            .with_manual_assignment(ManualAssignment::new("M1", "P1", "A", day(), slot(0)))
    }

    fn sample_request() -> SchedulingRequest {
        SchedulingRequest::new("May", DateRange::single(day()))
            .with_personnel("P1")
            .with_personnel("P2")
            .with_position("A")
            .with_position("B")
    }

    #[test]
    fn test_valid_set() {
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P1", "A", day(), slot(0)))
            .with_manual_assignment(ManualAssignment::new("M2", "P2", "B", day(), slot(0)));
        assert!(validate_constraints(&set).is_ok());
    }

    #[test]
    fn test_duplicate_personnel_id() {
        let mut set = sample_set();
        set.personnel.push(Personnel::new("P1"));
        let errors = validate_constraints(&set).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("personnel")));
    }

    #[test]
    fn test_empty_horizon() {
        let mut set = sample_set();
        set.horizon = DateRange::new(day(), day().pred_opt().unwrap());
        let errors = validate_constraints(&set).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::EmptyHorizon));
    }

    #[test]
    fn test_conflicting_manual_assignments() {
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P1", "A", day(), slot(0)))
            .with_manual_assignment(ManualAssignment::new("M2", "P2", "A", day(), slot(0)));
        let errors = validate_constraints(&set).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ConflictingManualAssignments);

        let conflict = errors[0].to_conflict();
        assert_eq!(conflict.subtype, ConflictSubtype::ConflictingManualAssignments);
        assert!(conflict.is_hard());
        assert_eq!(conflict.cell.as_ref().unwrap().position_id, "A");
    }

    #[test]
    fn test_disabled_manual_assignment_not_conflicting() {
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P1", "A", day(), slot(0)))
            .with_manual_assignment(
                ManualAssignment::new("M2", "P2", "A", day(), slot(0)).with_enabled(false),
            );
        assert!(validate_constraints(&set).is_ok());
    }

    #[test]
    fn test_manual_double_booking() {
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P1", "A", day(), slot(3)))
            .with_manual_assignment(ManualAssignment::new("M2", "P1", "B", day(), slot(3)));
        let errors = validate_constraints(&set).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ManualDoubleBooking
                && e.personnel_id.as_deref() == Some("P1")));
    }

    #[test]
    fn test_manual_outside_horizon_not_checked() {
        let later = day().succ_opt().unwrap();
        let set = sample_set()
            .with_manual_assignment(ManualAssignment::new("M1", "P1", "A", later, slot(0)))
            .with_manual_assignment(ManualAssignment::new("M2", "P2", "A", later, slot(0)));
        assert!(validate_constraints(&set).is_ok());
    }

    #[test]
    fn test_resolve_request() {
        let request = sample_request()
            .with_fixed_rule("R1")
            .with_fixed_rule("R2")
            .with_manual_assignment("M1")
            .with_inline_assignment(ManualAssignment::new("M1-copy", "P1", "A", day(), slot(0)))
            .with_inline_assignment(ManualAssignment::new("M9", "P2", "B", day(), slot(1)));
        let set = resolve_request(&request, &sample_store(), &EngineConfig::default()).unwrap();

        assert_eq!(set.personnel.len(), 2);
        assert_eq!(set.fixed_rules.len(), 1);
        assert_eq!(set.fixed_rules[0].id, "R1");
        // M1-copy duplicates M1.
        let ids: Vec<&str> = set.manual_assignments.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M9"]);
        assert!(set.holidays.is_none());
    }

    #[test]
    fn test_resolve_unknown_ids() {
        let request = sample_request()
            .with_personnel("P9")
            .with_fixed_rule("R9")
            .with_manual_assignment("M9")
            .with_holiday_config("H9");
        let errors = resolve_request(&request, &sample_store(), &EngineConfig::default()).unwrap_err();
        let kinds: Vec<ValidationErrorKind> = errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::UnknownPersonnel));
        assert!(kinds.contains(&ValidationErrorKind::UnknownFixedRule));
        assert!(kinds.contains(&ValidationErrorKind::UnknownManualAssignment));
        assert!(kinds.contains(&ValidationErrorKind::UnknownHolidayConfig));
        assert!(errors.iter().all(|e| e.to_conflict().subtype == ConflictSubtype::InvalidInput));
    }

    #[test]
    fn test_resolve_holiday_selection() {
        let store = sample_store()
            .with_holiday_config(HolidayConfig::new("H1").activated())
            .with_holiday_config(HolidayConfig::new("H2"));
        let set = resolve_request(&sample_request(), &store, &EngineConfig::default()).unwrap();
        assert_eq!(set.holidays.unwrap().id, "H1");

        let set = resolve_request(
            &sample_request().with_holiday_config("H2"),
            &store,
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(set.holidays.unwrap().id, "H2");

        let store = store.with_holiday_config(HolidayConfig::new("H3").activated());
        let errors = resolve_request(&sample_request(), &store, &EngineConfig::default()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::AmbiguousHolidayConfig);
    }

    #[test]
    fn test_resolve_duplicate_listing() {
        let request = sample_request().with_personnel("P1");
        let errors = resolve_request(&request, &sample_store(), &EngineConfig::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }
}
