//! Conflict records.
//!
//! A [`Conflict`] describes one violation (or one unstaffed cell) in a
//! finalized schedule, or one data-integrity problem in the input that
//! prevented a run. Conflicts are derived data: they are recomputed
//! whenever the schedule changes and carry no UI state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CellRef, ShiftId};

/// Conflict category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Invalidates the schedule.
    Hard,
    /// A cell nobody staffs.
    Unassigned,
    /// Lowers quality only.
    Soft,
    /// Informational notice.
    Info,
}

impl ConflictType {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictType::Hard => "hard",
            ConflictType::Unassigned => "unassigned",
            ConflictType::Soft => "soft",
            ConflictType::Info => "info",
        }
    }

    /// Soft and info conflicts may be dismissed by the user.
    pub fn is_ignorable(self) -> bool {
        matches!(self, ConflictType::Soft | ConflictType::Info)
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specific conflict kind. Each subtype belongs to exactly one
/// [`ConflictType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSubtype {
    /// A person occupies two cells in the same (date, slot).
    DoubleBooking,
    /// A person staffs a cell they are not eligible for.
    IneligibleAssignment,
    /// A forced cell is empty or staffed by someone else.
    ManualAssignmentNotHonored,
    /// The schedule references a person or position outside the run.
    UnknownReference,
    /// Two enabled manual assignments pin different people to one cell.
    ConflictingManualAssignments,
    /// Manual assignments pin one person to two cells at the same time.
    ManualDoubleBooking,
    /// A position nobody is ever eligible for.
    NoEligiblePersonnel,
    /// Malformed request or snapshot (unknown ids, duplicates, ...).
    InvalidInput,
    /// Internal fault during the run.
    InternalError,
    /// Too little rest between two duties.
    RestInterval,
    /// A person's workload deviates from the mean.
    WorkloadImbalance,
    /// A person subject to rest days serves on one.
    RestDayDuty,
    /// A manual assignment overrides normal eligibility.
    ManualOverride,
    /// No eligible candidate exists for the cell.
    NoCandidates,
    /// Candidates exist but the cell was left empty.
    Unfilled,
}

impl ConflictSubtype {
    /// Category of this subtype.
    pub fn conflict_type(self) -> ConflictType {
        use ConflictSubtype::*;
        match self {
            DoubleBooking
            | IneligibleAssignment
            | ManualAssignmentNotHonored
            | UnknownReference
            | ConflictingManualAssignments
            | ManualDoubleBooking
            | NoEligiblePersonnel
            | InvalidInput
            | InternalError => ConflictType::Hard,
            RestInterval | WorkloadImbalance | RestDayDuty => ConflictType::Soft,
            ManualOverride => ConflictType::Info,
            NoCandidates | Unfilled => ConflictType::Unassigned,
        }
    }

    /// Default severity (1 = minor, 5 = critical).
    pub fn default_severity(self) -> u8 {
        use ConflictSubtype::*;
        match self {
            DoubleBooking | ManualAssignmentNotHonored | ConflictingManualAssignments
            | ManualDoubleBooking | InternalError => 5,
            IneligibleAssignment | UnknownReference | NoEligiblePersonnel | InvalidInput => 4,
            NoCandidates => 4,
            Unfilled => 3,
            RestInterval | WorkloadImbalance => 2,
            RestDayDuty | ManualOverride => 1,
        }
    }

    /// Snake-case name.
    pub fn as_str(self) -> &'static str {
        use ConflictSubtype::*;
        match self {
            DoubleBooking => "double_booking",
            IneligibleAssignment => "ineligible_assignment",
            ManualAssignmentNotHonored => "manual_assignment_not_honored",
            UnknownReference => "unknown_reference",
            ConflictingManualAssignments => "conflicting_manual_assignments",
            ManualDoubleBooking => "manual_double_booking",
            NoEligiblePersonnel => "no_eligible_personnel",
            InvalidInput => "invalid_input",
            InternalError => "internal_error",
            RestInterval => "rest_interval",
            WorkloadImbalance => "workload_imbalance",
            RestDayDuty => "rest_day_duty",
            ManualOverride => "manual_override",
            NoCandidates => "no_candidates",
            Unfilled => "unfilled",
        }
    }
}

impl fmt::Display for ConflictSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One categorized violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conflict {
    /// Deterministic id (same violation → same id across re-detection).
    pub id: String,
    /// Category.
    pub conflict_type: ConflictType,
    /// Specific kind.
    pub subtype: ConflictSubtype,
    /// 1 (minor) to 5 (critical).
    pub severity: u8,
    /// Shifts involved.
    pub shift_ids: Vec<ShiftId>,
    /// Cell involved, when the conflict concerns one cell (always set for
    /// unassigned conflicts).
    pub cell: Option<CellRef>,
    /// Person involved.
    pub personnel_id: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Whether the user may dismiss it.
    pub ignorable: bool,
}

impl Conflict {
    /// Creates a conflict with the subtype's default severity.
    pub fn new(subtype: ConflictSubtype, message: impl Into<String>) -> Self {
        let conflict_type = subtype.conflict_type();
        let mut c = Self {
            id: String::new(),
            conflict_type,
            subtype,
            severity: subtype.default_severity(),
            shift_ids: Vec::new(),
            cell: None,
            personnel_id: None,
            message: message.into(),
            ignorable: conflict_type.is_ignorable(),
        };
        c.refresh_id();
        c
    }

    /// Sets the severity (clamped to 1..=5).
    pub fn with_severity(mut self, severity: u8) -> Self {
        self.severity = severity.clamp(1, 5);
        self
    }

    /// Sets the cell.
    pub fn with_cell(mut self, cell: CellRef) -> Self {
        self.cell = Some(cell);
        self.refresh_id();
        self
    }

    /// Adds a related shift.
    pub fn with_shift(mut self, id: ShiftId) -> Self {
        self.shift_ids.push(id);
        self.shift_ids.sort();
        self.refresh_id();
        self
    }

    /// Sets the person.
    pub fn with_personnel(mut self, personnel_id: impl Into<String>) -> Self {
        self.personnel_id = Some(personnel_id.into());
        self.refresh_id();
        self
    }

    /// Whether this conflict invalidates the schedule.
    pub fn is_hard(&self) -> bool {
        self.conflict_type == ConflictType::Hard
    }

    fn refresh_id(&mut self) {
        let mut id = format!("{}:{}", self.conflict_type, self.subtype);
        if let Some(cell) = &self.cell {
            id.push(':');
            id.push_str(cell.shift_id().as_str());
        }
        for shift in &self.shift_ids {
            id.push(':');
            id.push_str(shift.as_str());
        }
        if let Some(p) = &self.personnel_id {
            id.push_str(":p=");
            id.push_str(p);
        }
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;
    use chrono::NaiveDate;

    fn cell() -> CellRef {
        CellRef::new("Gate", NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(), TimeSlot::new(2).unwrap())
    }

    #[test]
    fn test_type_derived_from_subtype() {
        assert_eq!(Conflict::new(ConflictSubtype::DoubleBooking, "x").conflict_type, ConflictType::Hard);
        assert_eq!(Conflict::new(ConflictSubtype::RestInterval, "x").conflict_type, ConflictType::Soft);
        assert_eq!(Conflict::new(ConflictSubtype::ManualOverride, "x").conflict_type, ConflictType::Info);
        assert_eq!(Conflict::new(ConflictSubtype::Unfilled, "x").conflict_type, ConflictType::Unassigned);
    }

    #[test]
    fn test_ignorable_only_soft_and_info() {
        assert!(!Conflict::new(ConflictSubtype::DoubleBooking, "x").ignorable);
        assert!(!Conflict::new(ConflictSubtype::NoCandidates, "x").ignorable);
        assert!(Conflict::new(ConflictSubtype::WorkloadImbalance, "x").ignorable);
        assert!(Conflict::new(ConflictSubtype::ManualOverride, "x").ignorable);
    }

    #[test]
    fn test_severity_clamped() {
        let c = Conflict::new(ConflictSubtype::RestInterval, "x").with_severity(9);
        assert_eq!(c.severity, 5);
        let c = Conflict::new(ConflictSubtype::RestInterval, "x").with_severity(0);
        assert_eq!(c.severity, 1);
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = Conflict::new(ConflictSubtype::Unfilled, "first wording").with_cell(cell());
        let b = Conflict::new(ConflictSubtype::Unfilled, "other wording").with_cell(cell());
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "unassigned:unfilled:Gate@2024-05-06#2");

        let c = a.clone().with_personnel("P1");
        assert_ne!(a.id, c.id);
    }
}
