//! Feasibility model.
//!
//! Computes, for every (personnel, position, date, slot), whether the
//! person may staff that cell. The result is a [`FeasibilityTensor`]
//! that the greedy assigner, the genetic optimizer and the conflict
//! detector all read.
//!
//! # Pipeline
//!
//! 1. **Base eligibility**: skills ⊇ required skills (unless skill
//!    matching is disabled), available, not retired, allow-listed.
//! 2. **Fixed-rule narrowing**: enabled [`FixedPositionRule`]s confine a
//!    person to their allowed positions × slots, horizon-wide.
//! 3. **Rest-day policy**: under [`RestDayPolicy::Hard`], personnel subject
//!    to rest days are forbidden on rest days.
//! 4. **Manual overlay**: enabled [`ManualAssignment`]s pin their cell
//!    (forced for the assignee, forbidden for everyone else) and forbid the
//!    assignee at every other position in the same (date, slot).
//!
//! The tensor is immutable once built.
//!
//! [`RestDayPolicy::Hard`]: crate::config::RestDayPolicy::Hard

mod builder;
mod tensor;

pub use builder::{explain_ineligibility, TensorBuilder};
pub use tensor::{CellId, CellState, FeasibilityTensor, PersonIdx};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;
use crate::models::{
    DateRange, FixedPositionRule, HolidayConfig, ManualAssignment, Personnel, Position,
};

/// Resolved, read-only input of one run.
///
/// Personnel and position order define the index order of the tensor
/// and the deterministic tie-break order of the greedy pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Planning horizon.
    pub horizon: DateRange,
    /// Personnel in the run.
    pub personnel: Vec<Personnel>,
    /// Positions in the run.
    pub positions: Vec<Position>,
    /// Enabled fixed-position rules.
    pub fixed_rules: Vec<FixedPositionRule>,
    /// Enabled manual assignments.
    pub manual_assignments: Vec<ManualAssignment>,
    /// Governing rest-day calendar, if any.
    pub holidays: Option<HolidayConfig>,
    /// Deployment policy.
    pub config: EngineConfig,
}

impl ConstraintSet {
    /// Creates a constraint set with no rules and default policy.
    pub fn new(horizon: DateRange, personnel: Vec<Personnel>, positions: Vec<Position>) -> Self {
        Self {
            horizon,
            personnel,
            positions,
            fixed_rules: Vec::new(),
            manual_assignments: Vec::new(),
            holidays: None,
            config: EngineConfig::default(),
        }
    }

    /// Adds a fixed-position rule.
    pub fn with_fixed_rule(mut self, rule: FixedPositionRule) -> Self {
        self.fixed_rules.push(rule);
        self
    }

    /// Adds a manual assignment.
    pub fn with_manual_assignment(mut self, assignment: ManualAssignment) -> Self {
        self.manual_assignments.push(assignment);
        self
    }

    /// Sets the rest-day calendar.
    pub fn with_holidays(mut self, holidays: HolidayConfig) -> Self {
        self.holidays = Some(holidays);
        self
    }

    /// Sets the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Enabled manual assignments.
    pub fn enabled_manual_assignments(&self) -> impl Iterator<Item = &ManualAssignment> {
        self.manual_assignments.iter().filter(|m| m.enabled)
    }

    /// Enabled fixed rules for one person.
    pub fn fixed_rules_for<'a>(
        &'a self,
        personnel_id: &'a str,
    ) -> impl Iterator<Item = &'a FixedPositionRule> + 'a {
        self.fixed_rules
            .iter()
            .filter(move |r| r.enabled && r.personnel_id == personnel_id)
    }
}

/// Why a person may not staff a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    /// The person is marked unavailable.
    Unavailable,
    /// The person is retired.
    Retired,
    /// The person lacks required skills.
    MissingSkills(Vec<String>),
    /// The position's allow-list excludes the person.
    NotAllowListed,
    /// The person's fixed-position rules exclude this cell.
    FixedRule(Vec<String>),
    /// The date is a rest day and the policy is hard.
    RestDay,
    /// The cell is pinned to someone else.
    PinnedToOther(String),
    /// The person is pinned elsewhere at the same time.
    PinnedElsewhere(String),
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibleReason::Unavailable => write!(f, "unavailable"),
            IneligibleReason::Retired => write!(f, "retired"),
            IneligibleReason::MissingSkills(skills) => {
                write!(f, "missing skills: {}", skills.join(", "))
            }
            IneligibleReason::NotAllowListed => write!(f, "not on the position's allow-list"),
            IneligibleReason::FixedRule(rules) => {
                write!(f, "excluded by fixed rule(s) {}", rules.join(", "))
            }
            IneligibleReason::RestDay => write!(f, "rest day"),
            IneligibleReason::PinnedToOther(p) => write!(f, "cell is pinned to {p}"),
            IneligibleReason::PinnedElsewhere(pos) => write!(f, "pinned to {pos} at the same time"),
        }
    }
}
