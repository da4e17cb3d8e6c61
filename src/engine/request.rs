//! Inbound request and the domain-store seam.

use serde::{Deserialize, Serialize};

use crate::ga::GeneticParams;
use crate::models::{
    DateRange, FixedPositionRule, HolidayConfig, ManualAssignment, Personnel, Position,
};

/// Which pipeline a run uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "params", rename_all = "snake_case")]
pub enum SchedulingMode {
    /// Greedy construction only.
    GreedyOnly,
    /// Greedy construction refined by the genetic optimizer.
    Hybrid(GeneticParams),
}

impl SchedulingMode {
    /// Lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingMode::GreedyOnly => "greedy_only",
            SchedulingMode::Hybrid(_) => "hybrid",
        }
    }
}

/// One scheduling request.
///
/// Records are referenced by id and resolved against a [`DomainStore`]
/// when the run starts. Manual assignments that have not been persisted
/// yet travel inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingRequest {
    /// Schedule title.
    pub title: String,
    /// Planning horizon.
    pub horizon: DateRange,
    /// Personnel in the run, in tie-break order.
    pub personnel_ids: Vec<String>,
    /// Positions in the run.
    pub position_ids: Vec<String>,
    /// Explicit holiday configuration. `None` selects the active one.
    pub holiday_config_id: Option<String>,
    /// Fixed-position rules to apply.
    pub fixed_rule_ids: Vec<String>,
    /// Persisted manual assignments to apply.
    pub manual_assignment_ids: Vec<String>,
    /// Manual assignments not in the store.
    pub inline_manual_assignments: Vec<ManualAssignment>,
    /// Pipeline.
    pub mode: SchedulingMode,
}

impl SchedulingRequest {
    /// Creates a greedy-only request with nothing selected.
    pub fn new(title: impl Into<String>, horizon: DateRange) -> Self {
        Self {
            title: title.into(),
            horizon,
            personnel_ids: Vec::new(),
            position_ids: Vec::new(),
            holiday_config_id: None,
            fixed_rule_ids: Vec::new(),
            manual_assignment_ids: Vec::new(),
            inline_manual_assignments: Vec::new(),
            mode: SchedulingMode::GreedyOnly,
        }
    }

    /// Adds a personnel id.
    pub fn with_personnel(mut self, id: impl Into<String>) -> Self {
        self.personnel_ids.push(id.into());
        self
    }

    /// Adds a position id.
    pub fn with_position(mut self, id: impl Into<String>) -> Self {
        self.position_ids.push(id.into());
        self
    }

    /// Sets the holiday configuration id.
    pub fn with_holiday_config(mut self, id: impl Into<String>) -> Self {
        self.holiday_config_id = Some(id.into());
        self
    }

    /// Adds a fixed-position rule id.
    pub fn with_fixed_rule(mut self, id: impl Into<String>) -> Self {
        self.fixed_rule_ids.push(id.into());
        self
    }

    /// Adds a persisted manual assignment id.
    pub fn with_manual_assignment(mut self, id: impl Into<String>) -> Self {
        self.manual_assignment_ids.push(id.into());
        self
    }

    /// Adds a manual assignment that is not in the store.
    pub fn with_inline_assignment(mut self, assignment: ManualAssignment) -> Self {
        self.inline_manual_assignments.push(assignment);
        self
    }

    /// Sets the pipeline.
    pub fn with_mode(mut self, mode: SchedulingMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Read-only access to persisted domain records.
///
/// Implemented by the persistence collaborator. The engine only reads.
pub trait DomainStore {
    fn personnel(&self, id: &str) -> Option<&Personnel>;
    fn position(&self, id: &str) -> Option<&Position>;
    fn fixed_rule(&self, id: &str) -> Option<&FixedPositionRule>;
    fn manual_assignment(&self, id: &str) -> Option<&ManualAssignment>;
    fn holiday_config(&self, id: &str) -> Option<&HolidayConfig>;
    /// Configurations flagged active.
    fn active_holiday_configs(&self) -> Vec<&HolidayConfig>;
}

/// In-memory [`DomainStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainSnapshot {
    pub personnel: Vec<Personnel>,
    pub positions: Vec<Position>,
    pub fixed_rules: Vec<FixedPositionRule>,
    pub manual_assignments: Vec<ManualAssignment>,
    pub holiday_configs: Vec<HolidayConfig>,
}

impl DomainSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a personnel record.
    pub fn with_personnel(mut self, personnel: Personnel) -> Self {
        self.personnel.push(personnel);
        self
    }

    /// Adds a position record.
    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
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

    /// Adds a holiday configuration.
    pub fn with_holiday_config(mut self, config: HolidayConfig) -> Self {
        self.holiday_configs.push(config);
        self
    }
}

impl DomainStore for DomainSnapshot {
    fn personnel(&self, id: &str) -> Option<&Personnel> {
        self.personnel.iter().find(|p| p.id == id)
    }

    fn position(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|q| q.id == id)
    }

    fn fixed_rule(&self, id: &str) -> Option<&FixedPositionRule> {
        self.fixed_rules.iter().find(|r| r.id == id)
    }

    fn manual_assignment(&self, id: &str) -> Option<&ManualAssignment> {
        self.manual_assignments.iter().find(|m| m.id == id)
    }

    fn holiday_config(&self, id: &str) -> Option<&HolidayConfig> {
        self.holiday_configs.iter().find(|h| h.id == id)
    }

    fn active_holiday_configs(&self) -> Vec<&HolidayConfig> {
        self.holiday_configs.iter().filter(|h| h.active).collect()
    }
}
