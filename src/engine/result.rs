//! Outbound result of a run.

use serde::{Deserialize, Serialize};

use crate::conflicts::ConflictSummary;
use crate::fitness::Fitness;
use crate::models::{Conflict, Schedule};
use crate::scheduler::ScheduleStats;

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Invalid input (conflicting manual assignments, starved positions,
    /// unknown ids, ...). Conflicts explain it.
    DataIntegrity,
    /// The final schedule still violates hard constraints.
    Unsatisfiable,
    /// A fault inside the engine. Diagnostics carry the detail.
    Internal,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Failed(FailureKind),
    Cancelled,
}

/// Complete result of one scheduling request.
///
/// Every run produces exactly one result. A cancelled or failed-input run
/// carries no schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingResult {
    /// Request title.
    pub title: String,
    pub outcome: RunOutcome,
    /// Final schedule, when one was produced.
    pub schedule: Option<Schedule>,
    /// Statistics of the final schedule.
    pub statistics: Option<ScheduleStats>,
    /// Conflicts, sorted by id.
    pub conflicts: Vec<Conflict>,
    pub summary: ConflictSummary,
    /// Fitness of the final schedule.
    pub fitness: Option<Fitness>,
    /// Fitness of the greedy roster.
    pub seed_fitness: Option<Fitness>,
    /// Generations run by the genetic optimizer (0 in greedy mode).
    pub generations: usize,
    /// Free-form notes (internal fault details, early stopping, ...).
    pub diagnostics: Vec<String>,
}

impl SchedulingResult {
    pub(crate) fn empty(title: impl Into<String>, outcome: RunOutcome) -> Self {
        Self {
            title: title.into(),
            outcome,
            schedule: None,
            statistics: None,
            conflicts: Vec::new(),
            summary: ConflictSummary::default(),
            fitness: None,
            seed_fitness: None,
            generations: 0,
            diagnostics: Vec::new(),
        }
    }

    /// A failed result explained by `conflicts`.
    pub(crate) fn failed(title: impl Into<String>, kind: FailureKind, conflicts: Vec<Conflict>) -> Self {
        let mut result = Self::empty(title, RunOutcome::Failed(kind));
        result.set_conflicts(conflicts);
        result
    }

    /// A cancelled result.
    pub(crate) fn cancelled(title: impl Into<String>) -> Self {
        Self::empty(title, RunOutcome::Cancelled)
    }

    pub(crate) fn set_conflicts(&mut self, mut conflicts: Vec<Conflict>) {
        conflicts.sort_by(|a, b| a.id.cmp(&b.id));
        self.summary = ConflictSummary::from_conflicts(&conflicts);
        self.conflicts = conflicts;
    }

    pub(crate) fn with_diagnostic(mut self, note: impl Into<String>) -> Self {
        self.diagnostics.push(note.into());
        self
    }

    /// Whether the run completed with no hard conflict.
    pub fn success(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    /// Whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.outcome == RunOutcome::Cancelled
    }

    /// Hard conflicts.
    pub fn hard_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.is_hard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConflictSubtype;

    #[test]
    fn test_failed_summarizes_conflicts() {
        let result = SchedulingResult::failed(
            "May",
            FailureKind::DataIntegrity,
            vec![
                Conflict::new(ConflictSubtype::NoEligiblePersonnel, "b"),
                Conflict::new(ConflictSubtype::ConflictingManualAssignments, "a"),
            ],
        );
        assert!(!result.success());
        assert!(result.schedule.is_none());
        assert_eq!(result.summary.hard(), 2);
        assert_eq!(result.hard_conflicts().count(), 2);
        assert!(result.conflicts[0].id < result.conflicts[1].id);
    }

    #[test]
    fn test_outcome_serde() {
        let json = serde_json::to_value(RunOutcome::Failed(FailureKind::Internal)).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "failed", "kind": "internal"}));
        let cancelled = SchedulingResult::cancelled("x");
        assert!(cancelled.is_cancelled());
        assert!(!cancelled.success());
    }
}
