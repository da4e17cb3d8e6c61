//! Aggregate conflict counts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Conflict, ConflictSubtype, ConflictType};

/// Conflict counts by type, subtype and severity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub by_type: BTreeMap<ConflictType, usize>,
    pub by_subtype: BTreeMap<ConflictSubtype, usize>,
    /// Severity (1..=5) → count.
    pub by_severity: BTreeMap<u8, usize>,
    pub total: usize,
}

impl ConflictSummary {
    /// Tallies a conflict list.
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        let mut summary = Self::default();
        for c in conflicts {
            *summary.by_type.entry(c.conflict_type).or_default() += 1;
            *summary.by_subtype.entry(c.subtype).or_default() += 1;
            *summary.by_severity.entry(c.severity).or_default() += 1;
            summary.total += 1;
        }
        summary
    }

    /// Count of one type.
    pub fn count(&self, conflict_type: ConflictType) -> usize {
        self.by_type.get(&conflict_type).copied().unwrap_or(0)
    }

    /// Hard conflict count.
    pub fn hard(&self) -> usize {
        self.count(ConflictType::Hard)
    }

    /// Unassigned-cell conflict count.
    pub fn unassigned(&self) -> usize {
        self.count(ConflictType::Unassigned)
    }
}
