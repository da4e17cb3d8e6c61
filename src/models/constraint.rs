//! Hard assignment constraints.
//!
//! Two kinds of hard rule narrow who may serve where:
//!
//! - [`FixedPositionRule`]: confines one person, horizon-wide, to a set of
//!   positions and slots.
//! - [`ManualAssignment`]: pins one person to one (position, date, slot)
//!   cell. Manual assignments take precedence over every other rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimeSlot;

/// Confines a person to the listed positions and slots.
///
/// An empty `allowed_positions` admits every position, an empty
/// `allowed_slots` admits every slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPositionRule {
    /// Rule identifier.
    pub id: String,
    /// Person the rule applies to.
    pub personnel_id: String,
    /// Positions the person may staff.
    pub allowed_positions: Vec<String>,
    /// Slots of day the person may serve in.
    pub allowed_slots: Vec<TimeSlot>,
    /// Disabled rules are ignored.
    pub enabled: bool,
}

impl FixedPositionRule {
    /// Creates an enabled rule with no restrictions yet.
    pub fn new(id: impl Into<String>, personnel_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            personnel_id: personnel_id.into(),
            allowed_positions: Vec::new(),
            allowed_slots: Vec::new(),
            enabled: true,
        }
    }

    /// Adds an allowed position.
    pub fn with_position(mut self, position_id: impl Into<String>) -> Self {
        self.allowed_positions.push(position_id.into());
        self
    }

    /// Adds an allowed slot.
    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.allowed_slots.push(slot);
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether the rule admits (position, slot).
    pub fn admits(&self, position_id: &str, slot: TimeSlot) -> bool {
        let position_ok = self.allowed_positions.is_empty()
            || self.allowed_positions.iter().any(|p| p == position_id);
        let slot_ok = self.allowed_slots.is_empty() || self.allowed_slots.contains(&slot);
        position_ok && slot_ok
    }
}

/// Forces a person onto one (position, date, slot) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAssignment {
    /// Assignment identifier. Inline (not yet persisted) assignments may
    /// carry any caller-chosen id.
    pub id: String,
    /// Person forced onto the cell.
    pub personnel_id: String,
    /// Target position.
    pub position_id: String,
    /// Target date.
    pub date: NaiveDate,
    /// Target slot.
    pub slot: TimeSlot,
    /// Disabled assignments are ignored.
    pub enabled: bool,
}

impl ManualAssignment {
    /// Creates an enabled manual assignment.
    pub fn new(
        id: impl Into<String>,
        personnel_id: impl Into<String>,
        position_id: impl Into<String>,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Self {
        Self {
            id: id.into(),
            personnel_id: personnel_id.into(),
            position_id: position_id.into(),
            date,
            slot,
            enabled: true,
        }
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether two assignments target the same cell.
    pub fn same_cell(&self, other: &Self) -> bool {
        self.position_id == other.position_id && self.date == other.date && self.slot == other.slot
    }
}
