//! Schedule (solution) model.
//!
//! A schedule is the full set of duty cells for a horizon: one [`Shift`]
//! per (position, date, slot), each either staffed by one person or left
//! unassigned.
//!
//! # Invariants
//! - At most one person per cell.
//! - No person occupies two cells with the same (date, slot).
//!
//! Engine-produced schedules satisfy both. Schedules edited by callers may
//! not; the conflict detector reports any breach.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{DateRange, TimeSlot};

/// Stable shift identifier derived from the cell coordinate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    /// Builds the id for (position, date, slot).
    pub fn for_cell(position_id: &str, date: NaiveDate, slot: TimeSlot) -> Self {
        Self(format!("{position_id}@{date}#{}", slot.index()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coordinate of one duty cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Position identifier.
    pub position_id: String,
    /// Date.
    pub date: NaiveDate,
    /// Slot of day.
    pub slot: TimeSlot,
}

impl CellRef {
    /// Creates a cell reference.
    pub fn new(position_id: impl Into<String>, date: NaiveDate, slot: TimeSlot) -> Self {
        Self {
            position_id: position_id.into(),
            date,
            slot,
        }
    }

    /// Shift id of this cell.
    pub fn shift_id(&self) -> ShiftId {
        ShiftId::for_cell(&self.position_id, self.date, self.slot)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} {}", self.position_id, self.date, self.slot)
    }
}

/// One duty cell and its occupant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Stable identifier.
    pub id: ShiftId,
    /// Position staffed.
    pub position_id: String,
    /// Date.
    pub date: NaiveDate,
    /// Slot of day.
    pub slot: TimeSlot,
    /// Assigned person, if any.
    pub personnel_id: Option<String>,
    /// Whether the cell was pinned by a manual assignment.
    pub pinned: bool,
}

impl Shift {
    /// Creates an unassigned shift.
    pub fn new(position_id: impl Into<String>, date: NaiveDate, slot: TimeSlot) -> Self {
        let position_id = position_id.into();
        Self {
            id: ShiftId::for_cell(&position_id, date, slot),
            position_id,
            date,
            slot,
            personnel_id: None,
            pinned: false,
        }
    }

    /// Sets the occupant.
    pub fn with_personnel(mut self, personnel_id: impl Into<String>) -> Self {
        self.personnel_id = Some(personnel_id.into());
        self
    }

    /// Marks the shift pinned.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Cell coordinate of this shift.
    pub fn cell(&self) -> CellRef {
        CellRef::new(self.position_id.clone(), self.date, self.slot)
    }

    /// Whether someone is assigned.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.personnel_id.is_some()
    }
}

/// A complete duty schedule over a horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Planning horizon.
    pub horizon: DateRange,
    /// All cells, ordered by (date, slot, position order of the run).
    pub shifts: Vec<Shift>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new(horizon: DateRange) -> Self {
        Self {
            horizon,
            shifts: Vec::new(),
        }
    }

    /// Adds a shift.
    pub fn add_shift(&mut self, shift: Shift) {
        self.shifts.push(shift);
    }

    /// Finds the shift for a cell.
    pub fn shift_at(&self, position_id: &str, date: NaiveDate, slot: TimeSlot) -> Option<&Shift> {
        self.shifts
            .iter()
            .find(|s| s.position_id == position_id && s.date == date && s.slot == slot)
    }

    /// Finds a shift by id.
    pub fn shift(&self, id: &ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }

    /// Assigns a person to a shift, replacing any occupant.
    ///
    /// Returns the previous occupant, or `None` if the shift does not exist
    /// or was empty.
    pub fn assign(&mut self, id: &ShiftId, personnel_id: impl Into<String>) -> Option<String> {
        let shift = self.shifts.iter_mut().find(|s| &s.id == id)?;
        shift.personnel_id.replace(personnel_id.into())
    }

    /// Clears a shift. Returns the previous occupant.
    pub fn unassign(&mut self, id: &ShiftId) -> Option<String> {
        let shift = self.shifts.iter_mut().find(|s| &s.id == id)?;
        shift.personnel_id.take()
    }

    /// All shifts staffed by a person.
    pub fn shifts_for_personnel(&self, personnel_id: &str) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|s| s.personnel_id.as_deref() == Some(personnel_id))
            .collect()
    }

    /// All shifts of a position.
    pub fn shifts_for_position(&self, position_id: &str) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|s| s.position_id == position_id)
            .collect()
    }

    /// Number of staffed shifts.
    pub fn assigned_count(&self) -> usize {
        self.shifts.iter().filter(|s| s.is_assigned()).count()
    }

    /// Number of unstaffed shifts.
    pub fn unassigned_count(&self) -> usize {
        self.shifts.len() - self.assigned_count()
    }

    /// Total number of cells.
    pub fn shift_count(&self) -> usize {
        self.shifts.len()
    }

    /// Groups staffed shifts by (date, slot, person); any group with more
    /// than one shift is a double booking.
    pub fn occupancy(&self) -> BTreeMap<(NaiveDate, TimeSlot, &str), Vec<&Shift>> {
        let mut map: BTreeMap<(NaiveDate, TimeSlot, &str), Vec<&Shift>> = BTreeMap::new();
        for shift in &self.shifts {
            if let Some(p) = shift.personnel_id.as_deref() {
                map.entry((shift.date, shift.slot, p)).or_default().push(shift);
            }
        }
        map
    }

    /// Whether any person is booked twice in the same (date, slot).
    pub fn has_double_booking(&self) -> bool {
        self.occupancy().values().any(|v| v.len() > 1)
    }
}
