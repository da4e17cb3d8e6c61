//! Dense feasibility tensor.
//!
//! # Layout
//!
//! Cells are numbered so that all positions of one (day, slot) are
//! contiguous:
//!
//! ```text
//! cell = (day * SLOTS_PER_DAY + slot) * positions + position
//! ```
//!
//! Per-person states are stored cell-major (`cell * personnel + person`).
//! Alongside the states the tensor keeps, for each cell, the sorted list
//! of eligible personnel so callers never scan the full tensor per cell.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::models::{CellRef, DateRange, TimeSlot, SLOTS_PER_DAY};

/// Dense cell number (see module docs).
pub type CellId = usize;

/// Dense personnel number (index into the run's personnel list).
pub type PersonIdx = u32;

/// Eligibility of one person for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    /// May not staff the cell.
    Forbidden,
    /// May staff the cell.
    Allowed,
    /// Must staff the cell (manual assignment).
    Forced,
}

/// (personnel × position × date × slot) → [`CellState`].
///
/// Built once per run by [`TensorBuilder`](super::TensorBuilder) and
/// read-only afterwards, so it may be shared freely across threads.
#[derive(Debug, Clone)]
pub struct FeasibilityTensor {
    pub(super) horizon: DateRange,
    pub(super) personnel_ids: Vec<String>,
    pub(super) position_ids: Vec<String>,
    pub(super) personnel_index: HashMap<String, usize>,
    pub(super) position_index: HashMap<String, usize>,
    pub(super) days: usize,
    pub(super) states: Vec<CellState>,
    pub(super) eligible: Vec<Vec<PersonIdx>>,
    pub(super) pinned: Vec<Option<PersonIdx>>,
    pub(super) open_cells: Vec<CellId>,
    pub(super) pinned_cells: Vec<CellId>,
    pub(super) rest_days: Vec<bool>,
}

impl FeasibilityTensor {
    /// Creates an all-forbidden tensor.
    pub(super) fn empty(
        horizon: DateRange,
        personnel_ids: Vec<String>,
        position_ids: Vec<String>,
    ) -> Self {
        let days = horizon.len();
        let cells = days * SLOTS_PER_DAY * position_ids.len();
        let personnel_index = personnel_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let position_index = position_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self {
            horizon,
            states: vec![CellState::Forbidden; cells * personnel_ids.len()],
            eligible: vec![Vec::new(); cells],
            pinned: vec![None; cells],
            open_cells: Vec::new(),
            pinned_cells: Vec::new(),
            rest_days: vec![false; days],
            personnel_ids,
            position_ids,
            personnel_index,
            position_index,
            days,
        }
    }

    /// Planning horizon.
    pub fn horizon(&self) -> DateRange {
        self.horizon
    }

    /// Number of personnel.
    #[inline]
    pub fn personnel_count(&self) -> usize {
        self.personnel_ids.len()
    }

    /// Number of positions.
    #[inline]
    pub fn position_count(&self) -> usize {
        self.position_ids.len()
    }

    /// Number of days.
    #[inline]
    pub fn day_count(&self) -> usize {
        self.days
    }

    /// Number of cells (positions × days × slots).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.eligible.len()
    }

    /// Number of distinct (day, slot) times.
    #[inline]
    pub fn time_count(&self) -> usize {
        self.days * SLOTS_PER_DAY
    }

    /// Cell number for (position, day, slot). Caller guarantees bounds.
    #[inline]
    pub fn cell_id(&self, position: usize, day: usize, slot: TimeSlot) -> CellId {
        (day * SLOTS_PER_DAY + slot.index()) * self.position_count() + position
    }

    /// Bounds-checked [`cell_id`](Self::cell_id).
    pub fn checked_cell_id(&self, position: usize, day: usize, slot: TimeSlot) -> Result<CellId> {
        if position >= self.position_count() || day >= self.days {
            return Err(EngineError::Internal(format!(
                "tensor index out of range: position {position}/{}, day {day}/{}",
                self.position_count(),
                self.days
            )));
        }
        Ok(self.cell_id(position, day, slot))
    }

    /// Cell number for an id-based coordinate, if inside the run.
    pub fn find_cell(&self, position_id: &str, date: NaiveDate, slot: TimeSlot) -> Option<CellId> {
        let position = *self.position_index.get(position_id)?;
        let day = self.horizon.day_index(date)?;
        Some(self.cell_id(position, day, slot))
    }

    /// Global time index (day * SLOTS_PER_DAY + slot) of a cell.
    #[inline]
    pub fn time_of(&self, cell: CellId) -> usize {
        cell / self.position_count().max(1)
    }

    /// Position index of a cell.
    #[inline]
    pub fn position_of(&self, cell: CellId) -> usize {
        cell % self.position_count().max(1)
    }

    /// Day index of a cell.
    #[inline]
    pub fn day_of(&self, cell: CellId) -> usize {
        self.time_of(cell) / SLOTS_PER_DAY
    }

    /// Slot of a cell.
    #[inline]
    pub fn slot_of(&self, cell: CellId) -> TimeSlot {
        let index = (self.time_of(cell) % SLOTS_PER_DAY) as u8;
        TimeSlot::new(index).unwrap_or_else(|| unreachable!("slot index is reduced modulo SLOTS_PER_DAY"))
    }

    /// Date of a cell.
    pub fn date_of(&self, cell: CellId) -> NaiveDate {
        self.horizon
            .date_at(self.day_of(cell))
            .unwrap_or(self.horizon.start)
    }

    /// Id-based coordinate of a cell.
    pub fn cell_ref(&self, cell: CellId) -> CellRef {
        CellRef::new(
            self.position_ids[self.position_of(cell)].clone(),
            self.date_of(cell),
            self.slot_of(cell),
        )
    }

    /// Cells belonging to one (day, slot) time index.
    pub fn cells_at_time(&self, time: usize) -> std::ops::Range<CellId> {
        let q = self.position_count();
        time * q..(time + 1) * q
    }

    /// State of (person, cell).
    #[inline]
    pub fn state(&self, person: PersonIdx, cell: CellId) -> CellState {
        self.states[cell * self.personnel_count() + person as usize]
    }

    /// Whether the person may (or must) staff the cell.
    #[inline]
    pub fn is_eligible(&self, person: PersonIdx, cell: CellId) -> bool {
        self.state(person, cell) != CellState::Forbidden
    }

    /// Eligible personnel of a cell, ascending.
    #[inline]
    pub fn eligible(&self, cell: CellId) -> &[PersonIdx] {
        &self.eligible[cell]
    }

    /// Forced occupant of a pinned cell.
    #[inline]
    pub fn pinned(&self, cell: CellId) -> Option<PersonIdx> {
        self.pinned[cell]
    }

    /// Cells not pinned by a manual assignment, ascending.
    pub fn open_cells(&self) -> &[CellId] {
        &self.open_cells
    }

    /// Cells pinned by a manual assignment, ascending.
    pub fn pinned_cells(&self) -> &[CellId] {
        &self.pinned_cells
    }

    /// Whether the day is a rest day under the governing calendar.
    pub fn is_rest_day(&self, day: usize) -> bool {
        self.rest_days.get(day).copied().unwrap_or(false)
    }

    /// Personnel id for an index.
    pub fn personnel_id(&self, person: PersonIdx) -> &str {
        &self.personnel_ids[person as usize]
    }

    /// Position id for an index.
    pub fn position_id(&self, position: usize) -> &str {
        &self.position_ids[position]
    }

    /// Personnel index for an id, if in the run.
    pub fn personnel_idx(&self, id: &str) -> Option<PersonIdx> {
        self.personnel_index.get(id).map(|&i| i as PersonIdx)
    }

    /// Position index for an id, if in the run.
    pub fn position_idx(&self, id: &str) -> Option<usize> {
        self.position_index.get(id).copied()
    }

    pub(super) fn set_state(&mut self, person: usize, cell: CellId, state: CellState) {
        let p = self.personnel_count();
        self.states[cell * p + person] = state;
    }

    /// Rebuilds the per-cell eligible lists and the pinned/open partition
    /// from the states.
    pub(super) fn index_cells(&mut self) {
        let p_count = self.personnel_count();
        self.open_cells.clear();
        self.pinned_cells.clear();
        for cell in 0..self.cell_count() {
            let row = &self.states[cell * p_count..(cell + 1) * p_count];
            let mut eligible = Vec::new();
            let mut forced = None;
            for (p, state) in row.iter().enumerate() {
                match state {
                    CellState::Forbidden => {}
                    CellState::Allowed => eligible.push(p as PersonIdx),
                    CellState::Forced => {
                        eligible.push(p as PersonIdx);
                        forced = Some(p as PersonIdx);
                    }
                }
            }
            self.eligible[cell] = eligible;
            self.pinned[cell] = forced;
            if forced.is_some() {
                self.pinned_cells.push(cell);
            } else {
                self.open_cells.push(cell);
            }
        }
    }
}
