//! Time model: fixed-width slots within a day, and the planning horizon.
//!
//! A day is divided into [`SLOTS_PER_DAY`] windows of equal width
//! (two hours each). A slot paired with a date forms a duty coordinate.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of slots in one day.
pub const SLOTS_PER_DAY: usize = 12;

/// Width of one slot in hours.
pub const SLOT_HOURS: u32 = (24 / SLOTS_PER_DAY) as u32;

/// A slot of the day, `0..SLOTS_PER_DAY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TimeSlot(u8);

impl TimeSlot {
    /// Creates a slot, or `None` if `index >= SLOTS_PER_DAY`.
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < SLOTS_PER_DAY).then_some(Self(index))
    }

    /// Slot index within the day.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Hour of day at which this slot starts.
    pub fn start_hour(self) -> u32 {
        self.0 as u32 * SLOT_HOURS
    }

    /// All slots of a day in order.
    pub fn all() -> impl Iterator<Item = TimeSlot> {
        (0..SLOTS_PER_DAY as u8).map(TimeSlot)
    }
}

impl TryFrom<u8> for TimeSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TimeSlot::new(value).ok_or_else(|| format!("time slot {value} out of range 0..{SLOTS_PER_DAY}"))
    }
}

impl From<TimeSlot> for u8 {
    fn from(slot: TimeSlot) -> u8 {
        slot.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start_hour();
        write!(f, "{:02}:00-{:02}:00", start, (start + SLOT_HOURS) % 24)
    }
}

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the horizon.
    pub start: NaiveDate,
    /// Last day of the horizon (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range. `end` before `start` yields an empty range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A single-day range.
    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// Number of days in the range.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    /// Whether the range contains no days.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Zero-based day offset of `date`, if inside the range.
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.contains(date)
            .then(|| (date - self.start).num_days() as usize)
    }

    /// Date at a zero-based offset.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.len() {
            return None;
        }
        self.start.checked_add_days(Days::new(index as u64))
    }

    /// Iterates all dates in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.len()).filter_map(|i| self.date_at(i))
    }
}
