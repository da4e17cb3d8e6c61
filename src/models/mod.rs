//! Duty-roster domain models.
//!
//! Provides the input records (personnel, positions, rules, calendars)
//! and the output records (schedules, conflicts) of the engine.
//!
//! # Domain Mappings
//!
//! | duty-roster | Guard Service | Hospital | Help Desk |
//! |-------------|---------------|----------|-----------|
//! | Personnel | Guard | Nurse | Agent |
//! | Position | Post | Ward Station | Queue |
//! | TimeSlot | Watch | Shift Block | Rota Block |
//! | Schedule | Duty Roster | Ward Rota | Coverage Plan |

mod calendar;
mod conflict;
mod constraint;
mod personnel;
mod position;
mod schedule;
mod timeslot;

pub use calendar::HolidayConfig;
pub use conflict::{Conflict, ConflictSubtype, ConflictType};
pub use constraint::{FixedPositionRule, ManualAssignment};
pub use personnel::Personnel;
pub use position::Position;
pub use schedule::{CellRef, Schedule, Shift, ShiftId};
pub use timeslot::{DateRange, TimeSlot, SLOTS_PER_DAY, SLOT_HOURS};
