//! Conflict detection.
//!
//! Turns a finalized (or hand-edited) schedule into categorized
//! [`Conflict`](crate::models::Conflict) records and aggregate counts.
//! Detection never mutates its inputs; the caller-owned "ignored" state of
//! a conflict is keyed by its deterministic id and plays no part here.

mod detector;
mod summary;

pub use detector::{detect_conflicts, ConflictDetector};
pub use summary::ConflictSummary;
