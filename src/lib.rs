//! Constraint-based duty roster engine.
//!
//! Assigns personnel to time-sliced duty positions over a multi-day
//! horizon. Hard constraints (eligibility, manual assignments, no double
//! booking) are never traded away; soft ones (workload balance, rest) are
//! minimized.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Personnel`, `Position`, `TimeSlot`,
//!   `FixedPositionRule`, `ManualAssignment`, `HolidayConfig`, `Schedule`,
//!   `Conflict`
//! - **`validation`**: Request resolution and input integrity checks
//! - **`feasibility`**: Feasibility tensor and constraint application
//! - **`scheduler`**: Greedy assigner, fairness counters, statistics
//! - **`fitness`**: Lexicographic `(hard, soft)` scoring
//! - **`ga`**: Genetic refinement of the greedy roster
//! - **`conflicts`**: Conflict detection and summaries
//! - **`engine`**: Request → result pipeline with progress and cancellation
//!
//! # Architecture
//!
//! The tensor is built once per run and shared read-only by the greedy
//! pass, the genetic optimizer and the conflict detector. Domain records
//! are never mutated; fairness counters live in a run-local table.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod config;
pub mod conflicts;
pub mod engine;
pub mod error;
pub mod feasibility;
pub mod fitness;
pub mod ga;
pub mod models;
pub mod progress;
pub mod scheduler;
pub mod validation;
