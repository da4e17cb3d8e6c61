//! Progress reporting and cooperative cancellation.
//!
//! The engine pushes [`ProgressEvent`]s into a [`ProgressSink`]
//! synchronously, from whatever thread runs the engine. Sinks must not
//! block; a UI that needs its own thread should forward through a
//! channel (`std::sync::mpsc::Sender` implements the trait).
//!
//! A [`CancellationToken`] is checked at the start of each generation and
//! periodically within the greedy pass.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::models::CellRef;

/// A stage of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Request resolved and validated.
    Validated,
    /// Feasibility tensor built and constraints applied.
    TensorBuilt,
    /// Greedy pass in progress.
    Greedy,
    /// Greedy pass complete.
    GreedyComplete,
    /// One genetic generation complete.
    Generation { index: usize, of: usize },
    /// Conflicts detected on the final schedule.
    ConflictsDetected,
    /// Run finished.
    Finished,
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Current stage.
    pub stage: Stage,
    /// Overall completion, 0.0..=100.0.
    pub percent: f32,
    /// Cells assigned so far.
    pub assignments_completed: usize,
    /// Total cells in the horizon.
    pub assignments_total: usize,
    /// Cell being processed, when meaningful.
    pub current: Option<CellRef>,
}

impl ProgressEvent {
    /// Creates an event with no current cell.
    pub fn new(stage: Stage, percent: f32, completed: usize, total: usize) -> Self {
        Self {
            stage,
            percent: percent.clamp(0.0, 100.0),
            assignments_completed: completed,
            assignments_total: total,
            current: None,
        }
    }

    /// Sets the current cell.
    pub fn at(mut self, cell: CellRef) -> Self {
        self.current = Some(cell);
        self
    }
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    /// Delivers one event. Must not block.
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Forwards events into a channel. A disconnected receiver is ignored.
impl ProgressSink for Sender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _event: ProgressEvent) {}
}

/// Maps a stage-local fraction onto an overall percent window.
#[derive(Clone, Copy)]
pub(crate) struct ProgressScale<'a> {
    sink: &'a dyn ProgressSink,
    from: f32,
    to: f32,
    total: usize,
}

impl<'a> ProgressScale<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink, from: f32, to: f32, total: usize) -> Self {
        Self { sink, from, to, total }
    }

    /// Reports `stage` at `fraction` (0.0..=1.0) of the window.
    pub(crate) fn emit(&self, stage: Stage, fraction: f32, completed: usize, current: Option<CellRef>) {
        let percent = self.from + (self.to - self.from) * fraction.clamp(0.0, 1.0);
        let mut event = ProgressEvent::new(stage, percent, completed, self.total);
        event.current = current;
        self.sink.report(event);
    }
}

/// Shared cancellation flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// The underlying flag, for runners that poll an `AtomicBool`.
    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
