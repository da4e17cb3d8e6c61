//! Scheduling engine.
//!
//! [`SchedulingEngine::run`] executes one request as a single cancellable
//! unit of work:
//!
//! 1. Resolve the request against the [`DomainStore`] and validate it.
//! 2. Build the feasibility tensor.
//! 3. Greedy pass.
//! 4. Genetic refinement (hybrid mode).
//! 5. Conflict detection and statistics.
//!
//! Configuration errors are returned synchronously. Everything else,
//! including cancellation and internal faults, yields one complete
//! [`SchedulingResult`].

mod request;
mod result;

pub use request::{DomainSnapshot, DomainStore, SchedulingMode, SchedulingRequest};
pub use result::{FailureKind, RunOutcome, SchedulingResult};

use std::panic::{self, AssertUnwindSafe};
use tracing::{info, info_span, warn};

use crate::config::EngineConfig;
use crate::conflicts::ConflictDetector;
use crate::error::{ConfigError, EngineError, Result};
use crate::feasibility::TensorBuilder;
use crate::fitness::Scorer;
use crate::ga::GeneticOptimizer;
use crate::models::{Conflict, ConflictSubtype, SLOTS_PER_DAY};
use crate::progress::{CancellationToken, NullSink, ProgressEvent, ProgressScale, ProgressSink, Stage};
use crate::scheduler::{roster_to_schedule, GreedyAssigner, ScheduleStats};
use crate::validation::{resolve_request, ValidationError};

/// Runs scheduling requests under one deployment configuration.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use duty_roster::config::EngineConfig;
/// use duty_roster::engine::{DomainSnapshot, SchedulingEngine, SchedulingRequest};
/// use duty_roster::models::{DateRange, Personnel, Position};
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
/// let store = DomainSnapshot::new()
///     .with_personnel(Personnel::new("P1"))
///     .with_personnel(Personnel::new("P2"))
///     .with_position(Position::new("Gate"));
/// let request = SchedulingRequest::new("Monday", DateRange::single(day))
///     .with_personnel("P1")
///     .with_personnel("P2")
///     .with_position("Gate");
///
/// let engine = SchedulingEngine::new(EngineConfig::default());
/// let result = engine.run_simple(&request, &store).unwrap();
/// assert!(result.success());
/// assert_eq!(result.schedule.unwrap().assigned_count(), 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchedulingEngine {
    config: EngineConfig,
}

impl SchedulingEngine {
    /// Creates an engine with a deployment configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the deployment configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs without progress reporting or cancellation.
    pub fn run_simple(
        &self,
        request: &SchedulingRequest,
        store: &dyn DomainStore,
    ) -> std::result::Result<SchedulingResult, ConfigError> {
        self.run(request, store, &NullSink, &CancellationToken::new())
    }

    /// Runs one request.
    ///
    /// # Errors
    /// [`ConfigError`] when the engine configuration or the genetic
    /// parameters are out of range. Nothing runs in that case.
    pub fn run(
        &self,
        request: &SchedulingRequest,
        store: &dyn DomainStore,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> std::result::Result<SchedulingResult, ConfigError> {
        self.config.validate()?;
        if let SchedulingMode::Hybrid(params) = &request.mode {
            params.validate()?;
        }

        let span = info_span!("schedule", title = %request.title, mode = request.mode.as_str());
        let _enter = span.enter();

        let title = request.title.as_str();
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.execute(request, store, sink, cancel)));
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(EngineError::DataIntegrity(conflicts))) => {
                warn!(conflicts = conflicts.len(), "input failed integrity checks");
                SchedulingResult::failed(title, FailureKind::DataIntegrity, conflicts)
            }
            Ok(Err(EngineError::Cancelled)) => {
                info!("run cancelled");
                SchedulingResult::cancelled(title)
            }
            Ok(Err(EngineError::Config(err))) => return Err(err),
            Ok(Err(EngineError::Internal(detail))) => internal_failure(title, detail),
            Err(payload) => {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                internal_failure(title, format!("panic: {detail}"))
            }
        };
        Ok(result)
    }

    fn execute(
        &self,
        request: &SchedulingRequest,
        store: &dyn DomainStore,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<SchedulingResult> {
        let set = resolve_request(request, store, &self.config).map_err(|errors| {
            EngineError::DataIntegrity(errors.iter().map(ValidationError::to_conflict).collect())
        })?;
        let total = set.positions.len() * set.horizon.len() * SLOTS_PER_DAY;
        info!(
            personnel = set.personnel.len(),
            positions = set.positions.len(),
            days = set.horizon.len(),
            "request validated"
        );
        sink.report(ProgressEvent::new(Stage::Validated, 5.0, 0, total));
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let tensor = TensorBuilder::new(&set).build()?;
        info!(
            pinned = tensor.pinned_cells().len(),
            open = tensor.open_cells().len(),
            "feasibility tensor built"
        );
        sink.report(ProgressEvent::new(Stage::TensorBuilt, 15.0, 0, total));

        let hybrid = match &request.mode {
            SchedulingMode::GreedyOnly => None,
            SchedulingMode::Hybrid(params) => Some(params),
        };
        let greedy_end = if hybrid.is_some() { 35.0 } else { 90.0 };
        let greedy = GreedyAssigner::new(&tensor, &set.personnel)
            .with_check_interval(self.config.cancel_check_interval)
            .run(&ProgressScale::new(sink, 15.0, greedy_end, total), cancel)?;
        let greedy_assigned = greedy.roster.iter().filter(|o| o.is_some()).count();
        info!(
            assigned = greedy_assigned,
            unassigned = greedy.unassigned.len(),
            "greedy pass complete"
        );
        sink.report(ProgressEvent::new(Stage::GreedyComplete, greedy_end, greedy_assigned, total));

        let scorer = Scorer::new(&tensor, &set);
        let seed_fitness = scorer.evaluate(&greedy.roster);
        let mut diagnostics = Vec::new();
        let (roster, generations) = match hybrid {
            None => (greedy.roster, 0),
            Some(params) => {
                let outcome = GeneticOptimizer::new(&tensor, scorer, params).run_with(
                    &greedy.roster,
                    &ProgressScale::new(sink, greedy_end, 90.0, total),
                    cancel,
                )?;
                if outcome.cancelled {
                    return Err(EngineError::Cancelled);
                }
                info!(
                    generations = outcome.generations,
                    seed = %outcome.seed_fitness,
                    best = %outcome.best_fitness(),
                    stagnated = outcome.stagnated,
                    "genetic refinement complete"
                );
                if outcome.stagnated {
                    diagnostics.push(format!(
                        "stopped after {} generations without improvement",
                        outcome.generations
                    ));
                }
                (outcome.best.decode(&tensor), outcome.generations)
            }
        };

        let fitness = scorer.evaluate(&roster);
        let schedule = roster_to_schedule(&tensor, &roster);
        let conflicts = ConflictDetector::new(&set, &tensor).detect(&schedule);
        sink.report(ProgressEvent::new(
            Stage::ConflictsDetected,
            95.0,
            schedule.assigned_count(),
            total,
        ));

        let statistics = ScheduleStats::calculate(&schedule, &set);
        let outcome = if conflicts.iter().any(Conflict::is_hard) {
            warn!(fitness = %fitness, "final schedule violates hard constraints");
            RunOutcome::Failed(FailureKind::Unsatisfiable)
        } else {
            RunOutcome::Completed
        };

        let mut result = SchedulingResult::empty(request.title.clone(), outcome);
        result.set_conflicts(conflicts);
        result.statistics = Some(statistics);
        result.fitness = Some(fitness);
        result.seed_fitness = Some(seed_fitness);
        result.generations = generations;
        result.diagnostics = diagnostics;
        let assigned = schedule.assigned_count();
        result.schedule = Some(schedule);

        info!(
            assigned,
            conflicts = result.summary.total,
            hard = result.summary.hard(),
            "run finished"
        );
        sink.report(ProgressEvent::new(Stage::Finished, 100.0, assigned, total));
        Ok(result)
    }
}

fn internal_failure(title: &str, detail: String) -> SchedulingResult {
    warn!(%detail, "internal fault");
    SchedulingResult::failed(
        title,
        FailureKind::Internal,
        vec![Conflict::new(ConflictSubtype::InternalError, detail.clone())],
    )
    .with_diagnostic(detail)
}
