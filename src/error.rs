//! Error taxonomy.
//!
//! - [`ConfigError`]: out-of-range parameters, rejected before a run starts.
//! - [`EngineError`]: stage-level failures inside a run. The engine turns
//!   every variant except `Config` into a failed or cancelled
//!   [`SchedulingResult`](crate::engine::SchedulingResult).

use thiserror::Error;

use crate::models::Conflict;

/// Invalid engine or genetic configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("population_size must be in 10..=200, got {0}")]
    PopulationSize(usize),

    #[error("max_generations must be in 10..=500, got {0}")]
    MaxGenerations(usize),

    #[error("crossover_rate must be in 0.0..=1.0, got {0}")]
    CrossoverRate(f64),

    #[error("mutation_rate must be in 0.0..=1.0, got {0}")]
    MutationRate(f64),

    #[error("perturbation_rate must be in 0.0..=1.0, got {0}")]
    PerturbationRate(f64),

    #[error("elite_count must be in 0..=10 and below population_size ({population}), got {elite}")]
    EliteCount { elite: usize, population: usize },

    #[error("tournament size must be in 2..=population_size ({population}), got {size}")]
    TournamentSize { size: usize, population: usize },

    #[error("stagnation_limit must be positive when set")]
    StagnationLimit,

    #[error("scoring weight '{name}' must be finite and non-negative, got {value}")]
    ScoringWeight { name: &'static str, value: f64 },

    #[error("imbalance_tolerance must be finite and non-negative, got {0}")]
    ImbalanceTolerance(f64),

    #[error("cancel_check_interval must be at least 1")]
    CancelCheckInterval,

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure inside a scheduling run.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("data integrity error: {} conflict(s)", .0.len())]
    DataIntegrity(Vec<Conflict>),

    #[error("run cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
