//! Per-deployment engine configuration.
//!
//! [`EngineConfig`] carries the policy knobs that differ between
//! deployments: whether skills are matched, how rest days are treated,
//! how much rest personnel need between duties, and how soft violations
//! are weighted. Every field has a default, so a partial TOML document
//! is enough:
//!
//! ```
//! use duty_roster::config::{EngineConfig, RestDayPolicy};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     rest_day_policy = "hard"
//!     min_rest_slots = 2
//!
//!     [weights]
//!     rest_interval = 3.0
//! "#).unwrap();
//!
//! assert_eq!(config.rest_day_policy, RestDayPolicy::Hard);
//! assert_eq!(config.min_rest_slots, 2);
//! assert!((config.weights.rest_interval - 3.0).abs() < 1e-12);
//! assert!(config.skill_matching);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How rest days affect personnel subject to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestDayPolicy {
    /// Rest days have no effect.
    Ignore,
    /// Rest-day duty is allowed but penalized.
    #[default]
    Soft,
    /// Rest-day duty is forbidden.
    Hard,
}

/// Weights of the soft-penalty terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the variance of per-person assignment totals.
    pub workload_variance: f64,
    /// Penalty per rest-interval violation.
    pub rest_interval: f64,
    /// Penalty per unassigned open cell.
    pub unassigned: f64,
    /// Penalty per rest-day duty (soft rest-day policy only).
    pub rest_day_duty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            workload_variance: 1.0,
            rest_interval: 5.0,
            unassigned: 50.0,
            rest_day_duty: 1.0,
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("workload_variance", self.workload_variance),
            ("rest_interval", self.rest_interval),
            ("unassigned", self.unassigned),
            ("rest_day_duty", self.rest_day_duty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ScoringWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Engine policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Require personnel skills to cover position requirements.
    pub skill_matching: bool,
    /// Treatment of rest days.
    pub rest_day_policy: RestDayPolicy,
    /// Minimum idle slots between two duties of one person.
    pub min_rest_slots: u32,
    /// Deviation from the mean workload (in shifts) beyond which the
    /// detector reports an imbalance.
    pub imbalance_tolerance: f64,
    /// Soft-penalty weights.
    pub weights: ScoringWeights,
    /// The greedy pass checks for cancellation every this many cells.
    pub cancel_check_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            skill_matching: true,
            rest_day_policy: RestDayPolicy::default(),
            min_rest_slots: 1,
            imbalance_tolerance: 2.0,
            weights: ScoringWeights::default(),
            cancel_check_interval: 256,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets skill matching.
    pub fn with_skill_matching(mut self, enabled: bool) -> Self {
        self.skill_matching = enabled;
        self
    }

    /// Sets the rest-day policy.
    pub fn with_rest_day_policy(mut self, policy: RestDayPolicy) -> Self {
        self.rest_day_policy = policy;
        self
    }

    /// Sets the minimum rest between duties.
    pub fn with_min_rest_slots(mut self, slots: u32) -> Self {
        self.min_rest_slots = slots;
        self
    }

    /// Sets the workload-imbalance tolerance, in shifts.
    pub fn with_imbalance_tolerance(mut self, tolerance: f64) -> Self {
        self.imbalance_tolerance = tolerance;
        self
    }

    /// Sets the scoring weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !self.imbalance_tolerance.is_finite() || self.imbalance_tolerance < 0.0 {
            return Err(ConfigError::ImbalanceTolerance(self.imbalance_tolerance));
        }
        if self.cancel_check_interval == 0 {
            return Err(ConfigError::CancelCheckInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.skill_matching);
        assert_eq!(config.rest_day_policy, RestDayPolicy::Soft);
        assert_eq!(config.min_rest_slots, 1);
        assert_eq!(config.cancel_check_interval, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_weights() {
        let config = EngineConfig::from_toml_str("[weights]\nunassigned = 10.0\n").unwrap();
        assert!((config.weights.unassigned - 10.0).abs() < 1e-12);
        assert!((config.weights.rest_interval - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = EngineConfig::from_toml_str("[weights]\nrest_interval = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ScoringWeight { name: "rest_interval", .. }));
    }

    #[test]
    fn test_bad_policy_rejected() {
        let err = EngineConfig::from_toml_str("rest_day_policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_check_interval_rejected() {
        let config = EngineConfig {
            cancel_check_interval: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::CancelCheckInterval)));
    }
}
