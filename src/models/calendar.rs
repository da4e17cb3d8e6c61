//! Rest-day calendar.
//!
//! A [`HolidayConfig`] flags which dates are rest days. Exactly one
//! configuration governs a run; the engine picks it from the request or
//! from the config marked `active`.
//!
//! # Precedence
//! Exclusions override everything. A date is a rest day iff:
//! - It is NOT listed in `exclusions`, AND
//! - It falls on a weekend day (when `weekend_rest` is set), OR is a
//!   legal holiday, OR is a custom holiday.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Rest-day calendar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayConfig {
    /// Configuration identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether weekend days count as rest days.
    pub weekend_rest: bool,
    /// Days treated as the weekend.
    pub weekend_days: Vec<Weekday>,
    /// Statutory holidays.
    pub legal_holidays: Vec<NaiveDate>,
    /// Deployment-specific extra rest days.
    pub custom_holidays: Vec<NaiveDate>,
    /// Dates that are working days despite the rules above
    /// (e.g. a make-up Saturday).
    pub exclusions: Vec<NaiveDate>,
    /// Marks the deployment's default configuration.
    pub active: bool,
}

impl HolidayConfig {
    /// Creates a config with Saturday/Sunday weekends and no holidays.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            weekend_rest: true,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            legal_holidays: Vec::new(),
            custom_holidays: Vec::new(),
            exclusions: Vec::new(),
            active: false,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enables or disables weekend rest.
    pub fn with_weekend_rest(mut self, enabled: bool) -> Self {
        self.weekend_rest = enabled;
        self
    }

    /// Replaces the weekend days.
    pub fn with_weekend_days(mut self, days: Vec<Weekday>) -> Self {
        self.weekend_days = days;
        self
    }

    /// Adds a legal holiday.
    pub fn with_legal_holiday(mut self, date: NaiveDate) -> Self {
        self.legal_holidays.push(date);
        self
    }

    /// Adds a custom holiday.
    pub fn with_custom_holiday(mut self, date: NaiveDate) -> Self {
        self.custom_holidays.push(date);
        self
    }

    /// Adds an exclusion (forced working day).
    pub fn with_exclusion(mut self, date: NaiveDate) -> Self {
        self.exclusions.push(date);
        self
    }

    /// Marks this config active.
    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    /// Whether `date` is a rest day.
    pub fn is_rest_day(&self, date: NaiveDate) -> bool {
        if self.exclusions.contains(&date) {
            return false;
        }
        let weekend = self.weekend_rest && self.weekend_days.contains(&date.weekday());
        weekend || self.legal_holidays.contains(&date) || self.custom_holidays.contains(&date)
    }
}
