//! Duty position model.

use serde::{Deserialize, Serialize};

/// A duty position (e.g. a guard post) staffed by one person per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique position identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Skills a person must hold to staff this position.
    pub required_skills: Vec<String>,
    /// Personnel allowed to staff this position.
    ///
    /// An empty list places no restriction.
    pub allowed_personnel: Vec<String>,
}

impl Position {
    /// Creates a position with no requirements.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            required_skills: Vec::new(),
            allowed_personnel: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a required skill.
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.push(skill.into());
        self
    }

    /// Adds a person to the allow-list.
    pub fn with_allowed(mut self, personnel_id: impl Into<String>) -> Self {
        self.allowed_personnel.push(personnel_id.into());
        self
    }

    /// Whether the allow-list admits `personnel_id`.
    pub fn allows(&self, personnel_id: &str) -> bool {
        self.allowed_personnel.is_empty() || self.allowed_personnel.iter().any(|p| p == personnel_id)
    }
}
