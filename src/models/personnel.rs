//! Personnel model.
//!
//! Personnel are the people assigned to duty positions. Each carries a
//! skill set, availability/retirement flags and historical fairness
//! counters (how many duty intervals they have served, overall and
//! per slot of day).
//!
//! Personnel records are read-only inputs. The engine copies the
//! counters into a run-local table before mutating them.

use serde::{Deserialize, Serialize};

use super::timeslot::{TimeSlot, SLOTS_PER_DAY};

/// A person who can be assigned to duty positions.
///
/// Missing fields deserialize to the [`Personnel::new`] defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personnel {
    /// Unique personnel identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Skills held.
    pub skills: Vec<String>,
    /// Whether the person is available for duty at all.
    pub available: bool,
    /// Retired personnel are never eligible.
    pub retired: bool,
    /// Exempts the person from the rest-day policy.
    pub exempt_from_rest_days: bool,
    /// Historical number of duty intervals served.
    pub interval_count: u32,
    /// Historical duty intervals served, per slot of day.
    pub slot_counts: [u32; SLOTS_PER_DAY],
}

impl Personnel {
    /// Creates an available, active person with no skills.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: Vec::new(),
            available: true,
            retired: false,
            exempt_from_rest_days: false,
            interval_count: 0,
            slot_counts: [0; SLOTS_PER_DAY],
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Sets availability.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Marks the person retired.
    pub fn retired(mut self) -> Self {
        self.retired = true;
        self
    }

    /// Exempts the person from the rest-day policy.
    pub fn exempt_from_rest_days(mut self) -> Self {
        self.exempt_from_rest_days = true;
        self
    }

    /// Sets the historical interval count.
    pub fn with_interval_count(mut self, count: u32) -> Self {
        self.interval_count = count;
        self
    }

    /// Sets the historical count for one slot of day.
    pub fn with_slot_count(mut self, slot: TimeSlot, count: u32) -> Self {
        self.slot_counts[slot.index()] = count;
        self
    }

    /// Whether this person holds a given skill.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Whether this person holds every skill in `required`.
    pub fn has_all_skills<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|r| self.has_skill(r.as_ref()))
    }

    /// Available and not retired.
    pub fn is_active(&self) -> bool {
        self.available && !self.retired
    }

    /// Whether the rest-day policy applies to this person.
    pub fn observes_rest_days(&self) -> bool {
        !self.exempt_from_rest_days
    }
}

impl Default for Personnel {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personnel_builder() {
        let p = Personnel::new("P1")
            .with_name("Alice")
            .with_skill("armed")
            .with_skill("driver")
            .with_interval_count(7)
            .with_slot_count(TimeSlot::new(3).unwrap(), 2);

        assert_eq!(p.id, "P1");
        assert!(p.has_skill("armed"));
        assert!(!p.has_skill("medic"));
        assert!(p.has_all_skills(&["armed", "driver"]));
        assert!(!p.has_all_skills(&["armed", "medic"]));
        assert!(p.has_all_skills::<&str>(&[]));
        assert_eq!(p.interval_count, 7);
        assert_eq!(p.slot_counts[3], 2);
    }

    #[test]
    fn test_active_flags() {
        assert!(Personnel::new("P1").is_active());
        assert!(!Personnel::new("P1").with_available(false).is_active());
        assert!(!Personnel::new("P1").retired().is_active());
    }

    #[test]
    fn test_rest_days_apply_unless_exempt() {
        assert!(Personnel::new("P1").observes_rest_days());
        assert!(!Personnel::new("P1").exempt_from_rest_days().observes_rest_days());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let p: Personnel = serde_json::from_str(r#"{"id": "P7", "skills": ["guard"]}"#).unwrap();
        assert_eq!(p.id, "P7");
        assert!(p.has_skill("guard"));
        assert!(p.is_active());
        assert!(p.observes_rest_days());
        assert_eq!(p.interval_count, 0);
    }
}
