//! Match priority weights — five independently set values in [0.0, 1.0].
//! They express stated priority, not probability: no normalization, no
//! sum constraint. The match stage receives them verbatim.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub skills: f64,
    pub experience: f64,
    pub salary: f64,
    pub location: f64,
    pub education: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skills: 0.30,
            experience: 0.25,
            salary: 0.20,
            location: 0.15,
            education: 0.10,
        }
    }
}

impl MatchWeights {
    /// Clamps each weight to [0.0, 1.0] independently.
    pub fn clamped(self) -> Self {
        Self {
            skills: self.skills.clamp(0.0, 1.0),
            experience: self.experience.clamp(0.0, 1.0),
            salary: self.salary.clamp(0.0, 1.0),
            location: self.location.clamp(0.0, 1.0),
            education: self.education.clamp(0.0, 1.0),
        }
    }

    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.salary + self.location + self.education
    }
}
