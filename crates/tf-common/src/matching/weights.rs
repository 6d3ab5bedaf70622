use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::validate::require_percentage;

/// Weighting preference supplied per matching request. Each slider is an
/// independent 0..=100 value; the sliders are not forced to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub skills_vs_description: f64,
    pub experience_vs_description: f64,
    pub years_of_experience: f64,
    pub location: f64,
}

impl Default for Preference {
    fn default() -> Self {
        Self {
            skills_vs_description: 50.0,
            experience_vs_description: 50.0,
            years_of_experience: 50.0,
            location: 50.0,
        }
    }
}

/// Preference weights divided by 100, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedWeights {
    pub skills: f64,
    pub experience: f64,
    pub years_of_exp: f64,
    pub location: f64,
}

/// Two normalized weights closer than this are treated as equal when
/// deciding whether the caller meant "all equally important".
pub const BALANCED_EPSILON: f64 = 0.01;

impl Preference {
    pub fn normalize(&self) -> Result<NormalizedWeights, CoreError> {
        require_percentage("preference.skills_vs_description", self.skills_vs_description)?;
        require_percentage(
            "preference.experience_vs_description",
            self.experience_vs_description,
        )?;
        require_percentage("preference.years_of_experience", self.years_of_experience)?;
        require_percentage("preference.location", self.location)?;

        Ok(NormalizedWeights {
            skills: self.skills_vs_description / 100.0,
            experience: self.experience_vs_description / 100.0,
            years_of_exp: self.years_of_experience / 100.0,
            location: self.location / 100.0,
        })
    }
}

impl NormalizedWeights {
    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.years_of_exp + self.location
    }

    /// All four weights mutually within [`BALANCED_EPSILON`] of each other.
    pub fn is_balanced(&self) -> bool {
        let weights = [self.skills, self.experience, self.years_of_exp, self.location];
        let max = weights.iter().cloned().fold(f64::MIN, f64::max);
        let min = weights.iter().cloned().fold(f64::MAX, f64::min);
        max - min <= BALANCED_EPSILON
    }
}
