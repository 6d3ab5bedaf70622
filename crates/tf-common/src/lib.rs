pub mod api;
pub mod db;
pub mod directory;
pub mod error;
pub mod logging;
pub mod mail;
pub mod matching;
pub mod notify;
pub mod validate;
pub mod workflow;

use serde::{Deserialize, Serialize};

// Commonly used data models. Jobs and candidates are owned by external
// collaborators; the core only reads these snapshots and carries ids.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub remote_friendly: bool,
    #[serde(default)]
    pub min_experience_years: Option<f64>,
    #[serde(default)]
    pub max_experience_years: Option<f64>,
    #[serde(default)]
    pub compensation_min: Option<u32>,
    #[serde(default)]
    pub compensation_max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub domain_tags: Vec<String>,
    #[serde(default)]
    pub talent_pool_tags: Vec<String>,
    #[serde(default)]
    pub skill_tags: Vec<String>,
    /// Upstream evaluation snapshot, when a cached scoring run exists.
    #[serde(default)]
    pub evaluation: Option<CandidateEvaluation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub years: f64,
}

/// Scores supplied by an upstream computation. A `composite` here is
/// authoritative and must never be recomputed from the components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    #[serde(default)]
    pub composite: Option<u8>,
    #[serde(default)]
    pub components: Option<matching::ComponentScores>,
}

impl Candidate {
    /// Total years across the experience history, `None` when the history
    /// is empty.
    pub fn total_experience_years(&self) -> Option<f64> {
        if self.experience.is_empty() {
            return None;
        }
        Some(self.experience.iter().map(|entry| entry.years).sum())
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self
                .email
                .clone()
                .unwrap_or_else(|| format!("candidate {}", self.id.unwrap_or_default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_experience_sums_entries() {
        let candidate = Candidate {
            experience: vec![
                ExperienceEntry {
                    title: "Backend Engineer".into(),
                    years: 3.5,
                    ..ExperienceEntry::default()
                },
                ExperienceEntry {
                    title: "SRE".into(),
                    years: 1.5,
                    ..ExperienceEntry::default()
                },
            ],
            ..Candidate::default()
        };

        assert_eq!(candidate.total_experience_years(), Some(5.0));
    }

    #[test]
    fn total_experience_is_none_without_history() {
        assert_eq!(Candidate::default().total_experience_years(), None);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let candidate = Candidate {
            email: Some("dev@example.com".into()),
            ..Candidate::default()
        };
        assert_eq!(candidate.display_name(), "dev@example.com");
    }
}
