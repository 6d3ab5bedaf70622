use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PhaseType {
    InterviewVideo,
    InterviewCall,
    InterviewOnsite,
    TestOnline,
    TestOffline,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
pub enum PhaseStatus {
    Active,
    Completed,
    #[serde(rename = "On Hold")]
    #[strum(serialize = "On Hold")]
    OnHold,
    Cancelled,
}

/// Per-candidate progress inside one phase. Persisted alongside the
/// candidate set; every newly added candidate starts as `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr)]
pub enum CandidateStatus {
    #[default]
    New,
    Contacted,
    Scheduled,
    Passed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub phase_number: usize,
    pub phase_name: String,
    pub phase_type: PhaseType,
    pub status: PhaseStatus,
    /// Candidate ids in insertion order, duplicate-free.
    pub candidates: Vec<i64>,
    #[serde(default)]
    pub candidate_statuses: BTreeMap<i64, CandidateStatus>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

/// Derived display name: "Phase N", with the entry phase marked.
pub fn phase_name(index: usize) -> String {
    if index == 0 {
        format!("Phase {index} (When Starts)")
    } else {
        format!("Phase {index}")
    }
}

impl Phase {
    pub fn new(index: usize, candidates: Vec<i64>) -> Self {
        let mut phase = Self {
            phase_number: index,
            phase_name: phase_name(index),
            phase_type: PhaseType::Custom,
            status: PhaseStatus::Active,
            candidates: Vec::new(),
            candidate_statuses: BTreeMap::new(),
            custom_fields: Vec::new(),
        };
        phase.replace_candidates(candidates);
        phase
    }

    pub fn contains(&self, candidate_id: i64) -> bool {
        self.candidates.contains(&candidate_id)
    }

    /// Replace the candidate set, de-duplicating while keeping first
    /// occurrence order. Statuses of retained candidates survive; new
    /// entries default to `New`.
    pub fn replace_candidates(&mut self, candidates: Vec<i64>) {
        let mut deduped: Vec<i64> = Vec::with_capacity(candidates.len());
        for id in candidates {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }

        let mut statuses = BTreeMap::new();
        for id in &deduped {
            let status = self
                .candidate_statuses
                .get(id)
                .copied()
                .unwrap_or_default();
            statuses.insert(*id, status);
        }

        self.candidates = deduped;
        self.candidate_statuses = statuses;
    }

    /// Keep only custom fields where both key and value are non-empty.
    pub fn replace_custom_fields(&mut self, fields: Vec<CustomField>) {
        self.custom_fields = fields
            .into_iter()
            .filter(|field| !field.key.trim().is_empty() && !field.value.trim().is_empty())
            .collect();
    }
}
