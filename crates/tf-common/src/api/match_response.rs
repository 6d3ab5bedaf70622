use serde::{Deserialize, Serialize};

use crate::matching::{ComponentScores, MatchResult};
use crate::Candidate;

/// Ranked match entry enriched with display fields for the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub candidate_id: i64,
    pub candidate_name: String,
    pub composite_score: u8,
    pub component_scores: ComponentScores,
}

impl MatchResponse {
    pub fn from_result(result: &MatchResult, candidate: Option<&Candidate>) -> Self {
        Self {
            candidate_id: result.candidate_id,
            candidate_name: candidate
                .map(Candidate::display_name)
                .unwrap_or_else(|| format!("candidate {}", result.candidate_id)),
            composite_score: result.composite_score,
            component_scores: result.component_scores.clone(),
        }
    }
}
