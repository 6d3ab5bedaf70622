use serde::Deserialize;

use crate::matching::Preference;

/// Matching query from the HTTP API.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub job_id: i64,
    pub preference: Preference,
    /// Restrict scoring to these candidates; defaults to the job's
    /// applicant pool.
    #[serde(default)]
    pub candidate_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub limit: Option<usize>,
}
