use serde::Deserialize;

use crate::workflow::{Phase, Priority, WorkflowStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflowRequest {
    pub job_id: i64,
    pub candidate_ids: Vec<i64>,
    pub priority: Priority,
    pub description: String,
}

/// Full-chain replacement. Phase numbering in the payload is untrusted;
/// the server rederives it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkflowRequest {
    pub phases: Vec<Phase>,
    pub priority: Priority,
    pub description: String,
    pub status: WorkflowStatus,
    /// Which phase the edit touched, for notification targeting.
    #[serde(default)]
    pub mutated_phase: Option<usize>,
}
