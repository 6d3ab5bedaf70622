use serde::{Deserialize, Serialize};

use crate::notify::{NotificationJob, SendResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmRequest {
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPreview {
    pub job: Option<NotificationJob>,
    /// Items still queued behind the active one, the preview included.
    pub remaining: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResponse {
    pub result: SendResult,
}
