use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use tf_common::api::notification::{ConfirmRequest, ConfirmResponse, NotificationPreview};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

/// Preview the next notification awaiting confirmation. Single-flight:
/// repeated calls return the same job until it is confirmed or cancelled.
pub async fn next_notification(
    State(state): State<SharedState>,
    Path(workflow_id): Path<i64>,
    _auth: AuthUser,
) -> Result<Json<NotificationPreview>, ApiError> {
    let mut queues = state.queues.lock().await;
    let queue = queues.entry(workflow_id).or_default();

    let job = queue.next().cloned();
    Ok(Json(NotificationPreview {
        job,
        remaining: queue.pending_len(),
    }))
}

/// Send the active notification to the reviewed recipient list. On
/// failure the job stays active so the caller can retry.
pub async fn confirm_notification(
    State(state): State<SharedState>,
    Path(workflow_id): Path<i64>,
    _auth: AuthUser,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let mut queues = state.queues.lock().await;
    let queue = queues
        .get_mut(&workflow_id)
        .ok_or_else(|| ApiError::NotFound(format!("no notifications for workflow {workflow_id}")))?;

    // Activate the head job if the caller confirms without previewing.
    queue.next();
    let result = queue
        .confirm(state.mailer.as_ref(), &request.recipients)
        .await?;

    Ok(Json(ConfirmResponse { result }))
}

pub async fn cancel_notification(
    State(state): State<SharedState>,
    Path(workflow_id): Path<i64>,
    _auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    let mut queues = state.queues.lock().await;
    let queue = queues
        .get_mut(&workflow_id)
        .ok_or_else(|| ApiError::NotFound(format!("no notifications for workflow {workflow_id}")))?;

    queue.next();
    match queue.cancel() {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::NotFound(
            "no notification awaiting confirmation".into(),
        )),
    }
}
