use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use tracing::warn;

use tf_common::api::workflow_request::{CreateWorkflowRequest, UpdateWorkflowRequest};
use tf_common::directory::Recruiter;
use tf_common::workflow::{CreateWorkflow, UpdateWorkflow, Workflow, WorkflowService};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

async fn recruiters_or_empty(state: &SharedState, job_id: i64) -> Vec<Recruiter> {
    match state.directory.list_recruiters(job_id).await {
        Ok(recruiters) => recruiters,
        Err(err) => {
            warn!(job_id, error = %err, "recruiter lookup failed; recruiter notices skipped");
            Vec::new()
        }
    }
}

pub async fn create_workflow(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(request): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let service = WorkflowService::new(state.store.clone());
    let workflow = service
        .create(
            &auth.actor(),
            CreateWorkflow {
                job_id: request.job_id,
                initial_candidates: request.candidate_ids,
                priority: request.priority,
                description: request.description,
            },
        )
        .await?;

    // The workflow is saved; notification scheduling follows persistence
    // and a recruiter-lookup failure must not fail the mutation.
    let recruiters = recruiters_or_empty(&state, workflow.job_id).await;
    if let Some(id) = workflow.id {
        state
            .queues
            .lock()
            .await
            .entry(id)
            .or_default()
            .enqueue_for_create(&workflow, &recruiters);
    }

    Ok((StatusCode::CREATED, Json(workflow)))
}

pub async fn get_workflow(
    State(state): State<SharedState>,
    Path(workflow_id): Path<i64>,
    _auth: AuthUser,
) -> Result<Json<Workflow>, ApiError> {
    let service = WorkflowService::new(state.store.clone());
    Ok(Json(service.get(workflow_id).await?))
}

pub async fn update_workflow(
    State(state): State<SharedState>,
    Path(workflow_id): Path<i64>,
    auth: AuthUser,
    Json(request): Json<UpdateWorkflowRequest>,
) -> Result<Json<Workflow>, ApiError> {
    let mutated_phase = request.mutated_phase;
    let service = WorkflowService::new(state.store.clone());
    let workflow = service
        .update(
            &auth.actor(),
            workflow_id,
            UpdateWorkflow {
                phases: request.phases,
                priority: request.priority,
                description: request.description,
                status: request.status,
            },
        )
        .await?;

    let recruiters = recruiters_or_empty(&state, workflow.job_id).await;
    state
        .queues
        .lock()
        .await
        .entry(workflow_id)
        .or_default()
        .enqueue_for_update(&workflow, &recruiters, mutated_phase);

    Ok(Json(workflow))
}

pub async fn delete_workflow(
    State(state): State<SharedState>,
    Path(workflow_id): Path<i64>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    let service = WorkflowService::new(state.store.clone());
    service.delete(&auth.actor(), workflow_id).await?;
    state.queues.lock().await.remove(&workflow_id);
    Ok(StatusCode::NO_CONTENT)
}
