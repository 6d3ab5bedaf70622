use async_trait::async_trait;
use deadpool_postgres::PoolError;
use serde_json::Value;
use tokio_postgres::types::Json;
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::pool::PgPool;
use crate::error::CoreError;
use crate::workflow::{Phase, PhaseChain, Priority, Workflow, WorkflowStatus, WorkflowStore};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("stored workflow is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("stored workflow failed validation: {0}")]
    Invalid(String),
    #[error("workflow not found: {0}")]
    NotFound(i64),
}

impl From<WorkflowStorageError> for CoreError {
    fn from(value: WorkflowStorageError) -> Self {
        match value {
            WorkflowStorageError::NotFound(id) => CoreError::not_found(format!("workflow {id}")),
            other => CoreError::Transport(other.to_string()),
        }
    }
}

fn enum_to_text<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}

fn enum_from_text<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::String(text.to_string()))
}

/// Postgres-backed `WorkflowStore`. The phase chain is rewritten inside a
/// single transaction on every save, so a workflow is never partially
/// persisted.
pub struct PgWorkflowStore {
    pool: PgPool,
}

impl PgWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    async fn load(&self, id: i64) -> Result<Option<Workflow>, WorkflowStorageError> {
        let client = self.pool.get().await?;

        let row = client
            .query_opt(
                "SELECT id, job_id, priority, description, status, created_by,
                        created_at, updated_at
                 FROM tf.workflows WHERE id = $1",
                &[&id],
            )
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let phase_rows = client
            .query(
                "SELECT phase FROM tf.workflow_phases
                 WHERE workflow_id = $1 ORDER BY phase_number",
                &[&id],
            )
            .await?;

        let mut phases = Vec::with_capacity(phase_rows.len());
        for phase_row in phase_rows {
            let Json(value): Json<Value> = phase_row.get(0);
            phases.push(serde_json::from_value::<Phase>(value)?);
        }

        let priority: String = row.get(2);
        let status: String = row.get(4);

        Ok(Some(Workflow {
            id: Some(row.get(0)),
            job_id: row.get(1),
            priority: enum_from_text::<Priority>(&priority)?,
            description: row.get(3),
            status: enum_from_text::<WorkflowStatus>(&status)?,
            created_by: row.get(5),
            created_at: row.get(6),
            updated_at: row.get(7),
            phases: PhaseChain::from_phases(phases)
                .map_err(|err| WorkflowStorageError::Invalid(err.to_string()))?,
        }))
    }

    #[instrument(skip(self, workflow))]
    async fn save(&self, workflow: &Workflow) -> Result<Workflow, WorkflowStorageError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let priority = enum_to_text(&workflow.priority)?;
        let status = enum_to_text(&workflow.status)?;

        let id = match workflow.id {
            None => {
                let row = tx
                    .query_one(
                        "INSERT INTO tf.workflows
                            (job_id, priority, description, status, created_by,
                             created_at, updated_at)
                         VALUES ($1, $2, $3, $4, $5, $6, $7)
                         RETURNING id",
                        &[
                            &workflow.job_id,
                            &priority,
                            &workflow.description,
                            &status,
                            &workflow.created_by,
                            &workflow.created_at,
                            &workflow.updated_at,
                        ],
                    )
                    .await?;
                row.get::<_, i64>(0)
            }
            Some(id) => {
                let updated = tx
                    .execute(
                        "UPDATE tf.workflows
                         SET job_id = $2, priority = $3, description = $4,
                             status = $5, updated_at = $6
                         WHERE id = $1",
                        &[
                            &id,
                            &workflow.job_id,
                            &priority,
                            &workflow.description,
                            &status,
                            &workflow.updated_at,
                        ],
                    )
                    .await?;
                if updated == 0 {
                    return Err(WorkflowStorageError::NotFound(id));
                }
                id
            }
        };

        tx.execute(
            "DELETE FROM tf.workflow_phases WHERE workflow_id = $1",
            &[&id],
        )
        .await?;

        let insert_phase = tx
            .prepare(
                "INSERT INTO tf.workflow_phases (workflow_id, phase_number, phase)
                 VALUES ($1, $2, $3)",
            )
            .await?;
        for phase in workflow.phases.phases() {
            let value = serde_json::to_value(phase)?;
            tx.execute(
                &insert_phase,
                &[&id, &(phase.phase_number as i32), &Json(&value)],
            )
            .await?;
        }

        tx.commit().await?;

        let mut stored = workflow.clone();
        stored.id = Some(id);
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, WorkflowStorageError> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM tf.workflows WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn load_workflow(&self, id: i64) -> Result<Option<Workflow>, CoreError> {
        Ok(self.load(id).await?)
    }

    async fn save_workflow(&self, workflow: &Workflow) -> Result<Workflow, CoreError> {
        Ok(self.save(workflow).await?)
    }

    async fn delete_workflow(&self, id: i64) -> Result<bool, CoreError> {
        Ok(self.delete(id).await?)
    }
}
