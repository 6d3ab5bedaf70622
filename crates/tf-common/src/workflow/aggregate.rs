use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use tracing::info;

use crate::error::CoreError;
use crate::validate::{require_non_empty, require_non_empty_set};
use crate::workflow::chain::PhaseChain;
use crate::workflow::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Workflow-level status. Freely re-editable: any state may return to
/// Active, there is no terminal lock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
pub enum WorkflowStatus {
    Active,
    Completed,
    #[serde(rename = "On Hold")]
    #[strum(serialize = "On Hold")]
    OnHold,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Option<i64>,
    pub job_id: i64,
    pub phases: PhaseChain,
    pub priority: Priority,
    pub description: String,
    pub status: WorkflowStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller's identity, threaded explicitly into every aggregate
/// operation instead of ambient session state, so authorization is
/// testable without a fake session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub subject: String,
    pub elevated: bool,
}

#[derive(Debug, Clone)]
pub struct CreateWorkflow {
    pub job_id: i64,
    pub initial_candidates: Vec<i64>,
    pub priority: Priority,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateWorkflow {
    pub phases: Vec<Phase>,
    pub priority: Priority,
    pub description: String,
    pub status: WorkflowStatus,
}

/// Persistence seam. The Postgres implementation lives in `crate::db`;
/// tests substitute an in-memory store.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn load_workflow(&self, id: i64) -> Result<Option<Workflow>, CoreError>;
    /// Persist the workflow as a unit; partial writes are not acceptable.
    /// Returns the stored workflow with its id assigned.
    async fn save_workflow(&self, workflow: &Workflow) -> Result<Workflow, CoreError>;
    async fn delete_workflow(&self, id: i64) -> Result<bool, CoreError>;
}

pub struct WorkflowService {
    store: Arc<dyn WorkflowStore>,
}

impl WorkflowService {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, workflow_id: i64) -> Result<Workflow, CoreError> {
        self.store
            .load_workflow(workflow_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("workflow {workflow_id}")))
    }

    /// Create a workflow seeded with the phase-0 candidate set. A workflow
    /// cannot start with zero entrants.
    pub async fn create(&self, actor: &Actor, input: CreateWorkflow) -> Result<Workflow, CoreError> {
        require_non_empty("description", &input.description)?;
        require_non_empty_set("phases[0].candidates", &input.initial_candidates)?;

        let now = Utc::now();
        let workflow = Workflow {
            id: None,
            job_id: input.job_id,
            phases: PhaseChain::seeded(input.initial_candidates),
            priority: input.priority,
            description: input.description,
            status: WorkflowStatus::Active,
            created_by: actor.subject.clone(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.save_workflow(&workflow).await?;
        info!(
            workflow_id = stored.id.unwrap_or_default(),
            job_id = stored.job_id,
            created_by = %actor.subject,
            "workflow created"
        );
        Ok(stored)
    }

    /// Replace the full phase chain atomically. The whole new chain
    /// validates (every adjacent pair) or the update fails entirely and
    /// the prior state is retained.
    pub async fn update(
        &self,
        actor: &Actor,
        workflow_id: i64,
        input: UpdateWorkflow,
    ) -> Result<Workflow, CoreError> {
        let existing = self.get(workflow_id).await?;
        authorize_edit(actor, &existing)?;

        require_non_empty("description", &input.description)?;
        let phases = PhaseChain::from_phases(input.phases)?;
        require_non_empty_set("phases[0].candidates", &phases.phases()[0].candidates)?;

        let updated = Workflow {
            phases,
            priority: input.priority,
            description: input.description,
            status: input.status,
            updated_at: Utc::now(),
            ..existing
        };

        let stored = self.store.save_workflow(&updated).await?;
        info!(
            workflow_id,
            updated_by = %actor.subject,
            phases = stored.phases.len(),
            "workflow updated"
        );
        Ok(stored)
    }

    /// Deletion requires elevated privilege unconditionally.
    pub async fn delete(&self, actor: &Actor, workflow_id: i64) -> Result<(), CoreError> {
        if !actor.elevated {
            return Err(CoreError::Forbidden(
                "deleting a workflow requires elevated privilege".into(),
            ));
        }
        if !self.store.delete_workflow(workflow_id).await? {
            return Err(CoreError::not_found(format!("workflow {workflow_id}")));
        }
        info!(workflow_id, deleted_by = %actor.subject, "workflow deleted");
        Ok(())
    }
}

/// Limited actors may edit only workflows they created; elevated actors
/// may edit any.
fn authorize_edit(actor: &Actor, workflow: &Workflow) -> Result<(), CoreError> {
    if actor.elevated || workflow.created_by == actor.subject {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "{} may only edit workflows they created",
            actor.subject
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::workflow::phase::PhaseStatus;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<i64, Workflow>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl WorkflowStore for MemoryStore {
        async fn load_workflow(&self, id: i64) -> Result<Option<Workflow>, CoreError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn save_workflow(&self, workflow: &Workflow) -> Result<Workflow, CoreError> {
            let mut stored = workflow.clone();
            let id = match workflow.id {
                Some(id) => id,
                None => {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    *next
                }
            };
            stored.id = Some(id);
            self.rows.lock().unwrap().insert(id, stored.clone());
            Ok(stored)
        }

        async fn delete_workflow(&self, id: i64) -> Result<bool, CoreError> {
            Ok(self.rows.lock().unwrap().remove(&id).is_some())
        }
    }

    fn service() -> WorkflowService {
        WorkflowService::new(Arc::new(MemoryStore::default()))
    }

    fn recruiter() -> Actor {
        Actor {
            subject: "recruiter-1".into(),
            elevated: false,
        }
    }

    fn admin() -> Actor {
        Actor {
            subject: "admin".into(),
            elevated: true,
        }
    }

    fn create_input() -> CreateWorkflow {
        CreateWorkflow {
            job_id: 11,
            initial_candidates: vec![1, 2, 3],
            priority: Priority::High,
            description: "Backend hiring push".into(),
        }
    }

    fn update_input(workflow: &Workflow) -> UpdateWorkflow {
        UpdateWorkflow {
            phases: workflow.phases.phases().to_vec(),
            priority: workflow.priority,
            description: workflow.description.clone(),
            status: workflow.status,
        }
    }

    #[tokio::test]
    async fn create_rejects_zero_entrants() {
        let svc = service();
        let err = svc
            .create(
                &recruiter(),
                CreateWorkflow {
                    initial_candidates: vec![],
                    ..create_input()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation { ref field, .. }
            if field == "phases[0].candidates"));
    }

    #[tokio::test]
    async fn create_seeds_phase_zero_and_assigns_an_id() {
        let svc = service();
        let workflow = svc.create(&recruiter(), create_input()).await.unwrap();

        assert!(workflow.id.is_some());
        assert_eq!(workflow.phases.len(), 1);
        assert_eq!(workflow.phases.phases()[0].candidates, vec![1, 2, 3]);
        assert_eq!(workflow.status, WorkflowStatus::Active);
        assert_eq!(workflow.created_by, "recruiter-1");
    }

    #[tokio::test]
    async fn update_replaces_the_chain_atomically() {
        let svc = service();
        let workflow = svc.create(&recruiter(), create_input()).await.unwrap();
        let id = workflow.id.unwrap();

        // A broken chain leaves the stored workflow untouched.
        let mut broken = workflow.phases.append().phases().to_vec();
        broken[1].candidates = vec![99];
        let err = svc
            .update(
                &recruiter(),
                id,
                UpdateWorkflow {
                    phases: broken,
                    ..update_input(&workflow)
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Invariant { phase: 1, .. }));
        assert_eq!(svc.get(id).await.unwrap().phases.len(), 1);

        // A valid chain replaces the whole thing.
        let grown = workflow.phases.append();
        let updated = svc
            .update(
                &recruiter(),
                id,
                UpdateWorkflow {
                    phases: grown.phases().to_vec(),
                    status: WorkflowStatus::OnHold,
                    ..update_input(&workflow)
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phases.len(), 2);
        assert_eq!(updated.status, WorkflowStatus::OnHold);
    }

    #[tokio::test]
    async fn status_is_freely_reeditable() {
        let svc = service();
        let workflow = svc.create(&recruiter(), create_input()).await.unwrap();
        let id = workflow.id.unwrap();

        for status in [
            WorkflowStatus::Completed,
            WorkflowStatus::Active,
            WorkflowStatus::Cancelled,
            WorkflowStatus::Active,
        ] {
            let updated = svc
                .update(
                    &recruiter(),
                    id,
                    UpdateWorkflow {
                        status,
                        ..update_input(&workflow)
                    },
                )
                .await
                .unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[tokio::test]
    async fn limited_actors_only_edit_their_own_workflows() {
        let svc = service();
        let workflow = svc.create(&recruiter(), create_input()).await.unwrap();
        let id = workflow.id.unwrap();

        let stranger = Actor {
            subject: "recruiter-2".into(),
            elevated: false,
        };
        let err = svc
            .update(&stranger, id, update_input(&workflow))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        // Elevated actors may edit anything.
        assert!(svc.update(&admin(), id, update_input(&workflow)).await.is_ok());
    }

    #[tokio::test]
    async fn delete_requires_elevation() {
        let svc = service();
        let workflow = svc.create(&recruiter(), create_input()).await.unwrap();
        let id = workflow.id.unwrap();

        assert!(matches!(
            svc.delete(&recruiter(), id).await.unwrap_err(),
            CoreError::Forbidden(_)
        ));
        svc.delete(&admin(), id).await.unwrap();
        assert!(matches!(
            svc.get(id).await.unwrap_err(),
            CoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn update_keeps_per_candidate_statuses_that_arrive_in_the_payload() {
        let svc = service();
        let workflow = svc.create(&recruiter(), create_input()).await.unwrap();
        let id = workflow.id.unwrap();

        let mut phases = workflow.phases.phases().to_vec();
        phases[0]
            .candidate_statuses
            .insert(2, crate::workflow::phase::CandidateStatus::Passed);
        let updated = svc
            .update(
                &recruiter(),
                id,
                UpdateWorkflow {
                    phases,
                    ..update_input(&workflow)
                },
            )
            .await
            .unwrap();

        assert_eq!(
            updated.phases.phases()[0].candidate_statuses[&2],
            crate::workflow::phase::CandidateStatus::Passed
        );
        assert_eq!(updated.phases.phases()[0].status, PhaseStatus::Active);
    }
}
