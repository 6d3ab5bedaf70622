use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use tracing::info;

use crate::directory::Recruiter;
use crate::error::CoreError;
use crate::mail::Mailer;
use crate::workflow::{Phase, Workflow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NotificationKind {
    CandidatePhaseNotice,
    RecruiterPhaseNotice,
    RecruiterJobCreation,
}

/// One email preview awaiting human confirmation. Transient: queued in
/// memory, consumed exactly once per confirm or cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub id: u64,
    pub kind: NotificationKind,
    pub job_id: i64,
    pub workflow_id: i64,
    /// Snapshot of the affected phase at enqueue time.
    pub phase: Phase,
    pub candidate_ids: Vec<i64>,
    pub recruiter_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub notification_id: u64,
    pub subject: String,
    pub recipient_count: usize,
}

/// Single-flight notification queue: exactly one job is active (previewed,
/// awaiting confirm or cancel) at a time, so a human always reviews the
/// recipient list and rendered content before anything is sent. One queue
/// per workflow; queues progress independently.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: VecDeque<NotificationJob>,
    active: Option<NotificationJob>,
    next_id: u64,
}

impl NotificationQueue {
    fn push(&mut self, mut job: NotificationJob) {
        self.next_id += 1;
        job.id = self.next_id;
        self.pending.push_back(job);
    }

    fn job_for_phase(
        &self,
        kind: NotificationKind,
        workflow: &Workflow,
        phase: &Phase,
        recruiters: &[Recruiter],
    ) -> NotificationJob {
        NotificationJob {
            id: 0,
            kind,
            job_id: workflow.job_id,
            workflow_id: workflow.id.unwrap_or_default(),
            phase: phase.clone(),
            candidate_ids: phase.candidates.clone(),
            recruiter_ids: recruiters.iter().map(|recruiter| recruiter.id).collect(),
        }
    }

    /// After a successful create: a candidate notice for phase 0 when it
    /// has candidates, then a recruiter notice when the job has
    /// recruiters. With recruiters but no candidates, only the recruiter
    /// notice goes out.
    pub fn enqueue_for_create(&mut self, workflow: &Workflow, recruiters: &[Recruiter]) {
        let phase = &workflow.phases.phases()[0];

        if !phase.candidates.is_empty() {
            self.push(self.job_for_phase(
                NotificationKind::CandidatePhaseNotice,
                workflow,
                phase,
                recruiters,
            ));
        }
        if !recruiters.is_empty() {
            self.push(self.job_for_phase(
                NotificationKind::RecruiterPhaseNotice,
                workflow,
                phase,
                recruiters,
            ));
        }
    }

    /// After a successful update: candidate and recruiter notices for the
    /// mutated phase, defaulting to the last phase when no index is given.
    pub fn enqueue_for_update(
        &mut self,
        workflow: &Workflow,
        recruiters: &[Recruiter],
        mutated_phase: Option<usize>,
    ) {
        let phases = workflow.phases.phases();
        let index = mutated_phase
            .filter(|index| *index < phases.len())
            .unwrap_or(phases.len() - 1);
        let phase = &phases[index];

        self.push(self.job_for_phase(
            NotificationKind::CandidatePhaseNotice,
            workflow,
            phase,
            recruiters,
        ));
        self.push(self.job_for_phase(
            NotificationKind::RecruiterPhaseNotice,
            workflow,
            phase,
            recruiters,
        ));
    }

    /// Announce a newly created job posting to its recruiters.
    pub fn enqueue_for_job_creation(&mut self, workflow: &Workflow, recruiters: &[Recruiter]) {
        if recruiters.is_empty() {
            return;
        }
        let phase = &workflow.phases.phases()[0];
        self.push(self.job_for_phase(
            NotificationKind::RecruiterJobCreation,
            workflow,
            phase,
            recruiters,
        ));
    }

    /// The job currently awaiting confirmation, activating the head of the
    /// queue if none is. Returns the same job until it is confirmed or
    /// cancelled.
    pub fn next(&mut self) -> Option<&NotificationJob> {
        if self.active.is_none() {
            self.active = self.pending.pop_front();
        }
        self.active.as_ref()
    }

    /// Send the active job. Zero recipients is a validation error and a
    /// transport failure surfaces as-is; in both cases the job stays
    /// active so the caller can retry. Only success (or cancel) advances
    /// the queue.
    pub async fn confirm(
        &mut self,
        mailer: &dyn Mailer,
        recipients: &[String],
    ) -> Result<SendResult, CoreError> {
        let job = self
            .active
            .as_ref()
            .ok_or_else(|| CoreError::not_found("no notification awaiting confirmation"))?;

        if recipients.is_empty() {
            return Err(CoreError::validation(
                "recipients",
                "confirming a notification requires at least one recipient",
            ));
        }

        let rendered = mailer.render(job).await?;
        mailer
            .send(recipients, &rendered.subject, &rendered.html)
            .await?;

        let sent = self.active.take().expect("checked above");
        info!(
            notification_id = sent.id,
            kind = sent.kind.as_ref(),
            workflow_id = sent.workflow_id,
            recipients = recipients.len(),
            "notification sent"
        );

        Ok(SendResult {
            notification_id: sent.id,
            subject: rendered.subject,
            recipient_count: recipients.len(),
        })
    }

    /// Discard the active job without sending. Safe to call at any time
    /// before confirm completes.
    pub fn cancel(&mut self) -> Option<NotificationJob> {
        let cancelled = self.active.take();
        if let Some(job) = &cancelled {
            info!(
                notification_id = job.id,
                kind = job.kind.as_ref(),
                workflow_id = job.workflow_id,
                "notification cancelled"
            );
        }
        cancelled
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len() + usize::from(self.active.is_some())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use super::*;
    use crate::mail::RenderedEmail;
    use crate::workflow::{Actor, PhaseChain, Priority, WorkflowStatus};

    struct FakeMailer {
        fail_send: bool,
        sent: Mutex<Vec<(Vec<String>, String)>>,
    }

    impl FakeMailer {
        fn new(fail_send: bool) -> Self {
            Self {
                fail_send,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for FakeMailer {
        async fn render(&self, job: &NotificationJob) -> Result<RenderedEmail, CoreError> {
            Ok(RenderedEmail {
                subject: format!("{} for workflow {}", job.kind.as_ref(), job.workflow_id),
                html: "<p>preview</p>".into(),
                recipients: vec![],
            })
        }

        async fn send(
            &self,
            recipients: &[String],
            subject: &str,
            _html: &str,
        ) -> Result<(), CoreError> {
            if self.fail_send {
                return Err(CoreError::Transport("mailer unreachable".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipients.to_vec(), subject.to_string()));
            Ok(())
        }
    }

    fn workflow(candidates: Vec<i64>) -> Workflow {
        let actor = Actor {
            subject: "recruiter-1".into(),
            elevated: false,
        };
        Workflow {
            id: Some(77),
            job_id: 11,
            phases: PhaseChain::seeded(candidates),
            priority: Priority::Medium,
            description: "pipeline".into(),
            status: WorkflowStatus::Active,
            created_by: actor.subject,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn recruiters() -> Vec<Recruiter> {
        vec![Recruiter {
            id: 5,
            name: "Dana".into(),
            email: "dana@example.com".into(),
        }]
    }

    #[test]
    fn create_enqueues_candidate_then_recruiter_notice() {
        let mut queue = NotificationQueue::default();
        queue.enqueue_for_create(&workflow(vec![1, 2]), &recruiters());

        assert_eq!(queue.pending_len(), 2);
        let first = queue.next().unwrap();
        assert_eq!(first.kind, NotificationKind::CandidatePhaseNotice);
        assert_eq!(first.candidate_ids, vec![1, 2]);
    }

    #[test]
    fn create_with_only_recruiters_skips_the_candidate_notice() {
        let mut queue = NotificationQueue::default();
        queue.enqueue_for_create(&workflow(vec![]), &recruiters());

        assert_eq!(queue.pending_len(), 1);
        assert_eq!(
            queue.next().unwrap().kind,
            NotificationKind::RecruiterPhaseNotice
        );
    }

    #[test]
    fn next_is_single_flight() {
        let mut queue = NotificationQueue::default();
        queue.enqueue_for_create(&workflow(vec![1]), &recruiters());

        let first_id = queue.next().unwrap().id;
        // A second call before confirm/cancel returns the same job, not
        // the recruiter notice behind it.
        let again = queue.next().unwrap();
        assert_eq!(again.id, first_id);
        assert_eq!(again.kind, NotificationKind::CandidatePhaseNotice);
    }

    #[tokio::test]
    async fn confirm_advances_and_cancel_discards() {
        let mut queue = NotificationQueue::default();
        queue.enqueue_for_create(&workflow(vec![1]), &recruiters());
        let mailer = FakeMailer::new(false);

        queue.next().unwrap();
        let result = queue
            .confirm(&mailer, &["a@example.com".into()])
            .await
            .unwrap();
        assert_eq!(result.recipient_count, 1);

        let second = queue.next().unwrap();
        assert_eq!(second.kind, NotificationKind::RecruiterPhaseNotice);
        queue.cancel().unwrap();
        assert!(queue.next().is_none());
    }

    #[tokio::test]
    async fn confirm_without_recipients_keeps_the_job_active() {
        let mut queue = NotificationQueue::default();
        queue.enqueue_for_create(&workflow(vec![1]), &recruiters());
        let mailer = FakeMailer::new(false);

        let id = queue.next().unwrap().id;
        let err = queue.confirm(&mailer, &[]).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "recipients"));
        assert_eq!(queue.next().unwrap().id, id);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_preserves_queue_position() {
        let mut queue = NotificationQueue::default();
        queue.enqueue_for_create(&workflow(vec![1]), &recruiters());
        let failing = FakeMailer::new(true);

        let id = queue.next().unwrap().id;
        let err = queue
            .confirm(&failing, &["a@example.com".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
        assert_eq!(queue.next().unwrap().id, id);

        // Retry against a healthy transport succeeds and dequeues.
        let healthy = FakeMailer::new(false);
        queue.confirm(&healthy, &["a@example.com".into()]).await.unwrap();
        assert_ne!(queue.next().unwrap().id, id);
    }

    #[test]
    fn update_defaults_to_the_last_phase() {
        let mut queue = NotificationQueue::default();
        let mut wf = workflow(vec![1, 2, 3]);
        wf.phases = wf.phases.append();
        wf.phases = wf.phases.set_candidates(1, vec![1]).unwrap();

        queue.enqueue_for_update(&wf, &recruiters(), None);
        let job = queue.next().unwrap();
        assert_eq!(job.phase.phase_number, 1);
        assert_eq!(job.candidate_ids, vec![1]);

        let mut explicit = NotificationQueue::default();
        explicit.enqueue_for_update(&wf, &recruiters(), Some(0));
        assert_eq!(explicit.next().unwrap().phase.phase_number, 0);
    }

    #[test]
    fn job_creation_notice_requires_recruiters() {
        let mut queue = NotificationQueue::default();
        queue.enqueue_for_job_creation(&workflow(vec![1]), &[]);
        assert_eq!(queue.pending_len(), 0);

        queue.enqueue_for_job_creation(&workflow(vec![1]), &recruiters());
        assert_eq!(
            queue.next().unwrap().kind,
            NotificationKind::RecruiterJobCreation
        );
    }
}
