use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::CoreError;
use crate::notify::NotificationJob;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    /// Suggested recipients from the template service; the caller reviews
    /// and may override them before confirming.
    pub recipients: Vec<String>,
}

/// Email transport collaborator: renders a preview for a notification job
/// and delivers confirmed messages. The core never sends without an
/// explicit confirm.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn render(&self, job: &NotificationJob) -> Result<RenderedEmail, CoreError>;
    async fn send(&self, recipients: &[String], subject: &str, html: &str)
        -> Result<(), CoreError>;
}

/// Mailer reached over HTTP (an internal template/delivery service).
pub struct HttpMailer {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SendPayload<'a> {
    recipients: &'a [String],
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip(self, job), fields(kind = job.kind.as_ref()))]
    async fn render(&self, job: &NotificationJob) -> Result<RenderedEmail, CoreError> {
        let url = format!("{}/render", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(job)
            .send()
            .await
            .map_err(|err| CoreError::Transport(format!("mailer render request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(CoreError::Transport(format!(
                "mailer render returned {}",
                response.status()
            )));
        }

        response
            .json::<RenderedEmail>()
            .await
            .map_err(|err| CoreError::Transport(format!("malformed render response: {err}")))
    }

    #[instrument(skip(self, recipients, html), fields(recipient_count = recipients.len()))]
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html: &str,
    ) -> Result<(), CoreError> {
        let url = format!("{}/send", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SendPayload {
                recipients,
                subject,
                html,
            })
            .send()
            .await
            .map_err(|err| CoreError::Transport(format!("mailer send request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(CoreError::Transport(format!(
                "mailer send returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
