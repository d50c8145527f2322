use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use iam_core::RetryPolicy;
use iam_invitation::{InvitationEmailEnqueuer, InvitationError, InvitationService, InvitationStatus};

use crate::queue::JobQueue;

pub const TASK_INVITATION_EMAIL: &str = "invitation_email";
pub const QUEUE_DEFAULT: &str = "default";

#[derive(Debug, Serialize, Deserialize)]
struct InvitationEmailPayload {
    invitation_id: Uuid,
    acceptance_url: String,
}

/// No SMTP implementation ships with this crate (explicit spec Non-goal);
/// collaborators provide their own. `NoopEmailDispatcher` logs the
/// acceptance link instead of sending it, so the crate is usable
/// out-of-the-box in tests and local development.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send_invitation_email(&self, to: &str, acceptance_url: &str) -> Result<(), String>;
}

#[derive(Debug, Default)]
pub struct NoopEmailDispatcher;

#[async_trait]
impl EmailDispatcher for NoopEmailDispatcher {
    async fn send_invitation_email(&self, to: &str, acceptance_url: &str) -> Result<(), String> {
        tracing::info!(to, acceptance_url, "no email transport configured; logging invitation link instead");
        Ok(())
    }
}

fn as_invitation_error(err: crate::error::JobError) -> InvitationError {
    InvitationError::Database(sea_orm::DbErr::Custom(err.to_string()))
}

/// Implements `iam_invitation::InvitationEmailEnqueuer` by dropping a row on
/// the default queue.
pub struct JobInvitationEmailEnqueuer {
    queue: Arc<dyn JobQueue>,
}

impl JobInvitationEmailEnqueuer {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl InvitationEmailEnqueuer for JobInvitationEmailEnqueuer {
    async fn enqueue_invitation_email(
        &self,
        invitation_id: Uuid,
        acceptance_url: String,
    ) -> Result<(), InvitationError> {
        self.queue
            .enqueue(
                TASK_INVITATION_EMAIL,
                QUEUE_DEFAULT,
                json!({ "invitation_id": invitation_id, "acceptance_url": acceptance_url }),
                RetryPolicy::invitation_email().max_attempts,
            )
            .await
            .map(|_| ())
            .map_err(as_invitation_error)
    }
}

/// Processes claimed `invitation_email` jobs. Idempotent by construction: if
/// the invitation is no longer pending by the time the job runs (accepted,
/// cancelled, or lazily expired), there's nothing useful left to send, so
/// the job is marked done rather than retried or dead-lettered.
pub struct InvitationEmailRunner {
    queue: Arc<dyn JobQueue>,
    invitation_service: Arc<InvitationService>,
    dispatcher: Arc<dyn EmailDispatcher>,
}

impl InvitationEmailRunner {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        invitation_service: Arc<InvitationService>,
        dispatcher: Arc<dyn EmailDispatcher>,
    ) -> Self {
        Self {
            queue,
            invitation_service,
            dispatcher,
        }
    }

    pub async fn run_once(&self, worker_id: &str, batch_size: u64) -> Result<usize, crate::error::JobError> {
        let claimed = self.queue.claim_batch(QUEUE_DEFAULT, worker_id, batch_size).await?;
        let processed = claimed.len();
        for job in claimed {
            self.process(job).await;
        }
        Ok(processed)
    }

    async fn process(&self, job: crate::entities::job::Model) {
        let payload: InvitationEmailPayload = match serde_json::from_value(job.payload.clone()) {
            Ok(payload) => payload,
            Err(err) => {
                let _ = self.queue.mark_failed(job.id, &err.to_string(), Duration::ZERO).await;
                return;
            }
        };

        let invitation = match self.invitation_service.get(payload.invitation_id).await {
            Ok(invitation) => invitation,
            Err(err) => {
                let policy = RetryPolicy::invitation_email();
                let attempt = job.attempts as u32 + 1;
                let delay = policy.strategy.delay(attempt, job.id.as_u128() as u64);
                let _ = self.queue.mark_failed(job.id, &err.to_string(), delay).await;
                return;
            }
        };

        if invitation.status != InvitationStatus::Pending {
            let _ = self.queue.mark_success(job.id).await;
            return;
        }

        match self
            .dispatcher
            .send_invitation_email(&invitation.email, &payload.acceptance_url)
            .await
        {
            Ok(()) => {
                let _ = self.queue.mark_success(job.id).await;
            }
            Err(err) => {
                let policy = RetryPolicy::invitation_email();
                let attempt = job.attempts as u32 + 1;
                let delay = policy.strategy.delay(attempt, job.id.as_u128() as u64);
                let _ = self.queue.mark_failed(job.id, &err, delay).await;
            }
        }
    }
}
