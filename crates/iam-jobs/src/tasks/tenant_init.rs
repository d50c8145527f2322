use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use iam_core::{DomainEvent, EventBus, RetryPolicy};
use iam_tenant::{TenantError, TenantInitEnqueuer, TenantService, TenantStatus};

use crate::queue::JobQueue;

pub const TASK_TENANT_INIT: &str = "tenant_init";
pub const QUEUE_CRITICAL: &str = "critical";

#[derive(Debug, Serialize, Deserialize)]
struct TenantInitPayload {
    tenant_id: Uuid,
}

fn as_tenant_error(err: crate::error::JobError) -> TenantError {
    TenantError::Database(sea_orm::DbErr::Custom(err.to_string()))
}

/// One downstream service's acknowledgement of a tenant-created
/// notification. Split out from `TenantInitRunner` the way
/// `EmailDispatcher` is split from `InvitationEmailRunner` — the HTTP
/// transport is swappable, and tests exercise the fan-out/progress-tracking
/// logic against a recording double instead of a live server.
#[async_trait]
pub trait TenantNotifier: Send + Sync {
    async fn notify(&self, url: &str, tenant_id: Uuid) -> Result<(), String>;
}

/// Default transport: POSTs a `tenant.created` event to each configured
/// downstream service URL.
pub struct ReqwestTenantNotifier {
    http: reqwest::Client,
}

impl ReqwestTenantNotifier {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TenantNotifier for ReqwestTenantNotifier {
    async fn notify(&self, url: &str, tenant_id: Uuid) -> Result<(), String> {
        let response = self
            .http
            .post(url)
            .json(&json!({ "event": "tenant.created", "tenant_id": tenant_id }))
            .send()
            .await
            .map_err(|err| format!("{url}: {err}"))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("{url} responded with {}", response.status()))
        }
    }
}

/// Implements `iam_tenant::TenantInitEnqueuer` by dropping a row on the
/// critical queue — the concrete side of the collaborator trait `iam-tenant`
/// declares and `apps/server` wires in at startup.
pub struct JobTenantInitEnqueuer {
    queue: Arc<dyn JobQueue>,
}

impl JobTenantInitEnqueuer {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl TenantInitEnqueuer for JobTenantInitEnqueuer {
    async fn enqueue_tenant_init(&self, tenant_id: Uuid) -> Result<(), TenantError> {
        self.queue
            .enqueue(
                TASK_TENANT_INIT,
                QUEUE_CRITICAL,
                json!({ "tenant_id": tenant_id }),
                RetryPolicy::tenant_init().max_attempts,
            )
            .await
            .map(|_| ())
            .map_err(as_tenant_error)
    }
}

/// Processes claimed `tenant_init` jobs: notifies every configured
/// downstream service, records each acknowledgement in the tenant's
/// metadata (spec §4.4/§4.8), and flips `pending -> active` once all of
/// them have acknowledged at least once — possibly across several retried
/// runs, since `fan_out` skips services already marked acknowledged and so
/// resumes a partially-failed attempt instead of re-notifying everyone.
pub struct TenantInitRunner {
    queue: Arc<dyn JobQueue>,
    tenant_service: Arc<TenantService>,
    notifier: Arc<dyn TenantNotifier>,
    service_urls: Vec<String>,
    bus: Arc<EventBus>,
}

impl TenantInitRunner {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        tenant_service: Arc<TenantService>,
        notifier: Arc<dyn TenantNotifier>,
        service_urls: Vec<String>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            queue,
            tenant_service,
            notifier,
            service_urls,
            bus,
        }
    }

    pub async fn run_once(&self, worker_id: &str, batch_size: u64) -> Result<usize, crate::error::JobError> {
        let claimed = self.queue.claim_batch(QUEUE_CRITICAL, worker_id, batch_size).await?;
        let processed = claimed.len();
        for job in claimed {
            self.process(job).await;
        }
        Ok(processed)
    }

    async fn process(&self, job: crate::entities::job::Model) {
        let payload: TenantInitPayload = match serde_json::from_value(job.payload.clone()) {
            Ok(payload) => payload,
            Err(err) => {
                let _ = self.queue.mark_failed(job.id, &err.to_string(), Duration::ZERO).await;
                return;
            }
        };

        match self.fan_out(payload.tenant_id).await {
            Ok(()) => {
                let _ = self.queue.mark_success(job.id).await;
                self.activate_if_pending(payload.tenant_id).await;
            }
            Err(err) => {
                let policy = RetryPolicy::tenant_init();
                let attempt = job.attempts as u32 + 1;
                let delay = policy.strategy.delay(attempt, job.id.as_u128() as u64);
                let _ = self.queue.mark_failed(job.id, &err, delay).await;
            }
        }
    }

    async fn activate_if_pending(&self, tenant_id: Uuid) {
        let Ok(tenant) = self.tenant_service.get(tenant_id).await else {
            return;
        };
        if tenant.status != TenantStatus::Pending {
            return;
        }
        if let Ok(activated) = self.tenant_service.set_status(tenant_id, TenantStatus::Active).await {
            self.bus
                .publish(activated.id, None, DomainEvent::TenantActivated { tenant_id: activated.id });
        }
    }

    async fn fan_out(&self, tenant_id: Uuid) -> Result<(), String> {
        let (_, init) = self.tenant_service.get_status(tenant_id).await.map_err(|e| e.to_string())?;

        for url in &self.service_urls {
            let already_ack = init.get(url).and_then(|v| v.as_bool()).unwrap_or(false);
            if already_ack {
                continue;
            }

            self.notifier.notify(url, tenant_id).await?;

            self.tenant_service
                .record_init_progress(tenant_id, url, true)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}
