use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use iam_core::generate_id;

use crate::entities::job::{self, JobStatus};
use crate::error::JobError;
use crate::status::{JobRuntimeStatus, TaskCounts};

/// Durable task queue (spec §4.8): rows survive a process restart, unlike
/// the in-process `EventBus`. Grounded on
/// `rustok_outbox::relay::OutboxRelay`'s claim/dispatch/retry cycle, adapted
/// from a single relay loop into a trait so each task type can claim its own
/// queue independently.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(
        &self,
        task_name: &str,
        queue: &str,
        payload: serde_json::Value,
        max_attempts: u32,
    ) -> Result<Uuid, JobError>;

    async fn claim_batch(
        &self,
        queue: &str,
        worker_id: &str,
        batch_size: u64,
    ) -> Result<Vec<job::Model>, JobError>;

    async fn mark_success(&self, job_id: Uuid) -> Result<(), JobError>;

    async fn mark_failed(&self, job_id: Uuid, error: &str, retry_delay: Duration) -> Result<(), JobError>;

    async fn status(&self) -> Result<JobRuntimeStatus, JobError>;
}

#[derive(Clone)]
pub struct SeaOrmJobQueue {
    db: DatabaseConnection,
}

impl SeaOrmJobQueue {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobQueue for SeaOrmJobQueue {
    async fn enqueue(
        &self,
        task_name: &str,
        queue: &str,
        payload: serde_json::Value,
        max_attempts: u32,
    ) -> Result<Uuid, JobError> {
        let now = Utc::now().fixed_offset();
        let model = job::ActiveModel {
            id: ActiveValue::Set(generate_id()),
            task_name: ActiveValue::Set(task_name.to_string()),
            queue: ActiveValue::Set(queue.to_string()),
            payload: ActiveValue::Set(payload),
            status: ActiveValue::Set(JobStatus::Pending),
            attempts: ActiveValue::Set(0),
            max_attempts: ActiveValue::Set(max_attempts as i32),
            run_after: ActiveValue::Set(now),
            last_error: ActiveValue::Set(None),
            claimed_by: ActiveValue::Set(None),
            claimed_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(model.id)
    }

    /// Claims up to `batch_size` claimable rows for `queue` in one
    /// transaction: select candidates, stamp `claimed_by`/`claimed_at`,
    /// re-select by that stamp. Two-phase to stay correct under concurrent
    /// workers without a `SELECT ... FOR UPDATE` dependency on the sqlite
    /// backend used in tests.
    async fn claim_batch(
        &self,
        queue: &str,
        worker_id: &str,
        batch_size: u64,
    ) -> Result<Vec<job::Model>, JobError> {
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        let candidates = job::Entity::find()
            .filter(job::Column::Queue.eq(queue))
            .filter(job::Column::Status.eq(JobStatus::Pending))
            .filter(job::Column::RunAfter.lte(now))
            .filter(job::Column::ClaimedAt.is_null())
            .order_by_asc(job::Column::CreatedAt)
            .limit(batch_size)
            .all(&txn)
            .await?;

        let candidate_ids: Vec<Uuid> = candidates.iter().map(|m| m.id).collect();
        if candidate_ids.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        job::Entity::update_many()
            .filter(job::Column::Id.is_in(candidate_ids.clone()))
            .filter(job::Column::ClaimedAt.is_null())
            .col_expr(job::Column::ClaimedBy, sea_orm::sea_query::Expr::value(worker_id.to_string()))
            .col_expr(job::Column::ClaimedAt, sea_orm::sea_query::Expr::value(now))
            .exec(&txn)
            .await?;

        let claimed = job::Entity::find()
            .filter(job::Column::Id.is_in(candidate_ids))
            .filter(job::Column::ClaimedBy.eq(worker_id))
            .all(&txn)
            .await?;

        txn.commit().await?;
        Ok(claimed)
    }

    async fn mark_success(&self, job_id: Uuid) -> Result<(), JobError> {
        let existing = job::Entity::find_by_id(job_id)
            .one(&self.db)
            .await?
            .ok_or(JobError::NotFound)?;
        let mut active: job::ActiveModel = existing.into();
        active.status = ActiveValue::Set(JobStatus::Succeeded);
        active.claimed_by = ActiveValue::Set(None);
        active.claimed_at = ActiveValue::Set(None);
        active.last_error = ActiveValue::Set(None);
        active.updated_at = ActiveValue::Set(Utc::now().fixed_offset());
        active.update(&self.db).await?;
        Ok(())
    }

    /// Either reschedules for retry (`run_after = now + retry_delay`,
    /// `status` stays `Pending`) or dead-letters once `attempts` reaches
    /// `max_attempts` — the same branch `OutboxRelay::mark_failed_attempt`
    /// takes, generalized to a caller-supplied delay instead of a
    /// relay-owned backoff table.
    async fn mark_failed(&self, job_id: Uuid, error: &str, retry_delay: Duration) -> Result<(), JobError> {
        let existing = job::Entity::find_by_id(job_id)
            .one(&self.db)
            .await?
            .ok_or(JobError::NotFound)?;
        let attempts = existing.attempts + 1;
        let max_attempts = existing.max_attempts;
        let now = Utc::now().fixed_offset();

        let mut active: job::ActiveModel = existing.into();
        active.attempts = ActiveValue::Set(attempts);
        active.last_error = ActiveValue::Set(Some(error.to_string()));
        active.claimed_by = ActiveValue::Set(None);
        active.claimed_at = ActiveValue::Set(None);
        active.updated_at = ActiveValue::Set(now);

        if attempts >= max_attempts {
            active.status = ActiveValue::Set(JobStatus::DeadLettered);
            tracing::error!(job_id = %job_id, attempts, "job exhausted retries, dead-lettering");
        } else {
            active.status = ActiveValue::Set(JobStatus::Pending);
            active.run_after = ActiveValue::Set(now + chrono::Duration::from_std(retry_delay).unwrap_or_default());
            tracing::warn!(job_id = %job_id, attempts, "job failed, scheduled for retry");
        }

        active.update(&self.db).await?;
        Ok(())
    }

    async fn status(&self) -> Result<JobRuntimeStatus, JobError> {
        let rows = job::Entity::find()
            .filter(
                Condition::any()
                    .add(job::Column::Status.eq(JobStatus::Pending))
                    .add(job::Column::Status.eq(JobStatus::DeadLettered)),
            )
            .select_only()
            .column(job::Column::TaskName)
            .column(job::Column::Status)
            .into_tuple::<(String, JobStatus)>()
            .all(&self.db)
            .await?;

        let mut by_task = std::collections::HashMap::new();
        for (task_name, status) in rows {
            let counts: &mut TaskCounts = by_task.entry(task_name).or_default();
            match status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::DeadLettered => counts.dead_lettered += 1,
                JobStatus::Succeeded => {}
            }
        }
        Ok(JobRuntimeStatus { by_task })
    }
}
