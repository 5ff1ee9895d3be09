use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::jobs::JobEntity;

/// Source of work for the worker. Scheduling and transport live behind this
/// trait; the worker only locks, runs and reports.
#[async_trait]
#[automock]
pub trait JobRepository {
    async fn enqueue_job(&self, task_name: String, payload: Value) -> Result<Uuid>;

    /// Claims the oldest ready job and moves it to `running`, stamping
    /// `locked_at`/`locked_by`. Jobs left `running` by a worker that died are
    /// not reclaimed; an operator re-queues them using those columns.
    async fn lock_next_job(&self) -> Result<Option<JobEntity>>;

    async fn mark_job_done(&self, job_id: Uuid, result: Value) -> Result<()>;

    async fn mark_job_failed(&self, job_id: Uuid, err: String) -> Result<()>;
}
