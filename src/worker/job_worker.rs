use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info};

use crate::{application::task_registry::TaskRegistry, domain::repositories::job::JobRepository};

pub const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub async fn run_worker_loop(
    job_repo: Arc<dyn JobRepository + Send + Sync>,
    registry: Arc<TaskRegistry>,
) -> Result<()> {
    info!(tasks = ?registry.names(), "Starting job worker loop");
    loop {
        match process_next_job(job_repo.as_ref(), &registry).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("No jobs found.");
                tokio::time::sleep(IDLE_POLL_INTERVAL).await;
            }
            Err(e) => {
                error!("Error while processing jobs: {:#}", e);
                tokio::time::sleep(IDLE_POLL_INTERVAL).await;
            }
        }
    }
}

/// Locks one job, runs it and records the outcome. Returns `false` when the
/// queue had nothing ready.
pub async fn process_next_job(
    job_repo: &(dyn JobRepository + Send + Sync),
    registry: &TaskRegistry,
) -> Result<bool> {
    let Some(job) = job_repo.lock_next_job().await? else {
        return Ok(false);
    };

    info!(
        job_id = %job.id,
        task = %job.task_name,
        locked_by = job.locked_by.as_deref().unwrap_or("-"),
        "Processing job"
    );

    match registry.dispatch(&job.task_name, job.payload.clone()).await {
        Ok(output) => {
            job_repo
                .mark_job_done(job.id, output)
                .await
                .with_context(|| format!("failed to mark job {} as done", job.id))?;
            info!(job_id = %job.id, "Successfully processed job");
        }
        Err(e) => {
            error!(job_id = %job.id, task = %job.task_name, "Job failed: {:#}", e);
            job_repo
                .mark_job_failed(job.id, format!("{e:#}"))
                .await
                .with_context(|| format!("failed to mark job {} as failed", job.id))?;
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::jobs::JobEntity, repositories::job::MockJobRepository,
        value_objects::enums::job_statuses::JobStatus,
    };
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn sample_job(task_name: &str, payload: Value) -> JobEntity {
        let now = Utc::now();
        JobEntity {
            id: Uuid::new_v4(),
            task_name: task_name.to_string(),
            payload,
            status: JobStatus::Running.to_string(),
            output: None,
            error: None,
            run_at: now,
            locked_at: Some(now),
            locked_by: Some("worker-test".to_string()),
            created_at: now,
            finished_at: None,
        }
    }

    fn repo_returning(job: JobEntity) -> MockJobRepository {
        let mut job_repo = MockJobRepository::new();
        job_repo.expect_lock_next_job().times(1).returning(move || {
            let job = job.clone();
            Box::pin(async move { Ok(Some(job)) })
        });
        job_repo
    }

    #[tokio::test]
    async fn returns_false_when_no_job_is_ready() {
        let mut job_repo = MockJobRepository::new();
        job_repo
            .expect_lock_next_job()
            .times(1)
            .returning(|| Box::pin(async { Ok(None) }));
        job_repo.expect_mark_job_done().never();
        job_repo.expect_mark_job_failed().never();

        let registry = TaskRegistry::with_default_tasks();
        let processed = process_next_job(&job_repo, &registry).await.unwrap();

        assert!(!processed);
    }

    #[tokio::test(start_paused = true)]
    async fn marks_long_running_task_done_with_its_output() {
        let job = sample_job("long_running_task", json!({ "param": 5 }));
        let job_id = job.id;

        let mut job_repo = repo_returning(job);
        job_repo
            .expect_mark_job_done()
            .with(eq(job_id), eq(json!("Proceed 5 successfully!")))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));
        job_repo.expect_mark_job_failed().never();

        let registry = TaskRegistry::with_default_tasks();
        let processed = process_next_job(&job_repo, &registry).await.unwrap();

        assert!(processed);
    }

    #[tokio::test]
    async fn marks_detect_objects_done_with_null_output() {
        let job = sample_job("detect_objects_for_slot", Value::Null);
        let job_id = job.id;

        let mut job_repo = repo_returning(job);
        job_repo
            .expect_mark_job_done()
            .with(eq(job_id), eq(Value::Null))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let registry = TaskRegistry::with_default_tasks();
        assert!(process_next_job(&job_repo, &registry).await.unwrap());
    }

    #[tokio::test]
    async fn processes_job_without_lock_stamp() {
        let mut job = sample_job("detect_objects_for_slot", Value::Null);
        job.locked_at = None;
        job.locked_by = None;
        let job_id = job.id;

        let mut job_repo = repo_returning(job);
        job_repo
            .expect_mark_job_done()
            .with(eq(job_id), eq(Value::Null))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let registry = TaskRegistry::with_default_tasks();
        assert!(process_next_job(&job_repo, &registry).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_task_marks_job_failed() {
        let job = sample_job("resize_image", json!({}));
        let job_id = job.id;

        let mut job_repo = repo_returning(job);
        job_repo.expect_mark_job_done().never();
        job_repo
            .expect_mark_job_failed()
            .withf(move |id, err| *id == job_id && err.contains("unknown task: resize_image"))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let registry = TaskRegistry::with_default_tasks();
        assert!(process_next_job(&job_repo, &registry).await.unwrap());
    }

    #[tokio::test]
    async fn failing_task_marks_job_failed_with_error_chain() {
        let job = sample_job("flaky", json!({}));
        let job_id = job.id;

        let mut job_repo = repo_returning(job);
        job_repo
            .expect_mark_job_failed()
            .withf(move |id, err| *id == job_id && err == "slot 7 unavailable")
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut registry = TaskRegistry::new();
        registry.register_fn("flaky", |_| async {
            Err::<Value, _>(anyhow::anyhow!("slot 7 unavailable"))
        });

        assert!(process_next_job(&job_repo, &registry).await.unwrap());
    }

    #[tokio::test]
    async fn lock_error_is_propagated() {
        let mut job_repo = MockJobRepository::new();
        job_repo
            .expect_lock_next_job()
            .times(1)
            .returning(|| Box::pin(async { Err(anyhow::anyhow!("connection refused")) }));

        let registry = TaskRegistry::with_default_tasks();
        let err = process_next_job(&job_repo, &registry).await.unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn failure_to_record_outcome_is_reported() {
        let job = sample_job("detect_objects_for_slot", Value::Null);

        let mut job_repo = repo_returning(job);
        job_repo
            .expect_mark_job_done()
            .times(1)
            .returning(|_, _| Box::pin(async { Err(anyhow::anyhow!("pool timed out")) }));

        let registry = TaskRegistry::with_default_tasks();
        let err = process_next_job(&job_repo, &registry).await.unwrap_err();

        assert!(err.to_string().contains("failed to mark job"));
    }
}
