use anyhow::Result;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    repositories::job::JobRepository,
    value_objects::{enums::task_names::TaskName, task_payloads::LongRunningTaskPayload},
};

pub async fn send_long_running_task(
    job_repo: &(dyn JobRepository + Send + Sync),
    param: i64,
) -> Result<Uuid> {
    let payload = serde_json::to_value(LongRunningTaskPayload { param })?;
    job_repo
        .enqueue_job(TaskName::LongRunningTask.to_string(), payload)
        .await
}

pub async fn send_detect_objects_for_slot(
    job_repo: &(dyn JobRepository + Send + Sync),
) -> Result<Uuid> {
    job_repo
        .enqueue_job(TaskName::DetectObjectsForSlot.to_string(), Value::Null)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::task_registry::TaskRegistry, domain::repositories::job::MockJobRepository,
    };
    use mockall::predicate::eq;
    use serde_json::json;

    #[tokio::test]
    async fn enqueues_long_running_task_with_param() {
        let job_id = Uuid::new_v4();
        let mut job_repo = MockJobRepository::new();
        job_repo
            .expect_enqueue_job()
            .with(eq("long_running_task".to_string()), eq(json!({ "param": 5 })))
            .times(1)
            .returning(move |_, _| Box::pin(async move { Ok(job_id) }));

        let enqueued = send_long_running_task(&job_repo, 5).await.unwrap();

        assert_eq!(enqueued, job_id);
    }

    #[tokio::test]
    async fn enqueues_detect_objects_for_slot_without_payload() {
        let job_id = Uuid::new_v4();
        let mut job_repo = MockJobRepository::new();
        job_repo
            .expect_enqueue_job()
            .with(eq("detect_objects_for_slot".to_string()), eq(Value::Null))
            .times(1)
            .returning(move |_, _| Box::pin(async move { Ok(job_id) }));

        let enqueued = send_detect_objects_for_slot(&job_repo).await.unwrap();

        assert_eq!(enqueued, job_id);
    }

    #[tokio::test]
    async fn every_sent_task_has_a_registered_handler() {
        let registry = TaskRegistry::with_default_tasks();
        let mut job_repo = MockJobRepository::new();
        job_repo
            .expect_enqueue_job()
            .withf(move |name, _| registry.get(name).is_some())
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(Uuid::new_v4()) }));

        send_long_running_task(&job_repo, 1).await.unwrap();
        send_detect_objects_for_slot(&job_repo).await.unwrap();
    }
}
