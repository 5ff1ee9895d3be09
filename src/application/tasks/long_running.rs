use std::time::Duration;

pub const LONG_RUNNING_TASK_DELAY: Duration = Duration::from_secs(10);

pub async fn long_running_task(param: i64) -> String {
    tokio::time::sleep(LONG_RUNNING_TASK_DELAY).await;
    format!("Proceed {param} successfully!")
}
