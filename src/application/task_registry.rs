use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashMap, future::Future, sync::Arc};
use tracing::warn;

use crate::{
    application::tasks::{detect_objects_for_slot, long_running_task},
    domain::value_objects::{enums::task_names::TaskName, task_payloads::LongRunningTaskPayload},
};

#[async_trait]
pub trait TaskHandler {
    async fn run(&self, payload: Value) -> Result<Value>;
}

pub type SharedTaskHandler = Arc<dyn TaskHandler + Send + Sync>;

struct FnTask<F>(F);

#[async_trait]
impl<F, Fut> TaskHandler for FnTask<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn run(&self, payload: Value) -> Result<Value> {
        (self.0)(payload).await
    }
}

/// Maps task names to the handlers that run them.
#[derive(Default, Clone)]
pub struct TaskRegistry {
    handlers: HashMap<String, SharedTaskHandler>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_tasks() -> Self {
        let mut registry = Self::new();

        registry.register_fn(TaskName::LongRunningTask.as_str(), |payload| async move {
            let payload: LongRunningTaskPayload = serde_json::from_value(payload)
                .context("invalid payload for long_running_task")?;
            anyhow::Ok(Value::String(long_running_task(payload.param).await))
        });

        registry.register_fn(TaskName::DetectObjectsForSlot.as_str(), |_| async {
            detect_objects_for_slot();
            anyhow::Ok(Value::Null)
        });

        registry
    }

    /// Registers `handler` under `name`, replacing any previous handler.
    pub fn register(&mut self, name: impl Into<String>, handler: SharedTaskHandler) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(task = %name, "Task handler replaced");
        }
    }

    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, task: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.register(name, Arc::new(FnTask(task)));
    }

    pub fn get(&self, name: &str) -> Option<SharedTaskHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub async fn dispatch(&self, name: &str, payload: Value) -> Result<Value> {
        let handler = self
            .get(name)
            .ok_or_else(|| anyhow!("unknown task: {name}"))?;

        handler.run(payload).await
    }
}
