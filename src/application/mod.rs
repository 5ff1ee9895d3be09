pub mod task_client;
pub mod task_registry;
pub mod tasks;
