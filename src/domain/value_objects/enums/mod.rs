pub mod job_statuses;
pub mod task_names;
