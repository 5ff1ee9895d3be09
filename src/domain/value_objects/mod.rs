pub mod enums;
pub mod task_payloads;
