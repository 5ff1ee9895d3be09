pub mod detect_objects;
pub mod long_running;

pub use detect_objects::detect_objects_for_slot;
pub use long_running::long_running_task;
