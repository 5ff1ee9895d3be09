use std::fmt::Display;

/// Tasks shipped with the worker. The registry is keyed by the string form so
/// other handlers can be registered alongside these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskName {
    LongRunningTask,
    DetectObjectsForSlot,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::LongRunningTask => "long_running_task",
            TaskName::DetectObjectsForSlot => "detect_objects_for_slot",
        }
    }
}

impl Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
