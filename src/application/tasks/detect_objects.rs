/// Placeholder for object detection over a time slot. Inputs, detection
/// logic and result storage are not defined yet, so this does nothing.
pub fn detect_objects_for_slot() {}
