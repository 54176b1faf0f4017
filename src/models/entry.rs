use super::{slot::Slot, task::Task};
use serde::Serialize;

/// Transient pairing of a task and one of its slots.
///
/// Represents either the running timer or a historical row; never stored as
/// a table of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub task: Task,
    pub slot: Slot,
}

impl Entry {
    pub fn new(task: Task, slot: Slot) -> Self {
        Self { task, slot }
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_running()
    }
}
