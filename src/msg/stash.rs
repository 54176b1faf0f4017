use crate::errors::{AppError, AppResult};
use crate::models::{Entry, Tag};
use serde::Serialize;

/// What persisting an entry means, derived from the entry's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StashAction {
    /// New running slot: starts a timer.
    Start,
    /// Existing running slot gets its `lst`: stops the timer.
    Stop,
    /// New finished slot, e.g. time logged after the fact.
    Insert,
}

/// Persist (or update) a task and its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StashRequest {
    pub entry: Entry,
    /// Tag names attached to the entry's task; created on first use.
    pub tags: Vec<String>,
}

impl StashRequest {
    pub fn new(entry: Entry) -> Self {
        Self {
            entry,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn action(&self) -> AppResult<StashAction> {
        let slot = &self.entry.slot;
        match (slot.id, slot.lst) {
            (None, None) => Ok(StashAction::Start),
            (None, Some(_)) => Ok(StashAction::Insert),
            (Some(_), Some(_)) => Ok(StashAction::Stop),
            (Some(id), None) => Err(AppError::InvariantViolation(format!(
                "slot {} cannot be stashed without an end time",
                id
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StashResponse {
    /// The entry as persisted, with ids assigned.
    pub entry: Entry,
    pub tags: Vec<Tag>,
    pub action: StashAction,
    pub request: StashRequest,
}
