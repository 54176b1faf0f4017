use crate::models::Entry;
use serde::Serialize;

/// Request the currently running timer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimerFetchRequest;

/// The running timer, or `None` when the store holds no running slot.
#[derive(Debug, Clone, Serialize)]
pub struct TimerFetchResponse {
    pub timer: Option<Entry>,
    pub request: TimerFetchRequest,
}
