//! Typed request/response/failure envelopes exchanged between the control
//! layer and workers.
//!
//! Every response echoes the request it answers, so a caller holding several
//! in-flight operations can match them up without extra bookkeeping.

pub mod ray_slot;
pub mod stash;
pub mod timer;

pub use ray_slot::{RaySlotFetchRequest, RaySlotFetchResponse, SlotRow};
pub use stash::{StashAction, StashRequest, StashResponse};
pub use timer::{TimerFetchRequest, TimerFetchResponse};

use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

/// Base request for all read operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FetchRequest {
    RaySlots(RaySlotFetchRequest),
    Timer(TimerFetchRequest),
}

/// Base response for all read operations.
#[derive(Debug, Clone, Serialize)]
pub enum FetchResponse {
    RaySlots(RaySlotFetchResponse),
    Timer(TimerFetchResponse),
}

impl FetchResponse {
    pub fn request(&self) -> FetchRequest {
        match self {
            FetchResponse::RaySlots(r) => FetchRequest::RaySlots(r.request.clone()),
            FetchResponse::Timer(r) => FetchRequest::Timer(r.request.clone()),
        }
    }

    pub fn into_ray_slots(self) -> AppResult<RaySlotFetchResponse> {
        match self {
            FetchResponse::RaySlots(r) => Ok(r),
            other => Err(unexpected("ray slots", &other)),
        }
    }

    pub fn into_timer(self) -> AppResult<TimerFetchResponse> {
        match self {
            FetchResponse::Timer(r) => Ok(r),
            other => Err(unexpected("timer", &other)),
        }
    }
}

fn unexpected(wanted: &str, got: &impl fmt::Debug) -> AppError {
    AppError::Other(format!("expected a {} response, got {:?}", wanted, got))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    StorageUnavailable,
    QueryFailure,
    InvariantViolation,
    NotImplemented,
    Cancelled,
}

impl FailureKind {
    /// Only storage and query failures are meant for end users; anything else
    /// reaching them is a defect upstream.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            FailureKind::StorageUnavailable | FailureKind::QueryFailure
        )
    }
}

impl From<&AppError> for FailureKind {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::StorageUnavailable(_) => FailureKind::StorageUnavailable,
            AppError::InvariantViolation(_) => FailureKind::InvariantViolation,
            AppError::NotImplemented(_) => FailureKind::NotImplemented,
            AppError::Cancelled(_) => FailureKind::Cancelled,
            _ => FailureKind::QueryFailure,
        }
    }
}

/// Carried on the failure event; never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub description: String,
}

impl Failure {
    pub fn new(kind: FailureKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

impl From<&AppError> for Failure {
    fn from(err: &AppError) -> Self {
        Failure::new(FailureKind::from(err), err.detail())
    }
}

impl From<AppError> for Failure {
    fn from(err: AppError) -> Self {
        Failure::from(&err)
    }
}

impl From<Failure> for AppError {
    fn from(f: Failure) -> Self {
        match f.kind {
            FailureKind::StorageUnavailable => AppError::StorageUnavailable(f.description),
            FailureKind::InvariantViolation => AppError::InvariantViolation(f.description),
            FailureKind::NotImplemented => AppError::NotImplemented(f.description),
            FailureKind::Cancelled => AppError::Cancelled(f.description),
            FailureKind::QueryFailure => AppError::QueryFailure(f.description),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.description)
    }
}

/// Successful outcome of one unit of work.
#[derive(Debug, Clone)]
pub enum Completion {
    Fetched(FetchResponse),
    Stashed(StashResponse),
}

impl Completion {
    pub fn into_fetched(self) -> AppResult<FetchResponse> {
        match self {
            Completion::Fetched(r) => Ok(r),
            other => Err(unexpected("fetch", &other)),
        }
    }

    pub fn into_stashed(self) -> AppResult<StashResponse> {
        match self {
            Completion::Stashed(r) => Ok(r),
            other => Err(unexpected("stash", &other)),
        }
    }
}

impl From<FetchResponse> for Completion {
    fn from(r: FetchResponse) -> Self {
        Completion::Fetched(r)
    }
}

impl From<StashResponse> for Completion {
    fn from(r: StashResponse) -> Self {
        Completion::Stashed(r)
    }
}

/// Identifies one dispatched worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum EventKind {
    Started,
    Fetched(FetchResponse),
    Stashed(StashResponse),
    Stopped,
    Failed(Failure),
}

impl EventKind {
    /// `Stopped` and `Failed` end a worker's event stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Stopped | EventKind::Failed(_))
    }
}

impl From<Completion> for EventKind {
    fn from(c: Completion) -> Self {
        match c {
            Completion::Fetched(r) => EventKind::Fetched(r),
            Completion::Stashed(r) => EventKind::Stashed(r),
        }
    }
}

/// A worker event tagged with the worker that emitted it.
#[derive(Debug, Clone)]
pub struct Event {
    pub worker: WorkerId,
    pub kind: EventKind,
}
