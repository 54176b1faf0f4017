use crate::db::session::{Access, Session};
use crate::errors::{AppError, AppResult};
use crate::msg::{Completion, FetchResponse, StashResponse};

/// One unit of data work, executed by a [`Worker`](super::Worker) against
/// the session it opened on its own thread.
///
/// Implement `work`; the provided default fails with `NotImplemented`.
pub trait Operation: Send + 'static {
    /// `FetchResponse` for readers, `StashResponse` for writers.
    type Output: Into<Completion> + Send;

    /// Short name used in logs and failures.
    const NAME: &'static str;

    const ACCESS: Access;

    fn work(&mut self, _session: &mut Session) -> AppResult<Self::Output> {
        Err(AppError::NotImplemented(format!(
            "{}: default work method",
            Self::NAME
        )))
    }
}

/// An operation whose completion is `Fetched`.
pub trait Reader: Operation<Output = FetchResponse> {}

impl<T: Operation<Output = FetchResponse>> Reader for T {}

/// An operation whose completion is `Stashed`.
pub trait Writer: Operation<Output = StashResponse> {}

impl<T: Operation<Output = StashResponse>> Writer for T {}
