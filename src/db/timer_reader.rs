use crate::db::queries::load_running;
use crate::db::session::{Access, Session};
use crate::errors::{AppError, AppResult};
use crate::models::Entry;
use crate::msg::{FetchResponse, TimerFetchRequest, TimerFetchResponse};
use crate::worker::Operation;
use rusqlite::Connection;

/// Reads the running timer, if any.
pub struct TimerReader {
    request: TimerFetchRequest,
}

impl TimerReader {
    pub fn new(request: TimerFetchRequest) -> Self {
        Self { request }
    }
}

impl Default for TimerReader {
    fn default() -> Self {
        Self::new(TimerFetchRequest)
    }
}

impl Operation for TimerReader {
    type Output = FetchResponse;
    const NAME: &'static str = "timer_reader";
    const ACCESS: Access = Access::ReadOnly;

    fn work(&mut self, session: &mut Session) -> AppResult<FetchResponse> {
        Ok(FetchResponse::Timer(TimerFetchResponse {
            timer: fetch_timer(&session.conn)?,
            request: self.request.clone(),
        }))
    }
}

/// The running entry. More than one running slot means the store is corrupt.
pub fn fetch_timer(conn: &Connection) -> AppResult<Option<Entry>> {
    let mut running = load_running(conn)?;
    if running.len() > 1 {
        return Err(AppError::InvariantViolation(format!(
            "{} timers are running at once",
            running.len()
        )));
    }
    Ok(running.pop())
}
