//! Control-layer policies built on the workers: build a request, run it off
//! the calling thread, and turn the outcome into a result.

pub mod add;
pub mod list;
pub mod log;
pub mod timer;

use crate::db::TimerReader;
use crate::errors::{AppError, AppResult};
use crate::models::Entry;
use crate::msg::{Completion, FetchResponse, StashResponse};
use crate::worker::{Operation, Reader, Worker, Writer};
use std::path::Path;

/// Run one operation on its own worker thread and wait for the outcome.
pub fn run_worker<O: Operation>(op: O, db: &Path) -> AppResult<Completion> {
    Worker::new(op, db)
        .spawn()?
        .wait()
        .map_err(AppError::from)
}

pub fn fetch<R: Reader>(reader: R, db: &Path) -> AppResult<FetchResponse> {
    run_worker(reader, db)?.into_fetched()
}

pub fn stash<W: Writer>(writer: W, db: &Path) -> AppResult<StashResponse> {
    run_worker(writer, db)?.into_stashed()
}

/// The running timer, read on a worker thread.
pub fn current_timer(db: &Path) -> AppResult<Option<Entry>> {
    Ok(fetch(TimerReader::default(), db)?.into_timer()?.timer)
}
