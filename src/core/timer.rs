use super::{current_timer, stash};
use crate::db::StashWriter;
use crate::errors::{AppError, AppResult};
use crate::models::{Entry, Slot, Task};
use crate::msg::{StashRequest, StashResponse};
use crate::utils::time::format_ts;
use chrono::NaiveDateTime;
use std::path::Path;

/// Start, stop and inspect the single running timer.
///
/// The timer is always fetched (and that fetch settled) before the stash is
/// dispatched; the store re-checks the same condition inside the write.
pub struct TimerLogic;

impl TimerLogic {
    pub fn start(
        db: &Path,
        task: Option<&str>,
        tags: &[String],
        now: NaiveDateTime,
    ) -> AppResult<StashResponse> {
        if let Some(running) = current_timer(db)? {
            return Err(AppError::InvariantViolation(format!(
                "a timer is already running: '{}' since {}",
                running.task.name,
                format_ts(&running.slot.fst)
            )));
        }

        let entry = Entry::new(Task::new(task.unwrap_or_default()), Slot::open(now));
        let request = StashRequest::new(entry).with_tags(tags.to_vec());
        stash(StashWriter::new(request), db)
    }

    /// Stop the running timer at `now`, optionally renaming its task in the
    /// same write. A blank name keeps the current one.
    pub fn stop(db: &Path, rename: Option<&str>, now: NaiveDateTime) -> AppResult<StashResponse> {
        let mut entry = current_timer(db)?
            .ok_or_else(|| AppError::InvariantViolation("no timer is running".into()))?;

        // clock skew must not produce a negative slot
        entry.slot.lst = Some(now.max(entry.slot.fst));
        if let Some(name) = rename.map(str::trim).filter(|n| !n.is_empty()) {
            entry.task.name = name.to_string();
        }

        stash(StashWriter::new(StashRequest::new(entry)), db)
    }

    pub fn status(db: &Path) -> AppResult<Option<Entry>> {
        current_timer(db)
    }
}
