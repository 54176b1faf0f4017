use super::stash;
use crate::db::StashWriter;
use crate::errors::{AppError, AppResult};
use crate::models::{Entry, Slot, Task};
use crate::msg::{StashRequest, StashResponse};
use crate::utils::time::parse_time_on;
use chrono::NaiveDate;
use std::path::Path;

/// High-level business logic for the `add` command: log a finished slot
/// after the fact.
pub struct AddLogic;

impl AddLogic {
    pub fn apply(
        db: &Path,
        date: NaiveDate,
        start: &str,
        end: &str,
        task: &str,
        tags: &[String],
    ) -> AppResult<StashResponse> {
        let fst = parse_time_on(date, start)?;
        let lst = parse_time_on(date, end)?;
        if lst <= fst {
            return Err(AppError::InvalidTime(format!(
                "end {} must be after start {}",
                end, start
            )));
        }

        let task = task.trim();
        if task.is_empty() {
            return Err(AppError::Other("a task name is required".into()));
        }

        let request = StashRequest::new(Entry::new(Task::new(task), Slot::closed(fst, lst)))
            .with_tags(tags.to_vec());
        stash(StashWriter::new(request), db)
    }
}
