use crate::errors::{AppError, AppResult};
use crate::utils::time::format_ts;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A timestamped interval `[fst, lst?]` owned by one task.
///
/// All timestamps are UTC. `lst` stays `None` while the timer runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub id: Option<i64>,            // ⇔ slot.id (None until persisted)
    pub task_id: Option<i64>,       // ⇔ slot.task_id
    pub fst: NaiveDateTime,         // ⇔ slot.fst (TEXT "YYYY-MM-DD HH:MM:SS")
    pub lst: Option<NaiveDateTime>, // ⇔ slot.lst (NULL while running)
}

impl Slot {
    /// A running slot, not yet persisted.
    pub fn open(fst: NaiveDateTime) -> Self {
        Self {
            id: None,
            task_id: None,
            fst,
            lst: None,
        }
    }

    /// A finished slot, not yet persisted.
    pub fn closed(fst: NaiveDateTime, lst: NaiveDateTime) -> Self {
        Self {
            id: None,
            task_id: None,
            fst,
            lst: Some(lst),
        }
    }

    pub fn is_running(&self) -> bool {
        self.lst.is_none()
    }

    /// Calendar date (UTC) the slot belongs to.
    pub fn date(&self) -> NaiveDate {
        self.fst.date()
    }

    /// Elapsed time; running slots are measured against `now`.
    pub fn elapsed(&self, now: NaiveDateTime) -> Duration {
        self.lst.unwrap_or(now) - self.fst
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(lst) = self.lst
            && lst < self.fst
        {
            return Err(AppError::InvariantViolation(format!(
                "slot ends ({}) before it starts ({})",
                format_ts(&lst),
                format_ts(&self.fst)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_ts;

    fn ts(s: &str) -> NaiveDateTime {
        parse_ts(s).unwrap()
    }

    #[test]
    fn closed_slot_must_not_end_before_start() {
        let ok = Slot::closed(ts("2025-03-01 09:00:00"), ts("2025-03-01 09:00:00"));
        assert!(ok.validate().is_ok());

        let bad = Slot::closed(ts("2025-03-01 10:00:00"), ts("2025-03-01 09:00:00"));
        assert!(matches!(
            bad.validate(),
            Err(AppError::InvariantViolation(_))
        ));
    }

    #[test]
    fn running_slot_elapsed_uses_now() {
        let slot = Slot::open(ts("2025-03-01 09:00:00"));
        assert!(slot.is_running());
        assert_eq!(
            slot.elapsed(ts("2025-03-01 10:30:00")),
            Duration::minutes(90)
        );
    }
}
