use super::start::display_name;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::timer::TimerLogic;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::formatting::{duration_to_str, local_ts};
use crate::utils::time::now_utc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Stop { task } = cmd {
        let db = cfg.database_path();
        if TimerLogic::status(&db)?.is_none() {
            return Err(AppError::Refused("No timer is running.".into()));
        }

        let now = now_utc();
        let resp = TimerLogic::stop(&db, task.as_deref(), now)?;
        let slot = &resp.entry.slot;

        success(format!(
            "Stopped {} at {} after {}",
            display_name(&resp.entry.task.name),
            local_ts(&slot.lst.unwrap_or(now)),
            duration_to_str(slot.elapsed(now)).trim_start()
        ));
    }
    Ok(())
}
