use super::start::display_name;
use crate::config::Config;
use crate::core::timer::TimerLogic;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::colors::colorize_running;
use crate::utils::formatting::{duration_to_str, local_ts};
use crate::utils::time::now_utc;

pub fn handle(cfg: &Config) -> AppResult<()> {
    match TimerLogic::status(&cfg.database_path())? {
        Some(entry) => {
            let elapsed = duration_to_str(entry.slot.elapsed(now_utc()));
            println!(
                "⏱  {} running since {} ({})",
                display_name(&entry.task.name),
                local_ts(&entry.slot.fst),
                colorize_running(elapsed.trim_start(), true)
            );
        }
        None => info("No timer is running."),
    }
    Ok(())
}
