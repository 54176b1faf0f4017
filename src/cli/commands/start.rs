use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::timer::TimerLogic;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::formatting::local_ts;
use crate::utils::time::now_utc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Start { task, tags } = cmd {
        let db = cfg.database_path();
        if let Some(running) = TimerLogic::status(&db)? {
            return Err(AppError::Refused(format!(
                "A timer is already running on {} since {}. Stop it first.",
                display_name(&running.task.name),
                local_ts(&running.slot.fst)
            )));
        }

        let resp = TimerLogic::start(&db, task.as_deref(), tags, now_utc())?;

        let name = display_name(&resp.entry.task.name);
        let mut msg = format!("Started {} at {}", name, local_ts(&resp.entry.slot.fst));
        if !resp.tags.is_empty() {
            let tags: Vec<&str> = resp.tags.iter().map(|t| t.name.as_str()).collect();
            msg.push_str(&format!(" [{}]", tags.join(", ")));
        }
        success(msg);
    }
    Ok(())
}

/// Quoted task name, or a placeholder for a task still to be named.
pub fn display_name(name: &str) -> String {
    if name.is_empty() {
        "(unnamed task)".to_string()
    } else {
        format!("'{}'", name)
    }
}
