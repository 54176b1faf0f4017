use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::add::AddLogic;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::date::parse_date;
use crate::utils::formatting::duration_to_str;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Add {
        date,
        start,
        end,
        task,
        tags,
    } = cmd
    {
        let d = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.clone()))?;
        let resp = AddLogic::apply(&cfg.database_path(), d, start, end, task, tags)?;
        let slot = &resp.entry.slot;

        success(format!(
            "Logged {} on '{}' ({} → {})",
            duration_to_str(slot.elapsed(slot.fst)).trim_start(),
            resp.entry.task.name,
            slot.fst.format("%Y-%m-%d %H:%M"),
            slot.lst.unwrap_or(slot.fst).format("%H:%M"),
        ));
    }
    Ok(())
}
