use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::session::{Access, Session};
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let session = Session::open(&cfg.database_path(), Access::ReadOnly)?;
        LogLogic::print_log(&session.conn)?;
        session.close()?;
    }

    Ok(())
}
