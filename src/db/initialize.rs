use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Bring a database up to the current schema. Safe to call on every start.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    let applied = run_pending_migrations(conn)?;
    if !applied.is_empty() {
        log::info!("schema upgraded: {}", applied.join(", "));
    }
    Ok(())
}
