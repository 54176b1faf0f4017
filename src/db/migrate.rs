//! Schema migrations.
//!
//! Every migration is identified by a version string and recorded in the
//! `log` table (`operation = 'migration_applied'`) once applied.

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Tasks and their time slots. Timestamps are UTC TEXT "YYYY-MM-DD HH:MM:SS".
fn create_core_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS task (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS slot (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id  INTEGER NOT NULL REFERENCES task(id),
            fst      TEXT NOT NULL,
            lst      TEXT,
            CHECK (lst IS NULL OR fst <= lst)
        );

        CREATE INDEX IF NOT EXISTS idx_slot_fst ON slot(fst);
        CREATE INDEX IF NOT EXISTS idx_slot_task_fst ON slot(task_id, fst);
        "#,
    )?;
    Ok(())
}

fn create_tag_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tag (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS tag_task (
            tag_id   INTEGER NOT NULL REFERENCES tag(id),
            task_id  INTEGER NOT NULL REFERENCES task(id),
            PRIMARY KEY (tag_id, task_id)
        );

        CREATE INDEX IF NOT EXISTS idx_tag_task_task ON tag_task(task_id);
        "#,
    )?;
    Ok(())
}

/// At most one slot may be open. The partial unique index makes the store
/// itself reject a second running timer.
fn create_single_active_index(conn: &Connection) -> AppResult<()> {
    let open: i64 = conn.query_row(
        "SELECT COUNT(*) FROM slot WHERE lst IS NULL",
        [],
        |row| row.get(0),
    )?;
    if open > 1 {
        return Err(AppError::Migration(format!(
            "{} running slots found; close all but one before migrating",
            open
        )));
    }

    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_slot_single_active
         ON slot((lst IS NULL)) WHERE lst IS NULL;",
    )?;
    Ok(())
}

type Migration = (&'static str, &'static str, fn(&Connection) -> AppResult<()>);

const MIGRATIONS: &[Migration] = &[
    (
        "20240301_0001_core_tables",
        "Created task and slot tables",
        create_core_tables,
    ),
    (
        "20240315_0002_tag_tables",
        "Created tag and tag_task tables",
        create_tag_tables,
    ),
    (
        "20240402_0003_single_active_slot",
        "Enforced a single running slot",
        create_single_active_index,
    ),
];

/// Public entry point: run all pending migrations, each in its own
/// transaction. Returns the versions that were applied by this call.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for (version, message, apply) in MIGRATIONS {
        if is_applied(conn, version)? {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        apply(&tx).map_err(|e| AppError::Migration(format!("{}: {}", version, e)))?;
        mark_applied(&tx, version, message)?;
        tx.commit()?;

        log::info!("Migration applied: {} → {}", version, message);
        applied.push(*version);
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_applied_once() {
        let conn = Connection::open_in_memory().unwrap();

        let first = run_pending_migrations(&conn).unwrap();
        assert_eq!(first.len(), MIGRATIONS.len());

        let second = run_pending_migrations(&conn).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn store_rejects_second_open_slot() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();

        conn.execute("INSERT INTO task (name) VALUES ('a')", []).unwrap();
        conn.execute(
            "INSERT INTO slot (task_id, fst) VALUES (1, '2025-01-01 09:00:00')",
            [],
        )
        .unwrap();
        let second = conn.execute(
            "INSERT INTO slot (task_id, fst) VALUES (1, '2025-01-01 10:00:00')",
            [],
        );
        assert!(second.is_err());
    }

    #[test]
    fn store_rejects_slot_ending_before_start() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();

        conn.execute("INSERT INTO task (name) VALUES ('a')", []).unwrap();
        let bad = conn.execute(
            "INSERT INTO slot (task_id, fst, lst)
             VALUES (1, '2025-01-01 10:00:00', '2025-01-01 09:00:00')",
            [],
        );
        assert!(bad.is_err());
    }
}
