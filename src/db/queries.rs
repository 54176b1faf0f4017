use crate::errors::{AppError, AppResult};
use crate::models::{Entry, Slot, Tag, Task};
use crate::utils::time::{format_ts, parse_ts};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Column list shared by every query that maps rows with [`map_entry`].
pub const ENTRY_COLUMNS: &str = "s.id, s.task_id, s.fst, s.lst, t.name";

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

pub fn get_ts(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).ok_or_else(|| conversion_error(idx, AppError::InvalidTime(raw.clone())))
}

pub fn get_opt_ts(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_ts(&s)
            .map(Some)
            .ok_or_else(|| conversion_error(idx, AppError::InvalidTime(s.clone()))),
    }
}

pub fn get_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| conversion_error(idx, AppError::InvalidDate(raw.clone())))
}

/// Map a row selected with [`ENTRY_COLUMNS`] (starting at column 0).
pub fn map_entry(row: &Row) -> rusqlite::Result<Entry> {
    let task_id: i64 = row.get(1)?;
    let slot = Slot {
        id: Some(row.get(0)?),
        task_id: Some(task_id),
        fst: get_ts(row, 2)?,
        lst: get_opt_ts(row, 3)?,
    };
    Ok(Entry::new(Task::with_id(task_id, row.get::<_, String>(4)?), slot))
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

pub fn load_entry(conn: &Connection, slot_id: i64) -> AppResult<Option<Entry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM slot s JOIN task t ON t.id = s.task_id WHERE s.id = ?1"
    );
    Ok(conn.query_row(&sql, [slot_id], map_entry).optional()?)
}

/// Every running slot. A healthy store returns zero or one entries.
pub fn load_running(conn: &Connection) -> AppResult<Vec<Entry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM slot s JOIN task t ON t.id = s.task_id
         WHERE s.lst IS NULL
         ORDER BY s.fst DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_entry)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn has_running(conn: &Connection) -> AppResult<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM slot WHERE lst IS NULL)",
        [],
        |row| row.get(0),
    )?)
}

/// Insert a running slot only if no other slot is running. Returns the new
/// slot id, or `None` when the guard refused the insert.
pub fn insert_open_slot_guarded(
    conn: &Connection,
    task_id: i64,
    fst: &NaiveDateTime,
) -> AppResult<Option<i64>> {
    let inserted = conn.execute(
        "INSERT INTO slot (task_id, fst, lst)
         SELECT ?1, ?2, NULL
         WHERE NOT EXISTS (SELECT 1 FROM slot WHERE lst IS NULL)",
        params![task_id, format_ts(fst)],
    )?;
    if inserted == 0 {
        return Ok(None);
    }
    Ok(Some(conn.last_insert_rowid()))
}

pub fn insert_closed_slot(
    conn: &Connection,
    task_id: i64,
    fst: &NaiveDateTime,
    lst: &NaiveDateTime,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO slot (task_id, fst, lst) VALUES (?1, ?2, ?3)",
        params![task_id, format_ts(fst), format_ts(lst)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Set `lst` on a slot that is still running. Returns false when the slot
/// does not exist or is already closed.
pub fn close_slot(conn: &Connection, slot_id: i64, lst: &NaiveDateTime) -> AppResult<bool> {
    let updated = conn.execute(
        "UPDATE slot SET lst = ?1 WHERE id = ?2 AND lst IS NULL",
        params![format_ts(lst), slot_id],
    )?;
    Ok(updated == 1)
}

/// True when `[fst, lst)` intersects another slot of the same task. A running
/// slot extends to the end of time.
pub fn task_slot_overlaps(
    conn: &Connection,
    task_id: i64,
    fst: &NaiveDateTime,
    lst: &NaiveDateTime,
) -> AppResult<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM slot
            WHERE task_id = ?1
              AND fst < ?3
              AND COALESCE(lst, '9999-12-31 23:59:59') > ?2
         )",
        params![task_id, format_ts(fst), format_ts(lst)],
        |row| row.get(0),
    )?)
}

// ---------------------------------------------------------------------------
// Tasks and tags
// ---------------------------------------------------------------------------

pub fn insert_task(conn: &Connection, name: &str) -> AppResult<i64> {
    conn.execute("INSERT INTO task (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn find_task_by_name(conn: &Connection, name: &str) -> AppResult<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM task WHERE name = ?1 ORDER BY id DESC LIMIT 1",
            [name],
            |row| row.get(0),
        )
        .optional()?)
}

/// Resolve the task an entry refers to, creating it on first use.
///
/// A persisted task is used as-is. A new task with a non-empty name reuses
/// the latest task of that name; an empty name always creates a new task.
pub fn resolve_task(conn: &Connection, task: &Task) -> AppResult<i64> {
    if let Some(id) = task.id {
        return Ok(id);
    }
    let name = task.name.trim();
    if !name.is_empty()
        && let Some(id) = find_task_by_name(conn, name)?
    {
        return Ok(id);
    }
    insert_task(conn, name)
}

/// Returns false when the task does not exist.
pub fn rename_task(conn: &Connection, task_id: i64, name: &str) -> AppResult<bool> {
    let updated = conn.execute(
        "UPDATE task SET name = ?1 WHERE id = ?2",
        params![name.trim(), task_id],
    )?;
    Ok(updated == 1)
}

/// Attach tags to a task by name, creating unknown tags. Idempotent.
pub fn attach_tags(conn: &Connection, task_id: i64, names: &[String]) -> AppResult<Vec<Tag>> {
    let mut tags = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        conn.execute("INSERT OR IGNORE INTO tag (name) VALUES (?1)", [name])?;
        let tag_id: i64 = conn.query_row("SELECT id FROM tag WHERE name = ?1", [name], |row| {
            row.get(0)
        })?;
        conn.execute(
            "INSERT OR IGNORE INTO tag_task (tag_id, task_id) VALUES (?1, ?2)",
            params![tag_id, task_id],
        )?;
        tags.push(Tag::new(tag_id, name));
    }
    Ok(tags)
}

pub fn tags_for_task(conn: &Connection, task_id: i64) -> AppResult<Vec<Tag>> {
    let mut stmt = conn.prepare_cached(
        "SELECT g.id, g.name FROM tag g
         JOIN tag_task tt ON tt.tag_id = g.id
         WHERE tt.task_id = ?1
         ORDER BY g.id ASC",
    )?;
    let rows = stmt.query_map([task_id], |row| Ok(Tag::new(row.get(0)?, row.get::<_, String>(1)?)))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn ts(s: &str) -> NaiveDateTime {
        parse_ts(s).unwrap()
    }

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    #[test]
    fn guarded_insert_refuses_second_running_slot() {
        let conn = db();
        let task = insert_task(&conn, "Cook").unwrap();

        let first = insert_open_slot_guarded(&conn, task, &ts("2025-01-01 09:00:00")).unwrap();
        assert!(first.is_some());
        let second = insert_open_slot_guarded(&conn, task, &ts("2025-01-01 09:30:00")).unwrap();
        assert!(second.is_none());
        assert_eq!(load_running(&conn).unwrap().len(), 1);
    }

    #[test]
    fn close_slot_only_touches_running_slots() {
        let conn = db();
        let task = insert_task(&conn, "Cook").unwrap();
        let id = insert_open_slot_guarded(&conn, task, &ts("2025-01-01 09:00:00"))
            .unwrap()
            .unwrap();

        assert!(close_slot(&conn, id, &ts("2025-01-01 10:00:00")).unwrap());
        assert!(!close_slot(&conn, id, &ts("2025-01-01 11:00:00")).unwrap());

        let entry = load_entry(&conn, id).unwrap().unwrap();
        assert_eq!(entry.slot.lst, Some(ts("2025-01-01 10:00:00")));
    }

    #[test]
    fn overlap_is_checked_per_task() {
        let conn = db();
        let cook = insert_task(&conn, "Cook").unwrap();
        let wash = insert_task(&conn, "Wash").unwrap();
        insert_closed_slot(&conn, cook, &ts("2025-01-01 09:00:00"), &ts("2025-01-01 10:00:00"))
            .unwrap();

        assert!(
            task_slot_overlaps(&conn, cook, &ts("2025-01-01 09:30:00"), &ts("2025-01-01 11:00:00"))
                .unwrap()
        );
        // touching intervals do not overlap
        assert!(
            !task_slot_overlaps(&conn, cook, &ts("2025-01-01 10:00:00"), &ts("2025-01-01 11:00:00"))
                .unwrap()
        );
        assert!(
            !task_slot_overlaps(&conn, wash, &ts("2025-01-01 09:30:00"), &ts("2025-01-01 11:00:00"))
                .unwrap()
        );
    }

    #[test]
    fn tasks_are_reused_by_name_but_not_when_unnamed() {
        let conn = db();
        let a = resolve_task(&conn, &Task::new("Cook")).unwrap();
        let b = resolve_task(&conn, &Task::new("Cook")).unwrap();
        assert_eq!(a, b);

        let c = resolve_task(&conn, &Task::new("")).unwrap();
        let d = resolve_task(&conn, &Task::new("")).unwrap();
        assert_ne!(c, d);
    }

    #[test]
    fn tags_attach_idempotently() {
        let conn = db();
        let task = insert_task(&conn, "Run").unwrap();
        attach_tags(&conn, task, &["Health".into(), "Workout".into()]).unwrap();
        attach_tags(&conn, task, &["Health".into(), " ".into()]).unwrap();

        let tags: Vec<String> = tags_for_task(&conn, task)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(tags, vec!["Health", "Workout"]);
    }
}
