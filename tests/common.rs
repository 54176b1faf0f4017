#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use timereaper::db::initialize::init_db;
use timereaper::db::queries::{attach_tags, insert_closed_slot, insert_task};
use timereaper::db::session::Session;
use timereaper::utils::time::parse_ts;

/// The binary, with HOME pointed at a scratch dir so no real config is read.
pub fn trp(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("timereaper");
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

/// A scratch directory and a database path inside it (not yet created).
pub fn scratch(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(format!("{}.sqlite", name));
    (dir, path)
}

pub fn ts(s: &str) -> NaiveDateTime {
    parse_ts(s).expect("timestamp")
}

/// Create and migrate a database at `path`.
pub fn create_db(path: &Path) {
    let session = Session::create(path).expect("create db");
    init_db(&session.conn).expect("migrate");
    session.close().expect("close");
}

/// Insert finished slots `(task, fst, lst)`, creating tasks by name.
pub fn seed(path: &Path, slots: &[(&str, &str, &str)]) {
    let session = Session::create(path).expect("open db");
    for (task, fst, lst) in slots {
        let task_id = insert_task(&session.conn, task).expect("task");
        insert_closed_slot(&session.conn, task_id, &ts(fst), &ts(lst)).expect("slot");
    }
    session.close().expect("close");
}

pub fn seed_tagged(path: &Path, task: &str, tags: &[&str], fst: &str, lst: &str) {
    let session = Session::create(path).expect("open db");
    let task_id = insert_task(&session.conn, task).expect("task");
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    attach_tags(&session.conn, task_id, &tags).expect("tags");
    insert_closed_slot(&session.conn, task_id, &ts(fst), &ts(lst)).expect("slot");
    session.close().expect("close");
}

pub fn count(path: &Path, sql: &str) -> i64 {
    let session = Session::create(path).expect("open db");
    let n = session.conn.query_row(sql, [], |r| r.get(0)).expect("count");
    session.close().expect("close");
    n
}
