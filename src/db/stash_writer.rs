//! Persists entries: starting a timer, stopping it, or logging time after
//! the fact.
//!
//! Every stash runs in one IMMEDIATE transaction, so the write lock is taken
//! before the running-timer check and nothing can slip in between.

use crate::db::log::ttlog;
use crate::db::queries::{
    attach_tags, close_slot, has_running, insert_closed_slot, insert_open_slot_guarded,
    load_entry, rename_task, resolve_task, tags_for_task, task_slot_overlaps,
};
use crate::db::session::{Access, Session};
use crate::errors::{AppError, AppResult};
use crate::models::Entry;
use crate::msg::{StashAction, StashRequest, StashResponse};
use crate::utils::time::format_ts;
use crate::worker::Operation;
use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};

pub struct StashWriter {
    request: StashRequest,
}

impl StashWriter {
    pub fn new(request: StashRequest) -> Self {
        Self { request }
    }
}

impl Operation for StashWriter {
    type Output = StashResponse;
    const NAME: &'static str = "stash_writer";
    const ACCESS: Access = Access::ReadWrite;

    fn work(&mut self, session: &mut Session) -> AppResult<StashResponse> {
        stash(&mut session.conn, &self.request)
    }
}

pub fn stash(conn: &mut Connection, request: &StashRequest) -> AppResult<StashResponse> {
    let action = request.action()?;
    request.entry.slot.validate()?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let slot_id = match action {
        StashAction::Start => start(&tx, &request.entry)?,
        StashAction::Stop => stop(&tx, &request.entry)?,
        StashAction::Insert => insert(&tx, &request.entry)?,
    };

    let entry = load_entry(&tx, slot_id)?.ok_or_else(|| {
        AppError::QueryFailure(format!("slot {} vanished after {:?}", slot_id, action))
    })?;
    let task_id = entry.slot.task_id.unwrap_or_default();
    attach_tags(&tx, task_id, &request.tags)?;
    let tags = tags_for_task(&tx, task_id)?;
    tx.commit()?;

    log::info!("stashed slot {} ({:?})", slot_id, action);

    Ok(StashResponse {
        entry,
        tags,
        action,
        request: request.clone(),
    })
}

fn audit(conn: &Connection, operation: &str, slot_id: i64, entry: &Entry) -> AppResult<()> {
    ttlog(
        conn,
        operation,
        &slot_id.to_string(),
        &format!("task '{}' at {}", entry.task.name, format_ts(&stamp(entry))),
    )
}

fn stamp(entry: &Entry) -> NaiveDateTime {
    entry.slot.lst.unwrap_or(entry.slot.fst)
}

fn start(conn: &Connection, entry: &Entry) -> AppResult<i64> {
    if has_running(conn)? {
        return Err(AppError::InvariantViolation(
            "a timer is already running".into(),
        ));
    }

    let task_id = resolve_task(conn, &entry.task)?;
    let slot_id = insert_open_slot_guarded(conn, task_id, &entry.slot.fst)?.ok_or_else(|| {
        AppError::InvariantViolation("a timer is already running".into())
    })?;

    audit(conn, "start", slot_id, entry)?;
    Ok(slot_id)
}

/// Close the running slot and persist the task name edited during the run.
fn stop(conn: &Connection, entry: &Entry) -> AppResult<i64> {
    let slot_id = entry.slot.id.unwrap_or_default();
    let lst = entry.slot.lst.ok_or_else(|| {
        AppError::InvariantViolation(format!("slot {} has no end time", slot_id))
    })?;

    let stored = load_entry(conn, slot_id)?
        .ok_or_else(|| AppError::InvariantViolation(format!("slot {} does not exist", slot_id)))?;
    if !stored.is_running() {
        return Err(AppError::InvariantViolation(format!(
            "slot {} is not running",
            slot_id
        )));
    }
    if lst < stored.slot.fst {
        return Err(AppError::InvariantViolation(format!(
            "slot {} would stop before it started",
            slot_id
        )));
    }

    let task_id = stored.slot.task_id.unwrap_or_default();
    if entry.task.name.trim() != stored.task.name {
        rename_task(conn, task_id, &entry.task.name)?;
    }
    if !close_slot(conn, slot_id, &lst)? {
        return Err(AppError::InvariantViolation(format!(
            "slot {} is not running",
            slot_id
        )));
    }

    audit(conn, "stop", slot_id, entry)?;
    Ok(slot_id)
}

fn insert(conn: &Connection, entry: &Entry) -> AppResult<i64> {
    let fst = entry.slot.fst;
    let lst = stamp(entry);

    let task_id = resolve_task(conn, &entry.task)?;
    if task_slot_overlaps(conn, task_id, &fst, &lst)? {
        return Err(AppError::QueryFailure(format!(
            "'{}' already has time logged between {} and {}",
            entry.task.name,
            format_ts(&fst),
            format_ts(&lst)
        )));
    }

    let slot_id = insert_closed_slot(conn, task_id, &fst, &lst)?;
    audit(conn, "add", slot_id, entry)?;
    Ok(slot_id)
}
