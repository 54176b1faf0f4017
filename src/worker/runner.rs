use super::Operation;
use crate::db::session::Session;
use crate::errors::{AppError, AppResult};
use crate::msg::{Completion, Event, EventKind, Failure, FailureKind, WorkerId};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

fn next_worker_id() -> WorkerId {
    WorkerId(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed))
}

/// Shared flag asking a worker not to start.
///
/// Checked once, before the session is opened; a worker that already runs
/// goes on to completion or failure.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives one [`Operation`] through its lifecycle.
///
/// The storage session is not opened at construction. It is created the
/// first time the worker runs, on whatever thread runs it, and closed on
/// that same thread.
///
/// Events, in order: `Started`, `Fetched`/`Stashed`, `Stopped` on success.
/// A session failure emits only `Failed`; a work failure emits `Started`
/// then `Failed`. `Failed` is always the last event.
pub struct Worker<O: Operation> {
    id: WorkerId,
    op: O,
    path: PathBuf,
    cancel: CancelToken,
    session: Option<Session>,
}

impl<O: Operation> Worker<O> {
    pub fn new(op: O, path: impl Into<PathBuf>) -> Self {
        Self {
            id: next_worker_id(),
            op,
            path: path.into(),
            cancel: CancelToken::new(),
            session: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Open the session if it is not open yet.
    pub fn create_session(&mut self) -> AppResult<()> {
        if self.session.is_none() {
            self.session = Some(Session::open(&self.path, O::ACCESS)?);
        }
        Ok(())
    }

    fn close_session(&mut self) {
        if let Some(session) = self.session.take()
            && let Err(e) = session.close()
        {
            log::warn!("{} ({}): closing session failed: {}", self.id, O::NAME, e);
        }
    }

    fn emit(&self, tx: &Sender<Event>, kind: EventKind) {
        let event = Event {
            worker: self.id,
            kind,
        };
        if tx.send(event).is_err() {
            log::debug!("{} ({}): nobody listens for events", self.id, O::NAME);
        }
    }

    fn fail(&self, tx: &Sender<Event>, err: AppError) {
        let failure = Failure::from(&err);
        if err.is_defect() {
            log::error!("{} ({}): {}", self.id, O::NAME, err);
        } else {
            log::warn!("{} ({}): {}", self.id, O::NAME, err);
        }
        self.emit(tx, EventKind::Failed(failure));
    }

    /// Execute on the current thread, reporting through `tx`.
    pub fn run(mut self, tx: &Sender<Event>) {
        if self.cancel.is_cancelled() {
            self.fail(
                tx,
                AppError::Cancelled(format!("{} cancelled before start", O::NAME)),
            );
            return;
        }

        if let Err(e) = self.create_session() {
            self.fail(tx, e);
            return;
        }

        self.emit(tx, EventKind::Started);
        log::debug!("{} ({}): started", self.id, O::NAME);

        let result = match self.session.as_mut() {
            Some(session) => self.op.work(session),
            None => Err(AppError::Other("session vanished".into())),
        };

        match result {
            Ok(output) => {
                let completion: Completion = output.into();
                self.emit(tx, completion.into());
                self.close_session();
                self.emit(tx, EventKind::Stopped);
                log::debug!("{} ({}): stopped", self.id, O::NAME);
            }
            Err(e) => {
                self.close_session();
                self.fail(tx, e);
            }
        }
    }

    /// Run on a new thread, reporting into an existing channel.
    pub fn spawn_into(self, tx: Sender<Event>) -> AppResult<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name(format!("timereaper-{}-{}", O::NAME, self.id.0))
            .spawn(move || self.run(&tx))?;
        Ok(handle)
    }

    /// Run on a new thread with a private event channel.
    pub fn spawn(self) -> AppResult<WorkerHandle> {
        let (tx, rx) = mpsc::channel();
        let id = self.id;
        let cancel = self.cancel_token();
        let thread = self.spawn_into(tx)?;
        Ok(WorkerHandle {
            id,
            events: rx,
            thread,
            cancel,
        })
    }
}

/// Caller side of a spawned worker.
pub struct WorkerHandle {
    id: WorkerId,
    events: Receiver<Event>,
    thread: JoinHandle<()>,
    cancel: CancelToken,
}

impl WorkerHandle {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Ask the worker not to start. No effect once it has started.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the worker ends and return every event it emitted.
    pub fn collect(self) -> Vec<EventKind> {
        let events: Vec<EventKind> = self.events.iter().map(|e| e.kind).collect();
        if self.thread.join().is_err() {
            log::error!("{} panicked", self.id);
        }
        events
    }

    /// Block until the worker ends and return its completion or failure.
    pub fn wait(self) -> Result<Completion, Failure> {
        let id = self.id;
        let mut completion = None;
        let mut outcome = None;

        for event in self.events.iter() {
            match event.kind {
                EventKind::Started => {}
                EventKind::Fetched(r) => completion = Some(Completion::Fetched(r)),
                EventKind::Stashed(r) => completion = Some(Completion::Stashed(r)),
                EventKind::Stopped => {
                    outcome = Some(completion.take().ok_or_else(|| {
                        Failure::new(
                            FailureKind::QueryFailure,
                            format!("{} stopped without a result", id),
                        )
                    }));
                    break;
                }
                EventKind::Failed(f) => {
                    outcome = Some(Err(f));
                    break;
                }
            }
        }

        if self.thread.join().is_err() {
            log::error!("{} panicked", id);
        }

        outcome.unwrap_or_else(|| {
            Err(Failure::new(
                FailureKind::QueryFailure,
                format!("{} exited without completing", id),
            ))
        })
    }
}
