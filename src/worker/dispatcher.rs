use super::{CancelToken, Operation, Worker};
use crate::errors::AppResult;
use crate::msg::{Event, EventKind, Failure, FailureKind, WorkerId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

const POLL: Duration = Duration::from_millis(50);

struct InFlight {
    thread: JoinHandle<()>,
    cancel: CancelToken,
}

/// Runs workers on background threads and funnels all of their events into
/// one channel, each tagged with the id of the worker that emitted it.
///
/// Events of one worker arrive in order. Events of different workers
/// interleave arbitrarily; callers that need "A settled before B" wait for
/// A's terminal event before dispatching B.
pub struct Dispatcher {
    path: PathBuf,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    in_flight: HashMap<WorkerId, InFlight>,
}

impl Dispatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            path: path.into(),
            tx,
            rx,
            in_flight: HashMap::new(),
        }
    }

    pub fn dispatch<O: Operation>(&mut self, op: O) -> AppResult<WorkerId> {
        let worker = Worker::new(op, self.path.clone());
        let id = worker.id();
        let cancel = worker.cancel_token();
        let thread = worker.spawn_into(self.tx.clone())?;

        log::debug!("dispatched {} ({})", id, O::NAME);
        self.in_flight.insert(id, InFlight { thread, cancel });
        Ok(id)
    }

    /// Ask a dispatched worker not to start. Returns false if it already
    /// finished.
    pub fn cancel(&self, id: WorkerId) -> bool {
        match self.in_flight.get(&id) {
            Some(w) => {
                w.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn reap(&mut self, id: WorkerId) {
        if let Some(w) = self.in_flight.remove(&id)
            && w.thread.join().is_err()
        {
            log::error!("{} panicked", id);
        }
    }

    fn deliver(&mut self, event: Event) -> Event {
        if event.kind.is_terminal() {
            self.reap(event.worker);
        }
        event
    }

    /// Next event from any worker. Blocks while workers are in flight and
    /// returns `None` once all of them have ended.
    ///
    /// A worker that dies without a terminal event is reported as `Failed`.
    pub fn recv(&mut self) -> Option<Event> {
        loop {
            if self.in_flight.is_empty() {
                return None;
            }

            match self.rx.recv_timeout(POLL) {
                Ok(event) => return Some(self.deliver(event)),
                Err(RecvTimeoutError::Disconnected) => return None,
                Err(RecvTimeoutError::Timeout) => {}
            }

            // Finished threads sent all their events before finishing, so
            // look for them first and only then check the channel again.
            let finished: Vec<WorkerId> = self
                .in_flight
                .iter()
                .filter(|(_, w)| w.thread.is_finished())
                .map(|(id, _)| *id)
                .collect();

            match self.rx.try_recv() {
                Ok(event) => return Some(self.deliver(event)),
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => {}
            }

            if let Some(id) = finished.into_iter().next() {
                self.reap(id);
                return Some(Event {
                    worker: id,
                    kind: EventKind::Failed(Failure::new(
                        FailureKind::QueryFailure,
                        format!("{} exited without completing", id),
                    )),
                });
            }
        }
    }

    /// Receive until every in-flight worker has ended.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        while let Some(event) = self.recv() {
            out.push(event);
        }
        out
    }
}
