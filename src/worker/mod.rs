//! Asynchronous units of data work.
//!
//! A worker owns exactly one storage session, opened lazily on the thread
//! that executes it. Results travel back over `std::sync::mpsc` channels as
//! tagged [`Event`](crate::msg::Event)s.

pub mod dispatcher;
pub mod operation;
pub mod runner;

pub use dispatcher::Dispatcher;
pub use operation::{Operation, Reader, Writer};
pub use runner::{CancelToken, Worker, WorkerHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::session::{Access, Session};
    use crate::msg::{EventKind, FailureKind, FetchResponse};

    struct Unspecialized;

    impl Operation for Unspecialized {
        type Output = FetchResponse;
        const NAME: &'static str = "unspecialized";
        const ACCESS: Access = Access::ReadOnly;
    }

    fn empty_db() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.sqlite");
        Session::create(&path).unwrap().close().unwrap();
        (dir, path)
    }

    #[test]
    fn session_is_not_opened_at_construction() {
        let (_dir, path) = empty_db();
        let mut worker = Worker::new(Unspecialized, &path);
        assert!(!worker.has_session());

        worker.create_session().unwrap();
        assert!(worker.has_session());
    }

    #[test]
    fn default_work_is_not_implemented() {
        let (_dir, path) = empty_db();
        let events = Worker::new(Unspecialized, &path).spawn().unwrap().collect();

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], EventKind::Started));
        match &events[1] {
            EventKind::Failed(f) => assert_eq!(f.kind, FailureKind::NotImplemented),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn cancelled_worker_never_starts() {
        let (_dir, path) = empty_db();
        let cancel = CancelToken::new();
        cancel.cancel();

        let events = Worker::new(Unspecialized, &path)
            .with_cancel(cancel)
            .spawn()
            .unwrap()
            .collect();

        assert_eq!(events.len(), 1);
        match &events[0] {
            EventKind::Failed(f) => assert_eq!(f.kind, FailureKind::Cancelled),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
