//! SQLite session owned by exactly one worker.
//!
//! A `Session` wraps a `rusqlite::Connection`. It is `Send` but not `Sync`:
//! it is opened on the thread that performs the I/O and dropped there.

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a session waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Access mode requested by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Access {
    fn flags(self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI;
        match self {
            Access::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            Access::ReadWrite => base | OpenFlags::SQLITE_OPEN_READ_WRITE,
        }
    }
}

pub struct Session {
    pub conn: Connection,
    path: PathBuf,
    access: Access,
}

impl Session {
    /// Open a session on an existing database file.
    ///
    /// The path is checked first; a missing file is `StorageUnavailable` and
    /// no connection is attempted. The file is never created here.
    pub fn open(path: &Path, access: Access) -> AppResult<Self> {
        if !path.is_file() {
            return Err(AppError::StorageUnavailable(format!(
                "Path to database is gone {}",
                path.display()
            )));
        }

        log::debug!("Will create db session to {} ({:?})", path.display(), access);

        let conn = Connection::open_with_flags(path, access.flags()).map_err(|e| {
            AppError::StorageUnavailable(format!("Cannot open {}: {}", path.display(), e))
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            access,
        })
    }

    /// Open (creating if needed) a read-write database. Used by `init` and by
    /// the migration runner, never by workers.
    pub fn create(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            access: Access::ReadWrite,
        })
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Close the connection explicitly so close errors are not lost in Drop.
    pub fn close(self) -> AppResult<()> {
        log::debug!("Closing db session to {}", self.path.display());
        self.conn.close().map_err(|(_, e)| AppError::Db(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.sqlite");

        let err = Session::open(&path, Access::ReadOnly).err().unwrap();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        // opening must not have created the file
        assert!(!path.exists());
    }

    #[test]
    fn read_only_session_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.sqlite");
        Session::create(&path)
            .unwrap()
            .conn
            .execute_batch("CREATE TABLE t (x INTEGER);")
            .unwrap();

        let session = Session::open(&path, Access::ReadOnly).unwrap();
        assert_eq!(session.access(), Access::ReadOnly);
        assert!(session.conn.execute("INSERT INTO t VALUES (1)", []).is_err());
        session.close().unwrap();
    }
}
