//! Per-location instance lock.
//!
//! At most one live [`PersistentQueue`](crate::PersistentQueue) handle may
//! own a given database file: independent handles would each cache their own
//! first/last bookkeeping and race outside the engine's mutex. `open` takes
//! an exclusive non-blocking flock on a sidecar file next to the database
//! and holds it until the handle drops. flock conflicts between separate
//! file descriptors, so the guard covers a second open in this process as
//! well as one from another process.

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Held flock on `<db>.lock`. Closing the descriptor releases the lock.
#[derive(Debug)]
pub(crate) struct InstanceLock {
    _file: File,
}

impl InstanceLock {
    /// Acquires the lock for the database at `db_path`.
    ///
    /// Fails with [`Error::Locked`] when another live handle already owns
    /// the location.
    pub(crate) fn acquire(db_path: &Path) -> Result<InstanceLock> {
        let lock_path = sidecar_path(db_path);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&lock_path)?;
        if !try_flock(&file)? {
            return Err(Error::Locked(db_path.to_path_buf()));
        }
        Ok(InstanceLock { _file: file })
    }
}

fn sidecar_path(db_path: &Path) -> PathBuf {
    let mut name = db_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "queue".into());
    name.push(".lock");
    db_path.with_file_name(name)
}

fn try_flock(file: &File) -> Result<bool> {
    let res = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if res == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.kind() == std::io::ErrorKind::WouldBlock {
        return Ok(false);
    }
    Err(Error::Io(err))
}
