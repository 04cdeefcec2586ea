use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Logical position outside the valid bounds of the attempted operation.
    #[error("position {position} out of range for queue of size {size}")]
    OutOfRange { position: i64, size: u64 },

    /// `remove_at` was called on a queue holding zero elements.
    #[error("queue is empty")]
    EmptyQueue,

    /// The backing query or transaction could not complete. Surfaced
    /// unchanged; the engine never retries on its own.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Another live handle already owns this storage location.
    #[error("queue at {} is held by another live handle", .0.display())]
    Locked(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine mutex was poisoned by a panicked operation.
    #[error("queue lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
