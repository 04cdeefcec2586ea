//! Queue engine and public capability surface.
//!
//! # Design
//!
//! Items live in one SQLite table keyed by *physical position*, an integer
//! primary key that only ever advances over the queue's lifetime. Callers
//! address items by *logical position*, a 1-based index over the current
//! contents:
//!
//! ```text
//! logical    1      2      3            (what callers see)
//! physical   f      f+1    f+2          (f = first occupied position)
//! ```
//!
//! Whenever the queue is non-empty the occupied physical positions form one
//! unbroken range `[first, last]`; an empty queue is `first == last == 0`.
//! `size` and `is_empty` answer from the in-memory [`PositionIndex`] without
//! touching storage.
//!
//! Positional insert and remove renumber the affected records with a
//! two-phase shift: first move every record at or past the target far beyond
//! the tail (so no renumbered row can collide with the position primary key
//! mid-update), then, after the point insert/delete, pull them back to close
//! the range. Both phases plus the point mutation run in a single
//! transaction; a crash at any point rolls back to the pre-call record set,
//! and the index is rebuilt from a MIN/MAX query at the next open.
//!
//! # Example
//!
//! ```no_run
//! use keel::PersistentQueue;
//!
//! let queue = PersistentQueue::open("./queue.db")?;
//! queue.enqueue("first")?;
//! queue.enqueue("second")?;
//! queue.insert_at(2, "between")?;
//! assert_eq!(queue.dequeue()?.as_deref(), Some("first"));
//! assert_eq!(queue.peek()?.as_deref(), Some("between"));
//! # Ok::<(), keel::Error>(())
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use log::{debug, trace};
use rusqlite::Connection;

use crate::index::PositionIndex;
use crate::lock::InstanceLock;
use crate::store;
use crate::{Error, Result};

/// Durable FIFO queue with random-access read, insert, and remove by
/// 1-based logical position.
///
/// One handle per storage location; a second [`open`](Self::open) on the
/// same path fails with [`Error::Locked`] until the first handle drops.
/// Every operation serializes on a single internal mutex — the engine is
/// single-writer by design, and whole-surface exclusion is the entire
/// concurrency model.
pub struct PersistentQueue {
    inner: Mutex<Inner>,
}

struct Inner {
    conn: Connection,
    index: PositionIndex,
    /// Held until the handle drops; `None` for in-memory queues.
    _lock: Option<InstanceLock>,
}

impl PersistentQueue {
    /// Opens (creating if absent) the queue stored at `path`.
    ///
    /// Creates the table and index lazily, then rebuilds the position index
    /// from the persisted bounds. The path is the only recognized
    /// configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Locked`]: another live handle owns this location
    /// - [`Error::Io`]: the sidecar lock file could not be created
    /// - [`Error::Storage`]: the database could not be opened or bootstrapped
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let lock = InstanceLock::acquire(path)?;
        let conn = Connection::open(path)?;
        store::init_schema(&conn)?;
        let (min, max) = store::position_bounds(&conn)?;
        let index = PositionIndex::from_bounds(min, max);
        debug!(
            "opened queue at {} (first={}, last={}, size={})",
            path.display(),
            index.first(),
            index.last(),
            index.size()
        );
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                index,
                _lock: Some(lock),
            }),
        })
    }

    /// Opens a queue backed by an in-memory database.
    ///
    /// No durability and no instance lock; intended for tests and tooling.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        store::init_schema(&conn)?;
        let (min, max) = store::position_bounds(&conn)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                index: PositionIndex::from_bounds(min, max),
                _lock: None,
            }),
        })
    }

    /// Appends `item` at the tail.
    pub fn enqueue(&self, item: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let mut staged = inner.index;
        let position = staged.push_back();

        let tx = inner.conn.transaction()?;
        store::insert_record(&tx, position, item)?;
        tx.commit()?;

        inner.index = staged;
        Ok(())
    }

    /// Removes and returns the head item; `None` when the queue is empty.
    pub fn dequeue(&self) -> Result<Option<String>> {
        let mut inner = self.lock()?;
        if inner.index.is_empty() {
            return Ok(None);
        }

        let head = inner.index.first();
        let mut staged = inner.index;
        staged.pop_front();

        let tx = inner.conn.transaction()?;
        let value = store::value_at(&tx, head)?;
        let removed = store::delete_record(&tx, head)?;
        tx.commit()?;

        if removed {
            inner.index = staged;
        }
        Ok(value)
    }

    /// Returns the head item without removing it; `None` when empty.
    pub fn peek(&self) -> Result<Option<String>> {
        let inner = self.lock()?;
        if inner.index.is_empty() {
            return Ok(None);
        }
        Ok(store::value_at(&inner.conn, inner.index.first())?)
    }

    /// Returns the item at logical `position` without removing it.
    ///
    /// The emptiness check runs before the bounds check: on an empty queue
    /// every position returns `None` rather than failing.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] unless `1 <= position <= size` (non-empty
    /// queue only).
    pub fn peek_at(&self, position: i64) -> Result<Option<String>> {
        let inner = self.lock()?;
        if inner.index.is_empty() {
            return Ok(None);
        }
        let size = inner.index.size();
        if position < 1 || position as u64 > size {
            return Err(Error::OutOfRange { position, size });
        }
        Ok(store::value_at(&inner.conn, inner.index.physical(position))?)
    }

    /// Inserts `item` at logical `position`, pushing the items at `position`
    /// and after one place toward the tail.
    ///
    /// `position == size + 1` appends, equivalent to [`enqueue`](Self::enqueue).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] unless `1 <= position <= size + 1`. Validation
    /// runs before any storage access.
    pub fn insert_at(&self, position: i64, item: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let size = inner.index.size();
        if position < 1 || position as u64 > size + 1 {
            return Err(Error::OutOfRange { position, size });
        }

        let mut real = inner.index.physical(position);
        if real == 0 {
            // First insert into an empty queue: physical numbering starts
            // at 1. Only position 1 on an empty queue computes 0 here.
            real = 1;
        }
        // One more than the number of records at or after the insertion
        // point. Shifting up by this lands every moved row past the old
        // tail, clear of the slot about to be filled and of each other.
        let diff = inner.index.last() - real + 1;

        let mut staged = inner.index;
        staged.push_back();

        trace!("insert_at: position={position} real={real} diff={diff}");

        let tx = inner.conn.transaction()?;
        store::shift_at_or_after(&tx, real, diff)?;
        store::insert_record(&tx, real, item)?;
        // Pull the tail back to immediately after the new record.
        store::shift_after(&tx, real, -(diff - 1))?;
        tx.commit()?;

        inner.index = staged;
        Ok(())
    }

    /// Removes the item at logical `position`, pulling the items after it
    /// one place toward the head.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQueue`]: the queue holds zero elements (checked
    ///   before the bounds)
    /// - [`Error::OutOfRange`]: unless `1 <= position <= size`
    pub fn remove_at(&self, position: i64) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.index.is_empty() {
            return Err(Error::EmptyQueue);
        }
        let size = inner.index.size();
        if position < 1 || position as u64 > size {
            return Err(Error::OutOfRange { position, size });
        }

        let real = inner.index.physical(position);
        // Count of records strictly after the target.
        let diff = inner.index.last() - real;

        let mut staged = inner.index;
        staged.shrink_tail();

        trace!("remove_at: position={position} real={real} diff={diff}");

        let tx = inner.conn.transaction()?;
        store::shift_after(&tx, real, diff)?;
        store::delete_record(&tx, real)?;
        // Survivors come back one slot below where they started.
        store::shift_after(&tx, real, -(diff + 1))?;
        tx.commit()?;

        inner.index = staged;
        Ok(())
    }

    /// Number of items in the queue. O(1), no storage access.
    pub fn size(&self) -> Result<u64> {
        Ok(self.lock()?.index.size())
    }

    /// Whether the queue holds zero items. O(1), no storage access.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.index.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    /// Asserts the stored positions form exactly the contiguous range the
    /// index claims.
    #[cfg(test)]
    fn assert_contiguous(&self) {
        let inner = self.inner.lock().expect("lock");
        let mut stmt = inner
            .conn
            .prepare("SELECT position FROM queue ORDER BY position")
            .expect("prepare");
        let positions: Vec<i64> = stmt
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<rusqlite::Result<_>>()
            .expect("collect");

        if positions.is_empty() {
            assert_eq!(inner.index, PositionIndex::empty());
            return;
        }
        assert_eq!(positions[0], inner.index.first());
        assert_eq!(*positions.last().expect("last"), inner.index.last());
        for (offset, position) in positions.iter().enumerate() {
            assert_eq!(*position, inner.index.first() + offset as i64);
        }
    }
}
