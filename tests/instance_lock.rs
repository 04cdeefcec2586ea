use keel::{Error, PersistentQueue};
use tempfile::tempdir;

#[test]
fn second_open_of_same_location_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("queue.db");

    let first = PersistentQueue::open(&db).expect("first open");
    match PersistentQueue::open(&db) {
        Err(Error::Locked(path)) => assert_eq!(path, db),
        Err(other) => panic!("expected Locked, got {other:?}"),
        Ok(_) => panic!("second open unexpectedly succeeded"),
    }

    // Dropping the live handle releases the location.
    drop(first);
    PersistentQueue::open(&db).expect("reopen after drop");
}

#[test]
fn distinct_locations_open_independently() {
    let dir = tempdir().expect("tempdir");
    let a = PersistentQueue::open(dir.path().join("a.db")).expect("open a");
    let b = PersistentQueue::open(dir.path().join("b.db")).expect("open b");

    a.enqueue("for-a").expect("enqueue");
    b.enqueue("for-b").expect("enqueue");

    assert_eq!(a.dequeue().expect("dequeue").as_deref(), Some("for-a"));
    assert_eq!(b.dequeue().expect("dequeue").as_deref(), Some("for-b"));
}

#[test]
fn in_memory_queues_take_no_lock() {
    let a = PersistentQueue::open_in_memory().expect("first in-memory");
    let b = PersistentQueue::open_in_memory().expect("second in-memory");

    a.enqueue("a").expect("enqueue");
    assert!(b.is_empty().expect("is_empty"));
}
