use keel::{Error, PersistentQueue};
use tempfile::tempdir;

#[test]
fn fresh_empty_queue_error_taxonomy() {
    let dir = tempdir().expect("tempdir");
    let queue = PersistentQueue::open(dir.path().join("queue.db")).expect("open");

    // remove_at on an empty queue is an error, not a sentinel.
    assert!(matches!(queue.remove_at(1), Err(Error::EmptyQueue)));

    // dequeue and peek treat emptiness as a normal outcome.
    assert_eq!(queue.dequeue().expect("dequeue"), None);
    assert_eq!(queue.peek().expect("peek"), None);

    // peek_at checks emptiness before bounds: sentinel for any position.
    assert_eq!(queue.peek_at(1).expect("peek_at"), None);
    assert_eq!(queue.peek_at(1000).expect("peek_at"), None);
}

#[test]
fn peek_at_rejects_positions_past_the_tail() {
    let dir = tempdir().expect("tempdir");
    let queue = PersistentQueue::open(dir.path().join("queue.db")).expect("open");
    queue.enqueue("a").expect("enqueue");
    queue.enqueue("b").expect("enqueue");

    match queue.peek_at(5) {
        Err(Error::OutOfRange { position, size }) => {
            assert_eq!(position, 5);
            assert_eq!(size, 2);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

#[test]
fn zero_and_negative_positions_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let queue = PersistentQueue::open(dir.path().join("queue.db")).expect("open");
    queue.enqueue("a").expect("enqueue");

    assert!(matches!(queue.peek_at(0), Err(Error::OutOfRange { .. })));
    assert!(matches!(queue.peek_at(-1), Err(Error::OutOfRange { .. })));
    assert!(matches!(
        queue.insert_at(0, "x"),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(
        queue.remove_at(-2),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn insert_allows_size_plus_one_but_no_further() {
    let dir = tempdir().expect("tempdir");
    let queue = PersistentQueue::open(dir.path().join("queue.db")).expect("open");
    queue.enqueue("a").expect("enqueue");

    queue.insert_at(2, "b").expect("size + 1 appends");
    assert!(matches!(
        queue.insert_at(4, "c"),
        Err(Error::OutOfRange { .. })
    ));
    assert_eq!(queue.size().expect("size"), 2);
}

#[test]
fn failed_validation_mutates_nothing() {
    let dir = tempdir().expect("tempdir");
    let queue = PersistentQueue::open(dir.path().join("queue.db")).expect("open");
    queue.enqueue("a").expect("enqueue");
    queue.enqueue("b").expect("enqueue");

    let _ = queue.insert_at(99, "x");
    let _ = queue.remove_at(99);
    let _ = queue.peek_at(99);

    assert_eq!(queue.size().expect("size"), 2);
    assert_eq!(queue.dequeue().expect("dequeue").as_deref(), Some("a"));
    assert_eq!(queue.dequeue().expect("dequeue").as_deref(), Some("b"));
}
