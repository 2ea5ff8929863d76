//! Invariant 7 (spec.md §8): shared locks on one block are compatible with
//! each other but mutually exclusive with an exclusive lock.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use small_db::concurrency::LockTable;
use small_db::file::BlockId;

#[test]
fn two_shared_locks_coexist_but_an_exclusive_lock_waits_them_out() {
    let lt = Arc::new(LockTable::new(Duration::from_millis(200)));
    let blk = BlockId::new("f", 0);

    lt.s_lock(&blk).unwrap();
    lt.s_lock(&blk).unwrap();

    let lt2 = lt.clone();
    let blk2 = blk.clone();
    let x_attempt = thread::spawn(move || lt2.x_lock(&blk2));

    thread::sleep(Duration::from_millis(50));
    assert!(!x_attempt.is_finished(), "x_lock must wait while shared holders remain");

    lt.unlock(&blk);
    lt.unlock(&blk);

    assert!(x_attempt.join().unwrap().is_ok());
    lt.unlock(&blk);
}

#[test]
fn exclusive_lock_blocks_a_concurrent_shared_request_until_released() {
    let lt = Arc::new(LockTable::new(Duration::from_millis(200)));
    let blk = BlockId::new("f", 1);

    lt.x_lock(&blk).unwrap();

    let lt2 = lt.clone();
    let blk2 = blk.clone();
    let s_attempt = thread::spawn(move || lt2.s_lock(&blk2));

    thread::sleep(Duration::from_millis(50));
    assert!(!s_attempt.is_finished(), "s_lock must wait out the exclusive holder");

    lt.unlock(&blk);
    assert!(s_attempt.join().unwrap().is_ok());
    lt.unlock(&blk);
}

#[test]
fn s_lock_past_the_wait_cap_aborts() {
    let lt = Arc::new(LockTable::new(Duration::from_millis(50)));
    let blk = BlockId::new("f", 2);

    lt.x_lock(&blk).unwrap();
    assert!(lt.s_lock(&blk).is_err());
    lt.unlock(&blk);
}
