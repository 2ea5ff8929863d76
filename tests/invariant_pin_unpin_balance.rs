//! Invariant 8 (spec.md §8): pins and unpins balance over a committed
//! transaction's lifetime, and the pool's available count never drops below
//! zero or grows past its configured size.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use small_db::buffer::BufferManager;
use small_db::file::{BlockId, FileManager};
use small_db::wal::LogManager;

#[test]
fn pinning_and_unpinning_every_block_restores_full_availability() {
    let dir = common::fresh_dir("pin_balance");
    let fm = Arc::new(FileManager::new(&dir, 400).unwrap());
    let lm = Arc::new(Mutex::new(LogManager::new(fm.clone(), "t.log").unwrap()));
    let bm = BufferManager::new(fm.clone(), lm, 6, Duration::from_millis(300));

    assert_eq!(bm.available(), 6);

    let mut handles = Vec::new();
    for n in 0..6u64 {
        fm.append("data").unwrap();
        let blk = BlockId::new("data", n);
        handles.push(bm.pin(&blk).unwrap());
    }
    assert_eq!(bm.available(), 0);

    for idx in handles {
        bm.unpin(idx);
    }
    assert_eq!(bm.available(), 6);
}
