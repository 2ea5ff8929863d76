use std::collections::HashMap;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use log::warn;

use crate::error::{Error, Result};
use crate::file::BlockId;

const EXCLUSIVE: i32 = -1;

/// Shared lock state for every block any transaction currently holds a lock
/// on. A missing entry means unlocked; a positive count is that many shared
/// locks; [`EXCLUSIVE`] is one exclusive lock.
///
/// This is the block-granularity table from spec.md §4.4; callers that want
/// file-level locking pass the sentinel block `(file, EOF_BLOCK_NUM)`.
pub struct LockTable {
    state: Mutex<HashMap<BlockId, i32>>,
    cond: Condvar,
    wait_timeout: Duration,
}

impl LockTable {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            cond: Condvar::new(),
            wait_timeout,
        }
    }

    fn lock_val(map: &HashMap<BlockId, i32>, blk: &BlockId) -> i32 {
        *map.get(blk).unwrap_or(&0)
    }

    fn has_xlock(map: &HashMap<BlockId, i32>, blk: &BlockId) -> bool {
        Self::lock_val(map, blk) == EXCLUSIVE
    }

    fn has_other_s_locks(map: &HashMap<BlockId, i32>, blk: &BlockId) -> bool {
        Self::lock_val(map, blk) > 1
    }

    /// Blocks until no transaction holds an exclusive lock on `blk`, then
    /// records one more shared lock.
    pub fn s_lock(&self, blk: &BlockId) -> Result<()> {
        let deadline = Instant::now() + self.wait_timeout;
        let mut map = self.state.lock().unwrap();
        while Self::has_xlock(&map, blk) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!("s_lock({}) timed out", blk);
                return Err(Error::LockAbort);
            }
            let (guard, _) = self.cond.wait_timeout(map, remaining).unwrap();
            map = guard;
        }
        let val = Self::lock_val(&map, blk);
        map.insert(blk.clone(), val + 1);
        Ok(())
    }

    /// Blocks until no *other* transaction holds a shared or exclusive lock
    /// on `blk`, then marks it exclusive. Called after the caller already
    /// holds its own shared lock to perform an upgrade, or directly when it
    /// holds nothing yet.
    pub fn x_lock(&self, blk: &BlockId) -> Result<()> {
        let deadline = Instant::now() + self.wait_timeout;
        let mut map = self.state.lock().unwrap();
        while Self::has_other_s_locks(&map, blk) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!("x_lock({}) timed out", blk);
                return Err(Error::LockAbort);
            }
            let (guard, _) = self.cond.wait_timeout(map, remaining).unwrap();
            map = guard;
        }
        map.insert(blk.clone(), EXCLUSIVE);
        Ok(())
    }

    pub fn unlock(&self, blk: &BlockId) {
        let mut map = self.state.lock().unwrap();
        let val = Self::lock_val(&map, blk);
        if val > 1 {
            map.insert(blk.clone(), val - 1);
        } else {
            map.remove(blk);
            self.cond.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn shared_locks_on_the_same_block_do_not_block_each_other() {
        let table = LockTable::new(Duration::from_millis(200));
        let blk = BlockId::new("t.tbl", 0);
        table.s_lock(&blk).unwrap();
        table.s_lock(&blk).unwrap();
        table.unlock(&blk);
        table.unlock(&blk);
    }

    #[test]
    fn exclusive_lock_blocks_a_concurrent_shared_request() {
        let table = Arc::new(LockTable::new(Duration::from_millis(100)));
        let blk = BlockId::new("t.tbl", 0);
        table.x_lock(&blk).unwrap();

        let t2 = table.clone();
        let blk2 = blk.clone();
        let handle = thread::spawn(move || t2.s_lock(&blk2));

        let result = handle.join().unwrap();
        assert!(matches!(result, Err(Error::LockAbort)));
    }

    #[test]
    fn unlock_releases_the_block_for_new_requests() {
        let table = LockTable::new(Duration::from_millis(200));
        let blk = BlockId::new("t.tbl", 0);
        table.x_lock(&blk).unwrap();
        table.unlock(&blk);
        table.x_lock(&blk).unwrap();
    }
}
