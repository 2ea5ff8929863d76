use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::file::BlockId;

use super::lock_table::LockTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockKind {
    Shared,
    Exclusive,
}

/// Per-transaction view onto the shared [`LockTable`]: remembers which locks
/// this transaction already holds so repeat requests are free, and releases
/// all of them at once on commit/rollback (strict 2PL's "shrinking phase").
pub struct ConcurrencyMgr {
    table: Arc<LockTable>,
    locks: HashMap<BlockId, LockKind>,
}

impl ConcurrencyMgr {
    pub fn new(table: Arc<LockTable>) -> Self {
        Self {
            table,
            locks: HashMap::new(),
        }
    }

    pub fn s_lock(&mut self, blk: &BlockId) -> Result<()> {
        if self.locks.contains_key(blk) {
            return Ok(());
        }
        self.table.s_lock(blk)?;
        self.locks.insert(blk.clone(), LockKind::Shared);
        Ok(())
    }

    pub fn x_lock(&mut self, blk: &BlockId) -> Result<()> {
        if self.locks.get(blk) == Some(&LockKind::Exclusive) {
            return Ok(());
        }
        self.s_lock(blk)?;
        self.table.x_lock(blk)?;
        self.locks.insert(blk.clone(), LockKind::Exclusive);
        Ok(())
    }

    pub fn release(&mut self) {
        for blk in self.locks.keys() {
            self.table.unlock(blk);
        }
        self.locks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn repeated_requests_for_the_same_block_are_idempotent() {
        let table = Arc::new(LockTable::new(Duration::from_millis(100)));
        let blk = BlockId::new("t.tbl", 0);
        let mut mgr = ConcurrencyMgr::new(table);
        mgr.s_lock(&blk).unwrap();
        mgr.s_lock(&blk).unwrap();
        mgr.x_lock(&blk).unwrap();
        mgr.x_lock(&blk).unwrap();
        mgr.release();
    }

    #[test]
    fn release_frees_locks_for_other_transactions() {
        let table = Arc::new(LockTable::new(Duration::from_millis(100)));
        let blk = BlockId::new("t.tbl", 0);

        let mut mgr1 = ConcurrencyMgr::new(table.clone());
        mgr1.x_lock(&blk).unwrap();
        mgr1.release();

        let mut mgr2 = ConcurrencyMgr::new(table);
        mgr2.x_lock(&blk).unwrap();
    }
}
