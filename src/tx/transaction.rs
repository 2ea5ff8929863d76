use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::buffer::BufferManager;
use crate::concurrency::{ConcurrencyMgr, LockTable};
use crate::error::{Error, Result};
use crate::file::{BlockId, FileManager};
use crate::wal::{LogManager, LogRecord};

use super::recovery::RecoveryMgr;
use super::TxId;

static NEXT_TX_NUM: AtomicU64 = AtomicU64::new(1);

/// Tracks every block this transaction currently holds pinned, with
/// reference counts, so repeated `pin` calls on a block it already holds
/// reuse the same buffer index instead of asking the pool again.
struct BufferList {
    buffers: HashMap<BlockId, usize>,
    pins: Vec<BlockId>,
}

impl BufferList {
    fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            pins: Vec::new(),
        }
    }

    fn get_buffer(&self, blk: &BlockId) -> Option<usize> {
        self.buffers.get(blk).copied()
    }

    fn pin(&mut self, bm: &BufferManager, blk: &BlockId) -> Result<usize> {
        let idx = bm.pin(blk)?;
        self.buffers.insert(blk.clone(), idx);
        self.pins.push(blk.clone());
        Ok(idx)
    }

    fn unpin(&mut self, bm: &BufferManager, blk: &BlockId) {
        if let Some(&idx) = self.buffers.get(blk) {
            bm.unpin(idx);
        }
        if let Some(pos) = self.pins.iter().position(|b| b == blk) {
            self.pins.remove(pos);
        }
        if !self.pins.contains(blk) {
            self.buffers.remove(blk);
        }
    }

    fn unpin_all(&mut self, bm: &BufferManager) {
        for blk in &self.pins {
            if let Some(&idx) = self.buffers.get(blk) {
                bm.unpin(idx);
            }
        }
        self.buffers.clear();
        self.pins.clear();
    }
}

/// One client-facing unit of work (spec.md §4.4/§4.5): owns a
/// [`ConcurrencyMgr`] for strict two-phase locking, a [`RecoveryMgr`] for
/// undo logging, and a private set of pinned buffers. Every storage access
/// an operator makes funnels through here, never through `BufferManager`
/// directly, so locking and logging stay attached to every read and write.
pub struct Transaction {
    txnum: TxId,
    fm: Arc<FileManager>,
    lm: Arc<Mutex<LogManager>>,
    bm: Arc<BufferManager>,
    concur: ConcurrencyMgr,
    recovery: RecoveryMgr,
    my_buffers: BufferList,
}

impl Transaction {
    pub fn new(
        fm: Arc<FileManager>,
        lm: Arc<Mutex<LogManager>>,
        bm: Arc<BufferManager>,
        lock_table: Arc<LockTable>,
    ) -> Result<Self> {
        let txnum = NEXT_TX_NUM.fetch_add(1, Ordering::SeqCst);
        let recovery = RecoveryMgr::new(txnum, lm.clone(), bm.clone())?;
        Ok(Self {
            txnum,
            fm,
            lm,
            bm,
            concur: ConcurrencyMgr::new(lock_table),
            recovery,
            my_buffers: BufferList::new(),
        })
    }

    pub fn tx_num(&self) -> TxId {
        self.txnum
    }

    pub fn block_size(&self) -> usize {
        self.fm.block_size()
    }

    pub fn available_buffers(&self) -> usize {
        self.bm.available()
    }

    /// Flushes this transaction's dirty buffers, logs `COMMIT`, releases
    /// every lock, and unpins every buffer it was holding. The transaction
    /// must not be used again afterwards.
    pub fn commit(&mut self) -> Result<()> {
        self.recovery.commit()?;
        self.concur.release();
        self.my_buffers.unpin_all(&self.bm);
        debug!("transaction {} committed", self.txnum);
        Ok(())
    }

    /// Undoes every write this transaction made, logs `ROLLBACK`, releases
    /// every lock, and unpins every buffer. The transaction must not be
    /// used again afterwards.
    pub fn rollback(&mut self) -> Result<()> {
        self.recovery.rollback()?;
        self.concur.release();
        self.my_buffers.unpin_all(&self.bm);
        debug!("transaction {} rolled back", self.txnum);
        Ok(())
    }

    pub fn pin(&mut self, blk: &BlockId) -> Result<()> {
        self.my_buffers.pin(&self.bm, blk)?;
        Ok(())
    }

    pub fn unpin(&mut self, blk: &BlockId) {
        self.my_buffers.unpin(&self.bm, blk);
    }

    fn buffer_of(&self, blk: &BlockId) -> Result<usize> {
        self.my_buffers
            .get_buffer(blk)
            .ok_or_else(|| Error::logic(format!("{} is not pinned by this transaction", blk)))
    }

    pub fn get_int(&mut self, blk: &BlockId, offset: usize) -> Result<i32> {
        self.concur.s_lock(blk)?;
        Ok(self.bm.get_int(self.buffer_of(blk)?, offset))
    }
    pub fn get_short(&mut self, blk: &BlockId, offset: usize) -> Result<i16> {
        self.concur.s_lock(blk)?;
        Ok(self.bm.get_short(self.buffer_of(blk)?, offset))
    }
    pub fn get_long(&mut self, blk: &BlockId, offset: usize) -> Result<i64> {
        self.concur.s_lock(blk)?;
        Ok(self.bm.get_long(self.buffer_of(blk)?, offset))
    }
    pub fn get_bool(&mut self, blk: &BlockId, offset: usize) -> Result<bool> {
        self.concur.s_lock(blk)?;
        Ok(self.bm.get_bool(self.buffer_of(blk)?, offset))
    }
    pub fn get_date(&mut self, blk: &BlockId, offset: usize) -> Result<i64> {
        self.concur.s_lock(blk)?;
        Ok(self.bm.get_date(self.buffer_of(blk)?, offset))
    }
    pub fn get_string(&mut self, blk: &BlockId, offset: usize) -> Result<String> {
        self.concur.s_lock(blk)?;
        Ok(self.bm.get_string(self.buffer_of(blk)?, offset))
    }

    /// `ok_to_log` is false only when recovery itself is writing an old
    /// value back; every client-visible write must log.
    pub fn set_int(&mut self, blk: &BlockId, offset: usize, value: i32, ok_to_log: bool) -> Result<()> {
        self.concur.x_lock(blk)?;
        let idx = self.buffer_of(blk)?;
        let lsn = if ok_to_log {
            let old = self.bm.get_int(idx, offset);
            self.lm.lock().unwrap().append(
                &LogRecord::SetInt { tx: self.txnum, blk: blk.clone(), offset, old }.to_bytes(),
            )?
        } else {
            -1
        };
        self.bm.set_int(idx, offset, value, self.txnum, lsn);
        Ok(())
    }

    pub fn set_short(&mut self, blk: &BlockId, offset: usize, value: i16, ok_to_log: bool) -> Result<()> {
        self.concur.x_lock(blk)?;
        let idx = self.buffer_of(blk)?;
        let lsn = if ok_to_log {
            let old = self.bm.get_short(idx, offset);
            self.lm.lock().unwrap().append(
                &LogRecord::SetShort { tx: self.txnum, blk: blk.clone(), offset, old }.to_bytes(),
            )?
        } else {
            -1
        };
        self.bm.set_short(idx, offset, value, self.txnum, lsn);
        Ok(())
    }

    pub fn set_long(&mut self, blk: &BlockId, offset: usize, value: i64, ok_to_log: bool) -> Result<()> {
        self.concur.x_lock(blk)?;
        let idx = self.buffer_of(blk)?;
        let lsn = if ok_to_log {
            let old = self.bm.get_long(idx, offset);
            self.lm.lock().unwrap().append(
                &LogRecord::SetLong { tx: self.txnum, blk: blk.clone(), offset, old }.to_bytes(),
            )?
        } else {
            -1
        };
        self.bm.set_long(idx, offset, value, self.txnum, lsn);
        Ok(())
    }

    pub fn set_bool(&mut self, blk: &BlockId, offset: usize, value: bool, ok_to_log: bool) -> Result<()> {
        self.concur.x_lock(blk)?;
        let idx = self.buffer_of(blk)?;
        let lsn = if ok_to_log {
            let old = self.bm.get_bool(idx, offset);
            self.lm.lock().unwrap().append(
                &LogRecord::SetBool { tx: self.txnum, blk: blk.clone(), offset, old }.to_bytes(),
            )?
        } else {
            -1
        };
        self.bm.set_bool(idx, offset, value, self.txnum, lsn);
        Ok(())
    }

    pub fn set_date(&mut self, blk: &BlockId, offset: usize, value: i64, ok_to_log: bool) -> Result<()> {
        self.concur.x_lock(blk)?;
        let idx = self.buffer_of(blk)?;
        let lsn = if ok_to_log {
            let old = self.bm.get_date(idx, offset);
            self.lm.lock().unwrap().append(
                &LogRecord::SetDate { tx: self.txnum, blk: blk.clone(), offset, old }.to_bytes(),
            )?
        } else {
            -1
        };
        self.bm.set_date(idx, offset, value, self.txnum, lsn);
        Ok(())
    }

    pub fn set_string(&mut self, blk: &BlockId, offset: usize, value: &str, ok_to_log: bool) -> Result<()> {
        self.concur.x_lock(blk)?;
        let idx = self.buffer_of(blk)?;
        let lsn = if ok_to_log {
            let old = self.bm.get_string(idx, offset);
            self.lm.lock().unwrap().append(
                &LogRecord::SetString { tx: self.txnum, blk: blk.clone(), offset, old }.to_bytes(),
            )?
        } else {
            -1
        };
        self.bm.set_string(idx, offset, value, self.txnum, lsn);
        Ok(())
    }

    /// Block count of `filename`, under a file-granularity shared lock.
    pub fn size(&mut self, filename: &str) -> Result<u64> {
        let dummy = BlockId::eof(filename);
        self.concur.s_lock(&dummy)?;
        self.fm.length(filename)
    }

    /// Appends a new block to `filename`, under a file-granularity
    /// exclusive lock so two transactions never extend a file at once.
    pub fn append(&mut self, filename: &str) -> Result<BlockId> {
        let dummy = BlockId::eof(filename);
        self.concur.x_lock(&dummy)?;
        self.fm.append(filename)
    }
}
