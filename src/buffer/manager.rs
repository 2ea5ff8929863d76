use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::warn;

use crate::error::{Error, Result};
use crate::file::{BlockId, FileManager};
use crate::tx::TxId;
use crate::wal::LogManager;

use super::buffer::Buffer;

struct Inner {
    buffers: Vec<Buffer>,
    num_available: usize,
}

/// A fixed pool of buffers created at init (spec.md §4.3). `pin` blocks on a
/// condition variable, up to `wait_timeout`, when every buffer is pinned;
/// exceeding the cap surfaces `Error::BufferAbort`, which the caller must
/// translate into a transaction abort.
pub struct BufferManager {
    fm: Arc<FileManager>,
    lm: Arc<Mutex<LogManager>>,
    inner: Mutex<Inner>,
    not_full: Condvar,
    wait_timeout: Duration,
}

impl BufferManager {
    pub fn new(fm: Arc<FileManager>, lm: Arc<Mutex<LogManager>>, pool_size: usize, wait_timeout: Duration) -> Self {
        let buffers = (0..pool_size).map(|_| Buffer::new(fm.block_size())).collect();
        Self {
            fm,
            lm,
            inner: Mutex::new(Inner {
                buffers,
                num_available: pool_size,
            }),
            not_full: Condvar::new(),
            wait_timeout,
        }
    }

    pub fn available(&self) -> usize {
        self.inner.lock().unwrap().num_available
    }

    pub fn pool_size(&self) -> usize {
        self.inner.lock().unwrap().buffers.len()
    }

    fn find_existing(buffers: &[Buffer], blk: &BlockId) -> Option<usize> {
        buffers.iter().position(|b| b.block() == Some(blk))
    }

    fn choose_unpinned(buffers: &[Buffer]) -> Option<usize> {
        buffers.iter().position(|b| !b.is_pinned())
    }

    /// Pins `blk`, blocking until a buffer is available or the wait cap
    /// expires. Returns the buffer's index in the pool.
    pub fn pin(&self, blk: &BlockId) -> Result<usize> {
        let deadline = Instant::now() + self.wait_timeout;
        let mut inner = self.inner.lock().unwrap();

        loop {
            if let Some(i) = Self::find_existing(&inner.buffers, blk) {
                if !inner.buffers[i].is_pinned() {
                    inner.num_available -= 1;
                }
                inner.buffers[i].pin();
                return Ok(i);
            }

            if let Some(i) = Self::choose_unpinned(&inner.buffers) {
                inner.buffers[i].assign_to_block(&self.fm, &self.lm, blk)?;
                inner.buffers[i].pin();
                inner.num_available -= 1;
                return Ok(i);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!("buffer pool exhausted, pin({}) timed out", blk);
                return Err(Error::BufferAbort);
            }
            let (guard, _) = self.not_full.wait_timeout(inner, remaining).unwrap();
            inner = guard;
        }
    }

    pub fn unpin(&self, idx: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffers[idx].unpin();
        if !inner.buffers[idx].is_pinned() {
            inner.num_available += 1;
            self.not_full.notify_all();
        }
    }

    pub fn block_of(&self, idx: usize) -> BlockId {
        self.inner.lock().unwrap().buffers[idx]
            .block()
            .expect("buffer index has no assigned block")
            .clone()
    }

    pub fn get_int(&self, idx: usize, offset: usize) -> i32 {
        self.inner.lock().unwrap().buffers[idx].contents().get_int(offset)
    }
    pub fn get_short(&self, idx: usize, offset: usize) -> i16 {
        self.inner.lock().unwrap().buffers[idx].contents().get_short(offset)
    }
    pub fn get_long(&self, idx: usize, offset: usize) -> i64 {
        self.inner.lock().unwrap().buffers[idx].contents().get_long(offset)
    }
    pub fn get_bool(&self, idx: usize, offset: usize) -> bool {
        self.inner.lock().unwrap().buffers[idx].contents().get_bool(offset)
    }
    pub fn get_date(&self, idx: usize, offset: usize) -> i64 {
        self.inner.lock().unwrap().buffers[idx].contents().get_date(offset)
    }
    pub fn get_string(&self, idx: usize, offset: usize) -> String {
        self.inner.lock().unwrap().buffers[idx].contents().get_string(offset)
    }

    pub fn set_int(&self, idx: usize, offset: usize, value: i32, tx: TxId, lsn: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffers[idx].contents_mut().set_int(offset, value);
        inner.buffers[idx].set_modified(tx, lsn);
    }
    pub fn set_short(&self, idx: usize, offset: usize, value: i16, tx: TxId, lsn: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffers[idx].contents_mut().set_short(offset, value);
        inner.buffers[idx].set_modified(tx, lsn);
    }
    pub fn set_long(&self, idx: usize, offset: usize, value: i64, tx: TxId, lsn: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffers[idx].contents_mut().set_long(offset, value);
        inner.buffers[idx].set_modified(tx, lsn);
    }
    pub fn set_bool(&self, idx: usize, offset: usize, value: bool, tx: TxId, lsn: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffers[idx].contents_mut().set_bool(offset, value);
        inner.buffers[idx].set_modified(tx, lsn);
    }
    pub fn set_date(&self, idx: usize, offset: usize, value: i64, tx: TxId, lsn: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffers[idx].contents_mut().set_date(offset, value);
        inner.buffers[idx].set_modified(tx, lsn);
    }
    pub fn set_string(&self, idx: usize, offset: usize, value: &str, tx: TxId, lsn: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.buffers[idx].contents_mut().set_string(offset, value);
        inner.buffers[idx].set_modified(tx, lsn);
    }

    /// Used only by recovery's "write old value back without re-logging"
    /// path: writes directly through a pinned buffer's page.
    pub fn write_raw(&self, idx: usize, write: impl FnOnce(&mut crate::file::Page)) {
        let mut inner = self.inner.lock().unwrap();
        write(inner.buffers[idx].contents_mut());
    }

    /// Flushes every buffer modified by `tx`, preserving WAL order.
    pub fn flush_all(&self, tx: TxId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        for buf in inner.buffers.iter_mut() {
            if buf.modifying_tx() == Some(tx) {
                buf.flush(&self.fm, &self.lm)?;
            }
        }
        Ok(())
    }
}
