//! Undo-only crash recovery (spec.md §4.5). Every committed write is already
//! durable via the buffer manager's WAL discipline by the time `COMMIT`
//! is logged, so recovery never needs to redo anything — it only has to
//! walk the log backwards and restore old values for transactions that
//! never reached `COMMIT`/`ROLLBACK`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::buffer::BufferManager;
use crate::error::Result;
use crate::wal::{LogManager, LogRecord};

use super::TxId;

fn undo_record(bm: &BufferManager, owner: TxId, record: &LogRecord) -> Result<()> {
    match record {
        LogRecord::SetInt { blk, offset, old, .. } => {
            let idx = bm.pin(blk)?;
            bm.set_int(idx, *offset, *old, owner, -1);
            bm.unpin(idx);
        }
        LogRecord::SetShort { blk, offset, old, .. } => {
            let idx = bm.pin(blk)?;
            bm.set_short(idx, *offset, *old, owner, -1);
            bm.unpin(idx);
        }
        LogRecord::SetLong { blk, offset, old, .. } => {
            let idx = bm.pin(blk)?;
            bm.set_long(idx, *offset, *old, owner, -1);
            bm.unpin(idx);
        }
        LogRecord::SetString { blk, offset, old, .. } => {
            let idx = bm.pin(blk)?;
            bm.set_string(idx, *offset, old, owner, -1);
            bm.unpin(idx);
        }
        LogRecord::SetBool { blk, offset, old, .. } => {
            let idx = bm.pin(blk)?;
            bm.set_bool(idx, *offset, *old, owner, -1);
            bm.unpin(idx);
        }
        LogRecord::SetDate { blk, offset, old, .. } => {
            let idx = bm.pin(blk)?;
            bm.set_date(idx, *offset, *old, owner, -1);
            bm.unpin(idx);
        }
        LogRecord::Checkpoint | LogRecord::Start { .. } | LogRecord::Commit { .. } | LogRecord::Rollback { .. } => {}
    }
    Ok(())
}

/// One instance per transaction: logs `START` at construction, `COMMIT`/
/// `ROLLBACK` on the way out, and knows how to undo this transaction's own
/// writes.
pub struct RecoveryMgr {
    txnum: TxId,
    lm: Arc<Mutex<LogManager>>,
    bm: Arc<BufferManager>,
}

impl RecoveryMgr {
    pub fn new(txnum: TxId, lm: Arc<Mutex<LogManager>>, bm: Arc<BufferManager>) -> Result<Self> {
        lm.lock().unwrap().append(&LogRecord::Start { tx: txnum }.to_bytes())?;
        Ok(Self { txnum, lm, bm })
    }

    /// Flushes this transaction's own dirty buffers, then logs and flushes
    /// `COMMIT`. The buffer flush must happen first: once `COMMIT` is on
    /// disk the transaction is durable with or without its buffers.
    pub fn commit(&self) -> Result<()> {
        self.bm.flush_all(self.txnum)?;
        let mut lm = self.lm.lock().unwrap();
        let lsn = lm.append(&LogRecord::Commit { tx: self.txnum }.to_bytes())?;
        lm.flush(lsn)
    }

    /// Walks the log backwards from the tail, undoing every `SET_*` record
    /// belonging to this transaction until its own `START` record, then logs
    /// `ROLLBACK`.
    pub fn rollback(&self) -> Result<()> {
        {
            let mut lm = self.lm.lock().unwrap();
            let iter = lm.iterator()?;
            for rec in iter {
                let rec = rec?;
                let lr = LogRecord::from_bytes(&rec)?;
                if lr.tx_id() != Some(self.txnum) {
                    continue;
                }
                if matches!(lr, LogRecord::Start { .. }) {
                    break;
                }
                drop(lm);
                undo_record(&self.bm, self.txnum, &lr)?;
                lm = self.lm.lock().unwrap();
            }
        }
        self.bm.flush_all(self.txnum)?;
        let mut lm = self.lm.lock().unwrap();
        let lsn = lm.append(&LogRecord::Rollback { tx: self.txnum }.to_bytes())?;
        lm.flush(lsn)
    }

    /// Run once when the engine opens an existing database: undoes every
    /// `SET_*` record whose transaction never reached `COMMIT`/`ROLLBACK`,
    /// stopping at the most recent `CHECKPOINT` (everything before it is
    /// guaranteed flushed), then writes a fresh checkpoint.
    pub fn recover(bootstrap_tx: TxId, lm: Arc<Mutex<LogManager>>, bm: Arc<BufferManager>) -> Result<()> {
        let mut finished: HashSet<TxId> = HashSet::new();
        {
            let mut lm_guard = lm.lock().unwrap();
            let iter = lm_guard.iterator()?;
            for rec in iter {
                let rec = rec?;
                let lr = LogRecord::from_bytes(&rec)?;
                match &lr {
                    LogRecord::Checkpoint => break,
                    LogRecord::Commit { tx } | LogRecord::Rollback { tx } => {
                        finished.insert(*tx);
                    }
                    other => {
                        if let Some(tx) = other.tx_id() {
                            if !finished.contains(&tx) {
                                drop(lm_guard);
                                undo_record(&bm, bootstrap_tx, other)?;
                                lm_guard = lm.lock().unwrap();
                            }
                        }
                    }
                }
            }
        }
        bm.flush_all(bootstrap_tx)?;
        let mut lm = lm.lock().unwrap();
        let lsn = lm.append(&LogRecord::Checkpoint.to_bytes())?;
        lm.flush(lsn)
    }
}
