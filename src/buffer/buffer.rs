use std::sync::Mutex;

use crate::error::Result;
use crate::file::{BlockId, FileManager, Page};
use crate::tx::TxId;
use crate::wal::LogManager;

/// Wraps one page currently assigned to zero-or-one block (spec.md §3).
pub struct Buffer {
    page: Page,
    blk: Option<BlockId>,
    pins: i32,
    modifying_tx: Option<TxId>,
    lsn: i64,
}

impl Buffer {
    pub fn new(block_size: usize) -> Self {
        Self {
            page: Page::new(block_size),
            blk: None,
            pins: 0,
            modifying_tx: None,
            lsn: -1,
        }
    }

    pub fn block(&self) -> Option<&BlockId> {
        self.blk.as_ref()
    }

    pub fn is_pinned(&self) -> bool {
        self.pins > 0
    }

    pub fn modifying_tx(&self) -> Option<TxId> {
        self.modifying_tx
    }

    pub fn contents(&self) -> &Page {
        &self.page
    }

    pub fn contents_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn set_modified(&mut self, tx: TxId, lsn: i64) {
        self.modifying_tx = Some(tx);
        if lsn >= 0 {
            self.lsn = lsn;
        }
    }

    pub fn pin(&mut self) {
        self.pins += 1;
    }

    pub fn unpin(&mut self) {
        self.pins -= 1;
    }

    /// WAL discipline: flush the log up to this buffer's lsn *before*
    /// writing the data page to disk.
    pub fn flush(&mut self, fm: &FileManager, lm: &Mutex<LogManager>) -> Result<()> {
        if self.modifying_tx.is_some() {
            lm.lock().unwrap().flush(self.lsn)?;
            if let Some(blk) = &self.blk {
                fm.write(blk, &self.page)?;
            }
            self.modifying_tx = None;
        }
        Ok(())
    }

    pub fn assign_to_block(
        &mut self,
        fm: &FileManager,
        lm: &Mutex<LogManager>,
        blk: &BlockId,
    ) -> Result<()> {
        self.flush(fm, lm)?;
        let mut page = Page::new(fm.block_size());
        fm.read(blk, &mut page)?;
        self.page = page;
        self.blk = Some(blk.clone());
        self.lsn = -1;
        Ok(())
    }
}
