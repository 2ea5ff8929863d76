use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::file::{BlockId, FileManager, Page};

/// Owns one log file, one in-memory tail page, and the monotonically
/// increasing LSN counter (spec.md §4.2).
pub struct LogManager {
    fm: Arc<FileManager>,
    log_file: String,
    current_page: Page,
    current_blk: BlockId,
    latest_lsn: i64,
    last_saved_lsn: i64,
}

impl LogManager {
    pub fn new(fm: Arc<FileManager>, log_file: impl Into<String>) -> Result<Self> {
        let log_file = log_file.into();
        let block_size = fm.block_size();
        let num_blocks = fm.length(&log_file)?;

        let (current_blk, current_page) = if num_blocks == 0 {
            let blk = fm.append(&log_file)?;
            let mut page = Page::new(block_size);
            page.set_int(0, block_size as i32);
            fm.write(&blk, &page)?;
            (blk, page)
        } else {
            let blk = BlockId::new(&log_file, num_blocks - 1);
            let mut page = Page::new(block_size);
            fm.read(&blk, &mut page)?;
            (blk, page)
        };

        Ok(Self {
            fm,
            log_file,
            current_page,
            current_blk,
            latest_lsn: 0,
            last_saved_lsn: 0,
        })
    }

    /// Appends `record` right-to-left inside the current page, rolling to a
    /// new tail block when it doesn't fit. Returns the record's LSN.
    pub fn append(&mut self, record: &[u8]) -> Result<i64> {
        let block_size = self.fm.block_size();
        let mut boundary = self.current_page.get_int(0) as usize;
        let needed = record.len() + 4;

        if boundary < needed + 4 {
            self.flush_current_page()?;
            self.current_blk = self.fm.append(&self.log_file)?;
            self.current_page = Page::new(block_size);
            self.current_page.set_int(0, block_size as i32);
            boundary = block_size;

            if boundary < needed + 4 {
                return Err(Error::logic(format!(
                    "log record of {} bytes does not fit in a block of {} bytes",
                    record.len(),
                    block_size
                )));
            }
        }

        let new_boundary = boundary - needed;
        self.current_page.set_bytes(new_boundary, record);
        self.current_page.set_int(0, new_boundary as i32);

        self.latest_lsn += 1;
        debug!(
            "appended log record (lsn {}, {} bytes) to {}",
            self.latest_lsn,
            record.len(),
            self.current_blk
        );
        Ok(self.latest_lsn)
    }

    fn flush_current_page(&mut self) -> Result<()> {
        self.fm.write(&self.current_blk, &self.current_page)
    }

    /// Flushes the current page to disk if it might contain `lsn`.
    pub fn flush(&mut self, lsn: i64) -> Result<()> {
        if lsn >= self.last_saved_lsn {
            self.flush_current_page()?;
            self.last_saved_lsn = self.latest_lsn;
        }
        Ok(())
    }

    pub fn latest_lsn(&self) -> i64 {
        self.latest_lsn
    }

    /// Flushes, then returns an iterator over every record, newest first.
    pub fn iterator(&mut self) -> Result<LogIterator> {
        self.flush(self.latest_lsn)?;
        LogIterator::new(self.fm.clone(), self.log_file.clone(), self.current_blk.number())
    }
}

/// Walks the log newest-to-oldest: within a block from its boundary forward,
/// then to the previous block.
pub struct LogIterator {
    fm: Arc<FileManager>,
    filename: String,
    block_size: usize,
    current_blk: Option<BlockId>,
    page: Page,
    pos: usize,
}

impl LogIterator {
    fn new(fm: Arc<FileManager>, filename: String, tail_block_num: u64) -> Result<Self> {
        let block_size = fm.block_size();
        let blk = BlockId::new(&filename, tail_block_num);
        let mut page = Page::new(block_size);
        fm.read(&blk, &mut page)?;
        let pos = page.get_int(0) as usize;
        Ok(Self {
            fm,
            filename,
            block_size,
            current_blk: Some(blk),
            page,
            pos,
        })
    }

    fn load_block(&mut self, blk: BlockId) -> Result<()> {
        self.fm.read(&blk, &mut self.page)?;
        self.pos = self.page.get_int(0) as usize;
        self.current_blk = Some(blk);
        Ok(())
    }
}

impl Iterator for LogIterator {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let blk = self.current_blk.clone()?;
            if self.pos >= self.block_size {
                if blk.number() == 0 {
                    self.current_blk = None;
                    return None;
                }
                let prev = BlockId::new(&self.filename, blk.number() - 1);
                if let Err(e) = self.load_block(prev) {
                    return Some(Err(e));
                }
                continue;
            }

            let record = self.page.get_bytes(self.pos);
            self.pos += 4 + record.len();
            return Some(Ok(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::LogRecord;

    fn open(tag: &str) -> (Arc<FileManager>, LogManager) {
        let dir = crate::test_support::fresh_dir(tag);
        let fm = Arc::new(FileManager::new(&dir, 128).unwrap());
        let lm = LogManager::new(fm.clone(), "test.log").unwrap();
        (fm, lm)
    }

    #[test]
    fn iterator_returns_newest_first() {
        let (_fm, mut lm) = open("wal_order");
        for tx in [1u64, 2, 3] {
            let rec = LogRecord::Start { tx };
            lm.append(&rec.to_bytes()).unwrap();
        }

        let records: Vec<LogRecord> = lm
            .iterator()
            .unwrap()
            .map(|b| LogRecord::from_bytes(&b.unwrap()).unwrap())
            .collect();

        assert_eq!(
            records,
            vec![
                LogRecord::Start { tx: 3 },
                LogRecord::Start { tx: 2 },
                LogRecord::Start { tx: 1 },
            ]
        );
    }

    #[test]
    fn rolls_to_a_new_block_when_full() {
        let (fm, mut lm) = open("wal_roll");
        // Each record is ~30 bytes; with a 128-byte block this forces
        // several block rolls.
        for tx in 0..20u64 {
            lm.append(&LogRecord::Start { tx }.to_bytes()).unwrap();
        }
        assert!(fm.length("test.log").unwrap() > 1);

        let count = lm.iterator().unwrap().count();
        assert_eq!(count, 20);
    }
}
