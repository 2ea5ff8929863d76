//! Leaf pages: hold the actual `(dataval, rid)` entries for one key range,
//! chained into an overflow list when a key has too many duplicates to fit
//! a single block (spec.md §4.9.2).

use std::rc::Rc;

use crate::error::Result;
use crate::file::BlockId;
use crate::record::{Layout, Rid, Value};
use crate::tx::TxHandle;

use super::dir_entry::DirEntry;
use super::page::BTPage;

pub struct BTreeLeaf {
    tx: TxHandle,
    filename: String,
    layout: Rc<Layout>,
    search_key: Value,
    contents: BTPage,
    current_slot: i32,
}

impl BTreeLeaf {
    pub fn new(tx: TxHandle, filename: &str, layout: Rc<Layout>, blk: BlockId, search_key: Value) -> Result<Self> {
        let mut contents = BTPage::new(tx.clone(), blk, layout.clone())?;
        let current_slot = contents.find_slot_before(&search_key)?;
        Ok(Self {
            tx,
            filename: filename.to_string(),
            layout,
            search_key,
            contents,
            current_slot,
        })
    }

    /// Advances to the next entry equal to the search key, hopping into an
    /// overflow chain if this block is exhausted but declares one.
    pub fn next(&mut self) -> Result<bool> {
        self.current_slot += 1;
        if self.current_slot >= self.contents.get_num_recs()? {
            return self.try_overflow();
        }
        if self.contents.get_data_val(self.current_slot)? != self.search_key {
            return self.try_overflow();
        }
        Ok(true)
    }

    fn try_overflow(&mut self) -> Result<bool> {
        if self.contents.get_num_recs()? == 0 {
            return Ok(false);
        }
        let first_key = self.contents.get_data_val(0)?;
        let flag = self.contents.get_flag()?;
        if flag < 0 || first_key != self.search_key {
            return Ok(false);
        }
        let overflow_blk = BlockId::new(self.filename.clone(), flag as u64);
        self.contents = BTPage::new(self.tx.clone(), overflow_blk, self.layout.clone())?;
        self.current_slot = 0;
        Ok(true)
    }

    pub fn get_data_rid(&mut self) -> Result<Rid> {
        let block_num = self.contents.get_child_num(self.current_slot)?;
        let slot = self.contents.get_id_field(self.current_slot)?;
        Ok(Rid::new(block_num, slot))
    }

    pub fn delete(&mut self, rid: Rid) -> Result<()> {
        while self.next()? {
            if self.get_data_rid()? == rid {
                self.contents.delete_slot(self.current_slot)?;
                return Ok(());
            }
        }
        Ok(())
    }

    /// Inserts `rid` under the leaf's search key, splitting (or chaining
    /// into an overflow block) if the page is now full. Returns a
    /// `DirEntry` for the parent directory only when a structural split
    /// happened (never for an overflow chain).
    pub fn insert(&mut self, rid: Rid) -> Result<Option<DirEntry>> {
        if self.contents.get_flag()? >= 0 && self.contents.get_num_recs()? > 0 {
            let first_val = self.contents.get_data_val(0)?;
            if first_val > self.search_key {
                let flag = self.contents.get_flag()?;
                let new_blk = self.contents.split(0, flag)?;
                self.current_slot = 0;
                self.contents.set_flag(-1)?;
                self.contents.insert_leaf(self.current_slot, &self.search_key, rid.block_num(), rid.slot())?;
                return Ok(Some(DirEntry::new(first_val, new_blk.number())));
            }
        }

        self.current_slot += 1;
        self.contents.insert_leaf(self.current_slot, &self.search_key, rid.block_num(), rid.slot())?;
        if !self.contents.is_full()? {
            return Ok(None);
        }

        let n = self.contents.get_num_recs()?;
        let mut split_pos = n / 2;
        let split_key = self.contents.get_data_val(split_pos)?;
        if split_key == self.contents.get_data_val(0)? {
            let mut right_end = split_pos + 1;
            while right_end < n && self.contents.get_data_val(right_end)? == split_key {
                right_end += 1;
            }
            let flag = self.contents.get_flag()?;
            let new_blk = self.contents.split(right_end, flag)?;
            self.contents.set_flag(new_blk.number() as i64)?;
            Ok(None)
        } else {
            while split_pos > 0 && self.contents.get_data_val(split_pos - 1)? == split_key {
                split_pos -= 1;
            }
            let new_blk = self.contents.split(split_pos, -1)?;
            Ok(Some(DirEntry::new(split_key, new_blk.number())))
        }
    }
}
