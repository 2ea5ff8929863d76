//! Directory pages: internal nodes of the B-tree, routing a search key down
//! to the leaf block that may hold it (spec.md §4.9.2). The root is always
//! block 0 of the directory file; a root split copies the old root's
//! contents aside and reformats block 0 in place rather than moving the
//! root pointer.

use std::rc::Rc;

use crate::error::Result;
use crate::file::BlockId;
use crate::record::{Layout, Value};
use crate::tx::TxHandle;

use super::dir_entry::DirEntry;
use super::page::BTPage;

pub struct BTreeDir {
    tx: TxHandle,
    filename: String,
    layout: Rc<Layout>,
    contents: BTPage,
}

impl BTreeDir {
    pub fn new(tx: TxHandle, filename: &str, layout: Rc<Layout>, blk: BlockId) -> Result<Self> {
        let contents = BTPage::new(tx.clone(), blk, layout.clone())?;
        Ok(Self {
            tx,
            filename: filename.to_string(),
            layout,
            contents,
        })
    }

    fn find_child_block(&mut self, search_key: &Value) -> Result<BlockId> {
        let mut slot = self.contents.find_slot_before(search_key)?;
        let n = self.contents.get_num_recs()?;
        if slot + 1 < n && self.contents.get_data_val(slot + 1)? == *search_key {
            slot += 1;
        }
        let block_num = if slot < 0 { self.contents.get_child_num(0)? } else { self.contents.get_child_num(slot)? };
        Ok(BlockId::new(self.filename.clone(), block_num))
    }

    /// Descends from this directory page to the leaf block that should
    /// contain `search_key`.
    pub fn search(&mut self, search_key: &Value) -> Result<BlockId> {
        let mut child_blk = self.find_child_block(search_key)?;
        while self.contents.get_flag()? > 0 {
            self.contents = BTPage::new(self.tx.clone(), child_blk.clone(), self.layout.clone())?;
            child_blk = self.find_child_block(search_key)?;
        }
        Ok(child_blk)
    }

    fn insert_entry(&mut self, entry: &DirEntry) -> Result<Option<DirEntry>> {
        let new_slot = self.contents.find_slot_before(&entry.key)? + 1;
        self.contents.insert_dir(new_slot, &entry.key, entry.block_num)?;
        if !self.contents.is_full()? {
            return Ok(None);
        }
        let level = self.contents.get_flag()?;
        let n = self.contents.get_num_recs()?;
        let split_pos = n / 2;
        let split_val = self.contents.get_data_val(split_pos)?;
        let new_blk = self.contents.split(split_pos, level)?;
        Ok(Some(DirEntry::new(split_val, new_blk.number())))
    }

    /// Inserts a split entry bubbled up from a child, recursing down first
    /// if this page is not yet a leaf-pointing (level 0) directory page.
    pub fn insert(&mut self, entry: &DirEntry) -> Result<Option<DirEntry>> {
        if self.contents.get_flag()? == 0 {
            return self.insert_entry(entry);
        }
        let child_blk = self.find_child_block(&entry.key)?;
        let mut child = BTreeDir::new(self.tx.clone(), &self.filename, self.layout.clone(), child_blk)?;
        let bubbled = child.insert(entry)?;
        drop(child);
        match bubbled {
            None => Ok(None),
            Some(e) => self.insert_entry(&e),
        }
    }

    /// Copies the current root's contents into a fresh block, then
    /// reformats block 0 as a two-entry directory page one level higher:
    /// one entry pointing at the copied-old-root block, one at `entry`.
    pub fn make_new_root(tx: TxHandle, filename: &str, layout: Rc<Layout>, entry: &DirEntry) -> Result<()> {
        let root_blk = BlockId::new(filename.to_string(), 0);
        let mut root = BTPage::new(tx, root_blk, layout)?;
        let level = root.get_flag()?;
        let first_val = root.get_data_val(0)?;
        let new_blk = root.split(0, level)?;
        let old_root_entry = DirEntry::new(first_val, new_blk.number());
        root.insert_dir(0, &old_root_entry.key, old_root_entry.block_num)?;
        root.insert_dir(1, &entry.key, entry.block_num)?;
        root.set_flag(level + 1)?;
        Ok(())
    }
}
