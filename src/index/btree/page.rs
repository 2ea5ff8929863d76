//! Physical page layout shared by B-tree directory and leaf blocks
//! (spec.md §4.9.2): an 8-byte flag, a 4-byte record count, then packed
//! slots of `layout.slot_size()` bytes each — no per-slot "in use" flag,
//! since entries are always kept contiguous from slot 0.
//!
//! Directory and leaf pages use different schemas (`block, dataval` vs
//! `block, id, dataval`) but the same physical operations, so one type
//! serves both; `btree::dir`/`btree::leaf` add the tree-walking logic on
//! top.

use std::rc::Rc;

use crate::file::BlockId;
use crate::error::Result;
use crate::record::{Layout, Value};
use crate::tx::TxHandle;

const FLAG_OFFSET: usize = 0;
const NUM_REC_OFFSET: usize = 8;
pub const HEADER_SIZE: usize = 12;

pub struct BTPage {
    tx: TxHandle,
    blk: BlockId,
    layout: Rc<Layout>,
}

impl BTPage {
    pub fn new(tx: TxHandle, blk: BlockId, layout: Rc<Layout>) -> Result<Self> {
        tx.borrow_mut().pin(&blk)?;
        Ok(Self { tx, blk, layout })
    }

    pub fn block(&self) -> &BlockId {
        &self.blk
    }

    /// Initializes a freshly appended block as an empty page at `flag`.
    pub fn format_new(&mut self, flag: i64) -> Result<()> {
        self.set_flag(flag)?;
        self.set_num_recs(0)
    }

    fn slot_pos(&self, slot: i32) -> usize {
        HEADER_SIZE + slot as usize * self.layout.slot_size()
    }

    fn field_offset(&self, slot: i32, field: &str) -> usize {
        self.slot_pos(slot) + self.layout.offset(field)
    }

    pub fn get_flag(&mut self) -> Result<i64> {
        self.tx.borrow_mut().get_long(&self.blk, FLAG_OFFSET)
    }
    pub fn set_flag(&mut self, flag: i64) -> Result<()> {
        self.tx.borrow_mut().set_long(&self.blk, FLAG_OFFSET, flag, true)
    }
    pub fn get_num_recs(&mut self) -> Result<i32> {
        self.tx.borrow_mut().get_int(&self.blk, NUM_REC_OFFSET)
    }
    fn set_num_recs(&mut self, n: i32) -> Result<()> {
        self.tx.borrow_mut().set_int(&self.blk, NUM_REC_OFFSET, n, true)
    }

    pub fn is_full(&mut self) -> Result<bool> {
        let n = self.get_num_recs()?;
        Ok(self.slot_pos(n + 1) > self.tx.borrow().block_size())
    }

    pub fn get_data_val(&mut self, slot: i32) -> Result<Value> {
        self.get_field_val(slot, "dataval")
    }

    pub fn get_child_num(&mut self, slot: i32) -> Result<u64> {
        let off = self.field_offset(slot, "block");
        Ok(self.tx.borrow_mut().get_long(&self.blk, off)? as u64)
    }

    /// Reads the leaf-only "id" field (the heap slot number half of a RID).
    pub fn get_id_field(&mut self, slot: i32) -> Result<i32> {
        let off = self.field_offset(slot, "id");
        self.tx.borrow_mut().get_int(&self.blk, off)
    }

    fn get_field_val(&mut self, slot: i32, field: &str) -> Result<Value> {
        if field == "id" {
            let off = self.field_offset(slot, field);
            return Ok(Value::Int(self.tx.borrow_mut().get_int(&self.blk, off)?));
        }
        if field == "block" {
            return Ok(Value::Long(self.get_child_num(slot)? as i64));
        }
        let off = self.field_offset(slot, field);
        let ftype = self.layout.schema().field_type(field);
        let mut tx = self.tx.borrow_mut();
        Ok(match ftype {
            crate::record::FieldType::Integer => Value::Int(tx.get_int(&self.blk, off)?),
            crate::record::FieldType::Short => Value::Short(tx.get_short(&self.blk, off)?),
            crate::record::FieldType::Long => Value::Long(tx.get_long(&self.blk, off)?),
            crate::record::FieldType::Varchar(_) => Value::Varchar(tx.get_string(&self.blk, off)?),
            crate::record::FieldType::Boolean => Value::Boolean(tx.get_bool(&self.blk, off)?),
            crate::record::FieldType::Date => Value::Date(tx.get_date(&self.blk, off)?),
        })
    }

    fn set_field_val(&mut self, slot: i32, field: &str, val: Value) -> Result<()> {
        let off = self.field_offset(slot, field);
        let mut tx = self.tx.borrow_mut();
        match val {
            Value::Int(v) => tx.set_int(&self.blk, off, v, true),
            Value::Short(v) => tx.set_short(&self.blk, off, v, true),
            Value::Long(v) => tx.set_long(&self.blk, off, v, true),
            Value::Varchar(v) => tx.set_string(&self.blk, off, &v, true),
            Value::Boolean(v) => tx.set_bool(&self.blk, off, v, true),
            Value::Date(v) => tx.set_date(&self.blk, off, v, true),
        }
    }

    /// Last slot whose key is strictly less than `search_key`, or `-1` if
    /// every entry is `>= search_key` (or the page is empty).
    pub fn find_slot_before(&mut self, search_key: &Value) -> Result<i32> {
        let n = self.get_num_recs()?;
        let mut slot = 0;
        while slot < n && self.get_data_val(slot)? < *search_key {
            slot += 1;
        }
        Ok(slot - 1)
    }

    fn field_names(&self) -> Vec<String> {
        self.layout.schema().fields().to_vec()
    }

    fn copy_record(&mut self, from: i32, to: i32) -> Result<()> {
        for field in self.field_names() {
            let v = self.get_field_val(from, &field)?;
            self.set_field_val(to, &field, v)?;
        }
        Ok(())
    }

    fn insert_slot(&mut self, slot: i32) -> Result<()> {
        let n = self.get_num_recs()?;
        let mut i = n;
        while i > slot {
            self.copy_record(i - 1, i)?;
            i -= 1;
        }
        self.set_num_recs(n + 1)
    }

    pub fn insert_leaf(&mut self, slot: i32, val: &Value, block_num: u64, id: i32) -> Result<()> {
        self.insert_slot(slot)?;
        self.set_field_val(slot, "block", Value::Long(block_num as i64))?;
        self.set_field_val(slot, "id", Value::Int(id))?;
        self.set_field_val(slot, "dataval", val.clone())
    }

    pub fn insert_dir(&mut self, slot: i32, val: &Value, child_block: u64) -> Result<()> {
        self.insert_slot(slot)?;
        self.set_field_val(slot, "block", Value::Long(child_block as i64))?;
        self.set_field_val(slot, "dataval", val.clone())
    }

    pub fn delete_slot(&mut self, slot: i32) -> Result<()> {
        let n = self.get_num_recs()?;
        for i in (slot + 1)..n {
            self.copy_record(i, i - 1)?;
        }
        self.set_num_recs(n - 1)
    }

    /// Appends a new block, moves every slot from `split_pos` onward into
    /// it, and leaves this page holding just `[0, split_pos)`. The new
    /// block's flag is set to `flag`.
    pub fn split(&mut self, split_pos: i32, flag: i64) -> Result<BlockId> {
        let filename = self.blk.filename().to_string();
        let new_blk = self.tx.borrow_mut().append(&filename)?;
        let mut new_page = BTPage::new(self.tx.clone(), new_blk.clone(), self.layout.clone())?;
        new_page.format_new(flag)?;

        let n = self.get_num_recs()?;
        let mut dest = 0;
        for src in split_pos..n {
            for field in self.field_names() {
                let v = self.get_field_val(src, &field)?;
                new_page.set_field_val(dest, &field, v)?;
            }
            dest += 1;
        }
        new_page.set_num_recs(dest)?;
        self.set_num_recs(split_pos)?;
        Ok(new_blk)
    }
}

impl Drop for BTPage {
    fn drop(&mut self) {
        self.tx.borrow_mut().unpin(&self.blk);
    }
}
