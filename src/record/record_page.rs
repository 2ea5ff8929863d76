//! Slotted-page view over one block of a heap file (spec.md §4.8). Slot `i`
//! starts at `i * slot_size`; the first 4 bytes of a slot are the in-use
//! flag (0 = empty, 1 = in-use).

use std::rc::Rc;

use crate::error::Result;
use crate::file::BlockId;
use crate::record::schema::FieldType;
use crate::tx::TxHandle;

use super::layout::Layout;

const EMPTY: i32 = 0;
const IN_USE: i32 = 1;

pub struct RecordPage {
    tx: TxHandle,
    blk: BlockId,
    layout: Rc<Layout>,
}

impl RecordPage {
    pub fn new(tx: TxHandle, blk: BlockId, layout: Rc<Layout>) -> Result<Self> {
        tx.borrow_mut().pin(&blk)?;
        Ok(Self { tx, blk, layout })
    }

    pub fn block(&self) -> &BlockId {
        &self.blk
    }

    fn offset(&self, slot: i32, field: &str) -> usize {
        slot as usize * self.layout.slot_size() + self.layout.offset(field)
    }

    fn flag_offset(&self, slot: i32) -> usize {
        slot as usize * self.layout.slot_size()
    }

    fn is_valid_slot(&self, slot: i32) -> bool {
        self.flag_offset(slot + 1) <= self.tx.borrow().block_size()
    }

    fn read_flag(&mut self, slot: i32) -> Result<i32> {
        self.tx.clone().borrow_mut().get_int(&self.blk, self.flag_offset(slot))
    }

    /// Writes the empty flag and a type-appropriate zero value into every
    /// slot of this block, without logging — used to bulk-initialize a
    /// freshly appended block.
    pub fn format(&mut self) -> Result<()> {
        let mut slot = 0;
        while self.is_valid_slot(slot) {
            let mut tx = self.tx.borrow_mut();
            tx.set_int(&self.blk, self.flag_offset(slot), EMPTY, false)?;
            let schema = self.layout.schema().clone();
            for name in schema.fields() {
                let off = self.offset(slot, name);
                match schema.field_type(name) {
                    FieldType::Integer => tx.set_int(&self.blk, off, 0, false)?,
                    FieldType::Short => tx.set_short(&self.blk, off, 0, false)?,
                    FieldType::Long => tx.set_long(&self.blk, off, 0, false)?,
                    FieldType::Boolean => tx.set_bool(&self.blk, off, false, false)?,
                    FieldType::Date => tx.set_date(&self.blk, off, 0, false)?,
                    FieldType::Varchar(_) => tx.set_string(&self.blk, off, "", false)?,
                }
            }
            slot += 1;
        }
        Ok(())
    }

    /// Next in-use slot after `slot`, or `-1` if none remains in this block.
    pub fn next_after(&mut self, slot: i32) -> Result<i32> {
        self.search_after(slot, IN_USE)
    }

    /// Next empty slot after `slot`, marked in-use, or `-1` if the block is
    /// full.
    pub fn insert_after(&mut self, slot: i32) -> Result<i32> {
        let new_slot = self.search_after(slot, EMPTY)?;
        if new_slot >= 0 {
            self.set_flag(new_slot, IN_USE)?;
        }
        Ok(new_slot)
    }

    pub fn delete(&mut self, slot: i32) -> Result<()> {
        self.set_flag(slot, EMPTY)
    }

    fn set_flag(&mut self, slot: i32, flag: i32) -> Result<()> {
        self.tx.clone().borrow_mut().set_int(&self.blk, self.flag_offset(slot), flag, true)
    }

    fn search_after(&mut self, mut slot: i32, flag: i32) -> Result<i32> {
        slot += 1;
        while self.is_valid_slot(slot) {
            if self.read_flag(slot)? == flag {
                return Ok(slot);
            }
            slot += 1;
        }
        Ok(-1)
    }

    pub fn get_int(&mut self, slot: i32, field: &str) -> Result<i32> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().get_int(&self.blk, off)
    }
    pub fn get_short(&mut self, slot: i32, field: &str) -> Result<i16> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().get_short(&self.blk, off)
    }
    pub fn get_long(&mut self, slot: i32, field: &str) -> Result<i64> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().get_long(&self.blk, off)
    }
    pub fn get_bool(&mut self, slot: i32, field: &str) -> Result<bool> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().get_bool(&self.blk, off)
    }
    pub fn get_date(&mut self, slot: i32, field: &str) -> Result<i64> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().get_date(&self.blk, off)
    }
    pub fn get_string(&mut self, slot: i32, field: &str) -> Result<String> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().get_string(&self.blk, off)
    }

    pub fn set_int(&mut self, slot: i32, field: &str, value: i32) -> Result<()> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().set_int(&self.blk, off, value, true)
    }
    pub fn set_short(&mut self, slot: i32, field: &str, value: i16) -> Result<()> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().set_short(&self.blk, off, value, true)
    }
    pub fn set_long(&mut self, slot: i32, field: &str, value: i64) -> Result<()> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().set_long(&self.blk, off, value, true)
    }
    pub fn set_bool(&mut self, slot: i32, field: &str, value: bool) -> Result<()> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().set_bool(&self.blk, off, value, true)
    }
    pub fn set_date(&mut self, slot: i32, field: &str, value: i64) -> Result<()> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().set_date(&self.blk, off, value, true)
    }
    pub fn set_string(&mut self, slot: i32, field: &str, value: &str) -> Result<()> {
        let off = self.offset(slot, field);
        self.tx.clone().borrow_mut().set_string(&self.blk, off, value, true)
    }
}

impl Drop for RecordPage {
    fn drop(&mut self) {
        self.tx.borrow_mut().unpin(&self.blk);
    }
}
