//! Cursor over a heap file `<table>.tbl` (spec.md §4.8). The canonical
//! `UpdateScan`: every other update scan (index scans, the planner's
//! update paths) is ultimately a `TableScan` moved around by `Rid`.

use std::rc::Rc;

use crate::error::Result;
use crate::file::BlockId;
use crate::record::schema::FieldType;
use crate::record::value::Value;
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;

use super::layout::Layout;
use super::record_page::RecordPage;
use super::rid::Rid;

pub struct TableScan {
    tx: TxHandle,
    filename: String,
    layout: Rc<Layout>,
    rp: RecordPage,
    current_slot: i32,
}

impl TableScan {
    pub fn new(tx: TxHandle, table_name: &str, layout: Rc<Layout>) -> Result<Self> {
        let filename = format!("{}.tbl", table_name);
        let size = tx.borrow_mut().size(&filename)?;
        let rp = if size == 0 {
            let blk = tx.borrow_mut().append(&filename)?;
            let mut rp = RecordPage::new(tx.clone(), blk, layout.clone())?;
            rp.format()?;
            rp
        } else {
            RecordPage::new(tx.clone(), BlockId::new(filename.clone(), 0), layout.clone())?
        };
        Ok(Self {
            tx,
            filename,
            layout,
            rp,
            current_slot: -1,
        })
    }

    fn move_to_block(&mut self, block_num: u64) -> Result<()> {
        let blk = BlockId::new(self.filename.clone(), block_num);
        self.rp = RecordPage::new(self.tx.clone(), blk, self.layout.clone())?;
        self.current_slot = -1;
        Ok(())
    }

    fn move_to_new_block(&mut self) -> Result<()> {
        let blk = self.tx.borrow_mut().append(&self.filename)?;
        self.rp = RecordPage::new(self.tx.clone(), blk, self.layout.clone())?;
        self.rp.format()?;
        self.current_slot = -1;
        Ok(())
    }

    fn at_last_block(&mut self) -> Result<bool> {
        let size = self.tx.borrow_mut().size(&self.filename)?;
        Ok(self.rp.block().number() == size - 1)
    }

    fn field_name_check(&self, field: &str) {
        assert!(self.layout.schema().has_field(field), "unknown field '{}'", field);
    }
}

impl Scan for TableScan {
    fn before_first(&mut self) -> Result<()> {
        self.move_to_block(0)
    }

    fn next(&mut self) -> Result<bool> {
        loop {
            self.current_slot = self.rp.next_after(self.current_slot)?;
            if self.current_slot >= 0 {
                return Ok(true);
            }
            if self.at_last_block()? {
                return Ok(false);
            }
            let next_block = self.rp.block().number() + 1;
            self.move_to_block(next_block)?;
        }
    }

    fn get_int(&mut self, field: &str) -> Result<i32> {
        self.rp.get_int(self.current_slot, field)
    }
    fn get_short(&mut self, field: &str) -> Result<i16> {
        self.rp.get_short(self.current_slot, field)
    }
    fn get_long(&mut self, field: &str) -> Result<i64> {
        self.rp.get_long(self.current_slot, field)
    }
    fn get_string(&mut self, field: &str) -> Result<String> {
        self.rp.get_string(self.current_slot, field)
    }
    fn get_bool(&mut self, field: &str) -> Result<bool> {
        self.rp.get_bool(self.current_slot, field)
    }
    fn get_date(&mut self, field: &str) -> Result<i64> {
        self.rp.get_date(self.current_slot, field)
    }

    fn get_val(&mut self, field: &str) -> Result<Value> {
        self.field_name_check(field);
        Ok(match self.layout.schema().field_type(field) {
            FieldType::Integer => Value::Int(self.get_int(field)?),
            FieldType::Short => Value::Short(self.get_short(field)?),
            FieldType::Long => Value::Long(self.get_long(field)?),
            FieldType::Varchar(_) => Value::Varchar(self.get_string(field)?),
            FieldType::Boolean => Value::Boolean(self.get_bool(field)?),
            FieldType::Date => Value::Date(self.get_date(field)?),
        })
    }

    fn has_field(&self, field: &str) -> bool {
        self.layout.schema().has_field(field)
    }
}

impl UpdateScan for TableScan {
    fn set_int(&mut self, field: &str, value: i32) -> Result<()> {
        self.rp.set_int(self.current_slot, field, value)
    }
    fn set_short(&mut self, field: &str, value: i16) -> Result<()> {
        self.rp.set_short(self.current_slot, field, value)
    }
    fn set_long(&mut self, field: &str, value: i64) -> Result<()> {
        self.rp.set_long(self.current_slot, field, value)
    }
    fn set_string(&mut self, field: &str, value: &str) -> Result<()> {
        self.rp.set_string(self.current_slot, field, value)
    }
    fn set_bool(&mut self, field: &str, value: bool) -> Result<()> {
        self.rp.set_bool(self.current_slot, field, value)
    }
    fn set_date(&mut self, field: &str, value: i64) -> Result<()> {
        self.rp.set_date(self.current_slot, field, value)
    }

    fn set_val(&mut self, field: &str, value: Value) -> Result<()> {
        match value {
            Value::Int(v) => self.set_int(field, v),
            Value::Short(v) => self.set_short(field, v),
            Value::Long(v) => self.set_long(field, v),
            Value::Varchar(v) => self.set_string(field, &v),
            Value::Boolean(v) => self.set_bool(field, v),
            Value::Date(v) => self.set_date(field, v),
        }
    }

    fn insert(&mut self) -> Result<()> {
        loop {
            self.current_slot = self.rp.insert_after(self.current_slot)?;
            if self.current_slot >= 0 {
                return Ok(());
            }
            if self.at_last_block()? {
                self.move_to_new_block()?;
            } else {
                let next_block = self.rp.block().number() + 1;
                self.move_to_block(next_block)?;
            }
        }
    }

    fn delete(&mut self) -> Result<()> {
        self.rp.delete(self.current_slot)
    }

    fn get_record_id(&self) -> Rid {
        Rid::new(self.rp.block().number(), self.current_slot)
    }

    fn move_to_record_id(&mut self, rid: Rid) -> Result<()> {
        self.move_to_block(rid.block_num())?;
        self.current_slot = rid.slot();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::concurrency::LockTable;
    use crate::file::FileManager;
    use crate::record::schema::Schema;
    use crate::tx::Transaction;
    use crate::wal::LogManager;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn new_tx(tag: &str) -> TxHandle {
        let dir = crate::test_support::fresh_dir(tag);
        let fm = Arc::new(FileManager::new(&dir, 400).unwrap());
        let lm = Arc::new(Mutex::new(LogManager::new(fm.clone(), "t.log").unwrap()));
        let bm = Arc::new(BufferManager::new(fm.clone(), lm.clone(), 8, Duration::from_millis(300)));
        let lt = Arc::new(LockTable::new(Duration::from_millis(300)));
        Rc::new(RefCell::new(Transaction::new(fm, lm, bm, lt).unwrap()))
    }

    fn student_layout() -> Rc<Layout> {
        let mut schema = Schema::new();
        schema.add_string_field("sname", 10);
        schema.add_int_field("gradyear");
        Rc::new(Layout::from_schema(schema))
    }

    #[test]
    fn insert_then_scan_returns_every_row_once() {
        let tx = new_tx("tablescan_basic");
        let layout = student_layout();
        let mut ts = TableScan::new(tx.clone(), "student", layout).unwrap();

        for (name, year) in [("Alice", 2023), ("Bob", 2024), ("Charlie", 2025)] {
            ts.insert().unwrap();
            ts.set_string("sname", name).unwrap();
            ts.set_int("gradyear", year).unwrap();
        }

        ts.before_first().unwrap();
        let mut seen = Vec::new();
        while ts.next().unwrap() {
            seen.push((ts.get_string("sname").unwrap(), ts.get_int("gradyear").unwrap()));
        }
        assert_eq!(
            seen,
            vec![
                ("Alice".to_string(), 2023),
                ("Bob".to_string(), 2024),
                ("Charlie".to_string(), 2025),
            ]
        );
    }

    #[test]
    fn delete_then_reinsert_reuses_the_freed_slot() {
        let tx = new_tx("tablescan_delete");
        let layout = student_layout();
        let mut ts = TableScan::new(tx, "student", layout).unwrap();

        ts.insert().unwrap();
        ts.set_int("gradyear", 1).unwrap();
        let rid = ts.get_record_id();
        ts.insert().unwrap();
        ts.set_int("gradyear", 2).unwrap();

        ts.move_to_record_id(rid).unwrap();
        ts.delete().unwrap();

        ts.insert().unwrap();
        ts.set_int("gradyear", 3).unwrap();
        assert_eq!(ts.get_record_id(), rid);
    }

    #[test]
    fn spans_multiple_blocks_when_a_block_fills_up() {
        let tx = new_tx("tablescan_multiblock");
        let layout = student_layout();
        let mut ts = TableScan::new(tx, "student", layout).unwrap();

        let mut count = 0;
        for i in 0..200 {
            ts.insert().unwrap();
            ts.set_int("gradyear", i).unwrap();
            count += 1;
        }

        ts.before_first().unwrap();
        let mut seen = 0;
        while ts.next().unwrap() {
            seen += 1;
        }
        assert_eq!(seen, count);
    }
}
