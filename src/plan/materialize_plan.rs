//! Copies a plan's output into a temp table (spec.md §4.12/§4.13). Used
//! directly as a cost-estimation helper and as the building block `SortPlan`
//! materializes its runs with.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::record::{Layout, Schema, TableScan};
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;

use super::Plan;

static TEMP_TABLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A fresh, process-unique temp table name (`temp1`, `temp2`, ...).
pub fn next_temp_table_name() -> String {
    let n = TEMP_TABLE_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("temp{}", n)
}

pub struct MaterializePlan {
    input: Box<dyn Plan>,
    tx: TxHandle,
}

impl MaterializePlan {
    pub fn new(input: Box<dyn Plan>, tx: TxHandle) -> Self {
        Self { input, tx }
    }

    /// Copies the wrapped plan's rows into a brand-new temp table and
    /// returns the (still-open) scan over it.
    pub fn materialize_into_table_scan(&self) -> Result<TableScan> {
        let layout = Rc::new(Layout::from_schema(self.input.schema().clone()));
        let table_name = next_temp_table_name();
        let mut dest = TableScan::new(self.tx.clone(), &table_name, layout.clone())?;
        let mut src = self.input.open()?;
        src.before_first()?;
        while src.next()? {
            dest.insert()?;
            for field in layout.schema().fields() {
                dest.set_val(field, src.get_val(field)?)?;
            }
        }
        dest.before_first()?;
        Ok(dest)
    }
}

impl Plan for MaterializePlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        Ok(Box::new(self.materialize_into_table_scan()?))
    }

    fn blocks_accessed(&self) -> u64 {
        let layout = Layout::from_schema(self.input.schema().clone());
        let rpb = (self.tx.borrow().block_size() / layout.slot_size().max(1)).max(1) as u64;
        let records = self.input.records_output();
        (records + rpb - 1) / rpb
    }

    fn records_output(&self) -> u64 {
        self.input.records_output()
    }

    fn distinct_values(&self, field: &str) -> u64 {
        self.input.distinct_values(field)
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::concurrency::LockTable;
    use crate::file::FileManager;
    use crate::index::IndexKind;
    use crate::metadata::MetadataManager;
    use crate::plan::TablePlan;
    use crate::record::Schema as RecSchema;
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

    #[test]
    fn materializing_copies_every_row_into_a_fresh_table() {
        let tx = new_tx("materializeplan_basic");
        let mdm = MetadataManager::new(true, IndexKind::Hash, tx.clone()).unwrap();
        let mut schema = RecSchema::new();
        schema.add_int_field("n");
        mdm.create_table("src", &schema, tx.clone()).unwrap();
        let layout = mdm.get_layout("src", tx.clone()).unwrap();
        let mut ts = TableScan::new(tx.clone(), "src", layout).unwrap();
        for v in [1, 2, 3] {
            ts.insert().unwrap();
            ts.set_int("n", v).unwrap();
        }
        drop(ts);

        let table_plan = TablePlan::new("src", tx.clone(), &mdm).unwrap();
        let mat = MaterializePlan::new(Box::new(table_plan), tx);
        let mut scan = mat.open().unwrap();
        scan.before_first().unwrap();
        let mut seen = Vec::new();
        while scan.next().unwrap() {
            seen.push(scan.get_int("n").unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
