//! Selects via an index rather than a full scan (spec.md §4.13): costs the
//! index lookup itself plus the matching rows, instead of scanning the
//! whole table.

use crate::error::Result;
use crate::metadata::IndexInfo;
use crate::query::IndexSelectScan;
use crate::record::{Schema, TableScan, Value};
use crate::scan::Scan;

use super::table_plan::TablePlan;
use super::Plan;

pub struct IndexSelectPlan {
    table_plan: TablePlan,
    index_info: IndexInfo,
    val: Value,
}

impl IndexSelectPlan {
    pub fn new(table_plan: TablePlan, index_info: IndexInfo, val: Value) -> Self {
        Self { table_plan, index_info, val }
    }
}

impl Plan for IndexSelectPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let ts = TableScan::new(self.table_plan.tx(), self.table_plan.table_name(), self.table_plan.layout().clone())?;
        let idx = self.index_info.open(self.table_plan.tx())?;
        Ok(Box::new(IndexSelectScan::new(ts, idx, self.val.clone())))
    }

    fn blocks_accessed(&self) -> u64 {
        self.index_info.blocks_accessed() + self.records_output()
    }

    fn records_output(&self) -> u64 {
        self.index_info.records_output()
    }

    fn distinct_values(&self, field: &str) -> u64 {
        self.table_plan.distinct_values(field)
    }

    fn schema(&self) -> &Schema {
        self.table_plan.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::concurrency::LockTable;
    use crate::file::FileManager;
    use crate::index::{Index, IndexKind};
    use crate::metadata::MetadataManager;
    use crate::plan::TablePlan as PlanTablePlan;
    use crate::record::Schema as RecSchema;
    use crate::scan::UpdateScan;
    use crate::tx::{Transaction, TxHandle};
    use crate::wal::LogManager;
    use std::cell::RefCell;
    use std::rc::Rc;
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
    fn positions_the_table_scan_at_every_indexed_match() {
        let tx = new_tx("indexselectplan_basic");
        let mdm = MetadataManager::new(true, IndexKind::Hash, tx.clone()).unwrap();
        let mut schema = RecSchema::new();
        schema.add_int_field("gradyear");
        mdm.create_table("student", &schema, tx.clone()).unwrap();
        mdm.create_index("idx_gradyear", "student", "gradyear", tx.clone()).unwrap();

        let layout = mdm.get_layout("student", tx.clone()).unwrap();
        let mut ts = TableScan::new(tx.clone(), "student", layout).unwrap();
        for year in [2020, 2023, 2023] {
            ts.insert().unwrap();
            ts.set_int("gradyear", year).unwrap();
            let idx_info = mdm.get_index_info("student", tx.clone()).unwrap();
            let info = idx_info.get("gradyear").unwrap();
            let mut idx = info.open(tx.clone()).unwrap();
            idx.insert(&Value::Int(year), ts.get_record_id()).unwrap();
        }
        drop(ts);

        let table_plan = PlanTablePlan::new("student", tx.clone(), &mdm).unwrap();
        let idx_info = mdm.get_index_info("student", tx.clone()).unwrap().remove("gradyear").unwrap();
        let plan = IndexSelectPlan::new(table_plan, idx_info, Value::Int(2023));

        let mut scan = plan.open().unwrap();
        scan.before_first().unwrap();
        let mut count = 0;
        while scan.next().unwrap() {
            assert_eq!(scan.get_int("gradyear").unwrap(), 2023);
            count += 1;
        }
        assert_eq!(count, 2);
    }
}
