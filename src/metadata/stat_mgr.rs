//! Table statistics (spec.md §4.10), refreshed by scanning every table.
//!
//! The teacher-style design this replaces mutates a shared stats map in
//! place and hands out references into it, so a caller mid-iteration over
//! an old snapshot can observe a concurrent refresh. `get_stat_info`
//! returns an owned [`StatInfo`] clone instead, eliminating the aliasing.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Mutex;

use crate::error::Result;
use crate::record::{Layout, TableScan};
use crate::scan::Scan;
use crate::tx::TxHandle;

use super::table_mgr::TableManager;

const REFRESH_LIMIT: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct StatInfo {
    num_blocks: u64,
    num_records: u64,
    distinct: HashMap<String, u64>,
}

impl StatInfo {
    pub fn blocks_accessed(&self) -> u64 {
        self.num_blocks
    }

    pub fn records_output(&self) -> u64 {
        self.num_records
    }

    pub fn distinct_values(&self, field: &str) -> u64 {
        self.distinct.get(field).copied().unwrap_or(1).max(1)
    }
}

pub struct StatManager {
    table_mgr: Rc<TableManager>,
    table_stats: Mutex<HashMap<String, StatInfo>>,
    num_calls: Mutex<u64>,
}

impl StatManager {
    pub fn new(table_mgr: Rc<TableManager>, tx: TxHandle) -> Result<Self> {
        let mgr = Self {
            table_mgr,
            table_stats: Mutex::new(HashMap::new()),
            num_calls: Mutex::new(0),
        };
        mgr.refresh_statistics(tx)?;
        Ok(mgr)
    }

    pub fn get_stat_info(&self, table_name: &str, layout: &Layout, tx: TxHandle) -> Result<StatInfo> {
        let needs_refresh = {
            let mut calls = self.num_calls.lock().unwrap();
            *calls += 1;
            *calls > REFRESH_LIMIT || !self.table_stats.lock().unwrap().contains_key(table_name)
        };
        if needs_refresh {
            self.refresh_statistics(tx.clone())?;
        }
        if let Some(info) = self.table_stats.lock().unwrap().get(table_name) {
            return Ok(info.clone());
        }
        Self::calc_table_stats(table_name, layout, tx)
    }

    fn refresh_statistics(&self, tx: TxHandle) -> Result<()> {
        let mut fresh = HashMap::new();
        for table_name in self.table_mgr.table_names(tx.clone())? {
            let layout = self.table_mgr.get_layout(&table_name, tx.clone())?;
            let info = Self::calc_table_stats(&table_name, &layout, tx.clone())?;
            fresh.insert(table_name, info);
        }
        *self.table_stats.lock().unwrap() = fresh;
        *self.num_calls.lock().unwrap() = 0;
        Ok(())
    }

    fn calc_table_stats(table_name: &str, layout: &Layout, tx: TxHandle) -> Result<StatInfo> {
        let mut num_records = 0u64;
        let mut distinct_sets: HashMap<String, std::collections::HashSet<String>> = HashMap::new();
        for field in layout.schema().fields() {
            distinct_sets.insert(field.clone(), std::collections::HashSet::new());
        }

        let num_blocks = tx.borrow_mut().size(&format!("{}.tbl", table_name))?;

        let mut scan = TableScan::new(tx, table_name, Rc::new(layout.clone()))?;
        scan.before_first()?;
        while scan.next()? {
            num_records += 1;
            for field in layout.schema().fields() {
                let val = scan.get_val(field)?;
                distinct_sets.get_mut(field).unwrap().insert(val.to_string());
            }
        }

        let distinct = distinct_sets.into_iter().map(|(k, v)| (k, v.len() as u64)).collect();
        Ok(StatInfo {
            num_blocks,
            num_records,
            distinct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::concurrency::LockTable;
    use crate::file::FileManager;
    use crate::record::Schema;
    use crate::scan::UpdateScan;
    use crate::tx::{Transaction, TxHandle};
    use crate::wal::LogManager;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    fn new_tx(tag: &str) -> TxHandle {
        let dir = crate::test_support::fresh_dir(tag);
        let fm = Arc::new(FileManager::new(&dir, 400).unwrap());
        let lm = Arc::new(StdMutex::new(LogManager::new(fm.clone(), "t.log").unwrap()));
        let bm = Arc::new(BufferManager::new(fm.clone(), lm.clone(), 8, Duration::from_millis(300)));
        let lt = Arc::new(LockTable::new(Duration::from_millis(300)));
        Rc::new(RefCell::new(Transaction::new(fm, lm, bm, lt).unwrap()))
    }

    #[test]
    fn counts_records_and_distinct_values_after_inserts() {
        let tx = new_tx("statmgr_basic");
        let tmgr = Rc::new(TableManager::new(true, tx.clone()).unwrap());

        let mut schema = Schema::new();
        schema.add_int_field("gradyear");
        tmgr.create_table("student", &schema, tx.clone()).unwrap();
        let layout = tmgr.get_layout("student", tx.clone()).unwrap();

        let mut ts = TableScan::new(tx.clone(), "student", layout.clone()).unwrap();
        for year in [2020, 2020, 2021] {
            ts.insert().unwrap();
            ts.set_int("gradyear", year).unwrap();
        }
        drop(ts);

        let smgr = StatManager::new(tmgr, tx.clone()).unwrap();
        let info = smgr.get_stat_info("student", &layout, tx).unwrap();
        assert_eq!(info.records_output(), 3);
        assert_eq!(info.distinct_values("gradyear"), 2);
    }
}
