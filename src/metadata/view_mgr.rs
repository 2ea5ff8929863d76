//! View catalog (spec.md §4.10): `view_catalog(view_name, view_definition)`.
//! A view definition is just the SQL text of its defining query, capped at
//! [`MAX_VIEWDEF`] characters the way the table/field catalogs cap names.

use std::rc::Rc;

use crate::error::Result;
use crate::record::{Schema, TableScan};
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;

use super::table_mgr::{TableManager, MAX_NAME};

pub const MAX_VIEWDEF: usize = 100;

pub struct ViewManager {
    table_mgr: Rc<TableManager>,
}

impl ViewManager {
    pub fn new(is_new: bool, table_mgr: Rc<TableManager>, tx: TxHandle) -> Result<Self> {
        if is_new {
            let mut schema = Schema::new();
            schema.add_string_field("view_name", MAX_NAME);
            schema.add_string_field("view_def", MAX_VIEWDEF);
            table_mgr.create_table("view_catalog", &schema, tx)?;
        }
        Ok(Self { table_mgr })
    }

    pub fn create_view(&self, view_name: &str, view_def: &str, tx: TxHandle) -> Result<()> {
        assert!(
            view_def.len() <= MAX_VIEWDEF,
            "view definition for '{}' exceeds {} chars",
            view_name,
            MAX_VIEWDEF
        );
        let layout = self.table_mgr.get_layout("view_catalog", tx.clone())?;
        let mut scan = TableScan::new(tx, "view_catalog", layout)?;
        scan.insert()?;
        scan.set_string("view_name", view_name)?;
        scan.set_string("view_def", view_def)?;
        Ok(())
    }

    pub fn get_view_def(&self, view_name: &str, tx: TxHandle) -> Result<Option<String>> {
        let layout = self.table_mgr.get_layout("view_catalog", tx.clone())?;
        let mut scan = TableScan::new(tx, "view_catalog", layout)?;
        scan.before_first()?;
        while scan.next()? {
            if scan.get_string("view_name")? == view_name {
                return Ok(Some(scan.get_string("view_def")?));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::concurrency::LockTable;
    use crate::file::FileManager;
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
    fn stored_definition_comes_back_unchanged() {
        let tx = new_tx("viewmgr_basic");
        let tmgr = Rc::new(TableManager::new(true, tx.clone()).unwrap());
        let vmgr = ViewManager::new(true, tmgr, tx.clone()).unwrap();

        vmgr.create_view("young_students", "select sname from student where gradyear > 2020", tx.clone())
            .unwrap();

        assert_eq!(
            vmgr.get_view_def("young_students", tx).unwrap().as_deref(),
            Some("select sname from student where gradyear > 2020")
        );
    }

    #[test]
    fn unknown_view_returns_none() {
        let tx = new_tx("viewmgr_missing");
        let tmgr = Rc::new(TableManager::new(true, tx.clone()).unwrap());
        let vmgr = ViewManager::new(true, tmgr, tx.clone()).unwrap();

        assert_eq!(vmgr.get_view_def("nope", tx).unwrap(), None);
    }
}
