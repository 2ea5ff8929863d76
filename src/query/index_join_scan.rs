//! Index nested-loop join (spec.md §4.12): for every row of the outer
//! scan, reposition the index at the join field's value and yield one
//! joined row per match before advancing the outer scan.

use crate::error::Result;
use crate::index::Index;
use crate::record::{TableScan, Value};
use crate::scan::{Scan, UpdateScan};

pub struct IndexJoinScan {
    lhs: Box<dyn Scan>,
    rhs: TableScan,
    idx: Box<dyn Index>,
    join_field: String,
    lhs_has_row: bool,
}

impl IndexJoinScan {
    pub fn new(lhs: Box<dyn Scan>, rhs: TableScan, idx: Box<dyn Index>, join_field: &str) -> Result<Self> {
        let mut scan = Self {
            lhs,
            rhs,
            idx,
            join_field: join_field.to_string(),
            lhs_has_row: false,
        };
        scan.before_first()?;
        Ok(scan)
    }

    fn reset_index(&mut self) -> Result<()> {
        let val = self.lhs.get_val(&self.join_field)?;
        self.idx.before_first(&val)
    }
}

impl Scan for IndexJoinScan {
    fn before_first(&mut self) -> Result<()> {
        self.lhs.before_first()?;
        self.lhs_has_row = self.lhs.next()?;
        if self.lhs_has_row {
            self.reset_index()?;
        }
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        loop {
            if !self.lhs_has_row {
                return Ok(false);
            }
            if self.idx.next()? {
                let rid = self.idx.get_data_rid()?;
                self.rhs.move_to_record_id(rid)?;
                return Ok(true);
            }
            self.lhs_has_row = self.lhs.next()?;
            if self.lhs_has_row {
                self.reset_index()?;
            }
        }
    }

    fn get_int(&mut self, field: &str) -> Result<i32> {
        if self.lhs.has_field(field) { self.lhs.get_int(field) } else { self.rhs.get_int(field) }
    }
    fn get_short(&mut self, field: &str) -> Result<i16> {
        if self.lhs.has_field(field) { self.lhs.get_short(field) } else { self.rhs.get_short(field) }
    }
    fn get_long(&mut self, field: &str) -> Result<i64> {
        if self.lhs.has_field(field) { self.lhs.get_long(field) } else { self.rhs.get_long(field) }
    }
    fn get_string(&mut self, field: &str) -> Result<String> {
        if self.lhs.has_field(field) { self.lhs.get_string(field) } else { self.rhs.get_string(field) }
    }
    fn get_bool(&mut self, field: &str) -> Result<bool> {
        if self.lhs.has_field(field) { self.lhs.get_bool(field) } else { self.rhs.get_bool(field) }
    }
    fn get_date(&mut self, field: &str) -> Result<i64> {
        if self.lhs.has_field(field) { self.lhs.get_date(field) } else { self.rhs.get_date(field) }
    }
    fn get_val(&mut self, field: &str) -> Result<Value> {
        if self.lhs.has_field(field) { self.lhs.get_val(field) } else { self.rhs.get_val(field) }
    }

    fn has_field(&self, field: &str) -> bool {
        self.lhs.has_field(field) || self.rhs.has_field(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::HashIndex;
    use crate::record::{Layout, Schema};
    use crate::scan::UpdateScan;
    use crate::tx::{Transaction, TxHandle};
    use std::rc::Rc;

    fn new_tx(tag: &str) -> TxHandle {
        use crate::buffer::BufferManager;
        use crate::concurrency::LockTable;
        use crate::file::FileManager;
        use crate::wal::LogManager;
        use std::cell::RefCell;
        use std::sync::{Arc, Mutex};
        use std::time::Duration;

        let dir = crate::test_support::fresh_dir(tag);
        let fm = Arc::new(FileManager::new(&dir, 400).unwrap());
        let lm = Arc::new(Mutex::new(LogManager::new(fm.clone(), "t.log").unwrap()));
        let bm = Arc::new(BufferManager::new(fm.clone(), lm.clone(), 8, Duration::from_millis(300)));
        let lt = Arc::new(LockTable::new(Duration::from_millis(300)));
        Rc::new(RefCell::new(Transaction::new(fm, lm, bm, lt).unwrap()))
    }

    #[test]
    fn each_department_joins_to_its_matching_employees() {
        use crate::record::schema::FieldType;

        let tx = new_tx("indexjoin_basic");

        let mut dept_schema = Schema::new();
        dept_schema.add_int_field("did");
        let dept_layout = Rc::new(Layout::from_schema(dept_schema));
        let mut depts = TableScan::new(tx.clone(), "dept", dept_layout).unwrap();
        for did in [1, 2, 3] {
            depts.insert().unwrap();
            depts.set_int("did", did).unwrap();
        }
        depts.before_first().unwrap();

        let mut emp_schema = Schema::new();
        emp_schema.add_int_field("did");
        emp_schema.add_string_field("name", 10);
        let emp_layout = Rc::new(Layout::from_schema(emp_schema));
        let mut emps = TableScan::new(tx.clone(), "emp", emp_layout.clone()).unwrap();
        let idx_layout = crate::index::hash_index::index_layout(FieldType::Integer);
        let mut idx = HashIndex::new(tx.clone(), "idx_did", idx_layout);
        for (did, name) in [(1, "Alice"), (1, "Bob"), (2, "Carol")] {
            emps.insert().unwrap();
            emps.set_int("did", did).unwrap();
            emps.set_string("name", name).unwrap();
            idx.insert(&Value::Int(did), emps.get_record_id()).unwrap();
        }

        let rhs = TableScan::new(tx, "emp", emp_layout).unwrap();
        let mut join = IndexJoinScan::new(Box::new(depts), rhs, Box::new(idx), "did").unwrap();

        let mut names = Vec::new();
        while join.next().unwrap() {
            names.push(join.get_string("name").unwrap());
        }
        names.sort();
        assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()]);
    }
}
