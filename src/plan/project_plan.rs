//! Restricts an underlying plan's schema to a declared field list (spec.md
//! §4.13): inherits every cost estimate from its input unchanged.

use crate::error::Result;
use crate::query::ProjectScan;
use crate::record::Schema;
use crate::scan::Scan;

use super::Plan;

pub struct ProjectPlan {
    input: Box<dyn Plan>,
    schema: Schema,
    fields: Vec<String>,
}

impl ProjectPlan {
    pub fn new(input: Box<dyn Plan>, fields: Vec<String>) -> Self {
        let mut schema = Schema::new();
        for field in &fields {
            schema.add(field, input.schema());
        }
        Self { input, schema, fields }
    }
}

impl Plan for ProjectPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let scan = self.input.open()?;
        Ok(Box::new(ProjectScan::new(scan, self.fields.clone())))
    }

    fn blocks_accessed(&self) -> u64 {
        self.input.blocks_accessed()
    }

    fn records_output(&self) -> u64 {
        self.input.records_output()
    }

    fn distinct_values(&self, field: &str) -> u64 {
        self.input.distinct_values(field)
    }

    fn schema(&self) -> &Schema {
        &self.schema
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
    use crate::record::{Schema as RecSchema, TableScan};
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
    fn restricts_schema_but_not_statistics() {
        let tx = new_tx("projectplan_basic");
        let mdm = MetadataManager::new(true, IndexKind::Hash, tx.clone()).unwrap();
        let mut schema = RecSchema::new();
        schema.add_string_field("sname", 10);
        schema.add_int_field("gradyear");
        mdm.create_table("student", &schema, tx.clone()).unwrap();
        let layout = mdm.get_layout("student", tx.clone()).unwrap();
        let mut ts = TableScan::new(tx.clone(), "student", layout).unwrap();
        ts.insert().unwrap();
        ts.set_string("sname", "Alice").unwrap();
        ts.set_int("gradyear", 2023).unwrap();
        drop(ts);

        let table_plan = TablePlan::new("student", tx, &mdm).unwrap();
        let project = ProjectPlan::new(Box::new(table_plan), vec!["sname".to_string()]);
        assert!(project.schema().has_field("sname"));
        assert!(!project.schema().has_field("gradyear"));
        assert_eq!(project.records_output(), 1);
    }
}
