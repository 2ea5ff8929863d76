//! Table catalog (spec.md §4.10): `table_catalog(table_name, slot_size)`
//! and `field_catalog(table_name, field_name, type, length, offset)`.
//! Every other metadata sub-manager, and the planner, reach layouts
//! through here.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::record::schema::FieldType;
use crate::record::{Layout, Schema, TableScan};
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;

/// Catalog name cap (spec.md §4.10): table and field names longer than
/// this are rejected before they ever reach a catalog row.
pub const MAX_NAME: usize = 16;

const INTEGER_CODE: i32 = 0;
const SHORT_CODE: i32 = 1;
const LONG_CODE: i32 = 2;
const VARCHAR_CODE: i32 = 3;
const BOOLEAN_CODE: i32 = 4;
const DATE_CODE: i32 = 5;

fn type_code(ftype: FieldType) -> i32 {
    match ftype {
        FieldType::Integer => INTEGER_CODE,
        FieldType::Short => SHORT_CODE,
        FieldType::Long => LONG_CODE,
        FieldType::Varchar(_) => VARCHAR_CODE,
        FieldType::Boolean => BOOLEAN_CODE,
        FieldType::Date => DATE_CODE,
    }
}

fn type_from_code(code: i32, length: usize) -> FieldType {
    match code {
        INTEGER_CODE => FieldType::Integer,
        SHORT_CODE => FieldType::Short,
        LONG_CODE => FieldType::Long,
        VARCHAR_CODE => FieldType::Varchar(length),
        BOOLEAN_CODE => FieldType::Boolean,
        DATE_CODE => FieldType::Date,
        other => panic!("unknown catalog type code {}", other),
    }
}

pub struct TableManager {
    tcat_layout: Rc<Layout>,
    fcat_layout: Rc<Layout>,
}

impl TableManager {
    pub fn new(is_new: bool, tx: TxHandle) -> Result<Self> {
        let mut tcat_schema = Schema::new();
        tcat_schema.add_string_field("table_name", MAX_NAME);
        tcat_schema.add_int_field("slot_size");
        let tcat_layout = Rc::new(Layout::from_schema(tcat_schema));

        let mut fcat_schema = Schema::new();
        fcat_schema.add_string_field("table_name", MAX_NAME);
        fcat_schema.add_string_field("field_name", MAX_NAME);
        fcat_schema.add_int_field("type");
        fcat_schema.add_int_field("length");
        fcat_schema.add_int_field("offset");
        let fcat_layout = Rc::new(Layout::from_schema(fcat_schema));

        let mgr = Self { tcat_layout, fcat_layout };
        if is_new {
            mgr.create_table("table_catalog", mgr.tcat_layout.schema(), tx.clone())?;
            mgr.create_table("field_catalog", mgr.fcat_layout.schema(), tx)?;
        }
        Ok(mgr)
    }

    pub fn create_table(&self, table_name: &str, schema: &Schema, tx: TxHandle) -> Result<()> {
        assert!(table_name.len() <= MAX_NAME, "table name '{}' exceeds {} chars", table_name, MAX_NAME);
        let layout = Layout::from_schema(schema.clone());

        let mut tcat = TableScan::new(tx.clone(), "table_catalog", self.tcat_layout.clone())?;
        tcat.insert()?;
        tcat.set_string("table_name", table_name)?;
        tcat.set_int("slot_size", layout.slot_size() as i32)?;

        let mut fcat = TableScan::new(tx, "field_catalog", self.fcat_layout.clone())?;
        for field in schema.fields() {
            assert!(field.len() <= MAX_NAME, "field name '{}' exceeds {} chars", field, MAX_NAME);
            fcat.insert()?;
            fcat.set_string("table_name", table_name)?;
            fcat.set_string("field_name", field)?;
            fcat.set_int("type", type_code(schema.field_type(field)))?;
            fcat.set_int("length", schema.length(field) as i32)?;
            fcat.set_int("offset", layout.offset(field) as i32)?;
        }
        Ok(())
    }

    pub fn get_layout(&self, table_name: &str, tx: TxHandle) -> Result<Rc<Layout>> {
        let mut size = 0usize;
        let mut tcat = TableScan::new(tx.clone(), "table_catalog", self.tcat_layout.clone())?;
        tcat.before_first()?;
        while tcat.next()? {
            if tcat.get_string("table_name")? == table_name {
                size = tcat.get_int("slot_size")? as usize;
                break;
            }
        }

        let mut schema = Schema::new();
        let mut offsets = HashMap::new();
        let mut fcat = TableScan::new(tx, "field_catalog", self.fcat_layout.clone())?;
        fcat.before_first()?;
        while fcat.next()? {
            if fcat.get_string("table_name")? == table_name {
                let field_name = fcat.get_string("field_name")?;
                let code = fcat.get_int("type")?;
                let length = fcat.get_int("length")? as usize;
                let offset = fcat.get_int("offset")? as usize;
                let ftype = type_from_code(code, length);
                match ftype {
                    FieldType::Varchar(len) => schema.add_string_field(&field_name, len),
                    FieldType::Integer => schema.add_int_field(&field_name),
                    FieldType::Short => schema.add_short_field(&field_name),
                    FieldType::Long => schema.add_long_field(&field_name),
                    FieldType::Boolean => schema.add_boolean_field(&field_name),
                    FieldType::Date => schema.add_date_field(&field_name),
                }
                offsets.insert(field_name, offset);
            }
        }
        Ok(Rc::new(Layout::new(schema, offsets, size)))
    }

    /// Every table name registered in the catalog, including the system
    /// tables themselves. Used by [`super::stat_mgr::StatManager`] to walk
    /// the whole database when refreshing statistics.
    pub fn table_names(&self, tx: TxHandle) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut tcat = TableScan::new(tx, "table_catalog", self.tcat_layout.clone())?;
        tcat.before_first()?;
        while tcat.next()? {
            names.push(tcat.get_string("table_name")?);
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::concurrency::LockTable;
    use crate::file::FileManager;
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
    fn created_table_layout_round_trips_through_the_catalogs() {
        let tx = new_tx("tablemgr_roundtrip");
        let mgr = TableManager::new(true, tx.clone()).unwrap();

        let mut schema = Schema::new();
        schema.add_int_field("id");
        schema.add_string_field("name", 9);
        mgr.create_table("student", &schema, tx.clone()).unwrap();

        let layout = mgr.get_layout("student", tx).unwrap();
        assert_eq!(layout.schema().fields(), &["id".to_string(), "name".to_string()]);
        assert_eq!(layout.schema().field_type("name"), FieldType::Varchar(9));
        assert_eq!(layout.offset("id"), 4);
    }

    #[test]
    fn the_system_tables_are_registered_in_their_own_catalog() {
        let tx = new_tx("tablemgr_bootstrap");
        let mgr = TableManager::new(true, tx.clone()).unwrap();

        let layout = mgr.get_layout("table_catalog", tx).unwrap();
        assert_eq!(
            layout.schema().fields(),
            &["table_name".to_string(), "slot_size".to_string()]
        );
    }
}
