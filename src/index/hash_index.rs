//! Static hash secondary index (spec.md §4.9.1): a fixed number of bucket
//! files, each an ordinary heap file scanned with `TableScan`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::Result;
use crate::record::schema::FieldType;
use crate::record::{Layout, Rid, Schema, TableScan, Value};
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;
use crate::util::ceil_div;

use super::index::Index;

pub const NUM_BUCKETS: u64 = 100;

fn hash_value(val: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    match val {
        Value::Int(v) => v.hash(&mut hasher),
        Value::Short(v) => v.hash(&mut hasher),
        Value::Long(v) => v.hash(&mut hasher),
        Value::Varchar(v) => v.hash(&mut hasher),
        Value::Boolean(v) => v.hash(&mut hasher),
        Value::Date(v) => v.hash(&mut hasher),
    }
    hasher.finish()
}

pub fn index_layout(field_type: FieldType) -> Rc<Layout> {
    let mut schema = Schema::new();
    schema.add_long_field("block");
    schema.add_int_field("id");
    match field_type {
        FieldType::Integer => schema.add_int_field("dataval"),
        FieldType::Short => schema.add_short_field("dataval"),
        FieldType::Long => schema.add_long_field("dataval"),
        FieldType::Varchar(len) => schema.add_string_field("dataval", len),
        FieldType::Boolean => schema.add_boolean_field("dataval"),
        FieldType::Date => schema.add_date_field("dataval"),
    }
    Rc::new(Layout::from_schema(schema))
}

pub struct HashIndex {
    tx: TxHandle,
    index_name: String,
    layout: Rc<Layout>,
    search_key: Option<Value>,
    ts: Option<TableScan>,
}

impl HashIndex {
    pub fn new(tx: TxHandle, index_name: &str, layout: Rc<Layout>) -> Self {
        Self {
            tx,
            index_name: index_name.to_string(),
            layout,
            search_key: None,
            ts: None,
        }
    }

    pub fn search_cost(num_blocks: u64, _rpb: u64) -> u64 {
        ceil_div(num_blocks, NUM_BUCKETS)
    }
}

impl Index for HashIndex {
    fn before_first(&mut self, search_key: &Value) -> Result<()> {
        self.ts = None;
        self.search_key = Some(search_key.clone());
        let bucket = hash_value(search_key) % NUM_BUCKETS;
        let table_name = format!("{}{}", self.index_name, bucket);
        let ts = TableScan::new(self.tx.clone(), &table_name, self.layout.clone())?;
        self.ts = Some(ts);
        self.ts.as_mut().unwrap().before_first()
    }

    fn next(&mut self) -> Result<bool> {
        let key = self.search_key.clone().expect("before_first not called");
        let ts = self.ts.as_mut().expect("before_first not called");
        while ts.next()? {
            if ts.get_val("dataval")? == key {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get_data_rid(&mut self) -> Result<Rid> {
        let ts = self.ts.as_mut().expect("before_first not called");
        let block_num = ts.get_long("block")? as u64;
        let id = ts.get_int("id")?;
        Ok(Rid::new(block_num, id))
    }

    fn insert(&mut self, val: &Value, rid: Rid) -> Result<()> {
        self.before_first(val)?;
        let ts = self.ts.as_mut().unwrap();
        ts.insert()?;
        ts.set_long("block", rid.block_num() as i64)?;
        ts.set_int("id", rid.slot())?;
        ts.set_val("dataval", val.clone())
    }

    fn delete(&mut self, val: &Value, rid: Rid) -> Result<()> {
        self.before_first(val)?;
        while self.next()? {
            if self.get_data_rid()? == rid {
                self.ts.as_mut().unwrap().delete()?;
                return Ok(());
            }
        }
        Ok(())
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
    use std::sync::Mutex;
    use std::time::Duration;

    fn new_tx(tag: &str) -> TxHandle {
        let dir = crate::test_support::fresh_dir(tag);
        let fm = std::sync::Arc::new(FileManager::new(&dir, 400).unwrap());
        let lm = std::sync::Arc::new(Mutex::new(LogManager::new(fm.clone(), "t.log").unwrap()));
        let bm = std::sync::Arc::new(BufferManager::new(fm.clone(), lm.clone(), 8, Duration::from_millis(300)));
        let lt = std::sync::Arc::new(LockTable::new(Duration::from_millis(300)));
        Rc::new(RefCell::new(Transaction::new(fm, lm, bm, lt).unwrap()))
    }

    #[test]
    fn insert_then_find_by_exact_key() {
        let tx = new_tx("hash_basic");
        let layout = index_layout(FieldType::Integer);
        let mut idx = HashIndex::new(tx, "idx_age", layout);
        idx.insert(&Value::Int(42), Rid::new(3, 5)).unwrap();

        idx.before_first(&Value::Int(42)).unwrap();
        assert!(idx.next().unwrap());
        assert_eq!(idx.get_data_rid().unwrap(), Rid::new(3, 5));
        assert!(!idx.next().unwrap());
    }

    #[test]
    fn keys_in_different_buckets_do_not_collide() {
        let tx = new_tx("hash_buckets");
        let layout = index_layout(FieldType::Integer);
        let mut idx = HashIndex::new(tx, "idx_many", layout);
        for k in 0..20 {
            idx.insert(&Value::Int(k), Rid::new(0, k)).unwrap();
        }
        for k in 0..20 {
            idx.before_first(&Value::Int(k)).unwrap();
            assert!(idx.next().unwrap());
            assert_eq!(idx.get_data_rid().unwrap(), Rid::new(0, k));
        }
    }

    #[test]
    fn delete_removes_the_matching_entry_only() {
        let tx = new_tx("hash_delete");
        let layout = index_layout(FieldType::Integer);
        let mut idx = HashIndex::new(tx, "idx_del", layout);
        idx.insert(&Value::Int(9), Rid::new(0, 1)).unwrap();
        idx.insert(&Value::Int(9), Rid::new(0, 2)).unwrap();

        idx.delete(&Value::Int(9), Rid::new(0, 1)).unwrap();

        idx.before_first(&Value::Int(9)).unwrap();
        let mut rids = Vec::new();
        while idx.next().unwrap() {
            rids.push(idx.get_data_rid().unwrap());
        }
        assert_eq!(rids, vec![Rid::new(0, 2)]);
    }
}
