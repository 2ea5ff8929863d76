//! Positions an index at a search value and follows its matches back into
//! the underlying table (spec.md §4.12).

use crate::error::Result;
use crate::index::Index;
use crate::record::{TableScan, Value};
use crate::scan::{Scan, UpdateScan};

pub struct IndexSelectScan {
    ts: TableScan,
    idx: Box<dyn Index>,
    val: Value,
}

impl IndexSelectScan {
    pub fn new(ts: TableScan, idx: Box<dyn Index>, val: Value) -> Self {
        Self { ts, idx, val }
    }
}

impl Scan for IndexSelectScan {
    fn before_first(&mut self) -> Result<()> {
        self.idx.before_first(&self.val)
    }

    fn next(&mut self) -> Result<bool> {
        if !self.idx.next()? {
            return Ok(false);
        }
        let rid = self.idx.get_data_rid()?;
        self.ts.move_to_record_id(rid)?;
        Ok(true)
    }

    fn get_int(&mut self, field: &str) -> Result<i32> {
        self.ts.get_int(field)
    }
    fn get_short(&mut self, field: &str) -> Result<i16> {
        self.ts.get_short(field)
    }
    fn get_long(&mut self, field: &str) -> Result<i64> {
        self.ts.get_long(field)
    }
    fn get_string(&mut self, field: &str) -> Result<String> {
        self.ts.get_string(field)
    }
    fn get_bool(&mut self, field: &str) -> Result<bool> {
        self.ts.get_bool(field)
    }
    fn get_date(&mut self, field: &str) -> Result<i64> {
        self.ts.get_date(field)
    }
    fn get_val(&mut self, field: &str) -> Result<Value> {
        self.ts.get_val(field)
    }

    fn has_field(&self, field: &str) -> bool {
        self.ts.has_field(field)
    }
}
