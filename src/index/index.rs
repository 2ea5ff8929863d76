//! Common index contract (spec.md §4.9): position on a search key, walk
//! matching entries, and maintain the index on insert/delete.

use crate::error::Result;
use crate::record::{Rid, Value};

pub trait Index {
    fn before_first(&mut self, search_key: &Value) -> Result<()>;
    fn next(&mut self) -> Result<bool>;
    fn get_data_rid(&mut self) -> Result<Rid>;
    fn insert(&mut self, val: &Value, rid: Rid) -> Result<()>;
    fn delete(&mut self, val: &Value, rid: Rid) -> Result<()>;
}
