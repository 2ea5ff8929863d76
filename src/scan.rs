//! The common cursor contract every query-algebra node and the record
//! layer's `TableScan` implement (spec.md §4.12). Kept at the crate root,
//! beneath both `record` and `query`, since both depend on it.
//!
//! Unlike the reference design this is grounded on, there is no explicit
//! `close`: every scan owns the resources it pins (buffers, via
//! `RecordPage`'s `Drop`), so closing falls out of Rust's ordinary drop
//! order instead of needing a separate lifecycle method.

use crate::error::Result;
use crate::record::{Rid, Value};

/// Read-only cursor capability shared by every scan variant.
pub trait Scan {
    fn before_first(&mut self) -> Result<()>;
    fn next(&mut self) -> Result<bool>;

    fn get_int(&mut self, field: &str) -> Result<i32>;
    fn get_short(&mut self, field: &str) -> Result<i16>;
    fn get_long(&mut self, field: &str) -> Result<i64>;
    fn get_string(&mut self, field: &str) -> Result<String>;
    fn get_bool(&mut self, field: &str) -> Result<bool>;
    fn get_date(&mut self, field: &str) -> Result<i64>;
    fn get_val(&mut self, field: &str) -> Result<Value>;

    fn has_field(&self, field: &str) -> bool;
}

/// Mutation capability available only on scans that wrap a single heap
/// record: `TableScan`, and anything built directly on it (index scans).
/// Scans like `ProductScan`/`GroupByScan` do not implement this trait at
/// all, so attempting to mutate through them is a compile error rather
/// than a runtime `LogicError` (spec.md §7 narrows this to a runtime error;
/// the type system gives a stronger guarantee here for free).
pub trait UpdateScan: Scan {
    fn set_int(&mut self, field: &str, value: i32) -> Result<()>;
    fn set_short(&mut self, field: &str, value: i16) -> Result<()>;
    fn set_long(&mut self, field: &str, value: i64) -> Result<()>;
    fn set_string(&mut self, field: &str, value: &str) -> Result<()>;
    fn set_bool(&mut self, field: &str, value: bool) -> Result<()>;
    fn set_date(&mut self, field: &str, value: i64) -> Result<()>;
    fn set_val(&mut self, field: &str, value: Value) -> Result<()>;

    fn insert(&mut self) -> Result<()>;
    fn delete(&mut self) -> Result<()>;

    fn get_record_id(&self) -> Rid;
    fn move_to_record_id(&mut self, rid: Rid) -> Result<()>;
}
