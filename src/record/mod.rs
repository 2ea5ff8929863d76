//! L3: schema-driven slotted pages and heap-file cursors (spec.md §4.8).

pub mod date;
pub mod layout;
pub mod record_page;
pub mod rid;
pub mod schema;
pub mod table_scan;
pub mod value;

pub use date::{civil_from_days, days_from_civil, format_epoch_millis};
pub use layout::Layout;
pub use rid::Rid;
pub use schema::{FieldType, Schema};
pub use table_scan::TableScan;
pub use value::Value;
