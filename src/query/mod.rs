//! Relational query algebra (spec.md §4.12): predicates and the scan
//! variants that compose into a query's execution tree. `plan` builds these
//! trees; `planner` decides which shapes to build.

pub mod aggregate;
pub mod group_by_scan;
pub mod index_join_scan;
pub mod index_select_scan;
pub mod predicate;
pub mod product_scan;
pub mod project_scan;
pub mod select_scan;
pub mod sort_scan;

pub use aggregate::{AggregateSpec, Aggregator};
pub use group_by_scan::GroupByScan;
pub use index_join_scan::IndexJoinScan;
pub use index_select_scan::IndexSelectScan;
pub use predicate::{Expr, Op, Predicate, Term};
pub use product_scan::ProductScan;
pub use project_scan::ProjectScan;
pub use select_scan::SelectScan;
pub use sort_scan::{SortField, SortScan};
