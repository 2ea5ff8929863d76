//! Query plan trees (spec.md §4.13): each node estimates its own cost and
//! selectivity from catalog statistics and knows how to open itself into a
//! scan tree. `planner` decides which shapes to build; this module only
//! knows how to build and cost them.

pub mod group_by_plan;
pub mod index_join_plan;
pub mod index_select_plan;
pub mod materialize_plan;
pub mod product_plan;
pub mod project_plan;
pub mod select_plan;
pub mod sort_plan;
pub mod table_plan;

pub use group_by_plan::GroupByPlan;
pub use index_join_plan::IndexJoinPlan;
pub use index_select_plan::IndexSelectPlan;
pub use materialize_plan::MaterializePlan;
pub use product_plan::{estimate_blocks, ProductPlan};
pub use project_plan::ProjectPlan;
pub use select_plan::SelectPlan;
pub use sort_plan::SortPlan;
pub use table_plan::TablePlan;

use crate::error::Result;
use crate::record::Schema;
use crate::scan::Scan;

/// A node in the query algebra tree: knows its own statistics without
/// opening a scan, and can materialize itself into one on demand.
pub trait Plan {
    fn open(&self) -> Result<Box<dyn Scan>>;
    fn blocks_accessed(&self) -> u64;
    fn records_output(&self) -> u64;
    fn distinct_values(&self, field: &str) -> u64;
    fn schema(&self) -> &Schema;
}
