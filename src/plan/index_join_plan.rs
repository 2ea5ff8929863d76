//! Index nested-loop join plan (spec.md §4.13): `blocks = b1 + r1*idx.blocks
//! + records`, one index probe per outer row plus following every match
//! back into the inner table.

use crate::error::Result;
use crate::metadata::IndexInfo;
use crate::query::IndexJoinScan;
use crate::record::{Schema, TableScan};
use crate::scan::Scan;

use super::table_plan::TablePlan;
use super::Plan;

pub struct IndexJoinPlan {
    lhs: Box<dyn Plan>,
    rhs: TablePlan,
    index_info: IndexInfo,
    join_field: String,
    schema: Schema,
}

impl IndexJoinPlan {
    pub fn new(lhs: Box<dyn Plan>, rhs: TablePlan, index_info: IndexInfo, join_field: &str) -> Self {
        let mut schema = Schema::new();
        schema.add_all(lhs.schema());
        schema.add_all(rhs.schema());
        Self {
            lhs,
            rhs,
            index_info,
            join_field: join_field.to_string(),
            schema,
        }
    }
}

impl Plan for IndexJoinPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let lhs = self.lhs.open()?;
        let rhs_ts = TableScan::new(self.rhs.tx(), self.rhs.table_name(), self.rhs.layout().clone())?;
        let idx = self.index_info.open(self.rhs.tx())?;
        Ok(Box::new(IndexJoinScan::new(lhs, rhs_ts, idx, &self.join_field)?))
    }

    fn blocks_accessed(&self) -> u64 {
        self.lhs.blocks_accessed() + self.lhs.records_output() * self.index_info.blocks_accessed() + self.records_output()
    }

    fn records_output(&self) -> u64 {
        self.lhs.records_output() * self.index_info.records_output()
    }

    fn distinct_values(&self, field: &str) -> u64 {
        if self.lhs.schema().has_field(field) {
            self.lhs.distinct_values(field)
        } else {
            self.rhs.distinct_values(field)
        }
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
