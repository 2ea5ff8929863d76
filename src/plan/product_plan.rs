//! Cross product of two plans (spec.md §4.13): `blocks = b1 + r1*b2`, the
//! cost of scanning the left side once and rescanning the right side for
//! every left row.

use crate::error::Result;
use crate::query::ProductScan;
use crate::record::Schema;
use crate::scan::Scan;

use super::Plan;

/// `blocks_accessed` for a hypothetical `ProductPlan::new(lhs, rhs)` without
/// having to build one, so a planner can compare both join orders and keep
/// only the plan it actually wants.
pub fn estimate_blocks(lhs: &dyn Plan, rhs: &dyn Plan) -> u64 {
    lhs.blocks_accessed() + lhs.records_output() * rhs.blocks_accessed()
}

pub struct ProductPlan {
    lhs: Box<dyn Plan>,
    rhs: Box<dyn Plan>,
    schema: Schema,
}

impl ProductPlan {
    pub fn new(lhs: Box<dyn Plan>, rhs: Box<dyn Plan>) -> Self {
        let mut schema = Schema::new();
        schema.add_all(lhs.schema());
        schema.add_all(rhs.schema());
        Self { lhs, rhs, schema }
    }
}

impl Plan for ProductPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let lhs = self.lhs.open()?;
        let rhs = self.rhs.open()?;
        Ok(Box::new(ProductScan::new(lhs, rhs)?))
    }

    fn blocks_accessed(&self) -> u64 {
        self.lhs.blocks_accessed() + self.lhs.records_output() * self.rhs.blocks_accessed()
    }

    fn records_output(&self) -> u64 {
        self.lhs.records_output() * self.rhs.records_output()
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
