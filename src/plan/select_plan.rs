//! Filters an underlying plan by a predicate (spec.md §4.13): same block
//! cost as its input, fewer records, and per-field distinct-value
//! heuristics derived from the predicate's terms.

use crate::error::Result;
use crate::query::{Predicate, SelectScan};
use crate::record::Schema;
use crate::scan::Scan;

use super::Plan;

pub struct SelectPlan {
    input: Box<dyn Plan>,
    pred: Predicate,
}

impl SelectPlan {
    pub fn new(input: Box<dyn Plan>, pred: Predicate) -> Self {
        Self { input, pred }
    }
}

impl Plan for SelectPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let scan = self.input.open()?;
        Ok(Box::new(SelectScan::new(scan, self.pred.clone())))
    }

    fn blocks_accessed(&self) -> u64 {
        self.input.blocks_accessed()
    }

    fn records_output(&self) -> u64 {
        self.input.records_output() / self.pred.reduction_factor(self.input.as_ref())
    }

    fn distinct_values(&self, field: &str) -> u64 {
        if self.pred.equates_with_constant(field).is_some() {
            return 1;
        }
        if let Some(other) = self.pred.equates_with_field(field) {
            return self.input.distinct_values(field).min(self.input.distinct_values(other));
        }
        let dv = self.input.distinct_values(field);
        for term in self.pred.terms() {
            if term.compares_with_constant(field) {
                use crate::query::Op;
                return match term.op() {
                    Op::Lt | Op::Le | Op::Gt | Op::Ge => dv.max(2) / 2,
                    Op::Ne => dv.saturating_sub(1).max(1),
                    Op::Eq => 1,
                };
            }
        }
        dv
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }
}
