//! Groups by a field list, aggregating each group (spec.md §4.13). Wraps
//! its input in an internal `SortPlan` on the group fields so the resulting
//! `GroupByScan` can assume adjacent rows belong to the same group.

use crate::error::Result;
use crate::query::{AggregateSpec, GroupByScan, SortField};
use crate::record::{FieldType, Schema};
use crate::scan::Scan;
use crate::tx::TxHandle;

use super::sort_plan::SortPlan;
use super::Plan;

pub struct GroupByPlan {
    input: Box<dyn Plan>,
    group_fields: Vec<String>,
    agg_specs: Vec<AggregateSpec>,
    schema: Schema,
}

fn agg_field_type(spec: &AggregateSpec, input_schema: &Schema) -> FieldType {
    match spec {
        AggregateSpec::Max(f) | AggregateSpec::Min(f) => input_schema.field_type(f),
        AggregateSpec::Count(_) | AggregateSpec::Sum(_) | AggregateSpec::Avg(_) => FieldType::Long,
    }
}

impl GroupByPlan {
    pub fn new(input: Box<dyn Plan>, group_fields: Vec<String>, agg_specs: Vec<AggregateSpec>, tx: TxHandle) -> Self {
        let sort_fields = group_fields.iter().map(|f| SortField { field: f.clone(), desc: false }).collect();
        let mut schema = Schema::new();
        for field in &group_fields {
            schema.add(field, input.schema());
        }
        for spec in &agg_specs {
            schema.add_typed_field(&spec.field_name(), agg_field_type(spec, input.schema()));
        }
        let sorted = SortPlan::new(input, sort_fields, tx);
        Self {
            input: Box::new(sorted),
            group_fields,
            agg_specs,
            schema,
        }
    }
}

impl Plan for GroupByPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let scan = self.input.open()?;
        Ok(Box::new(GroupByScan::new(scan, self.group_fields.clone(), self.agg_specs.clone())?))
    }

    fn blocks_accessed(&self) -> u64 {
        self.input.blocks_accessed()
    }

    fn records_output(&self) -> u64 {
        self.group_fields.iter().map(|f| self.input.distinct_values(f)).product::<u64>().max(1)
    }

    fn distinct_values(&self, field: &str) -> u64 {
        if self.input.schema().has_field(field) {
            self.input.distinct_values(field)
        } else {
            self.records_output()
        }
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
