//! Groups a pre-sorted input by a set of fields and computes one row of
//! aggregates per group (spec.md §4.12). The input must already be sorted
//! on the group fields; `BasicQueryPlanner` arranges this with a `SortPlan`
//! before wrapping it here.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::record::Value;
use crate::scan::Scan;

use super::aggregate::{AggregateSpec, Aggregator};

pub struct GroupByScan {
    input: Box<dyn Scan>,
    group_fields: Vec<String>,
    agg_specs: Vec<AggregateSpec>,
    group_val: HashMap<String, Value>,
    agg_vals: HashMap<String, Value>,
    more_groups: bool,
}

impl GroupByScan {
    pub fn new(input: Box<dyn Scan>, group_fields: Vec<String>, agg_specs: Vec<AggregateSpec>) -> Result<Self> {
        let mut scan = Self {
            input,
            group_fields,
            agg_specs,
            group_val: HashMap::new(),
            agg_vals: HashMap::new(),
            more_groups: false,
        };
        scan.before_first()?;
        Ok(scan)
    }

    fn capture_group_val(&mut self) -> Result<HashMap<String, Value>> {
        let mut m = HashMap::new();
        for f in &self.group_fields {
            m.insert(f.clone(), self.input.get_val(f)?);
        }
        Ok(m)
    }

    fn val(&self, field: &str) -> Result<&Value> {
        self.group_val
            .get(field)
            .or_else(|| self.agg_vals.get(field))
            .ok_or_else(|| Error::logic(format!("field '{}' is not part of this grouping", field)))
    }
}

impl Scan for GroupByScan {
    fn before_first(&mut self) -> Result<()> {
        self.input.before_first()?;
        self.more_groups = self.input.next()?;
        self.group_val.clear();
        self.agg_vals.clear();
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        if !self.more_groups {
            return Ok(false);
        }

        let mut aggs: Vec<Box<dyn Aggregator>> = self.agg_specs.iter().map(|spec| spec.instantiate()).collect();
        for agg in aggs.iter_mut() {
            agg.process_first(self.input.as_mut())?;
        }
        self.group_val = self.capture_group_val()?;

        loop {
            self.more_groups = self.input.next()?;
            if !self.more_groups {
                break;
            }
            let candidate = self.capture_group_val()?;
            if candidate != self.group_val {
                break;
            }
            for agg in aggs.iter_mut() {
                agg.process_next(self.input.as_mut())?;
            }
        }

        self.agg_vals = aggs.iter().map(|a| (a.field_name(), a.value())).collect();
        Ok(true)
    }

    fn get_int(&mut self, field: &str) -> Result<i32> {
        match self.val(field)? {
            Value::Int(v) => Ok(*v),
            other => Err(Error::logic(format!("field '{}' is not an int ({:?})", field, other))),
        }
    }
    fn get_short(&mut self, field: &str) -> Result<i16> {
        match self.val(field)? {
            Value::Short(v) => Ok(*v),
            other => Err(Error::logic(format!("field '{}' is not a short ({:?})", field, other))),
        }
    }
    fn get_long(&mut self, field: &str) -> Result<i64> {
        match self.val(field)? {
            Value::Long(v) => Ok(*v),
            other => Err(Error::logic(format!("field '{}' is not a long ({:?})", field, other))),
        }
    }
    fn get_string(&mut self, field: &str) -> Result<String> {
        match self.val(field)? {
            Value::Varchar(v) => Ok(v.clone()),
            other => Err(Error::logic(format!("field '{}' is not a varchar ({:?})", field, other))),
        }
    }
    fn get_bool(&mut self, field: &str) -> Result<bool> {
        match self.val(field)? {
            Value::Boolean(v) => Ok(*v),
            other => Err(Error::logic(format!("field '{}' is not a bool ({:?})", field, other))),
        }
    }
    fn get_date(&mut self, field: &str) -> Result<i64> {
        match self.val(field)? {
            Value::Date(v) => Ok(*v),
            other => Err(Error::logic(format!("field '{}' is not a date ({:?})", field, other))),
        }
    }
    fn get_val(&mut self, field: &str) -> Result<Value> {
        self.val(field).cloned()
    }

    fn has_field(&self, field: &str) -> bool {
        self.group_fields.iter().any(|f| f == field) || self.agg_specs.iter().any(|a| a.field_name() == field)
    }
}
