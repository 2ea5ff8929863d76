//! Aggregation functions used by `GROUP BY` (spec.md §4.12). Each
//! aggregator is fed the rows of one group via `process_first`/
//! `process_next` and then exposes a single derived value and field name.

use std::fmt;

use crate::error::Result;
use crate::record::Value;
use crate::scan::Scan;

pub trait Aggregator {
    fn process_first(&mut self, scan: &mut dyn Scan) -> Result<()>;
    fn process_next(&mut self, scan: &mut dyn Scan) -> Result<()>;
    fn field_name(&self) -> String;
    fn value(&self) -> Value;
}

/// Names an aggregate function and its argument field without holding any
/// running state, so a fresh [`Aggregator`] can be instantiated per group
/// (spec.md §4.12 `GroupByScan`).
#[derive(Debug, Clone)]
pub enum AggregateSpec {
    Max(String),
    Min(String),
    Count(String),
    Sum(String),
    Avg(String),
}

impl AggregateSpec {
    pub fn field_name(&self) -> String {
        match self {
            AggregateSpec::Max(f) => format!("maxof{}", f),
            AggregateSpec::Min(f) => format!("minof{}", f),
            AggregateSpec::Count(f) => format!("countof{}", f),
            AggregateSpec::Sum(f) => format!("sumof{}", f),
            AggregateSpec::Avg(f) => format!("avgof{}", f),
        }
    }

    pub fn instantiate(&self) -> Box<dyn Aggregator> {
        match self {
            AggregateSpec::Max(f) => Box::new(MaxFn::new(f)),
            AggregateSpec::Min(f) => Box::new(MinFn::new(f)),
            AggregateSpec::Count(f) => Box::new(CountFn::new(f)),
            AggregateSpec::Sum(f) => Box::new(SumFn::new(f)),
            AggregateSpec::Avg(f) => Box::new(AvgFn::new(f)),
        }
    }
}

impl fmt::Display for AggregateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, field) = match self {
            AggregateSpec::Max(field) => ("max", field),
            AggregateSpec::Min(field) => ("min", field),
            AggregateSpec::Count(field) => ("count", field),
            AggregateSpec::Sum(field) => ("sum", field),
            AggregateSpec::Avg(field) => ("avg", field),
        };
        write!(f, "{}({})", name, field)
    }
}

pub struct MaxFn {
    field: String,
    current: Option<Value>,
}

impl MaxFn {
    pub fn new(field: &str) -> Self {
        Self { field: field.to_string(), current: None }
    }
}

impl Aggregator for MaxFn {
    fn process_first(&mut self, scan: &mut dyn Scan) -> Result<()> {
        self.current = Some(scan.get_val(&self.field)?);
        Ok(())
    }

    fn process_next(&mut self, scan: &mut dyn Scan) -> Result<()> {
        let candidate = scan.get_val(&self.field)?;
        if candidate.partial_cmp(self.current.as_ref().unwrap()) == Some(std::cmp::Ordering::Greater) {
            self.current = Some(candidate);
        }
        Ok(())
    }

    fn field_name(&self) -> String {
        format!("maxof{}", self.field)
    }

    fn value(&self) -> Value {
        self.current.clone().expect("process_first not called")
    }
}

pub struct MinFn {
    field: String,
    current: Option<Value>,
}

impl MinFn {
    pub fn new(field: &str) -> Self {
        Self { field: field.to_string(), current: None }
    }
}

impl Aggregator for MinFn {
    fn process_first(&mut self, scan: &mut dyn Scan) -> Result<()> {
        self.current = Some(scan.get_val(&self.field)?);
        Ok(())
    }

    fn process_next(&mut self, scan: &mut dyn Scan) -> Result<()> {
        let candidate = scan.get_val(&self.field)?;
        if candidate.partial_cmp(self.current.as_ref().unwrap()) == Some(std::cmp::Ordering::Less) {
            self.current = Some(candidate);
        }
        Ok(())
    }

    fn field_name(&self) -> String {
        format!("minof{}", self.field)
    }

    fn value(&self) -> Value {
        self.current.clone().expect("process_first not called")
    }
}

pub struct CountFn {
    field: String,
    count: i64,
}

impl CountFn {
    pub fn new(field: &str) -> Self {
        Self { field: field.to_string(), count: 0 }
    }
}

impl Aggregator for CountFn {
    fn process_first(&mut self, _scan: &mut dyn Scan) -> Result<()> {
        self.count = 1;
        Ok(())
    }

    fn process_next(&mut self, _scan: &mut dyn Scan) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn field_name(&self) -> String {
        format!("countof{}", self.field)
    }

    fn value(&self) -> Value {
        Value::Long(self.count)
    }
}

fn as_i64(val: &Value) -> i64 {
    match val {
        Value::Int(v) => *v as i64,
        Value::Short(v) => *v as i64,
        Value::Long(v) => *v,
        _ => panic!("SUM/AVG require a numeric field"),
    }
}

pub struct SumFn {
    field: String,
    sum: i64,
}

impl SumFn {
    pub fn new(field: &str) -> Self {
        Self { field: field.to_string(), sum: 0 }
    }
}

impl Aggregator for SumFn {
    fn process_first(&mut self, scan: &mut dyn Scan) -> Result<()> {
        self.sum = as_i64(&scan.get_val(&self.field)?);
        Ok(())
    }

    fn process_next(&mut self, scan: &mut dyn Scan) -> Result<()> {
        self.sum = self.sum.wrapping_add(as_i64(&scan.get_val(&self.field)?));
        Ok(())
    }

    fn field_name(&self) -> String {
        format!("sumof{}", self.field)
    }

    fn value(&self) -> Value {
        Value::Long(self.sum)
    }
}

pub struct AvgFn {
    field: String,
    sum: i64,
    count: i64,
}

impl AvgFn {
    pub fn new(field: &str) -> Self {
        Self { field: field.to_string(), sum: 0, count: 0 }
    }
}

impl Aggregator for AvgFn {
    fn process_first(&mut self, scan: &mut dyn Scan) -> Result<()> {
        self.sum = as_i64(&scan.get_val(&self.field)?);
        self.count = 1;
        Ok(())
    }

    fn process_next(&mut self, scan: &mut dyn Scan) -> Result<()> {
        self.sum = self.sum.wrapping_add(as_i64(&scan.get_val(&self.field)?));
        self.count += 1;
        Ok(())
    }

    fn field_name(&self) -> String {
        format!("avgof{}", self.field)
    }

    fn value(&self) -> Value {
        Value::Long(self.sum / self.count.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Layout, Schema, TableScan};
    use crate::scan::UpdateScan;
    use crate::tx::TxHandle;
    use std::rc::Rc;

    fn scan_with_values(tx: TxHandle, values: &[i32]) -> TableScan {
        let mut schema = Schema::new();
        schema.add_int_field("n");
        let layout = Rc::new(Layout::from_schema(schema));
        let mut ts = TableScan::new(tx, "agg_test", layout).unwrap();
        for v in values {
            ts.insert().unwrap();
            ts.set_int("n", *v).unwrap();
        }
        ts.before_first().unwrap();
        ts
    }

    fn new_tx(tag: &str) -> TxHandle {
        use crate::buffer::BufferManager;
        use crate::concurrency::LockTable;
        use crate::file::FileManager;
        use crate::tx::Transaction;
        use crate::wal::LogManager;
        use std::cell::RefCell;
        use std::sync::{Arc, Mutex};
        use std::time::Duration;

        let dir = crate::test_support::fresh_dir(tag);
        let fm = Arc::new(FileManager::new(&dir, 400).unwrap());
        let lm = Arc::new(Mutex::new(LogManager::new(fm.clone(), "t.log").unwrap()));
        let bm = Arc::new(BufferManager::new(fm.clone(), lm.clone(), 8, Duration::from_millis(300)));
        let lt = Arc::new(LockTable::new(Duration::from_millis(300)));
        Rc::new(RefCell::new(Transaction::new(fm, lm, bm, lt).unwrap()))
    }

    #[test]
    fn sum_count_avg_agree_over_a_small_group() {
        let tx = new_tx("aggregate_basic");
        let mut ts = scan_with_values(tx, &[3, 5, 10]);

        let mut sum = SumFn::new("n");
        let mut count = CountFn::new("n");
        let mut avg = AvgFn::new("n");

        ts.next().unwrap();
        sum.process_first(&mut ts).unwrap();
        count.process_first(&mut ts).unwrap();
        avg.process_first(&mut ts).unwrap();
        while ts.next().unwrap() {
            sum.process_next(&mut ts).unwrap();
            count.process_next(&mut ts).unwrap();
            avg.process_next(&mut ts).unwrap();
        }

        assert_eq!(sum.value(), Value::Long(18));
        assert_eq!(count.value(), Value::Long(3));
        assert_eq!(avg.value(), Value::Long(6));
    }

    #[test]
    fn max_and_min_track_the_extremes() {
        let tx = new_tx("aggregate_minmax");
        let mut ts = scan_with_values(tx, &[7, 1, 9, 4]);

        let mut max = MaxFn::new("n");
        let mut min = MinFn::new("n");
        ts.next().unwrap();
        max.process_first(&mut ts).unwrap();
        min.process_first(&mut ts).unwrap();
        while ts.next().unwrap() {
            max.process_next(&mut ts).unwrap();
            min.process_next(&mut ts).unwrap();
        }

        assert_eq!(max.value(), Value::Int(9));
        assert_eq!(min.value(), Value::Int(1));
    }
}
