//! Filters an underlying scan by a predicate (spec.md §4.12).

use crate::error::Result;
use crate::record::Value;
use crate::scan::Scan;

use super::predicate::Predicate;

pub struct SelectScan {
    input: Box<dyn Scan>,
    pred: Predicate,
}

impl SelectScan {
    pub fn new(input: Box<dyn Scan>, pred: Predicate) -> Self {
        Self { input, pred }
    }
}

impl Scan for SelectScan {
    fn before_first(&mut self) -> Result<()> {
        self.input.before_first()
    }

    fn next(&mut self) -> Result<bool> {
        while self.input.next()? {
            if self.pred.is_satisfied(self.input.as_mut())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get_int(&mut self, field: &str) -> Result<i32> {
        self.input.get_int(field)
    }
    fn get_short(&mut self, field: &str) -> Result<i16> {
        self.input.get_short(field)
    }
    fn get_long(&mut self, field: &str) -> Result<i64> {
        self.input.get_long(field)
    }
    fn get_string(&mut self, field: &str) -> Result<String> {
        self.input.get_string(field)
    }
    fn get_bool(&mut self, field: &str) -> Result<bool> {
        self.input.get_bool(field)
    }
    fn get_date(&mut self, field: &str) -> Result<i64> {
        self.input.get_date(field)
    }
    fn get_val(&mut self, field: &str) -> Result<Value> {
        self.input.get_val(field)
    }
    fn has_field(&self, field: &str) -> bool {
        self.input.has_field(field)
    }
}
