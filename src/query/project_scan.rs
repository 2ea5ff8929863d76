//! Restricts an underlying scan to a declared field list (spec.md §4.12).
//! Read-only: a projection drops information a caller would need to write
//! a record back, so unlike `SelectScan` it does not forward `UpdateScan`.

use crate::error::{Error, Result};
use crate::record::Value;
use crate::scan::Scan;

pub struct ProjectScan {
    input: Box<dyn Scan>,
    fields: Vec<String>,
}

impl ProjectScan {
    pub fn new(input: Box<dyn Scan>, fields: Vec<String>) -> Self {
        Self { input, fields }
    }

    fn check(&self, field: &str) -> Result<()> {
        if self.has_field(field) {
            Ok(())
        } else {
            Err(Error::logic(format!("field '{}' is not part of this projection", field)))
        }
    }
}

impl Scan for ProjectScan {
    fn before_first(&mut self) -> Result<()> {
        self.input.before_first()
    }

    fn next(&mut self) -> Result<bool> {
        self.input.next()
    }

    fn get_int(&mut self, field: &str) -> Result<i32> {
        self.check(field)?;
        self.input.get_int(field)
    }
    fn get_short(&mut self, field: &str) -> Result<i16> {
        self.check(field)?;
        self.input.get_short(field)
    }
    fn get_long(&mut self, field: &str) -> Result<i64> {
        self.check(field)?;
        self.input.get_long(field)
    }
    fn get_string(&mut self, field: &str) -> Result<String> {
        self.check(field)?;
        self.input.get_string(field)
    }
    fn get_bool(&mut self, field: &str) -> Result<bool> {
        self.check(field)?;
        self.input.get_bool(field)
    }
    fn get_date(&mut self, field: &str) -> Result<i64> {
        self.check(field)?;
        self.input.get_date(field)
    }
    fn get_val(&mut self, field: &str) -> Result<Value> {
        self.check(field)?;
        self.input.get_val(field)
    }

    fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}
