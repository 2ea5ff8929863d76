//! Cross product of two scans (spec.md §4.12). `next` advances the right
//! side; once it's exhausted, the right side resets and the left side
//! advances one row.

use crate::error::{Error, Result};
use crate::record::Value;
use crate::scan::Scan;

pub struct ProductScan {
    lhs: Box<dyn Scan>,
    rhs: Box<dyn Scan>,
}

impl ProductScan {
    pub fn new(lhs: Box<dyn Scan>, rhs: Box<dyn Scan>) -> Result<Self> {
        let mut scan = Self { lhs, rhs };
        scan.before_first()?;
        Ok(scan)
    }

    fn field_owner(&self, field: &str) -> Result<&dyn Scan> {
        if self.lhs.has_field(field) {
            Ok(self.lhs.as_ref())
        } else if self.rhs.has_field(field) {
            Ok(self.rhs.as_ref())
        } else {
            Err(Error::logic(format!("field '{}' is not part of this product", field)))
        }
    }
}

impl Scan for ProductScan {
    fn before_first(&mut self) -> Result<()> {
        self.lhs.before_first()?;
        self.lhs.next()?;
        self.rhs.before_first()
    }

    fn next(&mut self) -> Result<bool> {
        if self.rhs.next()? {
            return Ok(true);
        }
        self.rhs.before_first()?;
        Ok(self.rhs.next()? && self.lhs.next()?)
    }

    fn get_int(&mut self, field: &str) -> Result<i32> {
        if self.lhs.has_field(field) { self.lhs.get_int(field) } else { self.rhs.get_int(field) }
    }
    fn get_short(&mut self, field: &str) -> Result<i16> {
        if self.lhs.has_field(field) { self.lhs.get_short(field) } else { self.rhs.get_short(field) }
    }
    fn get_long(&mut self, field: &str) -> Result<i64> {
        if self.lhs.has_field(field) { self.lhs.get_long(field) } else { self.rhs.get_long(field) }
    }
    fn get_string(&mut self, field: &str) -> Result<String> {
        if self.lhs.has_field(field) { self.lhs.get_string(field) } else { self.rhs.get_string(field) }
    }
    fn get_bool(&mut self, field: &str) -> Result<bool> {
        if self.lhs.has_field(field) { self.lhs.get_bool(field) } else { self.rhs.get_bool(field) }
    }
    fn get_date(&mut self, field: &str) -> Result<i64> {
        if self.lhs.has_field(field) { self.lhs.get_date(field) } else { self.rhs.get_date(field) }
    }
    fn get_val(&mut self, field: &str) -> Result<Value> {
        if self.lhs.has_field(field) { self.lhs.get_val(field) } else { self.rhs.get_val(field) }
    }

    fn has_field(&self, field: &str) -> bool {
        self.field_owner(field).is_ok()
    }
}
