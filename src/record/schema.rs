//! Schema: an ordered list of named, typed fields (spec.md §3).

use std::collections::HashMap;

use crate::file::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Short,
    Long,
    Varchar(usize),
    Boolean,
    Date,
}

impl FieldType {
    /// Bytes a field of this type occupies within a slot, including a
    /// varchar's length prefix.
    pub fn byte_length(&self) -> usize {
        match self {
            FieldType::Integer => 4,
            FieldType::Short => 2,
            FieldType::Long => 8,
            FieldType::Boolean => 1,
            FieldType::Date => 8,
            FieldType::Varchar(len) => Page::max_length(*len),
        }
    }
}

#[derive(Debug, Clone)]
struct FieldInfo {
    ftype: FieldType,
}

/// An ordered field list plus per-field type info. Field order is
/// significant: it drives slot layout and `SELECT *` column order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<String>,
    info: HashMap<String, FieldInfo>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_field(&mut self, name: &str, ftype: FieldType) {
        if !self.info.contains_key(name) {
            self.fields.push(name.to_string());
        }
        self.info.insert(name.to_string(), FieldInfo { ftype });
    }

    pub fn add_int_field(&mut self, name: &str) {
        self.add_field(name, FieldType::Integer);
    }
    pub fn add_short_field(&mut self, name: &str) {
        self.add_field(name, FieldType::Short);
    }
    pub fn add_long_field(&mut self, name: &str) {
        self.add_field(name, FieldType::Long);
    }
    pub fn add_string_field(&mut self, name: &str, length: usize) {
        self.add_field(name, FieldType::Varchar(length));
    }
    pub fn add_boolean_field(&mut self, name: &str) {
        self.add_field(name, FieldType::Boolean);
    }
    pub fn add_date_field(&mut self, name: &str) {
        self.add_field(name, FieldType::Date);
    }

    /// Adds a field of an arbitrary type directly, for callers (like
    /// `GroupByPlan`) synthesizing a field whose type isn't known until
    /// runtime.
    pub fn add_typed_field(&mut self, name: &str, ftype: FieldType) {
        self.add_field(name, ftype);
    }

    /// Copies one field's type definition from another schema.
    pub fn add(&mut self, name: &str, other: &Schema) {
        let ftype = other.field_type(name);
        self.add_field(name, ftype);
    }

    pub fn add_all(&mut self, other: &Schema) {
        for name in &other.fields {
            self.add(name, other);
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.info.contains_key(name)
    }

    pub fn field_type(&self, name: &str) -> FieldType {
        self.info
            .get(name)
            .unwrap_or_else(|| panic!("unknown field '{}'", name))
            .ftype
    }

    pub fn length(&self, name: &str) -> usize {
        match self.field_type(name) {
            FieldType::Varchar(len) => len,
            _ => 0,
        }
    }
}
