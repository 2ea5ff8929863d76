//! Binds a [`Schema`] to byte offsets and a slot size (spec.md §3). Slot
//! layout is: one leading control int (0 = empty, 1 = in-use), then each
//! field in declaration order at its fixed offset.

use std::collections::HashMap;

use super::schema::Schema;

#[derive(Debug, Clone)]
pub struct Layout {
    schema: Schema,
    offsets: HashMap<String, usize>,
    slot_size: usize,
}

impl Layout {
    /// Computes offsets by walking the schema's fields in declaration
    /// order, starting right after the 4-byte control int.
    pub fn from_schema(schema: Schema) -> Self {
        let mut offsets = HashMap::new();
        let mut pos = 4;
        for name in schema.fields() {
            offsets.insert(name.clone(), pos);
            pos += schema.field_type(name).byte_length();
        }
        Self {
            schema,
            offsets,
            slot_size: pos,
        }
    }

    /// Like [`Layout::from_schema`], but without the leading 4-byte control
    /// int — used by the B-tree/hash index pages, whose "in use" bookkeeping
    /// is a page-level record count rather than a per-slot flag.
    pub fn from_schema_no_flag(schema: Schema) -> Self {
        let mut offsets = HashMap::new();
        let mut pos = 0;
        for name in schema.fields() {
            offsets.insert(name.clone(), pos);
            pos += schema.field_type(name).byte_length();
        }
        Self {
            schema,
            offsets,
            slot_size: pos,
        }
    }

    /// Reconstructs a layout from offsets already recorded in the catalog
    /// (used by `TableManager::get_layout`, which knows `slot_size` without
    /// recomputing it).
    pub fn new(schema: Schema, offsets: HashMap<String, usize>, slot_size: usize) -> Self {
        Self { schema, offsets, slot_size }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn offset(&self, field: &str) -> usize {
        *self
            .offsets
            .get(field)
            .unwrap_or_else(|| panic!("no offset recorded for field '{}'", field))
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }
}
