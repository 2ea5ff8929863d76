//! Index catalog (spec.md §4.10): `index_catalog(index_name, table_name,
//! field_name)`. [`IndexInfo`] binds a catalog row to the schema and stats
//! needed to cost a plan and to actually open the index.

use std::rc::Rc;

use crate::error::Result;
use crate::index::{BTreeIndex, HashIndex, Index, IndexKind};
use crate::record::schema::FieldType;
use crate::record::{Layout, Schema, TableScan};
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;

use super::stat_mgr::{StatInfo, StatManager};
use super::table_mgr::{TableManager, MAX_NAME};

pub struct IndexInfo {
    index_name: String,
    field_name: String,
    kind: IndexKind,
    table_schema: Schema,
    index_layout: Rc<Layout>,
    stats: StatInfo,
}

impl IndexInfo {
    fn new(index_name: &str, field_name: &str, kind: IndexKind, table_schema: Schema, stats: StatInfo) -> Self {
        let field_type = table_schema.field_type(field_name);
        let index_layout = match kind {
            IndexKind::Hash => crate::index::hash_index::index_layout(field_type),
            IndexKind::BTree => btree_index_layout(field_type),
        };
        Self {
            index_name: index_name.to_string(),
            field_name: field_name.to_string(),
            kind,
            table_schema,
            index_layout,
            stats,
        }
    }

    pub fn open(&self, tx: TxHandle) -> Result<Box<dyn Index>> {
        match self.kind {
            IndexKind::Hash => Ok(Box::new(HashIndex::new(tx, &self.index_name, self.index_layout.clone()))),
            IndexKind::BTree => Ok(Box::new(BTreeIndex::new(
                tx,
                &self.index_name,
                self.table_schema.field_type(&self.field_name),
            )?)),
        }
    }

    pub fn blocks_accessed(&self) -> u64 {
        let rpb = self.index_layout.slot_size().max(1) as u64;
        match self.kind {
            IndexKind::Hash => HashIndex::search_cost(self.stats.blocks_accessed(), rpb),
            IndexKind::BTree => BTreeIndex::search_cost(self.stats.blocks_accessed(), rpb),
        }
    }

    pub fn records_output(&self) -> u64 {
        self.stats.records_output() / self.stats.distinct_values(&self.field_name)
    }

    pub fn distinct_values(&self, field_name: &str) -> u64 {
        if field_name == self.field_name {
            1
        } else {
            self.stats.distinct_values(field_name)
        }
    }
}

/// Mirrors `super::super::index::btree_index`'s private leaf-layout helper:
/// a B-tree index's on-disk layout is an implementation detail of the
/// index file, but callers costing a plan need its slot size.
fn btree_index_layout(field_type: FieldType) -> Rc<Layout> {
    let mut schema = Schema::new();
    schema.add_long_field("block");
    schema.add_int_field("id");
    match field_type {
        FieldType::Integer => schema.add_int_field("dataval"),
        FieldType::Short => schema.add_short_field("dataval"),
        FieldType::Long => schema.add_long_field("dataval"),
        FieldType::Varchar(len) => schema.add_string_field("dataval", len),
        FieldType::Boolean => schema.add_boolean_field("dataval"),
        FieldType::Date => schema.add_date_field("dataval"),
    }
    Rc::new(Layout::from_schema_no_flag(schema))
}

pub struct IndexManager {
    table_mgr: Rc<TableManager>,
    layout: Rc<Layout>,
    kind: IndexKind,
}

impl IndexManager {
    pub fn new(is_new: bool, table_mgr: Rc<TableManager>, kind: IndexKind, tx: TxHandle) -> Result<Self> {
        if is_new {
            let mut schema = Schema::new();
            schema.add_string_field("index_name", MAX_NAME);
            schema.add_string_field("table_name", MAX_NAME);
            schema.add_string_field("field_name", MAX_NAME);
            table_mgr.create_table("index_catalog", &schema, tx.clone())?;
        }
        let layout = table_mgr.get_layout("index_catalog", tx)?;
        Ok(Self { table_mgr, layout, kind })
    }

    pub fn create_index(&self, index_name: &str, table_name: &str, field_name: &str, tx: TxHandle) -> Result<()> {
        let mut scan = TableScan::new(tx, "index_catalog", self.layout.clone())?;
        scan.insert()?;
        scan.set_string("index_name", index_name)?;
        scan.set_string("table_name", table_name)?;
        scan.set_string("field_name", field_name)?;
        Ok(())
    }

    /// Every index defined on `table_name`, keyed by field name (spec.md
    /// §4.10: `IndexUpdatePlanner` consults this to keep indexes current).
    pub fn get_index_info(
        &self,
        table_name: &str,
        stat_mgr: &StatManager,
        tx: TxHandle,
    ) -> Result<std::collections::HashMap<String, IndexInfo>> {
        let mut result = std::collections::HashMap::new();
        let table_schema = self.table_mgr.get_layout(table_name, tx.clone())?.schema().clone();
        let table_layout = self.table_mgr.get_layout(table_name, tx.clone())?;
        let stats = stat_mgr.get_stat_info(table_name, &table_layout, tx.clone())?;

        let mut scan = TableScan::new(tx, "index_catalog", self.layout.clone())?;
        scan.before_first()?;
        while scan.next()? {
            if scan.get_string("table_name")? == table_name {
                let index_name = scan.get_string("index_name")?;
                let field_name = scan.get_string("field_name")?;
                let info = IndexInfo::new(&index_name, &field_name, self.kind, table_schema.clone(), stats.clone());
                result.insert(field_name, info);
            }
        }
        Ok(result)
    }
}
