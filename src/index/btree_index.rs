//! Top-level B-tree index API (spec.md §4.9.2): wires `BTreeDir`/`BTreeLeaf`
//! together behind the common [`Index`] contract.

use std::rc::Rc;

use crate::error::Result;
use crate::file::BlockId;
use crate::record::schema::FieldType;
use crate::record::{Layout, Rid, Schema, Value};
use crate::tx::TxHandle;
use crate::util::arith::ilog_floor;

use super::btree::dir::BTreeDir;
use super::btree::dir_entry::DirEntry;
use super::btree::leaf::BTreeLeaf;
use super::btree::page::BTPage;
use super::index::Index;

fn leaf_layout(field_type: FieldType) -> Rc<Layout> {
    let mut schema = Schema::new();
    schema.add_long_field("block");
    schema.add_int_field("id");
    add_dataval(&mut schema, field_type);
    Rc::new(Layout::from_schema_no_flag(schema))
}

fn dir_layout(field_type: FieldType) -> Rc<Layout> {
    let mut schema = Schema::new();
    schema.add_long_field("block");
    add_dataval(&mut schema, field_type);
    Rc::new(Layout::from_schema_no_flag(schema))
}

fn add_dataval(schema: &mut Schema, field_type: FieldType) {
    match field_type {
        FieldType::Integer => schema.add_int_field("dataval"),
        FieldType::Short => schema.add_short_field("dataval"),
        FieldType::Long => schema.add_long_field("dataval"),
        FieldType::Varchar(len) => schema.add_string_field("dataval", len),
        FieldType::Boolean => schema.add_boolean_field("dataval"),
        FieldType::Date => schema.add_date_field("dataval"),
    }
}

pub struct BTreeIndex {
    tx: TxHandle,
    dir_table: String,
    leaf_table: String,
    dir_layout: Rc<Layout>,
    leaf_layout: Rc<Layout>,
    leaf: Option<BTreeLeaf>,
}

impl BTreeIndex {
    pub fn new(tx: TxHandle, index_name: &str, field_type: FieldType) -> Result<Self> {
        let dir_table = format!("{}_directory", index_name);
        let leaf_table = format!("{}_leaf", index_name);
        let dl = dir_layout(field_type);
        let ll = leaf_layout(field_type);

        let leaf_file = format!("{}.tbl", leaf_table);
        if tx.borrow_mut().size(&leaf_file)? == 0 {
            let blk = tx.borrow_mut().append(&leaf_file)?;
            let mut page = BTPage::new(tx.clone(), blk, ll.clone())?;
            page.format_new(-1)?;
        }

        let dir_file = format!("{}.tbl", dir_table);
        if tx.borrow_mut().size(&dir_file)? == 0 {
            let blk = tx.borrow_mut().append(&dir_file)?;
            let mut page = BTPage::new(tx.clone(), blk, dl.clone())?;
            page.format_new(0)?;
            page.insert_dir(0, &Value::min_for(field_type), 0)?;
        }

        Ok(Self {
            tx,
            dir_table,
            leaf_table,
            dir_layout: dl,
            leaf_layout: ll,
            leaf: None,
        })
    }

    pub fn search_cost(num_blocks: u64, rpb: u64) -> u64 {
        1 + ilog_floor(num_blocks, rpb)
    }

    fn root_block(&self) -> BlockId {
        BlockId::new(self.dir_table.clone(), 0)
    }
}

impl Index for BTreeIndex {
    fn before_first(&mut self, search_key: &Value) -> Result<()> {
        self.leaf = None;
        let mut dir = BTreeDir::new(self.tx.clone(), &self.dir_table, self.dir_layout.clone(), self.root_block())?;
        let leaf_blk = dir.search(search_key)?;
        drop(dir);
        self.leaf = Some(BTreeLeaf::new(
            self.tx.clone(),
            &self.leaf_table,
            self.leaf_layout.clone(),
            leaf_blk,
            search_key.clone(),
        )?);
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        self.leaf.as_mut().expect("before_first not called").next()
    }

    fn get_data_rid(&mut self) -> Result<Rid> {
        self.leaf.as_mut().expect("before_first not called").get_data_rid()
    }

    fn insert(&mut self, val: &Value, rid: Rid) -> Result<()> {
        self.before_first(val)?;
        let split = self.leaf.as_mut().unwrap().insert(rid)?;
        self.leaf = None;
        if let Some(entry) = split {
            self.insert_into_directory(entry)?;
        }
        Ok(())
    }

    fn delete(&mut self, val: &Value, rid: Rid) -> Result<()> {
        self.before_first(val)?;
        self.leaf.as_mut().unwrap().delete(rid)?;
        self.leaf = None;
        Ok(())
    }
}

impl BTreeIndex {
    fn insert_into_directory(&mut self, entry: DirEntry) -> Result<()> {
        let mut dir = BTreeDir::new(self.tx.clone(), &self.dir_table, self.dir_layout.clone(), self.root_block())?;
        let bubbled = dir.insert(&entry)?;
        drop(dir);
        if let Some(root_entry) = bubbled {
            BTreeDir::make_new_root(self.tx.clone(), &self.dir_table, self.dir_layout.clone(), &root_entry)?;
        }
        Ok(())
    }
}
