//! Executes `INSERT`/`DELETE`/`UPDATE`/`CREATE ...` statements (spec.md
//! §4.13). Unlike `QueryPlanner`, these never build a `plan`/`Scan` tree:
//! `SelectScan`/`ProjectScan` only implement `Scan`, not `UpdateScan`, so
//! mutation goes straight through a `TableScan` instead.

use std::rc::Rc;

use crate::error::Result;
use crate::metadata::MetadataManager;
use crate::parse::{CreateIndexData, CreateTableData, CreateViewData, DeleteData, InsertData, ModifyData};
use crate::record::{Schema, TableScan};
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;

pub trait UpdatePlanner {
    fn execute_insert(&self, data: InsertData, tx: TxHandle) -> Result<u64>;
    fn execute_delete(&self, data: DeleteData, tx: TxHandle) -> Result<u64>;
    fn execute_modify(&self, data: ModifyData, tx: TxHandle) -> Result<u64>;
    fn execute_create_table(&self, data: CreateTableData, tx: TxHandle) -> Result<u64>;
    fn execute_create_view(&self, data: CreateViewData, tx: TxHandle) -> Result<u64>;
    fn execute_create_index(&self, data: CreateIndexData, tx: TxHandle) -> Result<u64>;
}

fn schema_from_fields(data: &CreateTableData) -> Schema {
    let mut schema = Schema::new();
    for field in &data.fields {
        schema.add_typed_field(&field.name, field.ftype);
    }
    schema
}

/// No index maintenance: inserts/deletes/modifies only ever touch the
/// heap file.
pub struct BasicUpdatePlanner {
    mdm: Rc<MetadataManager>,
}

impl BasicUpdatePlanner {
    pub fn new(mdm: Rc<MetadataManager>) -> Self {
        Self { mdm }
    }
}

impl UpdatePlanner for BasicUpdatePlanner {
    fn execute_insert(&self, data: InsertData, tx: TxHandle) -> Result<u64> {
        let layout = self.mdm.get_layout(&data.table, tx.clone())?;
        let mut ts = TableScan::new(tx, &data.table, layout)?;
        ts.insert()?;
        for (field, value) in data.fields.into_iter().zip(data.values.into_iter()) {
            ts.set_val(&field, value)?;
        }
        Ok(1)
    }

    fn execute_delete(&self, data: DeleteData, tx: TxHandle) -> Result<u64> {
        let layout = self.mdm.get_layout(&data.table, tx.clone())?;
        let mut ts = TableScan::new(tx, &data.table, layout)?;
        ts.before_first()?;
        let mut count = 0;
        while ts.next()? {
            if data.pred.is_satisfied(&mut ts)? {
                ts.delete()?;
                count += 1;
            }
        }
        Ok(count)
    }

    fn execute_modify(&self, data: ModifyData, tx: TxHandle) -> Result<u64> {
        let layout = self.mdm.get_layout(&data.table, tx.clone())?;
        let mut ts = TableScan::new(tx, &data.table, layout)?;
        ts.before_first()?;
        let mut count = 0;
        while ts.next()? {
            if data.pred.is_satisfied(&mut ts)? {
                let new_val = data.new_value.evaluate(&mut ts)?;
                ts.set_val(&data.field, new_val)?;
                count += 1;
            }
        }
        Ok(count)
    }

    fn execute_create_table(&self, data: CreateTableData, tx: TxHandle) -> Result<u64> {
        let schema = schema_from_fields(&data);
        self.mdm.create_table(&data.table, &schema, tx)?;
        Ok(0)
    }

    fn execute_create_view(&self, data: CreateViewData, tx: TxHandle) -> Result<u64> {
        self.mdm.create_view(&data.view, &data.query.to_string(), tx)?;
        Ok(0)
    }

    fn execute_create_index(&self, data: CreateIndexData, tx: TxHandle) -> Result<u64> {
        self.mdm.create_index(&data.index, &data.table, &data.field, tx)?;
        Ok(0)
    }
}

/// Keeps every index on a table consistent with its heap records as they
/// change (spec.md §8.5): `CREATE TABLE`/`VIEW`/`INDEX` need no index
/// maintenance of their own, so those three delegate to `BasicUpdatePlanner`.
pub struct IndexUpdatePlanner {
    mdm: Rc<MetadataManager>,
    basic: BasicUpdatePlanner,
}

impl IndexUpdatePlanner {
    pub fn new(mdm: Rc<MetadataManager>) -> Self {
        let basic = BasicUpdatePlanner::new(mdm.clone());
        Self { mdm, basic }
    }
}

impl UpdatePlanner for IndexUpdatePlanner {
    fn execute_insert(&self, data: InsertData, tx: TxHandle) -> Result<u64> {
        let layout = self.mdm.get_layout(&data.table, tx.clone())?;
        let mut ts = TableScan::new(tx.clone(), &data.table, layout)?;
        ts.insert()?;
        let rid = ts.get_record_id();
        let indexes = self.mdm.get_index_info(&data.table, tx.clone())?;
        for (field, value) in data.fields.into_iter().zip(data.values.into_iter()) {
            ts.set_val(&field, value.clone())?;
            if let Some(info) = indexes.get(&field) {
                let mut idx = info.open(tx.clone())?;
                idx.insert(&value, rid)?;
            }
        }
        Ok(1)
    }

    fn execute_delete(&self, data: DeleteData, tx: TxHandle) -> Result<u64> {
        let layout = self.mdm.get_layout(&data.table, tx.clone())?;
        let mut ts = TableScan::new(tx.clone(), &data.table, layout)?;
        let indexes = self.mdm.get_index_info(&data.table, tx.clone())?;
        ts.before_first()?;
        let mut count = 0;
        while ts.next()? {
            if data.pred.is_satisfied(&mut ts)? {
                let rid = ts.get_record_id();
                for (field, info) in &indexes {
                    let val = ts.get_val(field)?;
                    let mut idx = info.open(tx.clone())?;
                    idx.delete(&val, rid)?;
                }
                ts.delete()?;
                count += 1;
            }
        }
        Ok(count)
    }

    fn execute_modify(&self, data: ModifyData, tx: TxHandle) -> Result<u64> {
        let layout = self.mdm.get_layout(&data.table, tx.clone())?;
        let mut ts = TableScan::new(tx.clone(), &data.table, layout)?;
        let indexes = self.mdm.get_index_info(&data.table, tx.clone())?;
        let modified_index = indexes.get(&data.field);
        ts.before_first()?;
        let mut count = 0;
        while ts.next()? {
            if data.pred.is_satisfied(&mut ts)? {
                let new_val = data.new_value.evaluate(&mut ts)?;
                let rid = ts.get_record_id();
                if let Some(info) = modified_index {
                    let old_val = ts.get_val(&data.field)?;
                    let mut idx = info.open(tx.clone())?;
                    idx.delete(&old_val, rid)?;
                    idx.insert(&new_val, rid)?;
                }
                ts.set_val(&data.field, new_val)?;
                count += 1;
            }
        }
        Ok(count)
    }

    fn execute_create_table(&self, data: CreateTableData, tx: TxHandle) -> Result<u64> {
        self.basic.execute_create_table(data, tx)
    }

    fn execute_create_view(&self, data: CreateViewData, tx: TxHandle) -> Result<u64> {
        self.basic.execute_create_view(data, tx)
    }

    fn execute_create_index(&self, data: CreateIndexData, tx: TxHandle) -> Result<u64> {
        self.basic.execute_create_index(data, tx)
    }
}
