//! Leaf plan over one catalog-registered table (spec.md §4.13): statistics
//! come straight from `StatManager`, nothing is estimated here.

use std::rc::Rc;

use crate::error::Result;
use crate::metadata::{MetadataManager, StatInfo};
use crate::record::{Layout, Schema, TableScan};
use crate::scan::Scan;
use crate::tx::TxHandle;

use super::Plan;

pub struct TablePlan {
    table_name: String,
    tx: TxHandle,
    layout: Rc<Layout>,
    stats: StatInfo,
}

impl TablePlan {
    pub fn new(table_name: &str, tx: TxHandle, mdm: &MetadataManager) -> Result<Self> {
        let layout = mdm.get_layout(table_name, tx.clone())?;
        let stats = mdm.get_stat_info(table_name, &layout, tx.clone())?;
        Ok(Self {
            table_name: table_name.to_string(),
            tx,
            layout,
            stats,
        })
    }
}

impl TablePlan {
    pub fn tx(&self) -> TxHandle {
        self.tx.clone()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn layout(&self) -> &Rc<Layout> {
        &self.layout
    }
}

impl Plan for TablePlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        Ok(Box::new(TableScan::new(self.tx.clone(), &self.table_name, self.layout.clone())?))
    }

    fn blocks_accessed(&self) -> u64 {
        self.stats.blocks_accessed()
    }

    fn records_output(&self) -> u64 {
        self.stats.records_output()
    }

    fn distinct_values(&self, field: &str) -> u64 {
        self.stats.distinct_values(field)
    }

    fn schema(&self) -> &Schema {
        self.layout.schema()
    }
}
