//! L4: the catalog (spec.md §4.10). [`MetadataManager`] fronts four
//! sub-managers that each own one system table, all bootstrapped together
//! the first time a database is opened.

pub mod index_mgr;
pub mod stat_mgr;
pub mod table_mgr;
pub mod view_mgr;

use std::rc::Rc;

use crate::error::Result;
use crate::index::IndexKind;
use crate::record::{Layout, Schema};
use crate::tx::TxHandle;

pub use index_mgr::{IndexInfo, IndexManager};
pub use stat_mgr::{StatInfo, StatManager};
pub use table_mgr::TableManager;
pub use view_mgr::ViewManager;

pub struct MetadataManager {
    table_mgr: Rc<TableManager>,
    view_mgr: ViewManager,
    stat_mgr: StatManager,
    index_mgr: IndexManager,
}

impl MetadataManager {
    pub fn new(is_new: bool, index_kind: IndexKind, tx: TxHandle) -> Result<Self> {
        let table_mgr = Rc::new(TableManager::new(is_new, tx.clone())?);
        let view_mgr = ViewManager::new(is_new, table_mgr.clone(), tx.clone())?;
        let stat_mgr = StatManager::new(table_mgr.clone(), tx.clone())?;
        let index_mgr = IndexManager::new(is_new, table_mgr.clone(), index_kind, tx)?;
        Ok(Self {
            table_mgr,
            view_mgr,
            stat_mgr,
            index_mgr,
        })
    }

    pub fn create_table(&self, table_name: &str, schema: &Schema, tx: TxHandle) -> Result<()> {
        self.table_mgr.create_table(table_name, schema, tx)
    }

    pub fn get_layout(&self, table_name: &str, tx: TxHandle) -> Result<Rc<Layout>> {
        self.table_mgr.get_layout(table_name, tx)
    }

    pub fn create_view(&self, view_name: &str, view_def: &str, tx: TxHandle) -> Result<()> {
        self.view_mgr.create_view(view_name, view_def, tx)
    }

    pub fn get_view_def(&self, view_name: &str, tx: TxHandle) -> Result<Option<String>> {
        self.view_mgr.get_view_def(view_name, tx)
    }

    pub fn create_index(&self, index_name: &str, table_name: &str, field_name: &str, tx: TxHandle) -> Result<()> {
        self.index_mgr.create_index(index_name, table_name, field_name, tx)
    }

    pub fn get_index_info(&self, table_name: &str, tx: TxHandle) -> Result<std::collections::HashMap<String, IndexInfo>> {
        self.index_mgr.get_index_info(table_name, &self.stat_mgr, tx)
    }

    pub fn get_stat_info(&self, table_name: &str, layout: &Layout, tx: TxHandle) -> Result<StatInfo> {
        self.stat_mgr.get_stat_info(table_name, layout, tx)
    }
}
