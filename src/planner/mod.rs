//! Turns parsed SQL into something runnable: `query_planner` builds a
//! `plan` tree for `SELECT`, `update_planner` executes everything else
//! directly. [`Planner`] is the facade a caller actually talks to.

pub mod query_planner;
pub mod update_planner;

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::metadata::MetadataManager;
use crate::parse::{Parser as SqlParser, Statement};
use crate::plan::Plan;
use crate::tx::TxHandle;

pub use query_planner::{BasicQueryPlanner, QueryPlanner};
pub use update_planner::{BasicUpdatePlanner, IndexUpdatePlanner, UpdatePlanner};

pub struct Planner {
    query_planner: Box<dyn QueryPlanner>,
    update_planner: Box<dyn UpdatePlanner>,
}

impl Planner {
    pub fn new(query_planner: Box<dyn QueryPlanner>, update_planner: Box<dyn UpdatePlanner>) -> Self {
        Self { query_planner, update_planner }
    }

    /// Wires up the catalog-aware query planner and the index-maintaining
    /// update planner, the combination `Database::open` actually uses.
    pub fn with_indexing(mdm: Rc<MetadataManager>) -> Self {
        Self::new(Box::new(BasicQueryPlanner::new(mdm.clone())), Box::new(IndexUpdatePlanner::new(mdm)))
    }

    pub fn create_query_plan(&self, sql: &str, tx: TxHandle) -> Result<Box<dyn Plan>> {
        match SqlParser::parse(sql)? {
            Statement::Query(data) => self.query_planner.create_plan(data, tx),
            _ => Err(Error::syntax("expected a query")),
        }
    }

    pub fn execute_update(&self, sql: &str, tx: TxHandle) -> Result<u64> {
        match SqlParser::parse(sql)? {
            Statement::Query(_) => Err(Error::syntax("expected an update command")),
            Statement::Insert(data) => self.update_planner.execute_insert(data, tx),
            Statement::Delete(data) => self.update_planner.execute_delete(data, tx),
            Statement::Modify(data) => self.update_planner.execute_modify(data, tx),
            Statement::CreateTable(data) => self.update_planner.execute_create_table(data, tx),
            Statement::CreateView(data) => self.update_planner.execute_create_view(data, tx),
            Statement::CreateIndex(data) => self.update_planner.execute_create_index(data, tx),
        }
    }
}
