//! Builds a `plan` tree from a parsed `SELECT` (spec.md §4.13).

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::metadata::MetadataManager;
use crate::parse::{Parser, QueryData};
use crate::plan::{estimate_blocks, GroupByPlan, Plan, ProductPlan, ProjectPlan, SelectPlan, SortPlan, TablePlan};
use crate::query::{Predicate, Term};
use crate::tx::TxHandle;

pub trait QueryPlanner {
    fn create_plan(&self, data: QueryData, tx: TxHandle) -> Result<Box<dyn Plan>>;
}

/// Resolves each `FROM` table (recursing through stored views), combines
/// them with the cheaper of left×right or right×left at every step, pushes
/// single-table and join sub-predicates down as early as they apply, and
/// only then projects, groups, and sorts.
pub struct BasicQueryPlanner {
    mdm: Rc<MetadataManager>,
}

impl BasicQueryPlanner {
    pub fn new(mdm: Rc<MetadataManager>) -> Self {
        Self { mdm }
    }

    fn plan_for_table(&self, table: &str, tx: TxHandle) -> Result<Box<dyn Plan>> {
        if let Some(view_def) = self.mdm.get_view_def(table, tx.clone())? {
            let view_data = Parser::parse_query(&view_def)?;
            self.create_plan(view_data, tx)
        } else {
            Ok(Box::new(TablePlan::new(table, tx, &self.mdm)?))
        }
    }

    fn combine(lhs: Box<dyn Plan>, rhs: Box<dyn Plan>) -> Box<dyn Plan> {
        if estimate_blocks(lhs.as_ref(), rhs.as_ref()) <= estimate_blocks(rhs.as_ref(), lhs.as_ref()) {
            Box::new(ProductPlan::new(lhs, rhs))
        } else {
            Box::new(ProductPlan::new(rhs, lhs))
        }
    }
}

impl QueryPlanner for BasicQueryPlanner {
    fn create_plan(&self, data: QueryData, tx: TxHandle) -> Result<Box<dyn Plan>> {
        if data.tables.is_empty() {
            return Err(Error::semantic("a query must name at least one table"));
        }

        let mut applied: Vec<Term> = Vec::new();

        let mut current = self.plan_for_table(&data.tables[0], tx.clone())?;
        if let Some(sub) = data.pred.select_sub_predicate(current.schema()) {
            applied.extend(sub.terms().iter().cloned());
            current = Box::new(SelectPlan::new(current, sub));
        }

        for table in &data.tables[1..] {
            let mut next = self.plan_for_table(table, tx.clone())?;
            if let Some(sub) = data.pred.select_sub_predicate(next.schema()) {
                applied.extend(sub.terms().iter().cloned());
                next = Box::new(SelectPlan::new(next, sub));
            }

            let join_pred = data.pred.join_sub_predicate(current.schema(), next.schema());
            current = Self::combine(current, next);
            if let Some(sub) = join_pred {
                applied.extend(sub.terms().iter().cloned());
                current = Box::new(SelectPlan::new(current, sub));
            }
        }

        let leftover: Vec<Term> = data.pred.terms().iter().filter(|t| !applied.contains(t)).cloned().collect();
        if !leftover.is_empty() {
            let mut pred = Predicate::new();
            for term in leftover {
                pred.conjoin_with(Predicate::of(term));
            }
            current = Box::new(SelectPlan::new(current, pred));
        }

        if data.is_grouped() {
            current = Box::new(GroupByPlan::new(current, data.group_by.clone(), data.aggregates(), tx.clone()));
            if let Some(having) = data.having.clone() {
                current = Box::new(SelectPlan::new(current, having));
            }
        }

        let mut project_fields = data.fields();
        for agg in data.aggregates() {
            project_fields.push(agg.field_name());
        }
        current = Box::new(ProjectPlan::new(current, project_fields));

        if !data.order_by.is_empty() {
            current = Box::new(SortPlan::new(current, data.order_by.clone(), tx));
        }

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferManager;
    use crate::concurrency::LockTable;
    use crate::file::FileManager;
    use crate::index::IndexKind;
    use crate::record::{Schema, TableScan};
    use crate::scan::{Scan, UpdateScan};
    use crate::tx::Transaction;
    use crate::wal::LogManager;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn new_tx(tag: &str) -> TxHandle {
        let dir = crate::test_support::fresh_dir(tag);
        let fm = Arc::new(FileManager::new(&dir, 400).unwrap());
        let lm = Arc::new(Mutex::new(LogManager::new(fm.clone(), "t.log").unwrap()));
        let bm = Arc::new(BufferManager::new(fm.clone(), lm.clone(), 8, Duration::from_millis(300)));
        let lt = Arc::new(LockTable::new(Duration::from_millis(300)));
        Rc::new(RefCell::new(Transaction::new(fm, lm, bm, lt).unwrap()))
    }

    #[test]
    fn plans_a_join_with_where_and_order_by() {
        let tx = new_tx("queryplanner_join");
        let mdm = Rc::new(MetadataManager::new(true, IndexKind::Hash, tx.clone()).unwrap());

        let mut dept_schema = Schema::new();
        dept_schema.add_int_field("did");
        dept_schema.add_string_field("dname", 10);
        mdm.create_table("dept", &dept_schema, tx.clone()).unwrap();
        let dept_layout = mdm.get_layout("dept", tx.clone()).unwrap();
        let mut depts = TableScan::new(tx.clone(), "dept", dept_layout).unwrap();
        for (did, name) in [(1, "eng"), (2, "sales")] {
            depts.insert().unwrap();
            depts.set_int("did", did).unwrap();
            depts.set_string("dname", name).unwrap();
        }
        drop(depts);

        let mut emp_schema = Schema::new();
        emp_schema.add_int_field("dept_id");
        emp_schema.add_string_field("name", 10);
        mdm.create_table("emp", &emp_schema, tx.clone()).unwrap();
        let emp_layout = mdm.get_layout("emp", tx.clone()).unwrap();
        let mut emps = TableScan::new(tx.clone(), "emp", emp_layout).unwrap();
        for (did, name) in [(1, "Bob"), (1, "Alice"), (2, "Carol")] {
            emps.insert().unwrap();
            emps.set_int("dept_id", did).unwrap();
            emps.set_string("name", name).unwrap();
        }
        drop(emps);

        let planner = BasicQueryPlanner::new(mdm);
        let data =
            Parser::parse_query("select name from emp, dept where dept_id = did and dname = 'eng' order by name asc")
                .unwrap();
        let plan = planner.create_plan(data, tx).unwrap();

        let mut scan = plan.open().unwrap();
        scan.before_first().unwrap();
        let mut names = Vec::new();
        while scan.next().unwrap() {
            names.push(scan.get_string("name").unwrap());
        }
        assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string()]);
    }
}
