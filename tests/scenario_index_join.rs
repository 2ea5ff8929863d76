//! Seed scenario 6 (spec.md §8): an index join across two tables yields
//! every correctly-matched row and excludes rows with no matching parent.

mod common;

use std::collections::HashSet;

use common::TestDb;
use small_db::index::Index;
use small_db::record::{TableScan, Value};
use small_db::scan::Scan;
use small_db::scan::UpdateScan;

#[test]
fn index_join_matches_five_employees_across_three_departments() {
    let t = TestDb::open("scenario6");
    let tx = t.db.new_tx().unwrap();

    // the index has to exist before the rows it covers are inserted: index
    // maintenance happens on insert, `CREATE INDEX` never backfills
    t.db.execute_update("create table departments (dept_id int, dept_name varchar(10), budget int)", tx.clone()).unwrap();
    t.db.execute_update("create index idx_dept on departments (dept_id)", tx.clone()).unwrap();
    for (id, name, budget) in [(1, "eng", 500), (2, "sales", 300), (3, "hr", 100)] {
        t.db
            .execute_update(
                &format!("insert into departments (dept_id, dept_name, budget) values ({id}, '{name}', {budget})"),
                tx.clone(),
            )
            .unwrap();
    }

    t.db.execute_update("create table employees (name varchar(10), dept_id int)", tx.clone()).unwrap();
    for (name, dept_id) in [("Ann", 1), ("Bo", 1), ("Cy", 2), ("Di", 3), ("Ed", 99)] {
        t.db
            .execute_update(&format!("insert into employees (name, dept_id) values ('{name}', {dept_id})"), tx.clone())
            .unwrap();
    }
    tx.borrow_mut().commit().unwrap();

    // join by hand through the index rather than through the planner, since
    // `BasicQueryPlanner` never picks an index-join plan on its own
    let tx2 = t.db.new_tx().unwrap();
    let emp_layout = t.db.metadata().get_layout("employees", tx2.clone()).unwrap();
    let dept_layout = t.db.metadata().get_layout("departments", tx2.clone()).unwrap();
    let indexes = t.db.metadata().get_index_info("departments", tx2.clone()).unwrap();
    let dept_idx_info = indexes.get("dept_id").expect("index on dept_id");

    let mut emps = TableScan::new(tx2.clone(), "employees", emp_layout).unwrap();
    let mut depts = TableScan::new(tx2.clone(), "departments", dept_layout).unwrap();

    let mut joined = HashSet::new();
    emps.before_first().unwrap();
    while emps.next().unwrap() {
        let name = emps.get_string("name").unwrap();
        let dept_id = emps.get_int("dept_id").unwrap();

        let mut idx = dept_idx_info.open(tx2.clone()).unwrap();
        idx.before_first(&Value::Int(dept_id)).unwrap();
        while idx.next().unwrap() {
            let rid = idx.get_data_rid().unwrap();
            depts.move_to_record_id(rid).unwrap();
            let dept_name = depts.get_string("dept_name").unwrap();
            let budget = depts.get_int("budget").unwrap();
            joined.insert((name.clone(), dept_name, budget));
        }
    }
    tx2.borrow_mut().commit().unwrap();

    assert_eq!(
        joined,
        HashSet::from([
            ("Ann".to_string(), "eng".to_string(), 500),
            ("Bo".to_string(), "eng".to_string(), 500),
            ("Cy".to_string(), "sales".to_string(), 300),
            ("Di".to_string(), "hr".to_string(), 100),
        ])
    );
}
