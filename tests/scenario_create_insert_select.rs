//! Seed scenario 1 (spec.md §8): create, insert, and select with ORDER BY.

mod common;

use common::TestDb;
use small_db::scan::Scan;

#[test]
fn select_orders_rows_by_gradyear_ascending() {
    let t = TestDb::open("scenario1");
    let tx = t.db.new_tx().unwrap();

    t.db.execute_update("create table student (sname varchar(10), gradyear int)", tx.clone()).unwrap();
    t.db.execute_update("insert into student (sname, gradyear) values ('Alice', 2023)", tx.clone()).unwrap();
    t.db.execute_update("insert into student (sname, gradyear) values ('Bob', 2024)", tx.clone()).unwrap();
    t.db.execute_update("insert into student (sname, gradyear) values ('Charlie', 2025)", tx.clone()).unwrap();
    tx.borrow_mut().commit().unwrap();

    let tx2 = t.db.new_tx().unwrap();
    let plan = t.db.create_query_plan("select sname, gradyear from student order by gradyear", tx2.clone()).unwrap();
    let mut scan = plan.open().unwrap();

    let mut rows = Vec::new();
    while scan.next().unwrap() {
        rows.push((scan.get_string("sname").unwrap(), scan.get_int("gradyear").unwrap()));
    }
    drop(scan);
    tx2.borrow_mut().commit().unwrap();

    assert_eq!(
        rows,
        vec![("Alice".to_string(), 2023), ("Bob".to_string(), 2024), ("Charlie".to_string(), 2025)]
    );
}
