//! Seed scenario 2 (spec.md §8): a rolled-back transaction's writes must
//! not be visible, while a committed one's must.
//!
//! The grammar's aggregate production is `(MAX|MIN|COUNT|AVG|SUM) '(' Field ')'`
//! with no star argument, so `count(id)` stands in for `COUNT(*)`.

mod common;

use common::TestDb;
use small_db::scan::Scan;

#[test]
fn rolled_back_insert_is_invisible_committed_insert_is_visible() {
    let t = TestDb::open("scenario2");
    let setup = t.db.new_tx().unwrap();
    t.db.execute_update("create table testtx (id int, val varchar(10))", setup.clone()).unwrap();
    setup.borrow_mut().commit().unwrap();

    let tx1 = t.db.new_tx().unwrap();
    t.db.execute_update("insert into testtx (id, val) values (1, 'rollback')", tx1.clone()).unwrap();
    tx1.borrow_mut().rollback().unwrap();

    // the underlying table is empty, so the single implicit group never
    // starts (GroupByScan::before_first finds no first row) and COUNT(id)
    // produces zero rows rather than one row holding 0
    let check1 = t.db.new_tx().unwrap();
    let plan = t.db.create_query_plan("select count(id) from testtx", check1.clone()).unwrap();
    let mut scan = plan.open().unwrap();
    assert!(!scan.next().unwrap());
    drop(scan);
    check1.borrow_mut().commit().unwrap();

    let tx2 = t.db.new_tx().unwrap();
    t.db.execute_update("insert into testtx (id, val) values (2, 'commit')", tx2.clone()).unwrap();
    tx2.borrow_mut().commit().unwrap();

    let check2 = t.db.new_tx().unwrap();
    let plan2 = t.db.create_query_plan("select id, val from testtx order by id", check2.clone()).unwrap();
    let mut scan2 = plan2.open().unwrap();
    let mut rows = Vec::new();
    while scan2.next().unwrap() {
        rows.push((scan2.get_int("id").unwrap(), scan2.get_string("val").unwrap()));
    }
    drop(scan2);
    check2.borrow_mut().commit().unwrap();

    assert_eq!(rows, vec![(2, "commit".to_string())]);
}
