//! Seed scenario 5 (spec.md §8): `UPDATE ... WHERE` through the
//! index-maintaining planner keeps an index on the updated field correct.

mod common;

use std::collections::HashSet;

use common::TestDb;
use small_db::scan::Scan;

#[test]
fn update_through_an_index_moves_matching_rows_between_index_buckets() {
    let t = TestDb::open("scenario5");
    let tx = t.db.new_tx().unwrap();

    t.db.execute_update("create table employees (id int, age int, status varchar(10))", tx.clone()).unwrap();
    t.db.execute_update("create index idx_status on employees (status)", tx.clone()).unwrap();

    for (id, age) in [(1, 25), (2, 31), (3, 40), (4, 28)] {
        t.db
            .execute_update(
                &format!("insert into employees (id, age, status) values ({id}, {age}, 'active')"),
                tx.clone(),
            )
            .unwrap();
    }
    tx.borrow_mut().commit().unwrap();

    let tx2 = t.db.new_tx().unwrap();
    let affected = t.db.execute_update("update employees set status = 'retired' where age >= 30", tx2.clone()).unwrap();
    tx2.borrow_mut().commit().unwrap();
    assert_eq!(affected, 2);

    let tx3 = t.db.new_tx().unwrap();
    let retired_plan = t.db.create_query_plan("select id from employees where status = 'retired'", tx3.clone()).unwrap();
    let mut retired_scan = retired_plan.open().unwrap();
    let mut retired = HashSet::new();
    while retired_scan.next().unwrap() {
        retired.insert(retired_scan.get_int("id").unwrap());
    }
    drop(retired_scan);

    let active_plan = t.db.create_query_plan("select id from employees where status = 'active'", tx3.clone()).unwrap();
    let mut active_scan = active_plan.open().unwrap();
    let mut active = HashSet::new();
    while active_scan.next().unwrap() {
        active.insert(active_scan.get_int("id").unwrap());
    }
    drop(active_scan);
    tx3.borrow_mut().commit().unwrap();

    assert_eq!(retired, HashSet::from([2, 3]));
    assert_eq!(active, HashSet::from([1, 4]));
}
