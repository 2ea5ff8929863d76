//! Seed scenario 3 (spec.md §8): GROUP BY with a HAVING filter on the
//! aggregate's derived field name (`sumofamount`, per spec.md §4.12's
//! naming convention — HAVING addresses the projected field, not the
//! original `SUM(amount)` syntax).

mod common;

use common::TestDb;
use small_db::scan::Scan;

#[test]
fn having_keeps_only_the_group_whose_sum_exceeds_the_threshold() {
    let t = TestDb::open("scenario3");
    let tx = t.db.new_tx().unwrap();

    t.db.execute_update("create table sales (product varchar(10), region varchar(10), amount int)", tx.clone())
        .unwrap();
    for (product, region, amount) in
        [("Widget", "North", 100), ("Widget", "North", 150), ("Gadget", "South", 50), ("Gadget", "South", 75)]
    {
        t.db
            .execute_update(
                &format!("insert into sales (product, region, amount) values ('{product}', '{region}', {amount})"),
                tx.clone(),
            )
            .unwrap();
    }
    tx.borrow_mut().commit().unwrap();

    let tx2 = t.db.new_tx().unwrap();
    let plan = t
        .db
        .create_query_plan(
            "select product, sum(amount) from sales group by product having sumofamount > 200",
            tx2.clone(),
        )
        .unwrap();
    let mut scan = plan.open().unwrap();

    let mut rows = Vec::new();
    while scan.next().unwrap() {
        rows.push((scan.get_string("product").unwrap(), scan.get_long("sumofamount").unwrap()));
    }
    drop(scan);
    tx2.borrow_mut().commit().unwrap();

    assert_eq!(rows, vec![("Widget".to_string(), 250)]);
}
