//! Seed scenario 4 (spec.md §8): a B-tree index holding many entries under
//! one duplicate key returns every RID exactly once.

mod common;

use std::collections::HashSet;

use common::TestDb;
use small_db::db::DbConfig;
use small_db::index::IndexKind;
use small_db::record::{Rid, TableScan, Value};
use small_db::scan::UpdateScan;

#[test]
fn three_hundred_duplicate_keys_all_come_back_exactly_once() {
    let t = TestDb::open_with_config("scenario4_btree", DbConfig { index_kind: IndexKind::BTree, ..DbConfig::default() });
    let tx = t.db.new_tx().unwrap();

    t.db.execute_update("create table dups (k int, n int)", tx.clone()).unwrap();
    t.db.execute_update("create index idx_k on dups (k)", tx.clone()).unwrap();

    let layout = t.db.metadata().get_layout("dups", tx.clone()).unwrap();
    let indexes = t.db.metadata().get_index_info("dups", tx.clone()).unwrap();
    let info = indexes.get("k").expect("index on k");

    let mut ts = TableScan::new(tx.clone(), "dups", layout).unwrap();
    let mut rids = HashSet::new();
    for n in 0..300 {
        ts.insert().unwrap();
        ts.set_int("k", 7).unwrap();
        ts.set_int("n", n).unwrap();
        let rid = ts.get_record_id();
        rids.insert(rid);
        let mut idx = info.open(tx.clone()).unwrap();
        idx.insert(&Value::Int(7), rid).unwrap();
    }
    drop(ts);

    let mut idx = info.open(tx.clone()).unwrap();
    idx.before_first(&Value::Int(7)).unwrap();
    let mut seen: HashSet<Rid> = HashSet::new();
    while idx.next().unwrap() {
        let rid = idx.get_data_rid().unwrap();
        assert!(seen.insert(rid), "rid {:?} returned more than once", rid);
    }
    assert_eq!(seen.len(), 300);
    assert_eq!(seen, rids);

    tx.borrow_mut().commit().unwrap();
}
