//! L2: strict two-phase locking with a wait-cap in place of deadlock
//! detection (spec.md §4.4). A process-wide [`LockTable`] tracks lock state
//! per block; each [`ConcurrencyMgr`] is scoped to one transaction and
//! remembers which locks it already holds so it only ever asks the table
//! for what it doesn't have yet.

pub mod concurrency_mgr;
pub mod lock_table;

pub use concurrency_mgr::ConcurrencyMgr;
pub use lock_table::LockTable;
