//! L2: the transaction facade that ties buffer pinning, locking, and
//! recovery logging together behind one handle (spec.md §4.4, §4.5).

pub mod recovery;
pub mod transaction;

pub use recovery::RecoveryMgr;
pub use transaction::Transaction;

/// Transaction identifiers are handed out by [`Transaction::next_tx_num`]
/// and never reused within a process lifetime.
pub type TxId = u64;

/// A transaction is used from a single thread (spec.md §5), but the record,
/// index and query-algebra layers build trees of scans that all need
/// mutable access to the same transaction at once (e.g. `ProductScan` holds
/// two `TableScan`s side by side). `Rc<RefCell<_>>` expresses "single owner
/// thread, many borrowers" without forcing every scan type to carry a
/// lifetime parameter back to one `&mut Transaction`.
pub type TxHandle = std::rc::Rc<std::cell::RefCell<Transaction>>;
