//! Test-only helpers shared by unit tests (inline `#[cfg(test)]` modules)
//! and the crate's `tests/` integration suite. The teacher crate has no
//! `tempfile` dependency and neither does this one, so temp directories are
//! built by hand from `std::env::temp_dir()` plus a process-id + atomic
//! counter suffix, uniqued per call.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

static COUNTER: AtomicU64 = AtomicU64::new(0);
static LOG_INIT: Once = Once::new();

pub fn fresh_dir(tag: &str) -> PathBuf {
    LOG_INIT.call_once(crate::util::init_logging);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    std::env::temp_dir().join(format!("small-db-test-{}-{}-{}", tag, pid, n))
}
