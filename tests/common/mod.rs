//! Shared integration-test helper (SPEC_FULL.md §A.4): opens a `Database`
//! in a fresh temp directory and removes it on drop. No `tempfile`
//! dependency, matching the crate's own `src/test_support.rs`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use small_db::db::DbConfig;
use small_db::Database;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temp directory for tests that build their own managers directly rather
/// than going through `Database`.
pub fn fresh_dir(tag: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    std::env::temp_dir().join(format!("small-db-itest-{}-{}-{}", tag, pid, n))
}

pub struct TestDb {
    pub db: Database,
    dir: PathBuf,
}

impl TestDb {
    pub fn open(tag: &str) -> Self {
        Self::open_with_config(tag, DbConfig::default())
    }

    pub fn open_with_config(tag: &str, cfg: DbConfig) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("small-db-itest-{}-{}-{}", tag, pid, n));
        let db = Database::open_with(&dir, cfg).unwrap();
        Self { db, dir }
    }

    pub fn reopen(self) -> Self {
        let dir = self.dir.clone();
        drop(self);
        let db = Database::open(&dir).unwrap();
        TestDb { db, dir }
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}
