//! Crate-wide error taxonomy (spec.md §7).
//!
//! Kinds, not types: every failure the engine can produce collapses into one
//! of these six variants so callers can match on *why* without downcasting.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// File-manager I/O failure. Never recovered locally.
    Io(std::io::Error),
    /// A buffer pin waited past the pool's wait cap. The caller must abort
    /// its transaction.
    BufferAbort,
    /// A lock request waited past the lock table's wait cap. Ditto.
    LockAbort,
    /// Parser rejected the input. Carries a human-readable message.
    Syntax(String),
    /// Field not found, type mismatch, or an operation unsupported on a
    /// non-update scan.
    Semantic(String),
    /// Internal invariant violation.
    Logic(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::BufferAbort => write!(f, "buffer pool wait timed out, transaction must abort"),
            Error::LockAbort => write!(f, "lock wait timed out, transaction must abort"),
            Error::Syntax(msg) => write!(f, "syntax error: {}", msg),
            Error::Semantic(msg) => write!(f, "semantic error: {}", msg),
            Error::Logic(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl Error {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Error::Syntax(msg.into())
    }

    pub fn semantic(msg: impl Into<String>) -> Self {
        Error::Semantic(msg.into())
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Error::Logic(msg.into())
    }
}
