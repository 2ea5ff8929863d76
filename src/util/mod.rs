//! Small cross-cutting helpers, generalized from the teacher crate's
//! `utils/other.rs` (`HandyRwLock`) and `utils/number.rs` (`ceil_dev`).

pub mod arith;
pub mod lock;
pub mod logging;

pub use arith::{ceil_div, floor_div};
pub use lock::HandyLock;
pub use logging::init_logging;
