//! Log initialization, ported from the teacher crate's `log.rs`. The
//! engine itself only calls into the `log` facade (`debug!`/`info!`/`warn!`);
//! this is the optional `env_logger` backend a binary or test harness can
//! wire in.

use std::io::Write;

use env_logger::Builder;

/// Installs an `env_logger` backend formatted as
/// `[LEVEL - target] [file:line] message`, honoring `RUST_LOG`.
///
/// Safe to call more than once per process; `env_logger::Builder::init`
/// panics on a second global logger, so callers running this from multiple
/// tests should guard it with a `std::sync::Once`.
pub fn init_logging() {
    Builder::from_default_env()
        .format_timestamp_secs()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} - {}] [{}:{}] {}",
                record.level(),
                record.target(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
