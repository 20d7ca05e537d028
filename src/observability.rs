//! This module provides observability and diagnostics for the codecs.
//!
//! Codecs log through the `log` facade: `debug!` for one-line per-call
//! summaries, `trace!` for per-block decisions. The `log_metric!` macro adds a
//! structured key/value record on top of that. It is a zero-cost abstraction:
//! the `#[cfg(debug_assertions)]` attribute compiles the macro body out of
//! release builds entirely.
//!
//! Nothing is printed unless the host application installs a logger;
//! `init_logging` installs a minimal `env_logger` one for tests, benches and
//! small tools.

use log::LevelFilter;
use std::sync::Once;

/// Logs a structured key-value metric record at `trace` level, only in debug builds.
///
/// # Example
/// ```
/// use intpack::log_metric;
/// let width = 7;
/// log_metric!("event"="pfor_block", "width"=&width);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::__log::trace!(target: "intpack::metric", "INTPACK_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs a stderr logger filtered at `level`. Later calls are no-ops, as is
/// the first call when the host already installed a logger.
pub fn init_logging(level: LevelFilter) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(cfg!(test));
        builder.filter_level(level);

        // Just the level, target and message.
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        });

        let _ = builder.try_init();
    });
}
