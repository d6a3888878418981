//! `env_logger` setup for the binary
//!
//! Library events are emitted through `tracing`, which forwards to `log`
//! when no subscriber is installed, so a single logger covers both.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Install the global logger once.
///
/// `RUST_LOG` overrides the default level, which is `warn` so that token
/// lifetime warnings are visible:
/// - `RUST_LOG=debug` - every issuance and verification step
/// - `RUST_LOG=sealjwt=debug,sealjwt_cli=info` - per crate levels
pub fn init() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .format_timestamp_micros()
            .init();
    });
}

/// Logger for tests; tolerates repeated initialization.
pub fn init_test() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}
