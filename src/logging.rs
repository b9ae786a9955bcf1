//! Tracing initialization.

use std::io;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g.
/// `SMARTCAPEX_LOG=smartcapex_kpi=debug`.
pub const LOG_ENV: &str = "SMARTCAPEX_LOG";

static INIT: Once = Once::new();

/// Install the stderr subscriber. Falls back to `smartcapex_kpi=warn` when
/// `SMARTCAPEX_LOG` is unset or invalid. Calling it again is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("smartcapex_kpi=warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    });
}
