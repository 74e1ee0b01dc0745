use std::sync::Once;

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CAMPUS_COMPANION_LOG";
const DEFAULT_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let filter = std::env::var(LOG_ENV)
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
