use std::io;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TENANTCTL_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

static INIT_LOGGER: Once = Once::new();

/// Installs the stderr subscriber once per process. `verbose` lowers the
/// default filter to `debug`; `TENANTCTL_LOG` always wins.
pub fn init_tracing(verbose: bool) {
    INIT_LOGGER.call_once(|| {
        let default = if verbose { "tenantctl=debug" } else { DEFAULT_LOG_FILTER };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
        if let Err(err) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .try_init()
        {
            eprintln!("tenantctl: tracing initialization failed: {err}");
        }
    });
}
