use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs the process-wide subscriber once. Logs go to stderr so stdout
/// stays machine-readable.
///
/// `RUST_LOG` sets the filter (default `warn`); `TOOLSMITH_LOG_FORMAT=json`
/// switches to JSON lines.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.get_or_init(|| {
        let default = if verbose { "info" } else { "warn" };
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        let json = std::env::var("TOOLSMITH_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
