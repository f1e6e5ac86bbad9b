//! Logging setup
//!
//! Library events go to stderr so reports on stdout stay machine-readable.
//! `RUST_LOG` takes precedence over the `-v`/`-q` flags.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{CliConfig, Verbosity};

/// Build the filter for `verbosity`, honouring `RUST_LOG` when set
#[must_use]
pub fn filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Initialize tracing for the CLI
pub fn init(config: &CliConfig) {
    let result = tracing_subscriber::registry()
        .with(filter(config.verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.color.should_color())
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
