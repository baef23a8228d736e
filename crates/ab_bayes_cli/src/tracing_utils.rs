use tracing::metadata::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a compact stderr subscriber. `RUST_LOG` directives take precedence over
/// `default_level`.
pub fn configure_tracing(default_level: LevelFilter) {
    let fmt_layer = fmt::layer()
        .compact()
        .with_target(false) // No module name.
        .with_writer(std::io::stderr);
    let filter_layer =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    tracing_subscriber::registry().with(fmt_layer).with(filter_layer).init();
}
