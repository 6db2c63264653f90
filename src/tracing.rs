//! Tracing (logging)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initlialise tracing (logging)
///
/// Applies a filter based on the `RUST_LOG` environment variable. If not set, tower_http logs at
/// debug level and this crate and the server binary at debug level when `debug` is set, info level
/// otherwise.
///
/// Logs go to stderr, stdout is reserved for the port announcement.
pub fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "bmi_relay=debug,run_bmi_server=debug,tower_http=debug"
    } else {
        "bmi_relay=info,run_bmi_server=info,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
