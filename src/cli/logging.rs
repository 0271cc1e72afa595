//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "common_clipboard=info",
        1 => "common_clipboard=debug",
        _ => "common_clipboard=trace,tower_http=debug",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
