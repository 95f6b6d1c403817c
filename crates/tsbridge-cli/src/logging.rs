//! Subscriber setup for command output

use tracing_subscriber::EnvFilter;

/// Filter directive from the command line, falling back to the configuration.
pub fn filter_directive(cli_level: Option<&str>, config_level: &str) -> String {
    cli_level.unwrap_or(config_level).to_ascii_lowercase()
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `directive`.
pub fn init_logging(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
