use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "appshell_lib=info";

/// Install the global fmt subscriber, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
