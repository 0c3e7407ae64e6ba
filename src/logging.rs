use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Initializes tracing for the binary.
/// The filter comes from RUST_LOG (e.g. RUST_LOG=monkey=trace) and falls back
/// to `warn`. Output goes to stderr so program results on stdout stay clean.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes tracing for tests: trace level, captured by the test runner,
/// installed once per test binary.
#[cfg(test)]
pub fn init_test_logging() {
    static TRACING_INIT: std::sync::Once = std::sync::Once::new();
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("trace")
            .with_test_writer()
            .try_init()
            .ok(); // Another harness may have installed one already
    });
}
