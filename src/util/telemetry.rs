//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Install the default fmt subscriber for the scheduler if none is set.
///
/// The filter comes from `RUST_LOG`; absent that, scheduler events are
/// logged at `info`. Embedders with their own subscriber can skip this
/// entirely, an already-installed dispatcher is left untouched.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scan_admission=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
