//! Logging setup shared by binaries, tests and benchmarks of the store.

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, LogFormat};

/// Install the process-wide subscriber with JSON output.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}
