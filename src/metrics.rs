//! Narrow metrics surface published by the health arbiter.
//!
//! The journal set does not own a metrics transport; it reports through
//! whatever the host wires up here, the same way the storage registry is
//! injected rather than constructed internally.
pub trait JournalSetMetrics: Send + Sync {
    /// Called whenever the set of disabled entries changes size.
    fn record_disabled_count(&self, disabled: usize);
}

/// Default metrics sink: discards everything. Useful for tests and for
/// callers that only care about the `StorageRegistry` notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl JournalSetMetrics for NoopMetrics {
    fn record_disabled_count(&self, _disabled: usize) {}
}
