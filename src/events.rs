//! Observability seam for loaders and exporters.
//!
//! Core logic reports through [`EventSink`] instead of logging directly, so
//! it stays testable without a subscriber. The binary binds [`TracingSink`];
//! tests bind [`NullSink`].

/// Receiver for informational, warning, and error events.
pub trait EventSink {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Discards all events.
pub struct NullSink;

impl EventSink for NullSink {
    fn info(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Forwards events to the `tracing` macros.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
