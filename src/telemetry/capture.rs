//! Capture span helpers.
//!
//! Each top-level capture runs inside one span so the per-action events of
//! nested thunks are grouped under the call that produced them.

use tracing::Span;

/// Start a span for a top-level capture call.
///
/// `capture.actions` is declared empty and filled in by [`record_captured`].
pub fn start_capture_span(operation: &'static str) -> Span {
    tracing::debug_span!(
        "capture",
        "capture.operation" = operation,
        "capture.actions" = tracing::field::Empty,
    )
}

/// Record how many actions the call captured.
pub fn record_captured(span: &Span, count: usize) {
    span.record("capture.actions", count);
}
