use super::TraceId;
use tracing::{Level, Span};

/// Create a root span for a replay run or another long-lived job.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::span!(
        Level::INFO,
        "root",
        name = %name,
        trace_id = %trace_id
    )
}

/// Create a child span (inherits trace_id from the entered parent).
pub fn child_span(name: &'static str) -> Span {
    tracing::span!(Level::INFO, "child", name = %name)
}
