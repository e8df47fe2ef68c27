//! Tracing utilities for query compilation and execution.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event when a backend starts compiling a query.
///
/// ```ignore
/// anvil_trace_compile!("criteria", query.entity().name());
/// ```
#[macro_export]
macro_rules! anvil_trace_compile {
    ($backend:literal, $entity:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(backend = $backend, entity = %$entity, "anvil.compile");
    };
}

/// Emit a debug-level tracing event with the rendered query text and parameter count.
///
/// ```ignore
/// anvil_trace_query!(&statement.sql, statement.params.len());
/// ```
#[macro_export]
macro_rules! anvil_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "anvil.query");
    };
}

/// Emit a debug-level tracing event after the finder ran a query.
///
/// ```ignore
/// anvil_trace_exec!("count", rows.len());
/// ```
#[macro_export]
macro_rules! anvil_trace_exec {
    ($operation:literal, $rows:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(operation = $operation, rows = $rows, "anvil.exec");
    };
}
