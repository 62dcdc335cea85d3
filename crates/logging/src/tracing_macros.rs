//! Convenience macros for subsystem-scoped tracing.
//!
//! Each macro forwards its arguments unchanged to the matching `tracing`
//! macro with the matching `*_TARGET` constant as its target. Callers must
//! depend on `tracing` directly.

/// Emit a traversal trace (directories entered, symlinks resolved).
///
/// # Example
/// ```
/// # use logging::trace_walk;
/// trace_walk!(depth = 2_usize, "entering directory");
/// ```
#[macro_export]
macro_rules! trace_walk {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: $crate::WALK_TARGET, $($arg)*);
    };
}

/// Emit a per-syscall resolution trace, such as a retried `openat2`.
///
/// # Example
/// ```
/// # use logging::trace_resolve;
/// trace_resolve!(retries = 1_usize, "retrying openat2");
/// ```
#[macro_export]
macro_rules! trace_resolve {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: $crate::RESOLVE_TARGET, $($arg)*);
    };
}

/// Emit an end-of-walk summary.
///
/// # Example
/// ```
/// # use logging::trace_summary;
/// trace_summary!(symlinks = 4_u64, "walk complete");
/// ```
#[macro_export]
macro_rules! trace_summary {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::SUMMARY_TARGET, $($arg)*);
    };
}
