#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` owns the diagnostic plumbing shared by the `openat2-resolve`
//! workspace: mapping the command line's `-v` count to a tracing level,
//! installing the process-wide subscriber, and a handful of macros that emit
//! events under stable, subsystem-scoped targets.
//!
//! # Design
//!
//! - [`VerbosityConfig`] turns a repeat count into a [`LevelFilter`].
//! - [`init_tracing`] installs a `tracing-subscriber` registry with an
//!   [`EnvFilter`](tracing_subscriber::EnvFilter) and a formatting layer on
//!   stderr. Setting [`LOG_ENV`] replaces the verbosity-derived filter with an
//!   arbitrary directive string.
//! - [`trace_walk!`], [`trace_resolve!`] and [`trace_summary!`] wrap the
//!   standard `tracing` macros with fixed targets, so operators can filter by
//!   subsystem (`OPENAT2_RESOLVE_LOG=openat2_resolve::resolve=trace`).
//!
//! # Invariants
//!
//! - Installing the subscriber twice is harmless: the second call reports
//!   `false` and leaves the first subscriber in place.
//! - Library crates only emit events; only binaries call [`init_tracing`].
//!
//! # Examples
//!
//! ```
//! use logging::{VerbosityConfig, init_tracing, trace_summary};
//!
//! init_tracing(VerbosityConfig::from_verbose_level(1));
//! trace_summary!(directories = 3_u64, "walk complete");
//! ```

mod config;
mod tracing_bridge;
mod tracing_macros;

pub use config::VerbosityConfig;
pub use tracing::level_filters::LevelFilter;
pub use tracing_bridge::{LOG_ENV, build_filter, init_tracing};

/// Target used by [`trace_walk!`].
pub const WALK_TARGET: &str = "openat2_resolve::walk";
/// Target used by [`trace_resolve!`].
pub const RESOLVE_TARGET: &str = "openat2_resolve::resolve";
/// Target used by [`trace_summary!`].
pub const SUMMARY_TARGET: &str = "openat2_resolve::summary";
