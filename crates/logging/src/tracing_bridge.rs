//! Subscriber installation.
//!
//! Events go through an [`EnvFilter`] and are formatted onto stderr, leaving
//! stdout to the command's own output.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::config::VerbosityConfig;

/// Environment variable whose value, when set, replaces the verbosity-derived
/// filter. It accepts the usual `EnvFilter` directive syntax.
pub const LOG_ENV: &str = "OPENAT2_RESOLVE_LOG";

/// Builds the filter for `config`, honouring an override directive string.
///
/// An override that fails to parse is ignored and the verbosity level is used
/// instead, so a typo in the environment never silences errors.
#[must_use]
pub fn build_filter(config: VerbosityConfig, override_directives: Option<&str>) -> EnvFilter {
    override_directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(config.directive()))
}

/// Installs the global subscriber for `config`.
///
/// Reads [`LOG_ENV`] from the environment. Returns `false` when a global
/// subscriber was already installed, in which case nothing changes.
///
/// # Example
///
/// ```
/// use logging::{VerbosityConfig, init_tracing};
///
/// init_tracing(VerbosityConfig::from_verbose_level(2));
/// assert!(!init_tracing(VerbosityConfig::default()));
/// ```
pub fn init_tracing(config: VerbosityConfig) -> bool {
    let directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(config, directives.as_deref());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(true),
        )
        .try_init()
        .is_ok()
}
