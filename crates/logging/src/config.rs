//! Verbosity configuration derived from the `-v` repeat count.

use tracing::level_filters::LevelFilter;

/// Maximum level recorded by the subscriber.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerbosityConfig {
    level: LevelFilter,
}

impl Default for VerbosityConfig {
    fn default() -> Self {
        Self::from_verbose_level(0)
    }
}

impl VerbosityConfig {
    /// Create a configuration from a verbose level.
    ///
    /// `0` records warnings and errors, `1` adds info, `2` adds debug and
    /// anything above adds trace.
    #[must_use]
    pub const fn from_verbose_level(level: u8) -> Self {
        let level = match level {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        Self { level }
    }

    /// The most verbose level that will be recorded.
    #[must_use]
    pub const fn level(self) -> LevelFilter {
        self.level
    }

    /// Filter directive equivalent to this configuration.
    #[must_use]
    pub fn directive(self) -> String {
        self.level.to_string().to_ascii_lowercase()
    }
}
