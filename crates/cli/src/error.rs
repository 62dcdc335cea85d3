use std::ffi::OsString;

use thiserror::Error;

/// Invalid command-line configuration, detected before any traversal.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// No root path operand was given.
    #[error("at least one argument is required")]
    MissingRoot,
    /// The root path operand was the empty string.
    #[error("root path argument is an empty string")]
    EmptyRoot,
    /// A flag operand is not one of the recognised `RESOLVE_*` names.
    #[error("invalid resolve flag: {}", .0.to_string_lossy())]
    UnknownFlag(OsString),
}
