#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front-end of `openat2-resolve`. It parses
//! `openat2-resolve [OPTIONS] ROOT [FLAG]...`, turns the `RESOLVE_*` names into
//! a resolution bitmask, runs the walk and reports the outcome through the exit
//! status and a single diagnostic line.
//!
//! # Design
//!
//! [`run`] takes the argument vector and handles for standard output and
//! error, so the whole front-end can be exercised in-process. A
//! [`clap`](https://docs.rs/clap/) builder definition recognises the options;
//! operand validation happens afterwards in [`WalkRequest::from_args`] so that
//! configuration errors use the tool's own wording. The flag-name table in
//! [`flags`] is the only place names are mapped to bits; the `walk` crate only
//! sees the bitmask.
//!
//! # Invariants
//!
//! - `run` never panics; write failures on either stream surface as exit
//!   status `1`.
//! - Configuration errors are reported before any descriptor is opened.
//!
//! # Errors
//!
//! Usage errors, [`ConfigError`]s and walk failures all map to exit status
//! `1`, printed as `openat2-resolve: error: <message>` on standard error.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let status = cli::run(["openat2-resolve", "--list-flags"], &mut stdout, &mut stderr);
//!
//! assert_eq!(status, 0);
//! assert!(String::from_utf8(stdout).unwrap().contains("RESOLVE_BENEATH"));
//! ```

use std::ffi::OsString;
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;

use logging::{VerbosityConfig, init_tracing};
use walk::{ResolveFlags, WalkBuilder, WalkSummary};

mod command;
mod error;
pub mod flags;

pub use command::ParsedArgs;
pub use error::ConfigError;

/// Program name used in usage text and diagnostics.
pub const PROGRAM_NAME: &str = "openat2-resolve";

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Validated traversal request built from the operands.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalkRequest {
    /// Directory to walk.
    pub root: PathBuf,
    /// Bitmask applied to every `openat2` call.
    pub resolve: ResolveFlags,
}

impl WalkRequest {
    /// Validates the operands of `args`.
    pub fn from_args(args: &ParsedArgs) -> Result<Self, ConfigError> {
        let root = args.root.as_ref().ok_or(ConfigError::MissingRoot)?;
        if root.is_empty() {
            return Err(ConfigError::EmptyRoot);
        }
        let resolve = flags::parse_flags(&args.flags)?;
        Ok(Self {
            root: PathBuf::from(root),
            resolve,
        })
    }

    /// Builder configured for this request.
    #[must_use]
    pub fn builder(&self) -> WalkBuilder {
        WalkBuilder::new(self.root.clone()).resolve_flags(self.resolve)
    }
}

/// Runs the front-end with the provided arguments and output handles.
///
/// The first argument is the program name. Returns the process exit status.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match command::parse_args(arguments) {
        Ok(parsed) => execute(&parsed, stdout, stderr),
        Err(error) => {
            let _ = write!(stderr, "{}", error.render());
            1
        }
    }
}

fn execute<Out, Err>(parsed: &ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    if parsed.show_help {
        let help = command::clap_command().render_help();
        return status_of(write!(stdout, "{help}"));
    }
    if parsed.show_version {
        return status_of(writeln!(
            stdout,
            "{PROGRAM_NAME} {}",
            env!("CARGO_PKG_VERSION")
        ));
    }
    if parsed.list_flags {
        return status_of(write_flag_table(stdout));
    }

    let request = match WalkRequest::from_args(parsed) {
        Ok(request) => request,
        Err(error) => return report(stderr, &error),
    };

    init_tracing(VerbosityConfig::from_verbose_level(parsed.verbosity));
    tracing::debug!(
        root = %request.root.display(),
        resolve = ?request.resolve,
        "walk requested"
    );

    match request.builder().walk() {
        Ok(summary) if parsed.stats => status_of(write_summary(stdout, summary)),
        Ok(_) => 0,
        Err(error) => report(stderr, &error),
    }
}

fn write_flag_table<W: Write>(out: &mut W) -> std::io::Result<()> {
    for entry in &flags::RESOLVE_FLAG_NAMES {
        writeln!(out, "{:<24}{:#06x}", entry.name(), entry.flags().bits())?;
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: WalkSummary) -> std::io::Result<()> {
    writeln!(out, "directories: {}", summary.directories)?;
    writeln!(out, "symlinks: {}", summary.symlinks)?;
    writeln!(out, "skipped: {}", summary.skipped)
}

fn report<Err: Write>(stderr: &mut Err, error: &dyn Display) -> i32 {
    let _ = writeln!(stderr, "{PROGRAM_NAME}: error: {error}");
    1
}

fn status_of(result: std::io::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Converts a numeric exit code into an [`std::process::ExitCode`].
///
/// Values outside `0..=255` are clamped.
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(u8::try_from(clamped).unwrap_or(u8::MAX))
}
