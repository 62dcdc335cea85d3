#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` performs an anchored, depth-first traversal of a directory tree in
//! which every directory and every symbolic link is opened through
//! `openat2(2)` under a caller-supplied set of [`ResolveFlags`]. The walk
//! exists to prove that constrained resolution succeeds for the whole tree:
//! the first entry that fails to resolve aborts the traversal and is reported
//! together with its root-relative path and the operation that failed.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures the traversal root, the resolution flags and
//!   the [`PathLimits`] used when re-resolving symlinks from the root.
//! - Directories are opened one component at a time, anchored at the parent
//!   directory's descriptor, so containment is enforced incrementally.
//! - Symlinks are re-resolved from the root descriptor using the full
//!   root-relative path rebuilt by [`reconstruct`], so flags such as
//!   `RESOLVE_BENEATH` and `RESOLVE_IN_ROOT` apply to the entire chain.
//! - The [`Filesystem`] trait isolates the four syscalls the walker issues.
//!   [`SystemFilesystem`] is the production implementation.
//!
//! # Invariants
//!
//! - Every descriptor opened during the walk is released exactly once on every
//!   exit path. Directory descriptors move into a [`DirStream`] by value and
//!   the stream closes them on drop.
//! - `.` and `..` are never opened.
//! - Each entry is routed to at most one handler.
//! - Only `EINTR` and `EAGAIN` are retried, and only a bounded number of times.
//! - No directory deeper than [`PathLimits::max_depth`] is opened, and
//!   [`WalkBuilder::walk`] runs on a thread whose stack fits that depth.
//!
//! # Errors
//!
//! Every failure is terminal and is reported as a [`WalkError`]. The error
//! exposes the [`Operation`] that failed and the root-relative path of the
//! offending entry.
//!
//! # Examples
//!
//! ```no_run
//! use walk::{ResolveFlags, WalkBuilder};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let summary = WalkBuilder::new("/srv/tree")
//!     .resolve_flags(ResolveFlags::BENEATH | ResolveFlags::NO_XDEV)
//!     .walk()?;
//! println!("{} directories resolved", summary.directories);
//! # Ok(())
//! # }
//! ```

mod builder;
mod dispatch;
mod entry;
mod error;
mod fs;
mod path;
mod resolve;
mod stack;
mod stream;
mod walker;

pub use builder::WalkBuilder;
pub use dispatch::{Route, classify, is_dot_entry};
pub use entry::{DirEntry, EntryKind};
pub use error::{Operation, WalkError, WalkErrorKind};
pub use fs::{DirectoryStream, Filesystem, SystemFilesystem};
pub use path::{MAX_DIR_DEPTH, PATH_MAX, PathError, PathLimits, display_path, reconstruct};
pub use resolve::{MAX_TRANSIENT_RETRIES, OpenHow, is_transient, openat2_with_retry};
pub use rustix::fs::ResolveFlags;
pub use stack::{Components, DirStack, components};
pub use stream::DirStream;
pub use walker::{STACK_BYTES_PER_LEVEL, WalkSummary, stack_size_for, walk_root};

#[cfg(test)]
mod tests;
