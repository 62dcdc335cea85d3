use std::path::PathBuf;
use std::{panic, thread};

use rustix::fs::ResolveFlags;

use crate::error::WalkError;
use crate::fs::{Filesystem, SystemFilesystem};
use crate::path::PathLimits;
use crate::walker::{WalkSummary, stack_size_for, walk_root};

/// Configures an anchored traversal rooted at a specific path.
///
/// The resolution flags are treated as an opaque bitmask and passed unchanged
/// to every `openat2` call the walk issues.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    resolve: ResolveFlags,
    limits: PathLimits,
}

impl WalkBuilder {
    /// Creates a new builder that will traverse the provided root path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            resolve: ResolveFlags::empty(),
            limits: PathLimits::default(),
        }
    }

    /// Sets the `RESOLVE_*` flags applied to every resolution.
    #[must_use]
    pub const fn resolve_flags(mut self, resolve: ResolveFlags) -> Self {
        self.resolve = resolve;
        self
    }

    /// Overrides the path length and directory depth bounds.
    #[must_use]
    pub const fn path_limits(mut self, limits: PathLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Walks the tree using the running kernel.
    ///
    /// The walk runs on a dedicated thread whose stack is sized for
    /// [`PathLimits::max_depth`], so deep trees end in a
    /// [`WalkError`] instead of overflowing the caller's stack.
    pub fn walk(&self) -> Result<WalkSummary, WalkError> {
        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("openat2-walk".to_owned())
                .stack_size(stack_size_for(self.limits))
                .spawn_scoped(scope, || self.walk_with(&SystemFilesystem))
                .map_err(|error| WalkError::spawn_worker(self.root.clone(), error))?;
            worker
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))
        })
    }

    /// Walks the tree through the supplied [`Filesystem`] on the calling
    /// thread.
    pub fn walk_with<F: Filesystem>(&self, fs: &F) -> Result<WalkSummary, WalkError> {
        walk_root(fs, &self.root, self.resolve, self.limits)
    }
}
