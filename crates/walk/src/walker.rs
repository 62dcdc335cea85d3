use std::ffi::OsStr;
use std::os::fd::{AsFd, BorrowedFd};
use std::path::Path;

use logging::{trace_summary, trace_walk};
use rustix::fs::ResolveFlags;

use crate::dispatch::{Route, classify};
use crate::error::WalkError;
use crate::fs::{DirectoryStream, Filesystem};
use crate::path::{PathLimits, display_path, reconstruct};
use crate::resolve::{OpenHow, openat2_with_retry};
use crate::stack::DirStack;

/// Counts gathered by a successful walk.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WalkSummary {
    /// Directories opened below the root.
    pub directories: u64,
    /// Symlinks resolved from the root.
    pub symlinks: u64,
    /// Entries with no resolution obligation.
    pub skipped: u64,
}

/// Opens `root` and walks everything beneath it.
///
/// The root is opened with `O_DIRECTORY | O_NOFOLLOW | O_CLOEXEC` and its
/// stream descriptor serves both as the root anchor for symlinks and as the
/// anchor for the top-level directories.
///
/// Recursion runs on the calling thread and descends at most
/// `limits.max_depth` directories; the caller's stack must hold that many
/// levels (see [`stack_size_for`]).
pub fn walk_root<F>(
    fs: &F,
    root: &Path,
    resolve: ResolveFlags,
    limits: PathLimits,
) -> Result<WalkSummary, WalkError>
where
    F: Filesystem,
{
    trace_walk!(root = %root.display(), ?resolve, "starting walk");
    let fd = fs
        .open_root(root)
        .map_err(|error| WalkError::open_root(root.to_path_buf(), error))?;
    let mut stream = fs
        .open_stream(fd)
        .map_err(|error| WalkError::open_stream(root.to_path_buf(), error))?;

    let mut walker = Walker {
        fs,
        resolve,
        limits,
        summary: WalkSummary::default(),
    };
    walker.walk_dir(None, &mut stream, None)?;

    let summary = walker.summary;
    trace_summary!(
        directories = summary.directories,
        symlinks = summary.symlinks,
        skipped = summary.skipped,
        "walk complete"
    );
    Ok(summary)
}

/// Stack reserved for each directory level of the recursion.
pub const STACK_BYTES_PER_LEVEL: usize = 16 * 1024;

const STACK_BYTES_BASE: usize = 1024 * 1024;

/// Thread stack size that fits a walk bounded by `limits.max_depth`.
#[must_use]
pub const fn stack_size_for(limits: PathLimits) -> usize {
    STACK_BYTES_BASE.saturating_add(limits.max_depth.saturating_mul(STACK_BYTES_PER_LEVEL))
}

struct Walker<'fs, F> {
    fs: &'fs F,
    resolve: ResolveFlags,
    limits: PathLimits,
    summary: WalkSummary,
}

impl<F: Filesystem> Walker<'_, F> {
    /// Walks one open directory. `root` is `None` when `current` is the root.
    fn walk_dir(
        &mut self,
        root: Option<BorrowedFd<'_>>,
        current: &mut F::Stream,
        stack: Option<&DirStack<'_>>,
    ) -> Result<(), WalkError> {
        while let Some(entry) = current.next_entry() {
            let entry = entry
                .map_err(|error| WalkError::read_directory(display_path(stack, None), error))?;
            let anchor = current.as_fd();
            let root = root.unwrap_or(anchor);
            let name = entry.name();

            let route = classify(&entry, || self.fs.stat_at(anchor, name))
                .map_err(|error| WalkError::metadata(display_path(stack, Some(name)), error))?;
            match route {
                Route::Ignore => {}
                Route::Skip => self.summary.skipped += 1,
                Route::Directory => self.handle_directory(name, root, anchor, stack)?,
                Route::Symlink => self.handle_symlink(name, root, stack)?,
            }
        }
        Ok(())
    }

    fn handle_directory(
        &mut self,
        name: &OsStr,
        root: BorrowedFd<'_>,
        anchor: BorrowedFd<'_>,
        stack: Option<&DirStack<'_>>,
    ) -> Result<(), WalkError> {
        let node = DirStack::new(name, stack);
        let depth = node.depth();
        if depth > self.limits.max_depth {
            return Err(WalkError::too_deep(
                display_path(Some(&node), None),
                self.limits.max_depth,
            ));
        }
        let how = OpenHow::directory(self.resolve);
        let fd = openat2_with_retry(self.fs, anchor, Path::new(name), how).map_err(|error| {
            WalkError::open_directory(display_path(Some(&node), None), error)
        })?;
        let mut stream = self
            .fs
            .open_stream(fd)
            .map_err(|error| WalkError::open_stream(display_path(Some(&node), None), error))?;

        self.summary.directories += 1;
        trace_walk!(name = ?name, depth, "entering directory");
        self.walk_dir(Some(root), &mut stream, Some(&node))
    }

    fn handle_symlink(
        &mut self,
        name: &OsStr,
        root: BorrowedFd<'_>,
        stack: Option<&DirStack<'_>>,
    ) -> Result<(), WalkError> {
        let path = reconstruct(stack, name, self.limits)
            .map_err(|error| WalkError::build_path(display_path(stack, Some(name)), error))?;
        let how = OpenHow::path_only(self.resolve);
        let resolved = openat2_with_retry(self.fs, root, &path, how)
            .map_err(|error| WalkError::open_symlink(path.clone(), error))?;
        drop(resolved);

        self.summary.symlinks += 1;
        trace_walk!(path = %path.display(), "resolved symlink");
        Ok(())
    }
}
