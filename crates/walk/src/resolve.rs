//! Constrained `openat2` calls with transient-failure retry.

use std::io;
use std::os::fd::{BorrowedFd, OwnedFd};
use std::path::Path;

use logging::trace_resolve;
use rustix::fs::{OFlags, ResolveFlags};

use crate::fs::Filesystem;

/// Upper bound on consecutive `EINTR`/`EAGAIN` retries for one path.
///
/// `RESOLVE_CACHED` reports `EAGAIN` for as long as the dentry cache cannot
/// satisfy the lookup, so an unbounded loop could spin forever.
pub const MAX_TRANSIENT_RETRIES: usize = 1024;

/// The `open_how` fields the walker varies between calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OpenHow {
    flags: OFlags,
    resolve: ResolveFlags,
}

impl OpenHow {
    /// Flags used for directories: `O_DIRECTORY | O_NOFOLLOW | O_CLOEXEC`.
    #[must_use]
    pub const fn directory(resolve: ResolveFlags) -> Self {
        Self {
            flags: OFlags::RDONLY
                .union(OFlags::DIRECTORY)
                .union(OFlags::NOFOLLOW)
                .union(OFlags::CLOEXEC),
            resolve,
        }
    }

    /// Flags used for symlinks: `O_PATH | O_CLOEXEC`.
    #[must_use]
    pub const fn path_only(resolve: ResolveFlags) -> Self {
        Self {
            flags: OFlags::PATH.union(OFlags::CLOEXEC),
            resolve,
        }
    }

    /// Open flags passed in `open_how.flags`.
    #[must_use]
    pub const fn flags(self) -> OFlags {
        self.flags
    }

    /// Resolution flags passed in `open_how.resolve`.
    #[must_use]
    pub const fn resolve(self) -> ResolveFlags {
        self.resolve
    }
}

/// Returns `true` for the errors the retry loop absorbs (`EINTR`, `EAGAIN`).
#[must_use]
pub fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

/// Opens `path` relative to `anchor`, retrying transient failures.
///
/// Any other error, including policy rejections such as `EXDEV` or `ELOOP`,
/// is returned on the first occurrence. After [`MAX_TRANSIENT_RETRIES`]
/// retries the last transient error is returned as-is.
pub fn openat2_with_retry<F>(
    fs: &F,
    anchor: BorrowedFd<'_>,
    path: &Path,
    how: OpenHow,
) -> io::Result<OwnedFd>
where
    F: Filesystem + ?Sized,
{
    let mut retries = 0;
    loop {
        match fs.openat2(anchor, path, how) {
            Ok(fd) => return Ok(fd),
            Err(error) if is_transient(&error) && retries < MAX_TRANSIENT_RETRIES => {
                retries += 1;
                trace_resolve!(
                    path = %path.display(),
                    retries,
                    "retrying openat2 after transient failure: {error}"
                );
            }
            Err(error) => return Err(error),
        }
    }
}
