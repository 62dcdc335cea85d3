use std::ffi::OsStr;
use std::io;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::path::Path;

use rustix::fs::{AtFlags, CWD, FileType, Mode, OFlags};

use crate::entry::{DirEntry, EntryKind};
use crate::resolve::OpenHow;
use crate::stream::DirStream;

/// Enumerable directory stream that exposes the descriptor it reads from.
pub trait DirectoryStream: AsFd {
    /// Returns the next record, `None` at the end of the stream.
    fn next_entry(&mut self) -> Option<io::Result<DirEntry>>;
}

/// The syscalls issued by the walker.
///
/// Implementations issue exactly one attempt per call; retrying transient
/// failures is the caller's job (see [`crate::openat2_with_retry`]).
pub trait Filesystem {
    /// Stream type produced by [`Filesystem::open_stream`].
    type Stream: DirectoryStream;

    /// Opens the traversal root as a directory without following a trailing
    /// symlink.
    fn open_root(&self, path: &Path) -> io::Result<OwnedFd>;

    /// Issues a single `openat2` call anchored at `anchor`.
    fn openat2(&self, anchor: BorrowedFd<'_>, path: &Path, how: OpenHow) -> io::Result<OwnedFd>;

    /// Converts a directory descriptor into a stream, taking ownership of it.
    fn open_stream(&self, fd: OwnedFd) -> io::Result<Self::Stream>;

    /// Reports the type of `name` inside `anchor` without following symlinks.
    fn stat_at(&self, anchor: BorrowedFd<'_>, name: &OsStr) -> io::Result<EntryKind>;
}

/// [`Filesystem`] backed by the running kernel.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemFilesystem;

impl Filesystem for SystemFilesystem {
    type Stream = DirStream;

    fn open_root(&self, path: &Path) -> io::Result<OwnedFd> {
        let flags = OFlags::RDONLY | OFlags::DIRECTORY | OFlags::NOFOLLOW | OFlags::CLOEXEC;
        Ok(rustix::fs::openat(CWD, path, flags, Mode::empty())?)
    }

    fn openat2(&self, anchor: BorrowedFd<'_>, path: &Path, how: OpenHow) -> io::Result<OwnedFd> {
        Ok(rustix::fs::openat2(
            anchor,
            path,
            how.flags(),
            Mode::empty(),
            how.resolve(),
        )?)
    }

    fn open_stream(&self, fd: OwnedFd) -> io::Result<DirStream> {
        DirStream::from_fd(fd)
    }

    fn stat_at(&self, anchor: BorrowedFd<'_>, name: &OsStr) -> io::Result<EntryKind> {
        let stat = rustix::fs::statat(anchor, name, AtFlags::SYMLINK_NOFOLLOW)?;
        Ok(EntryKind::from_file_type(FileType::from_raw_mode(
            stat.st_mode,
        )))
    }
}
