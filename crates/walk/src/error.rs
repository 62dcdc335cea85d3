use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::path::PathError;

/// Error returned when traversal fails.
///
/// Every variant is terminal: the walk stops at the first failing entry.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct WalkError(WalkErrorKind);

impl WalkError {
    pub(crate) fn new(kind: WalkErrorKind) -> Self {
        Self(kind)
    }

    pub(crate) fn open_root(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::OpenRoot { path, source })
    }

    pub(crate) fn open_directory(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::OpenDirectory { path, source })
    }

    pub(crate) fn open_stream(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::OpenStream { path, source })
    }

    pub(crate) fn read_directory(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::ReadDirectory { path, source })
    }

    pub(crate) fn metadata(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::Metadata { path, source })
    }

    pub(crate) fn open_symlink(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::OpenSymlink { path, source })
    }

    pub(crate) fn build_path(path: PathBuf, source: PathError) -> Self {
        Self::new(WalkErrorKind::BuildPath { path, source })
    }

    pub(crate) fn too_deep(path: PathBuf, max: usize) -> Self {
        Self::new(WalkErrorKind::TooDeep { path, max })
    }

    pub(crate) fn spawn_worker(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::SpawnWorker { path, source })
    }

    /// Returns the specific failure that terminated traversal.
    #[must_use]
    pub const fn kind(&self) -> &WalkErrorKind {
        &self.0
    }

    /// Returns the root-relative path of the entry that failed.
    ///
    /// For [`Operation::OpenRoot`] this is the root path exactly as supplied
    /// by the caller.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.0.path()
    }

    /// Returns the operation that failed.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.0.operation()
    }

    /// Returns the raw OS error code, when the failure came from a syscall.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.0.io_error().and_then(io::Error::raw_os_error)
    }
}

/// Classification of traversal failures.
#[derive(Debug, Error)]
pub enum WalkErrorKind {
    /// The traversal root could not be opened as a directory.
    #[error("failed to open traversal root '{}': {source}", path.display())]
    OpenRoot {
        /// Root path as supplied by the caller.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// `openat2` rejected or failed to open a directory.
    #[error("openat2 failed to open directory '{}': {source}", path.display())]
    OpenDirectory {
        /// Root-relative path of the directory.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// An open directory descriptor could not be turned into a stream.
    #[error("failed to open directory stream for '{}': {source}", path.display())]
    OpenStream {
        /// Root-relative path of the directory.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// Reading the next record from a directory stream failed.
    #[error("failed to read entry in '{}': {source}", path.display())]
    ReadDirectory {
        /// Root-relative path of the directory being enumerated.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// `fstatat` failed for an entry of unknown type.
    #[error("fstatat failed for '{}': {source}", path.display())]
    Metadata {
        /// Root-relative path of the entry.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// `openat2` rejected or failed to resolve a symlink from the root.
    #[error("openat2 failed to open symlink '{}': {source}", path.display())]
    OpenSymlink {
        /// Reconstructed root-relative path of the symlink.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// The root-relative path of a symlink could not be rebuilt.
    #[error("constructed relative path for '{}' is unusable: {source}", path.display())]
    BuildPath {
        /// Best-effort root-relative path of the symlink.
        path: PathBuf,
        /// Limit that was exceeded.
        #[source]
        source: PathError,
    },
    /// A directory sits deeper below the root than the configured bound.
    #[error("directory '{}' is nested deeper than {max} levels", path.display())]
    TooDeep {
        /// Root-relative path of the directory that was not opened.
        path: PathBuf,
        /// Configured depth bound.
        max: usize,
    },
    /// The thread that runs the walk could not be started.
    #[error("failed to start walker thread for '{}': {source}", path.display())]
    SpawnWorker {
        /// Root path as supplied by the caller.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
}

impl WalkErrorKind {
    /// Returns the filesystem path tied to the failure.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::OpenRoot { path, .. }
            | Self::OpenDirectory { path, .. }
            | Self::OpenStream { path, .. }
            | Self::ReadDirectory { path, .. }
            | Self::Metadata { path, .. }
            | Self::OpenSymlink { path, .. }
            | Self::BuildPath { path, .. }
            | Self::TooDeep { path, .. }
            | Self::SpawnWorker { path, .. } => path,
        }
    }

    /// Returns the operation that failed.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::OpenRoot { .. } => Operation::OpenRoot,
            Self::OpenDirectory { .. } => Operation::OpenDirectory,
            Self::OpenStream { .. } => Operation::OpenStream,
            Self::ReadDirectory { .. } => Operation::ReadDirectory,
            Self::Metadata { .. } => Operation::Metadata,
            Self::OpenSymlink { .. } => Operation::OpenSymlink,
            Self::BuildPath { .. } => Operation::BuildPath,
            Self::TooDeep { .. } => Operation::Descend,
            Self::SpawnWorker { .. } => Operation::SpawnWorker,
        }
    }

    fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::OpenRoot { source, .. }
            | Self::OpenDirectory { source, .. }
            | Self::OpenStream { source, .. }
            | Self::ReadDirectory { source, .. }
            | Self::Metadata { source, .. }
            | Self::OpenSymlink { source, .. }
            | Self::SpawnWorker { source, .. } => Some(source),
            Self::BuildPath { .. } | Self::TooDeep { .. } => None,
        }
    }
}

/// Operation that was in progress when a walk failed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    /// Opening the traversal root.
    OpenRoot,
    /// Opening a directory with `openat2`.
    OpenDirectory,
    /// Converting a directory descriptor into a stream.
    OpenStream,
    /// Reading a directory stream.
    ReadDirectory,
    /// Querying metadata for an entry of unknown type.
    Metadata,
    /// Resolving a symlink from the root with `openat2`.
    OpenSymlink,
    /// Rebuilding the root-relative path of a symlink.
    BuildPath,
    /// Descending into a directory below the depth bound.
    Descend,
    /// Starting the thread that runs the walk.
    SpawnWorker,
}

impl Operation {
    /// Returns the stable, human-readable operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenRoot => "open-root",
            Self::OpenDirectory => "open-directory",
            Self::OpenStream => "open-stream",
            Self::ReadDirectory => "read-directory",
            Self::Metadata => "metadata-query",
            Self::OpenSymlink => "open-symlink",
            Self::BuildPath => "build-path",
            Self::Descend => "descend",
            Self::SpawnWorker => "spawn-worker",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
