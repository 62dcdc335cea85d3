use std::ffi::{OsStr, OsString};

use rustix::fs::FileType;

/// File type reported for a directory entry.
///
/// Filesystems are free to report [`EntryKind::Unknown`] from `readdir(3)`;
/// the dispatcher then falls back to an explicit metadata query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
    /// A regular file.
    Regular,
    /// A fifo, socket or device node.
    Other,
    /// The filesystem did not report a type (`DT_UNKNOWN`).
    Unknown,
}

impl EntryKind {
    /// Maps the `d_type` byte of a `dirent` record.
    #[must_use]
    pub const fn from_d_type(d_type: u8) -> Self {
        match d_type {
            libc::DT_DIR => Self::Directory,
            libc::DT_LNK => Self::Symlink,
            libc::DT_REG => Self::Regular,
            libc::DT_UNKNOWN => Self::Unknown,
            _ => Self::Other,
        }
    }

    /// Maps the file type decoded from an `st_mode` field.
    ///
    /// A mode never reports "unknown", so anything unrecognised becomes
    /// [`EntryKind::Other`].
    #[must_use]
    pub const fn from_file_type(file_type: FileType) -> Self {
        match file_type {
            FileType::Directory => Self::Directory,
            FileType::Symlink => Self::Symlink,
            FileType::RegularFile => Self::Regular,
            _ => Self::Other,
        }
    }
}

/// A single record read from a directory stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirEntry {
    name: OsString,
    kind: EntryKind,
}

impl DirEntry {
    /// Creates an entry from its name and reported type.
    #[must_use]
    pub fn new<N: Into<OsString>>(name: N, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Returns the entry name, a single path component.
    #[must_use]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Returns the type reported by the directory stream.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Replaces the reported type.
    #[must_use]
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }
}
