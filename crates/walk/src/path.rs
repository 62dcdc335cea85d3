//! Root-relative path reconstruction for symlink resolution.
//!
//! Directories are opened one component at a time, but a symlink has to be
//! resolved as a full path from the root descriptor so that the resolution
//! flags cover the whole chain. The helpers here rebuild that path from the
//! directory-name stack.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::PathBuf;

use thiserror::Error;

use crate::stack::{DirStack, components};

/// Capacity of the reconstruction buffer, terminator included.
pub const PATH_MAX: usize = libc::PATH_MAX as usize;

/// Deepest directory the walk descends into, and deepest stack a symlink
/// path may be rebuilt from.
pub const MAX_DIR_DEPTH: usize = 4096;

/// Limits applied when rebuilding a root-relative path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PathLimits {
    /// Destination capacity in bytes, including the NUL terminator the
    /// kernel expects.
    pub capacity: usize,
    /// Maximum number of directory components below the root.
    pub max_depth: usize,
}

impl Default for PathLimits {
    fn default() -> Self {
        Self {
            capacity: PATH_MAX,
            max_depth: MAX_DIR_DEPTH,
        }
    }
}

/// Reasons a root-relative path could not be rebuilt.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum PathError {
    /// The joined path does not fit in the destination buffer.
    #[error("path needs {required} bytes but the buffer holds {capacity}")]
    TooLong {
        /// Bytes needed, terminator included.
        required: usize,
        /// Bytes available.
        capacity: usize,
    },
    /// The directory stack is deeper than the configured bound.
    #[error("traversed deeper than {max} directories")]
    TooDeep {
        /// Configured depth bound.
        max: usize,
    },
}

/// Joins the directory stack and `file_name` into `dir1/dir2/.../file_name`.
///
/// The stack is stored innermost-first, so components are emitted in reverse.
/// Both limits are checked before the path is assembled: a path whose length
/// plus terminator exceeds `limits.capacity` by a single byte is rejected.
///
/// # Examples
///
/// ```
/// use std::ffi::OsStr;
/// use walk::{DirStack, PathLimits, reconstruct};
///
/// let a = DirStack::new(OsStr::new("a"), None);
/// let b = DirStack::new(OsStr::new("b"), Some(&a));
/// let path = reconstruct(Some(&b), OsStr::new("f"), PathLimits::default()).unwrap();
/// assert_eq!(path, std::path::Path::new("a/b/f"));
/// ```
pub fn reconstruct(
    stack: Option<&DirStack<'_>>,
    file_name: &OsStr,
    limits: PathLimits,
) -> Result<PathBuf, PathError> {
    let mut names: Vec<&OsStr> = Vec::new();
    for name in components(stack) {
        if names.len() >= limits.max_depth {
            return Err(PathError::TooDeep {
                max: limits.max_depth,
            });
        }
        names.push(name);
    }

    let required = names.iter().map(|name| name.len() + 1).sum::<usize>() + file_name.len() + 1;
    if required > limits.capacity {
        return Err(PathError::TooLong {
            required,
            capacity: limits.capacity,
        });
    }

    let mut buf = Vec::with_capacity(required - 1);
    for name in names.iter().rev() {
        buf.extend_from_slice(name.as_bytes());
        buf.push(b'/');
    }
    buf.extend_from_slice(file_name.as_bytes());
    Ok(PathBuf::from(OsString::from_vec(buf)))
}

/// Renders a root-relative path for diagnostics, without any limits.
///
/// With no stack and no name the root itself is rendered as `.`.
#[must_use]
pub fn display_path(stack: Option<&DirStack<'_>>, name: Option<&OsStr>) -> PathBuf {
    let mut names: Vec<&OsStr> = components(stack).collect();
    names.reverse();
    let mut path: PathBuf = names.into_iter().collect();
    if let Some(name) = name {
        path.push(name);
    }
    if path.as_os_str().is_empty() {
        path.push(".");
    }
    path
}
