//! Shared test utilities for the openat2-resolve workspace.
//!
//! Helpers panic on setup failures; they are only meant for tests.

#![allow(clippy::missing_panics_doc)]

use std::fs;
use std::io::{self, Write};
use std::thread;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use rustix::fs::{CWD, Mode, OFlags, ResolveFlags};
use tempfile::TempDir;

/// Temporary directory tree with a `root` directory to walk and an
/// `outside` sibling that symlinks can point at.
pub struct TempTree {
    temp: TempDir,
    root: PathBuf,
}

impl TempTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("create tempdir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("create root");
        fs::create_dir(temp.path().join("outside")).expect("create outside");
        Self { temp, root }
    }

    /// The directory to walk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A directory next to the root, outside the walked tree.
    #[must_use]
    pub fn outside(&self) -> PathBuf {
        self.temp.path().join("outside")
    }

    /// Creates `relative` (and its parents) beneath the root.
    pub fn dir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.root.join(relative)).expect("create directory");
        self
    }

    /// Creates a regular file at `relative` beneath the root.
    pub fn file(&self, relative: &str) -> &Self {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, b"data").expect("write file");
        self
    }

    /// Creates a symlink at `relative` beneath the root pointing at `target`.
    ///
    /// `target` is stored verbatim, so relative targets are resolved from the
    /// link's directory.
    pub fn symlink<T: AsRef<Path>>(&self, target: T, relative: &str) -> &Self {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        symlink(target, path).expect("create symlink");
        self
    }
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports whether the running kernel supports `openat2(2)`.
///
/// Kernels older than 5.6 and some sandboxes reject the syscall; tests that
/// need the real syscall return early when this is `false`. Each `false`
/// writes a skip note straight to stderr, past the harness's output capture,
/// so a green run without coverage is visible.
#[must_use]
pub fn openat2_available() -> bool {
    let available = rustix::fs::openat2(
        CWD,
        ".",
        OFlags::PATH | OFlags::CLOEXEC,
        Mode::empty(),
        ResolveFlags::empty(),
    )
    .is_ok();
    if !available {
        let current = thread::current();
        let _ = writeln!(io::stderr(), "{}", skip_note(current.name()));
    }
    available
}

fn skip_note(test: Option<&str>) -> String {
    format!(
        "skipped {}: openat2(2) is not available",
        test.unwrap_or("<unnamed>")
    )
}

/// Counts the descriptors currently open in this process.
///
/// The count includes the descriptor used to read `/proc/self/fd` itself, so
/// only differences between two calls are meaningful.
#[must_use]
pub fn open_descriptor_count() -> usize {
    fs::read_dir("/proc/self/fd")
        .expect("read /proc/self/fd")
        .count()
}
