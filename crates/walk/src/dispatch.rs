use std::ffi::OsStr;
use std::io;

use crate::entry::{DirEntry, EntryKind};

/// Handler an entry is routed to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    /// `.` or `..`; never handled and not counted.
    Ignore,
    /// An entry with no resolution obligation (files, sockets, devices).
    Skip,
    /// Open with `openat2` anchored at the parent, then recurse.
    Directory,
    /// Resolve from the root with `openat2`.
    Symlink,
}

/// Returns `true` for the `.` and `..` entries.
#[must_use]
pub fn is_dot_entry(name: &OsStr) -> bool {
    name == "." || name == ".."
}

/// Picks the single handler for `entry`.
///
/// Entries reporting [`EntryKind::Unknown`] are classified by calling
/// `metadata`, which must not follow symlinks. It is not called for any other
/// entry. A metadata failure is returned unchanged.
pub fn classify<M>(entry: &DirEntry, metadata: M) -> io::Result<Route>
where
    M: FnOnce() -> io::Result<EntryKind>,
{
    if is_dot_entry(entry.name()) {
        return Ok(Route::Ignore);
    }
    let route = match entry.kind() {
        EntryKind::Directory => Route::Directory,
        EntryKind::Symlink => Route::Symlink,
        EntryKind::Unknown => match metadata()? {
            EntryKind::Symlink => Route::Symlink,
            EntryKind::Directory => Route::Directory,
            _ => Route::Skip,
        },
        EntryKind::Regular | EntryKind::Other => Route::Skip,
    };
    Ok(route)
}
