//! Owned directory stream built on `fdopendir(3)`.
//!
//! `fdopendir` takes over the descriptor it is given, so [`DirStream::from_fd`]
//! consumes the [`OwnedFd`] and the stream closes it exactly once through
//! `closedir(3)` when dropped.

#![allow(unsafe_code)]

use std::ffi::{CStr, OsStr};
use std::io;
use std::os::fd::{AsFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::ptr::NonNull;

use crate::entry::{DirEntry, EntryKind};
use crate::fs::DirectoryStream;

/// Directory stream that owns its descriptor.
#[derive(Debug)]
pub struct DirStream {
    dir: NonNull<libc::DIR>,
    fd: RawFd,
}

impl DirStream {
    /// Converts an open directory descriptor into an enumerable stream.
    ///
    /// Ownership of `fd` moves into the stream. If `fdopendir` fails the
    /// descriptor is closed before the error is returned.
    pub fn from_fd(fd: OwnedFd) -> io::Result<Self> {
        let raw = fd.into_raw_fd();
        // SAFETY: `raw` is a valid descriptor whose ownership we just took.
        let dir = unsafe { libc::fdopendir(raw) };
        match NonNull::new(dir) {
            Some(dir) => Ok(Self { dir, fd: raw }),
            None => {
                let error = io::Error::last_os_error();
                // SAFETY: fdopendir leaves the descriptor untouched on failure,
                // so we still own it and nothing else will close it.
                drop(unsafe { OwnedFd::from_raw_fd(raw) });
                Err(error)
            }
        }
    }

    /// Reads the next record, including `.` and `..`.
    pub fn read_entry(&mut self) -> Option<io::Result<DirEntry>> {
        // readdir returns null both at end of stream and on error; only errno
        // tells them apart.
        // SAFETY: __errno_location returns the calling thread's errno slot.
        unsafe { *libc::__errno_location() = 0 };
        // SAFETY: `self.dir` came from a successful fdopendir and stays open
        // until drop.
        let record = unsafe { libc::readdir(self.dir.as_ptr()) };
        if record.is_null() {
            let error = io::Error::last_os_error();
            return match error.raw_os_error() {
                None | Some(0) => None,
                Some(_) => Some(Err(error)),
            };
        }
        // SAFETY: a non-null record stays valid until the next readdir call on
        // this stream; the name is copied out before returning.
        let record = unsafe { &*record };
        // SAFETY: d_name is NUL-terminated within the record.
        let name = unsafe { CStr::from_ptr(record.d_name.as_ptr()) };
        Some(Ok(DirEntry::new(
            OsStr::from_bytes(name.to_bytes()),
            EntryKind::from_d_type(record.d_type),
        )))
    }
}

impl AsFd for DirStream {
    fn as_fd(&self) -> BorrowedFd<'_> {
        // SAFETY: the descriptor is owned by the DIR and outlives `&self`.
        unsafe { BorrowedFd::borrow_raw(self.fd) }
    }
}

impl DirectoryStream for DirStream {
    fn next_entry(&mut self) -> Option<io::Result<DirEntry>> {
        self.read_entry()
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        // SAFETY: the DIR is valid and is closed only here.
        unsafe {
            libc::closedir(self.dir.as_ptr());
        }
    }
}
