//! A thin, non-owning wrapper for raw OS file handles.

#[cfg(unix)]
use std::os::unix::io::{BorrowedFd, RawFd};
#[cfg(windows)]
use std::os::windows::raw::HANDLE;

/// An open OS file description.
///
/// `FileHandle` is a plain value wrapping the raw handle integer, so it
/// can't be accidentally used as an array index or a counter, but it does
/// not own the handle: the caller opens the file, this crate operates on
/// it, and the caller closes it. Copying a `FileHandle` does not duplicate
/// the underlying description.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(RawFd);

/// An open OS file description.
///
/// `FileHandle` is a plain value wrapping the raw handle, so it can't be
/// accidentally used as an array index or a counter, but it does not own
/// the handle: the caller opens the file, this crate operates on it, and
/// the caller closes it.
#[cfg(windows)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(isize);

#[cfg(unix)]
impl FileHandle {
    /// Wrap a raw file descriptor.
    ///
    /// The descriptor must remain open for as long as operations are issued
    /// through the returned handle.
    #[inline]
    #[must_use]
    pub const fn from_raw(fd: RawFd) -> Self {
        Self(fd)
    }

    /// The raw file descriptor.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> RawFd {
        self.0
    }

    /// Borrow the descriptor for the duration of a system call.
    #[inline]
    pub(crate) fn as_fd(&self) -> BorrowedFd<'_> {
        // The caller guarantees the descriptor is open; see `from_raw`.
        unsafe { BorrowedFd::borrow_raw(self.0) }
    }
}

#[cfg(windows)]
impl FileHandle {
    /// Wrap a raw Win32 `HANDLE`.
    ///
    /// The handle must remain open for as long as operations are issued
    /// through the returned value.
    #[inline]
    #[must_use]
    pub fn from_raw(handle: HANDLE) -> Self {
        Self(handle as isize)
    }

    /// The raw Win32 `HANDLE`.
    #[inline]
    #[must_use]
    pub fn raw(self) -> HANDLE {
        self.0 as HANDLE
    }

    /// The handle as the integer type `windows-sys` expects.
    #[inline]
    pub(crate) fn as_sys(self) -> isize {
        self.0
    }
}
