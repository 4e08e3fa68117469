//! File opening and raw data transfer.
//!
//! The handles returned by [`open_readable`] and [`open_writable`] are
//! caller-owned: this crate never closes a handle on its own, and no
//! registry of open handles is kept. Reads and writes of arbitrary size are
//! satisfied by the chunked transfer engine, so callers never see the
//! kernel's per-call transfer ceiling or short-read/short-write semantics.

use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::path::PlatformPath;
use crate::sys;
use crate::transfer;
use std::io::SeekFrom;

/// Open a file for reading.
///
/// Fails distinctly if `path` resolves to a directory, which some platforms
/// would otherwise happily open as an eternally-empty stream.
pub fn open_readable(path: &PlatformPath) -> Result<FileHandle> {
    sys::open_readable(path)
}

/// Open a file for writing, creating it if it does not exist.
///
/// `write_only` selects write-only over read-write access; `truncate`
/// discards existing contents; `append` positions the handle at end-of-file
/// after opening. The explicit repositioning matters: the OS-level append
/// flag does not guarantee the initial position on every platform.
pub fn open_writable(
    path: &PlatformPath,
    write_only: bool,
    truncate: bool,
    append: bool,
) -> Result<FileHandle> {
    sys::open_writable(path, write_only, truncate, append)
}

/// Read up to `buf.len()` bytes from the handle's current position.
///
/// Returns the number of bytes read. A result smaller than `buf.len()`
/// means end-of-stream was reached; it is not an error. The request is
/// split into kernel-acceptable chunks internally, so `buf` may be
/// arbitrarily large.
pub fn read(handle: FileHandle, buf: &mut [u8]) -> Result<usize> {
    transfer::read_in_chunks(buf, transfer::MAX_TRANSFER_SIZE, |chunk| {
        sys::read_some(handle, chunk)
    })
    .map_err(|e| Error::os("Error reading bytes from file", e))
}

/// Read up to `buf.len()` bytes at the given byte offset.
///
/// The handle's seek cursor is left unmodified, so concurrent callers
/// issuing reads at different offsets against the same handle do not
/// disturb each other. Otherwise the contract is the same as [`read`].
pub fn read_at(handle: FileHandle, buf: &mut [u8], offset: u64) -> Result<usize> {
    transfer::read_at_in_chunks(buf, offset, transfer::MAX_TRANSFER_SIZE, |chunk, pos| {
        sys::pread_some(handle, chunk, pos)
    })
    .map_err(|e| Error::os("Error reading bytes from file", e))
}

/// Write all of `buf` at the handle's current position.
///
/// Loops over short writes and the kernel's per-call ceiling; on success
/// every byte has been handed to the OS. A failing underlying call aborts
/// immediately with the OS error.
pub fn write(handle: FileHandle, buf: &[u8]) -> Result<()> {
    transfer::write_in_chunks(buf, transfer::MAX_TRANSFER_SIZE, |chunk| {
        sys::write_some(handle, chunk)
    })
    .map_err(|e| Error::os("Error writing bytes to file", e))
}

/// Move the handle's seek cursor, returning the new position.
pub fn seek(handle: FileHandle, pos: SeekFrom) -> Result<u64> {
    sys::seek(handle, pos).map_err(|e| Error::os("Error seeking in file", e))
}

/// The handle's current seek position.
pub fn tell(handle: FileHandle) -> Result<u64> {
    sys::tell(handle).map_err(|e| Error::os("Error seeking in file", e))
}

/// Truncate or extend the file to exactly `size` bytes.
pub fn truncate(handle: FileHandle, size: u64) -> Result<()> {
    sys::truncate(handle, size).map_err(|e| Error::os("Error truncating file", e))
}

/// The size of the file behind `handle`, in bytes.
///
/// A reported size of zero is double-checked by querying the position:
/// seekable files genuinely have a size, while non-seekable streams (pipes,
/// character devices) report zero no matter how much data they carry, so
/// for those the probe turns a misleading `0` into an error.
pub fn size(handle: FileHandle) -> Result<u64> {
    let len = sys::stat_len(handle).map_err(|e| Error::os("error stat()ing file", e))?;
    if len == 0 {
        tell(handle)?;
    }
    Ok(len)
}

/// Close the handle.
///
/// After this returns the handle must not be used again, even on error.
pub fn close(handle: FileHandle) -> Result<()> {
    sys::close(handle).map_err(|e| Error::os("error closing file", e))
}

/// Create an anonymous pipe, returning `(read_end, write_end)`.
///
/// Both handles are caller-owned.
pub fn create_pipe() -> Result<(FileHandle, FileHandle)> {
    sys::create_pipe().map_err(|e| Error::os("Error creating pipe", e))
}
