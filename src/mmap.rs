//! Resizable file-backed memory mappings.

use crate::error::Result;
use crate::handle::FileHandle;
use crate::sys;
use std::slice;

/// A file-backed, read/write, shared memory mapping.
///
/// Like [`FileHandle`], a `MappedRegion` is a caller-owned resource: it has
/// no destructor, and unmapping is an explicit call. [`remap`] consumes the
/// region it resizes, so the invalidated range cannot be touched through
/// this type afterwards, even when the OS happens to return the same base
/// address.
///
/// [`remap`]: Self::remap
#[derive(Debug)]
pub struct MappedRegion {
    addr: *mut u8,
    len: usize,
    file: FileHandle,
}

impl MappedRegion {
    /// Map `len` bytes of `file`, starting at offset zero, for reading and
    /// writing. The mapping is shared: stores become visible to the file.
    pub fn map(file: FileHandle, len: usize) -> Result<Self> {
        let addr = sys::map(file, len)?;
        Ok(Self { addr, len, file })
    }

    /// Assemble a region from parts produced elsewhere.
    ///
    /// # Safety
    ///
    /// `addr` must be the base of a live mapping of exactly `len` bytes,
    /// mapped shared and read/write from `file` at offset zero.
    pub unsafe fn from_raw(addr: *mut u8, len: usize, file: FileHandle) -> Self {
        Self { addr, len, file }
    }

    /// Grow or shrink the region to `new_len` bytes, resizing the backing
    /// file to match.
    ///
    /// The old region is consumed and must be considered gone whatever the
    /// outcome. On platforms without a kernel remap primitive this unmaps,
    /// resizes the file, and maps afresh; if any step fails the mapping is
    /// left in an unspecified, partially-torn-down state and the error is
    /// fatal to it. There is no retry-in-place.
    pub fn remap(self, new_len: usize) -> Result<Self> {
        let file = self.file;
        let new_addr = sys::remap(self.addr, self.len, new_len, file)?;
        Ok(Self {
            addr: new_addr,
            len: new_len,
            file,
        })
    }

    /// Flush modified pages back to the backing file.
    pub fn flush(&self) -> Result<()> {
        sys::flush_map(self.addr, self.len)
    }

    /// Unmap the region.
    pub fn unmap(self) -> Result<()> {
        sys::unmap(self.addr, self.len)
    }

    /// The base address of the mapping.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> *mut u8 {
        self.addr
    }

    /// The length of the mapping, in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mapping is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The handle of the backing file.
    #[inline]
    #[must_use]
    pub fn file(&self) -> FileHandle {
        self.file
    }

    /// View the mapped bytes.
    ///
    /// # Safety
    ///
    /// The caller must ensure no one else is writing the region for the
    /// lifetime of the slice.
    pub unsafe fn as_slice(&self) -> &[u8] {
        slice::from_raw_parts(self.addr, self.len)
    }

    /// View the mapped bytes mutably.
    ///
    /// # Safety
    ///
    /// The caller must ensure no one else is accessing the region for the
    /// lifetime of the slice.
    pub unsafe fn as_mut_slice(&mut self) -> &mut [u8] {
        slice::from_raw_parts_mut(self.addr, self.len)
    }
}
