//! Posix-ish implementations of the OS primitives, via `rustix` and `libc`.

use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::path::PlatformPath;
use core::ffi::c_void;
use rustix::fs::{FileType, Mode, OFlags};
use rustix::mm;
use std::io;
use std::os::unix::io::IntoRawFd;
use std::ptr;

pub(crate) fn open_readable(path: &PlatformPath) -> Result<FileHandle> {
    let fd = rustix::fs::open(path.as_path(), OFlags::RDONLY | OFlags::CLOEXEC, Mode::empty())
        .map_err(|e| Error::file_op("open local", path, e.into()))?;
    let handle = FileHandle::from_raw(fd.into_raw_fd());

    // open(O_RDONLY) succeeds on directories; every subsequent read would
    // then report zero bytes. Check and fail distinctly instead.
    match rustix::fs::fstat(handle.as_fd()) {
        Ok(st) => {
            if FileType::from_raw_mode(st.st_mode as _) == FileType::Directory {
                let _ = close(handle);
                return Err(Error::Io(format!(
                    "Cannot open for reading: path '{}' is a directory",
                    path
                )));
            }
        }
        Err(e) => {
            let _ = close(handle);
            return Err(Error::file_op("open local", path, e.into()));
        }
    }

    Ok(handle)
}

pub(crate) fn open_writable(
    path: &PlatformPath,
    write_only: bool,
    truncate: bool,
    append: bool,
) -> Result<FileHandle> {
    let mut oflag = OFlags::CREATE | OFlags::CLOEXEC;
    if truncate {
        oflag |= OFlags::TRUNC;
    }
    if append {
        oflag |= OFlags::APPEND;
    }
    if write_only {
        oflag |= OFlags::WRONLY;
    } else {
        oflag |= OFlags::RDWR;
    }
    let mode = Mode::RUSR | Mode::WUSR | Mode::RGRP | Mode::ROTH;

    let fd = rustix::fs::open(path.as_path(), oflag, mode)
        .map_err(|e| Error::file_op("open local", path, e.into()))?;
    let handle = FileHandle::from_raw(fd.into_raw_fd());

    // O_APPEND only redirects writes; the position itself still starts at
    // the beginning, so move it to the end explicitly.
    if append {
        if let Err(e) = seek(handle, io::SeekFrom::End(0)) {
            let _ = close(handle);
            return Err(Error::file_op("open local", path, e));
        }
    }
    Ok(handle)
}

#[inline]
pub(crate) fn read_some(handle: FileHandle, buf: &mut [u8]) -> io::Result<usize> {
    Ok(rustix::io::read(handle.as_fd(), buf)?)
}

#[inline]
pub(crate) fn pread_some(handle: FileHandle, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    Ok(rustix::io::pread(handle.as_fd(), buf, offset)?)
}

#[inline]
pub(crate) fn write_some(handle: FileHandle, buf: &[u8]) -> io::Result<usize> {
    Ok(rustix::io::write(handle.as_fd(), buf)?)
}

pub(crate) fn seek(handle: FileHandle, pos: io::SeekFrom) -> io::Result<u64> {
    let pos = match pos {
        io::SeekFrom::Start(offset) => rustix::fs::SeekFrom::Start(offset),
        io::SeekFrom::End(offset) => rustix::fs::SeekFrom::End(offset),
        io::SeekFrom::Current(offset) => rustix::fs::SeekFrom::Current(offset),
    };
    Ok(rustix::fs::seek(handle.as_fd(), pos)?)
}

#[inline]
pub(crate) fn tell(handle: FileHandle) -> io::Result<u64> {
    Ok(rustix::fs::tell(handle.as_fd())?)
}

#[inline]
pub(crate) fn truncate(handle: FileHandle, size: u64) -> io::Result<()> {
    Ok(rustix::fs::ftruncate(handle.as_fd(), size)?)
}

pub(crate) fn stat_len(handle: FileHandle) -> io::Result<u64> {
    let st = rustix::fs::fstat(handle.as_fd())?;
    if st.st_size < 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "error getting file size",
        ));
    }
    Ok(st.st_size as u64)
}

pub(crate) fn close(handle: FileHandle) -> io::Result<()> {
    // rustix only closes owned descriptors; this layer doesn't own them,
    // so go through libc and report the result.
    if unsafe { libc::close(handle.raw()) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn create_pipe() -> io::Result<(FileHandle, FileHandle)> {
    let (read_end, write_end) = rustix::pipe::pipe()?;
    Ok((
        FileHandle::from_raw(read_end.into_raw_fd()),
        FileHandle::from_raw(write_end.into_raw_fd()),
    ))
}

//
// Memory mappings
//

pub(crate) fn map(file: FileHandle, len: usize) -> Result<*mut u8> {
    let addr = unsafe {
        mm::mmap(
            ptr::null_mut(),
            len,
            mm::ProtFlags::READ | mm::ProtFlags::WRITE,
            mm::MapFlags::SHARED,
            file.as_fd(),
            0,
        )
    }
    .map_err(|e| Error::os("mmap failed", e.into()))?;
    Ok(addr.cast())
}

/// Resize the mapping at `addr`, possibly moving it.
///
/// On Linux the kernel relocates the existing mapping in place via
/// `mremap`; elsewhere the region is unmapped, the backing file resized,
/// and a fresh mapping created. Either way the old address range must not
/// be used after this returns.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) fn remap(
    addr: *mut u8,
    old_len: usize,
    new_len: usize,
    file: FileHandle,
) -> Result<*mut u8> {
    rustix::fs::ftruncate(file.as_fd(), new_len as u64)
        .map_err(|e| Error::os("ftruncate failed", e.into()))?;
    let new_addr = unsafe {
        mm::mremap(
            addr.cast::<c_void>(),
            old_len,
            new_len,
            mm::MremapFlags::MAYMOVE,
        )
    }
    .map_err(|e| Error::os("mremap failed", e.into()))?;
    Ok(new_addr.cast())
}

/// Resize the mapping at `addr`, possibly moving it.
///
/// There is no remap primitive here, so the region is unmapped first, the
/// backing file resized, and a fresh read/write mapping created. If the
/// unmap itself fails, nothing further is attempted. We can set read/write
/// protection on the new map unconditionally since only read/write maps
/// are resizable in the first place.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub(crate) fn remap(
    addr: *mut u8,
    old_len: usize,
    new_len: usize,
    file: FileHandle,
) -> Result<*mut u8> {
    unsafe { mm::munmap(addr.cast::<c_void>(), old_len) }
        .map_err(|e| Error::os("munmap failed", e.into()))?;
    rustix::fs::ftruncate(file.as_fd(), new_len as u64)
        .map_err(|e| Error::os("ftruncate failed", e.into()))?;
    map(file, new_len)
}

pub(crate) fn flush_map(addr: *mut u8, len: usize) -> Result<()> {
    unsafe { mm::msync(addr.cast::<c_void>(), len, mm::MsyncFlags::SYNC) }
        .map_err(|e| Error::os("msync failed", e.into()))
}

pub(crate) fn unmap(addr: *mut u8, len: usize) -> Result<()> {
    unsafe { mm::munmap(addr.cast::<c_void>(), len) }
        .map_err(|e| Error::os("munmap failed", e.into()))
}
