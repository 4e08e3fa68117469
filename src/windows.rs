//! Windows implementations of the OS primitives, via `windows-sys`.
//!
//! There is no native positional-read call here; `pread_some` goes through
//! `ReadFile` with an `OVERLAPPED` offset instead, which reads at the given
//! position without consulting the stream cursor.

use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::path::PlatformPath;
use core::ffi::c_void;
use std::io;
use std::mem;
use std::ptr;
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_BROKEN_PIPE, ERROR_HANDLE_EOF, GENERIC_READ, GENERIC_WRITE,
    INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, GetFileSizeEx, ReadFile, SetEndOfFile, SetFilePointerEx, WriteFile, CREATE_ALWAYS,
    FILE_ATTRIBUTE_NORMAL, FILE_BEGIN, FILE_CURRENT, FILE_END, FILE_SHARE_DELETE, FILE_SHARE_READ,
    FILE_SHARE_WRITE, OPEN_ALWAYS, OPEN_EXISTING,
};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingW, FlushViewOfFile, MapViewOfFile, UnmapViewOfFile, FILE_MAP_WRITE,
    MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READWRITE,
};
use windows_sys::Win32::System::Pipes::CreatePipe;
use windows_sys::Win32::System::IO::OVERLAPPED;

const ALL_SHARING: u32 = FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE;

pub(crate) fn open_readable(path: &PlatformPath) -> Result<FileHandle> {
    let wide = path.to_wide();
    // Without FILE_FLAG_BACKUP_SEMANTICS a directory cannot be opened this
    // way, so a directory path fails distinctly here rather than opening as
    // an always-empty stream.
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            GENERIC_READ,
            ALL_SHARING,
            ptr::null(),
            OPEN_EXISTING,
            FILE_ATTRIBUTE_NORMAL,
            0,
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(Error::file_op(
            "open local",
            path,
            io::Error::last_os_error(),
        ));
    }
    Ok(FileHandle::from_raw(handle as _))
}

pub(crate) fn open_writable(
    path: &PlatformPath,
    write_only: bool,
    truncate: bool,
    append: bool,
) -> Result<FileHandle> {
    let wide = path.to_wide();
    let access = if write_only {
        GENERIC_WRITE
    } else {
        GENERIC_READ | GENERIC_WRITE
    };
    let disposition = if truncate { CREATE_ALWAYS } else { OPEN_ALWAYS };

    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            access,
            ALL_SHARING,
            ptr::null(),
            disposition,
            FILE_ATTRIBUTE_NORMAL,
            0,
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(Error::file_op(
            "open local",
            path,
            io::Error::last_os_error(),
        ));
    }
    let handle = FileHandle::from_raw(handle as _);

    // Win32 has no open-time append disposition for plain handles; the
    // append contract is satisfied by repositioning to end-of-file here.
    if append {
        if let Err(e) = seek(handle, io::SeekFrom::End(0)) {
            let _ = close(handle);
            return Err(Error::file_op("open local", path, e));
        }
    }
    Ok(handle)
}

pub(crate) fn read_some(handle: FileHandle, buf: &mut [u8]) -> io::Result<usize> {
    let mut nread: u32 = 0;
    let ok = unsafe {
        ReadFile(
            handle.as_sys(),
            buf.as_mut_ptr(),
            buf.len() as u32,
            &mut nread,
            ptr::null_mut(),
        )
    };
    if ok == 0 {
        // A pipe whose write end has closed reports this instead of a
        // zero-byte read.
        if unsafe { GetLastError() } == ERROR_BROKEN_PIPE {
            return Ok(0);
        }
        return Err(io::Error::last_os_error());
    }
    Ok(nread as usize)
}

pub(crate) fn pread_some(handle: FileHandle, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut overlapped: OVERLAPPED = unsafe { mem::zeroed() };
    overlapped.Anonymous.Anonymous = windows_sys::Win32::System::IO::OVERLAPPED_0_0 {
        Offset: offset as u32,
        OffsetHigh: (offset >> 32) as u32,
    };

    // An overlapped ReadFile still advances the file position on a
    // synchronous handle, so save it here and put it back afterwards to
    // keep the cursor-preservation contract.
    let saved = tell(handle)?;

    let mut nread: u32 = 0;
    let ok = unsafe {
        ReadFile(
            handle.as_sys(),
            buf.as_mut_ptr(),
            buf.len() as u32,
            &mut nread,
            &mut overlapped,
        )
    };
    if ok == 0 {
        // Reading at or past end-of-file is the overlapped path's way of
        // signaling end-of-stream, not a failure.
        if unsafe { GetLastError() } == ERROR_HANDLE_EOF {
            seek(handle, io::SeekFrom::Start(saved))?;
            return Ok(0);
        }
        return Err(io::Error::last_os_error());
    }
    seek(handle, io::SeekFrom::Start(saved))?;
    Ok(nread as usize)
}

pub(crate) fn write_some(handle: FileHandle, buf: &[u8]) -> io::Result<usize> {
    let mut nwritten: u32 = 0;
    let ok = unsafe {
        WriteFile(
            handle.as_sys(),
            buf.as_ptr(),
            buf.len() as u32,
            &mut nwritten,
            ptr::null_mut(),
        )
    };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(nwritten as usize)
}

pub(crate) fn seek(handle: FileHandle, pos: io::SeekFrom) -> io::Result<u64> {
    let (method, distance) = match pos {
        io::SeekFrom::Start(offset) => (FILE_BEGIN, offset as i64),
        io::SeekFrom::End(offset) => (FILE_END, offset),
        io::SeekFrom::Current(offset) => (FILE_CURRENT, offset),
    };
    let mut new_pos: i64 = 0;
    let ok = unsafe { SetFilePointerEx(handle.as_sys(), distance, &mut new_pos, method) };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(new_pos as u64)
}

#[inline]
pub(crate) fn tell(handle: FileHandle) -> io::Result<u64> {
    seek(handle, io::SeekFrom::Current(0))
}

pub(crate) fn truncate(handle: FileHandle, size: u64) -> io::Result<()> {
    // SetEndOfFile cuts at the current position, so move there and back.
    let saved = tell(handle)?;
    seek(handle, io::SeekFrom::Start(size))?;
    if unsafe { SetEndOfFile(handle.as_sys()) } == 0 {
        return Err(io::Error::last_os_error());
    }
    seek(handle, io::SeekFrom::Start(saved.min(size)))?;
    Ok(())
}

pub(crate) fn stat_len(handle: FileHandle) -> io::Result<u64> {
    let mut size: i64 = 0;
    if unsafe { GetFileSizeEx(handle.as_sys(), &mut size) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(size as u64)
}

pub(crate) fn close(handle: FileHandle) -> io::Result<()> {
    if unsafe { CloseHandle(handle.as_sys()) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn create_pipe() -> io::Result<(FileHandle, FileHandle)> {
    let mut read_end: isize = 0;
    let mut write_end: isize = 0;
    if unsafe { CreatePipe(&mut read_end, &mut write_end, ptr::null(), 0) } == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok((
        FileHandle::from_raw(read_end as _),
        FileHandle::from_raw(write_end as _),
    ))
}

//
// Memory mappings
//

pub(crate) fn map(file: FileHandle, len: usize) -> Result<*mut u8> {
    let mapping = unsafe {
        CreateFileMappingW(
            file.as_sys(),
            ptr::null(),
            PAGE_READWRITE,
            0,
            0,
            ptr::null(),
        )
    };
    if mapping == 0 {
        return Err(Error::os(
            "CreateFileMapping failed",
            io::Error::last_os_error(),
        ));
    }
    let view = unsafe { MapViewOfFile(mapping, FILE_MAP_WRITE, 0, 0, len) };
    // The view keeps the mapping object alive on its own.
    unsafe { CloseHandle(mapping) };
    if view.Value.is_null() {
        return Err(Error::os(
            "MapViewOfFile failed",
            io::Error::last_os_error(),
        ));
    }
    Ok(view.Value.cast())
}

/// Resize the mapping at `addr` by recreating the view.
///
/// The view is unmapped first; if that fails nothing further is attempted.
/// The file is then resized by repositioning its end-of-file marker, and a
/// fresh mapping object and view are created over the new length.
pub(crate) fn remap(
    addr: *mut u8,
    _old_len: usize,
    new_len: usize,
    file: FileHandle,
) -> Result<*mut u8> {
    let view = MEMORY_MAPPED_VIEW_ADDRESS {
        Value: addr.cast(),
    };
    if unsafe { UnmapViewOfFile(view) } == 0 {
        return Err(Error::os(
            "UnmapViewOfFile failed",
            io::Error::last_os_error(),
        ));
    }

    let mut ignored: i64 = 0;
    let ok = unsafe { SetFilePointerEx(file.as_sys(), new_len as i64, &mut ignored, FILE_BEGIN) };
    if ok == 0 {
        return Err(Error::os(
            "SetFilePointer failed",
            io::Error::last_os_error(),
        ));
    }
    if unsafe { SetEndOfFile(file.as_sys()) } == 0 {
        return Err(Error::os("SetEndOfFile failed", io::Error::last_os_error()));
    }

    map(file, new_len)
}

pub(crate) fn flush_map(addr: *mut u8, len: usize) -> Result<()> {
    if unsafe { FlushViewOfFile(addr.cast::<c_void>(), len) } == 0 {
        return Err(Error::os(
            "FlushViewOfFile failed",
            io::Error::last_os_error(),
        ));
    }
    Ok(())
}

pub(crate) fn unmap(addr: *mut u8, _len: usize) -> Result<()> {
    let view = MEMORY_MAPPED_VIEW_ADDRESS {
        Value: addr.cast(),
    };
    if unsafe { UnmapViewOfFile(view) } == 0 {
        return Err(Error::os(
            "UnmapViewOfFile failed",
            io::Error::last_os_error(),
        ));
    }
    Ok(())
}
