//! Directory operations and temporary directories.
//!
//! These are mechanical wrappers over `std::fs`; their only job beyond
//! delegation is translating filesystem-layer failures into the shared
//! error convention at the boundary, so `std::io::Error` never crosses this
//! crate's public interface.

use crate::error::{Error, Result};
use crate::path::PlatformPath;
use std::fs;
use std::io;

/// Create the directory `path`.
///
/// Returns `true` if the directory was created, `false` if it already
/// existed as a directory.
pub fn create_dir(path: &PlatformPath) -> Result<bool> {
    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && is_dir(path) => Ok(false),
        Err(e) => Err(Error::fs_boundary("create directory", path, e)),
    }
}

/// Create the directory `path` and any missing parents.
///
/// Returns `true` if anything was created.
pub fn create_dir_all(path: &PlatformPath) -> Result<bool> {
    if is_dir(path) {
        return Ok(false);
    }
    fs::create_dir_all(path)
        .map(|()| true)
        .map_err(|e| Error::fs_boundary("create directory tree", path, e))
}

/// Delete the directory `path` and everything under it.
///
/// Returns `false` if `path` does not exist. Fails if `path` exists but is
/// not a directory.
pub fn delete_dir_tree(path: &PlatformPath) -> Result<bool> {
    // XXX There is a race here between the type check and the removal.
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::fs_boundary("delete directory", path, e)),
        Ok(meta) if !meta.is_dir() => {
            return Err(Error::Io(format!(
                "Cannot delete non-directory '{}'",
                path
            )));
        }
        Ok(_) => {}
    }
    fs::remove_dir_all(path)
        .map(|()| true)
        .map_err(|e| Error::fs_boundary("delete directory", path, e))
}

/// Delete the children of the directory `path`, one by one, leaving the
/// directory itself in place.
///
/// Returns `false` if `path` does not exist. Fails if `path` exists but is
/// not a directory.
pub fn delete_dir_contents(path: &PlatformPath) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::fs_boundary("delete directory contents", path, e)),
        Ok(meta) if !meta.is_dir() => {
            return Err(Error::Io(format!(
                "Cannot delete contents of non-directory '{}'",
                path
            )));
        }
        Ok(_) => {}
    }
    let entries =
        fs::read_dir(path).map_err(|e| Error::fs_boundary("delete directory contents", path, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::fs_boundary("delete directory contents", path, e))?;
        let child = PlatformPath::from_native(entry.path());
        let remove = if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            fs::remove_dir_all(entry.path())
        } else {
            fs::remove_file(entry.path())
        };
        remove.map_err(|e| Error::fs_boundary("delete directory contents", &child, e))?;
    }
    Ok(true)
}

/// Delete the file `path`.
///
/// Returns `false` if `path` does not exist. Fails if `path` is a
/// directory.
pub fn delete_file(path: &PlatformPath) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::fs_boundary("delete file", path, e)),
        Ok(meta) if meta.is_dir() => {
            return Err(Error::Io(format!("Cannot delete directory '{}'", path)));
        }
        Ok(_) => {}
    }
    fs::remove_file(path)
        .map(|()| true)
        .map_err(|e| Error::fs_boundary("delete file", path, e))
}

/// Whether `path` exists.
pub fn file_exists(path: &PlatformPath) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::fs_boundary("stat", path, e)),
    }
}

fn is_dir(path: &PlatformPath) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// A temporary directory deleted when the value is dropped.
#[derive(Debug)]
pub struct TemporaryDir {
    inner: Option<tempfile::TempDir>,
    path: PlatformPath,
}

impl TemporaryDir {
    /// Create a fresh temporary directory whose name starts with `prefix`,
    /// under the system temporary location.
    pub fn new(prefix: &str) -> Result<Self> {
        let inner = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|e| Error::Io(format!("Cannot create temporary directory: {}", e)))?;
        let path = PlatformPath::from_native(inner.path().to_path_buf());
        Ok(Self {
            inner: Some(inner),
            path,
        })
    }

    /// The path of the directory.
    #[must_use]
    pub fn path(&self) -> &PlatformPath {
        &self.path
    }
}

impl Drop for TemporaryDir {
    fn drop(&mut self) {
        if let Some(dir) = self.inner.take() {
            if let Err(e) = dir.close() {
                log::warn!("When trying to delete temporary directory: {}", e);
            }
        }
    }
}
