//! The shared error convention used by every component in this crate.

use crate::path::PlatformPath;
use std::io;

/// The error type used uniformly across this crate.
///
/// Every OS-level failure is reported as [`Error::Io`] with a message that
/// names the attempted operation, the path involved (when there is one), and
/// the OS-supplied error text. No component recovers from an OS failure
/// internally; errors propagate to the immediate caller as soon as they are
/// detected.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input caught before any OS call was made, such as an
    /// embedded NUL character in a file name.
    #[error("Invalid: {0}")]
    Invalid(String),

    /// An OS-level call failed.
    #[error("IOError: {0}")]
    Io(String),

    /// A named external resource, such as an environment variable, was not
    /// found.
    #[error("KeyError: {0}")]
    Key(String),

    /// A result exceeds the bound of its intended destination.
    ///
    /// Reserved: nothing in this crate produces it today; it completes the
    /// error convention shared with callers layered on top.
    #[error("CapacityError: {0}")]
    Capacity(String),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Report a failed operation on a named file, in the form
    /// `Failed to <op> file '<path>', error: <OS error text>`.
    pub(crate) fn file_op(op: &str, path: &PlatformPath, err: io::Error) -> Self {
        Self::Io(format!("Failed to {} file '{}', error: {}", op, path, err))
    }

    /// Translate a filesystem-layer failure into the shared convention.
    ///
    /// This is the boundary through which `std::fs` errors cross into this
    /// crate; they never propagate in their original form.
    pub(crate) fn fs_boundary(op: &str, path: &PlatformPath, err: io::Error) -> Self {
        Self::Io(format!("Failed to {} '{}', error: {}", op, path, err))
    }

    /// Report a failed OS call that has no associated path.
    pub(crate) fn os(context: &str, err: io::Error) -> Self {
        Self::Io(format!("{}: {}", context, err))
    }
}
