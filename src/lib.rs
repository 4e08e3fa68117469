//! Platform I/O primitives.
//!
//! This crate is an operating-system abstraction layer offering a single,
//! platform-independent contract for the primitives whose behavior genuinely
//! diverges across platforms:
//!
//! - [`PlatformPath`] holds file names in the OS's native encoding, narrow
//!   or wide, and refuses embedded NUL characters up front.
//! - [`read`], [`write`], and [`read_at`] drive the underlying calls in a
//!   loop, hiding the kernel's per-call transfer ceiling and
//!   short-read/short-write semantics from callers requesting an exact byte
//!   count.
//! - [`read_at`] reads at an explicit offset without disturbing the
//!   handle's seek cursor, emulated where the platform lacks a native
//!   positional read.
//! - [`MappedRegion::remap`] resizes a file-backed memory mapping,
//!   sequencing the unmap/truncate/remap steps each platform family
//!   requires.
//! - [`get_signal_handler`] and [`set_signal_handler`] query and install
//!   process signal handlers, atomically where the platform allows it and
//!   with a documented best-effort fallback where it doesn't.
//!
//! All entry points are synchronous and blocking; there is no event loop,
//! no background thread, and no buffering policy above the raw primitives.
//! File handles and mappings are caller-owned: this layer operates on them
//! but never tracks or closes them on its own.

#![deny(missing_docs)]

mod env;
mod error;
mod file;
mod fs;
mod handle;
mod mmap;
mod path;
#[cfg(unix)]
mod posix;
mod signal;
mod stdio;
mod transfer;
#[cfg(windows)]
mod windows;

/// The platform implementation of the OS primitives, selected at build
/// time. Call sites elsewhere in the crate go through this facade and never
/// branch on the platform themselves.
pub(crate) mod sys {
    #[cfg(unix)]
    pub(crate) use crate::posix::*;
    #[cfg(windows)]
    pub(crate) use crate::windows::*;
}

pub use env::{del_env_var, get_env_var, set_env_var};
pub use error::{Error, Result};
pub use file::{
    close, create_pipe, open_readable, open_writable, read, read_at, seek, size, tell, truncate,
    write,
};
pub use fs::{
    create_dir, create_dir_all, delete_dir_contents, delete_dir_tree, delete_file, file_exists,
    TemporaryDir,
};
pub use handle::FileHandle;
pub use mmap::MappedRegion;
pub use path::PlatformPath;
pub use signal::{
    get_signal_handler, set_signal_handler, Disposition, SignalCallback, SignalHandler,
};
pub use stdio::{StderrStream, StdinStream, StdoutStream};
