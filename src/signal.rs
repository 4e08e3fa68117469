//! The process signal handler registry.
//!
//! Handlers are queried and replaced as whole descriptors, never partially
//! mutated. On platforms with `sigaction` both the query and the
//! install-with-readback are atomic with respect to concurrent signal
//! delivery. The fallback path based on `signal()` is not: querying swaps a
//! sentinel in and back out, and a signal delivered between the two swaps
//! hits the sentinel. That window is a documented limitation of the
//! platform; a lock cannot close it, since the race is against asynchronous
//! delivery rather than another thread.
//!
//! Nothing here makes a handler signal-safe. The installed callback itself
//! must only do what the platform permits in signal context.

use crate::error::{Error, Result};
use std::io;
use std::mem;

/// The entry point type for installed signal handlers.
pub type SignalCallback = extern "C" fn(libc::c_int);

/// What a [`SignalHandler`] does when its signal arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The platform's default action for the signal.
    Default,
    /// The signal is ignored.
    Ignore,
    /// A specific entry point runs.
    Handler(SignalCallback),
}

/// A descriptor for a process signal handler.
///
/// On Unix this wraps the complete `sigaction` record (entry point, the
/// mask of signals blocked while the handler runs, and installation flags)
/// so that re-installing a queried descriptor restores everything, not just
/// the entry point.
#[cfg(unix)]
#[derive(Clone, Copy)]
pub struct SignalHandler {
    action: libc::sigaction,
}

#[cfg(unix)]
impl SignalHandler {
    fn from_callback(raw: libc::sighandler_t) -> Self {
        let mut action: libc::sigaction = unsafe { mem::zeroed() };
        action.sa_sigaction = raw;
        action.sa_flags = 0;
        unsafe { libc::sigemptyset(&mut action.sa_mask) };
        Self { action }
    }

    /// A descriptor that runs `callback` with no blocked signals and no
    /// installation flags.
    #[must_use]
    pub fn new(callback: SignalCallback) -> Self {
        Self::from_callback(callback as libc::sighandler_t)
    }

    /// A descriptor that ignores the signal.
    #[must_use]
    pub fn ignore() -> Self {
        Self::from_callback(libc::SIG_IGN)
    }

    /// A descriptor that restores the platform's default action.
    #[must_use]
    pub fn default_action() -> Self {
        Self::from_callback(libc::SIG_DFL)
    }

    /// Wrap a raw `sigaction` record, as returned by a query.
    #[must_use]
    pub fn from_raw(action: libc::sigaction) -> Self {
        Self { action }
    }

    /// The underlying `sigaction` record.
    #[must_use]
    pub fn action(&self) -> &libc::sigaction {
        &self.action
    }

    /// What this descriptor does when the signal arrives.
    ///
    /// Interprets the entry point as a plain one-argument handler; records
    /// installed elsewhere with `SA_SIGINFO` carry a three-argument entry
    /// point and should be inspected through [`action`] instead.
    ///
    /// [`action`]: Self::action
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self.action.sa_sigaction {
            libc::SIG_DFL => Disposition::Default,
            libc::SIG_IGN => Disposition::Ignore,
            raw => Disposition::Handler(unsafe { mem::transmute::<usize, SignalCallback>(raw) }),
        }
    }
}

/// A descriptor for a process signal handler.
///
/// This platform has no `sigaction`; the descriptor carries only the CRT
/// callback slot.
#[cfg(windows)]
#[derive(Clone, Copy)]
pub struct SignalHandler {
    raw: libc::sighandler_t,
}

#[cfg(windows)]
impl SignalHandler {
    /// A descriptor that runs `callback`.
    #[must_use]
    pub fn new(callback: SignalCallback) -> Self {
        Self {
            raw: callback as libc::sighandler_t,
        }
    }

    /// A descriptor that ignores the signal.
    #[must_use]
    pub fn ignore() -> Self {
        Self { raw: libc::SIG_IGN }
    }

    /// A descriptor that restores the platform's default action.
    #[must_use]
    pub fn default_action() -> Self {
        Self { raw: libc::SIG_DFL }
    }

    /// What this descriptor does when the signal arrives.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self.raw {
            libc::SIG_DFL => Disposition::Default,
            libc::SIG_IGN => Disposition::Ignore,
            raw => Disposition::Handler(unsafe { mem::transmute::<usize, SignalCallback>(raw) }),
        }
    }
}

impl std::fmt::Debug for SignalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHandler")
            .field("disposition", &self.disposition())
            .finish()
    }
}

/// Read the currently installed handler for `signum` without modifying it.
#[cfg(unix)]
pub fn get_signal_handler(signum: i32) -> Result<SignalHandler> {
    let mut old: libc::sigaction = unsafe { mem::zeroed() };
    if unsafe { libc::sigaction(signum, std::ptr::null(), &mut old) } != 0 {
        return Err(Error::os(
            "sigaction call failed",
            io::Error::last_os_error(),
        ));
    }
    Ok(SignalHandler::from_raw(old))
}

/// Install `handler` for `signum`, returning the previous handler.
///
/// The swap is a single `sigaction` call, atomic with respect to delivery.
#[cfg(unix)]
pub fn set_signal_handler(signum: i32, handler: &SignalHandler) -> Result<SignalHandler> {
    let mut old: libc::sigaction = unsafe { mem::zeroed() };
    if unsafe { libc::sigaction(signum, &handler.action, &mut old) } != 0 {
        return Err(Error::os(
            "sigaction call failed",
            io::Error::last_os_error(),
        ));
    }
    Ok(SignalHandler::from_raw(old))
}

/// Read the currently installed handler for `signum`.
///
/// Best effort: to read the old handler the signal is pointed at a sentinel
/// and immediately pointed back, so a delivery landing between the two
/// `signal()` calls is mishandled. See the module docs.
#[cfg(windows)]
pub fn get_signal_handler(signum: i32) -> Result<SignalHandler> {
    let prev = unsafe { libc::signal(signum, libc::SIG_IGN) };
    if prev == libc::SIG_ERR {
        return Err(Error::os("signal call failed", io::Error::last_os_error()));
    }
    if unsafe { libc::signal(signum, prev) } == libc::SIG_ERR {
        return Err(Error::os("signal call failed", io::Error::last_os_error()));
    }
    Ok(SignalHandler { raw: prev })
}

/// Install `handler` for `signum`, returning the previous handler.
///
/// Best effort; carries the same delivery race as [`get_signal_handler`] on
/// this platform.
#[cfg(windows)]
pub fn set_signal_handler(signum: i32, handler: &SignalHandler) -> Result<SignalHandler> {
    let prev = unsafe { libc::signal(signum, handler.raw) };
    if prev == libc::SIG_ERR {
        return Err(Error::os("signal call failed", io::Error::last_os_error()));
    }
    Ok(SignalHandler { raw: prev })
}
