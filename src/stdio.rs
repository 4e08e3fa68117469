//! Position-tracking adapters over the process standard streams.

use crate::error::{Error, Result};
use std::io::{self, Read, Write};

/// An output stream over the process's standard output.
#[derive(Debug, Default)]
pub struct StdoutStream {
    pos: u64,
}

impl StdoutStream {
    /// Create the stream. The position starts at zero regardless of what
    /// was written to standard output before.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `data` to standard output.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        io::stdout()
            .write_all(data)
            .map_err(|e| Error::os("Error writing to stdout", e))?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// The number of bytes written through this stream.
    #[must_use]
    pub fn tell(&self) -> u64 {
        self.pos
    }
}

/// An output stream over the process's standard error.
#[derive(Debug, Default)]
pub struct StderrStream {
    pos: u64,
}

impl StderrStream {
    /// Create the stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `data` to standard error.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        io::stderr()
            .write_all(data)
            .map_err(|e| Error::os("Error writing to stderr", e))?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// The number of bytes written through this stream.
    #[must_use]
    pub fn tell(&self) -> u64 {
        self.pos
    }
}

/// An input stream over the process's standard input.
#[derive(Debug, Default)]
pub struct StdinStream {
    pos: u64,
}

impl StdinStream {
    /// Create the stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read up to `buf.len()` bytes from standard input, returning the
    /// number of bytes read; zero means end-of-stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = io::stdin()
            .read(buf)
            .map_err(|e| Error::os("Error reading from stdin", e))?;
        self.pos += n as u64;
        Ok(n)
    }

    /// The number of bytes read through this stream.
    #[must_use]
    pub fn tell(&self) -> u64 {
        self.pos
    }
}
