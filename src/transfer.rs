//! The chunked transfer engine.
//!
//! Kernels cap the number of bytes a single read or write call will accept:
//! Windows and Apple kernels refuse transfers above `i32::MAX`, and Linux
//! silently truncates at `0x7fff_f000` (see the BUGS section of the
//! `read(2)` man page). On top of that, `read`/`write` may legally transfer
//! fewer bytes than requested without it being an error. The loop drivers
//! here hide both behaviors from callers that request an exact byte count.
//!
//! The drivers are parameterized over the underlying primitive so that the
//! looping discipline itself can be tested with simulated chunk limits.

use std::io;

/// The most bytes a single OS read/write call is guaranteed to accept.
#[cfg(any(windows, target_os = "macos", target_os = "ios"))]
pub(crate) const MAX_TRANSFER_SIZE: usize = i32::MAX as usize;
/// The most bytes a single OS read/write call is guaranteed to accept.
#[cfg(not(any(windows, target_os = "macos", target_os = "ios")))]
pub(crate) const MAX_TRANSFER_SIZE: usize = 0x7fff_f000;

/// Fill `buf` by repeatedly calling `read_some` with at most `limit` bytes
/// per call.
///
/// A zero-byte transfer before `buf` is full is end-of-stream: the loop
/// ends without error and the partial count is returned, which is not
/// itself an error condition. A failing call aborts the loop immediately
/// and the error is propagated; no byte count accompanies a failure.
pub(crate) fn read_in_chunks<F>(buf: &mut [u8], limit: usize, mut read_some: F) -> io::Result<usize>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    let mut total = 0;
    while total < buf.len() {
        let chunk = (buf.len() - total).min(limit);
        let n = read_some(&mut buf[total..total + chunk])?;
        if n == 0 {
            // EOF
            break;
        }
        total += n;
    }
    Ok(total)
}

/// Like [`read_in_chunks`], for primitives that take an explicit offset.
///
/// The offset passed to `read_some` advances by each partial transfer, so
/// short reads resume where they left off.
pub(crate) fn read_at_in_chunks<F>(
    buf: &mut [u8],
    mut offset: u64,
    limit: usize,
    mut read_some: F,
) -> io::Result<usize>
where
    F: FnMut(&mut [u8], u64) -> io::Result<usize>,
{
    let mut total = 0;
    while total < buf.len() {
        let chunk = (buf.len() - total).min(limit);
        let n = read_some(&mut buf[total..total + chunk], offset)?;
        if n == 0 {
            // EOF
            break;
        }
        total += n;
        offset += n as u64;
    }
    Ok(total)
}

/// Write all of `buf` by repeatedly calling `write_some` with at most
/// `limit` bytes per call.
///
/// Partial-progress short writes are not errors and the loop continues
/// until every byte is written; a failing call aborts immediately.
pub(crate) fn write_in_chunks<F>(buf: &[u8], limit: usize, mut write_some: F) -> io::Result<()>
where
    F: FnMut(&[u8]) -> io::Result<usize>,
{
    let mut written = 0;
    while written < buf.len() {
        let chunk = (buf.len() - written).min(limit);
        let n = write_some(&buf[written..written + chunk])?;
        written += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A source holding `len` bytes which transfers at most `per_call`
    /// bytes per read, recording the size of every request it sees.
    struct ScriptedSource {
        len: usize,
        pos: usize,
        per_call: usize,
        requests: Vec<usize>,
    }

    impl ScriptedSource {
        fn new(len: usize, per_call: usize) -> Self {
            Self {
                len,
                pos: 0,
                per_call,
                requests: Vec::new(),
            }
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.requests.push(buf.len());
            let n = buf.len().min(self.per_call).min(self.len - self.pos);
            for b in &mut buf[..n] {
                *b = b'x';
            }
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn read_splits_at_the_chunk_limit() {
        // A 10-byte read against a 10-byte source with a limit of 4 issues
        // requests of 4, 4, and 2 bytes and reports the full count.
        let mut source = ScriptedSource::new(10, usize::MAX);
        let mut buf = [0_u8; 10];
        let n = read_in_chunks(&mut buf, 4, |b| source.read(b)).unwrap();
        assert_eq!(n, 10);
        assert_eq!(source.requests, [4, 4, 2]);

        // The source is exhausted; a subsequent read sees end-of-stream.
        let n = read_in_chunks(&mut buf, 4, |b| source.read(b)).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn read_stops_at_end_of_stream_without_error() {
        // For any source shorter than the request, the result is min(n, m).
        for (n, m, limit) in [(100, 37, 8), (10, 0, 1), (64, 64, 3), (5, 200, 2)] {
            let mut source = ScriptedSource::new(m, usize::MAX);
            let mut buf = vec![0_u8; n];
            let got = read_in_chunks(&mut buf, limit, |b| source.read(b)).unwrap();
            assert_eq!(got, n.min(m));
        }
    }

    #[test]
    fn read_tolerates_short_transfers() {
        // A primitive that returns fewer bytes than requested per call is
        // not an error; the loop keeps going until the source runs dry.
        let mut source = ScriptedSource::new(10, 3);
        let mut buf = [0_u8; 10];
        let n = read_in_chunks(&mut buf, 1024, |b| source.read(b)).unwrap();
        assert_eq!(n, 10);
    }

    #[test]
    fn read_aborts_on_failure() {
        // After a failure, the error is propagated with no usable count,
        // even if earlier iterations made progress.
        let mut calls = 0;
        let mut buf = [0_u8; 10];
        let result = read_in_chunks(&mut buf, 4, |b| {
            calls += 1;
            if calls == 2 {
                Err(io::Error::from_raw_os_error(libc::EIO))
            } else {
                b.fill(b'x');
                Ok(b.len())
            }
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn read_at_advances_the_offset() {
        let mut offsets = Vec::new();
        let mut buf = [0_u8; 10];
        let n = read_at_in_chunks(&mut buf, 100, 4, |b, offset| {
            offsets.push(offset);
            Ok(b.len())
        })
        .unwrap();
        assert_eq!(n, 10);
        assert_eq!(offsets, [100, 104, 108]);
    }

    #[test]
    fn write_issues_exactly_ceil_n_over_l_calls() {
        for (n, limit) in [(10, 4), (12, 4), (1, 1), (100, 7), (64, 64)] {
            let buf = vec![0_u8; n];
            let mut calls = 0;
            write_in_chunks(&buf, limit, |b| {
                calls += 1;
                Ok(b.len())
            })
            .unwrap();
            assert_eq!(calls, (n + limit - 1) / limit, "n={} limit={}", n, limit);
        }
    }

    #[test]
    fn write_resumes_after_short_writes() {
        // A sink accepting at most 3 bytes per call still gets everything.
        let mut received = Vec::new();
        write_in_chunks(b"hello, world!", 1024, |b| {
            let n = b.len().min(3);
            received.extend_from_slice(&b[..n]);
            Ok(n)
        })
        .unwrap();
        assert_eq!(received, b"hello, world!");
    }

    #[test]
    fn write_aborts_on_failure() {
        let mut calls = 0;
        let result = write_in_chunks(&[0_u8; 10], 4, |b| {
            calls += 1;
            if calls == 2 {
                Err(io::Error::from_raw_os_error(libc::ENOSPC))
            } else {
                Ok(b.len())
            }
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn empty_requests_complete_without_calling_the_primitive() {
        let n = read_in_chunks(&mut [], 4, |_| panic!("no call expected")).unwrap();
        assert_eq!(n, 0);
        write_in_chunks(&[], 4, |_| panic!("no call expected")).unwrap();
    }
}
