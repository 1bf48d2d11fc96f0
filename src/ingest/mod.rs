//! Byte sources feeding the frame synchronizer.
//!
//! A `ByteSource` performs bounded, possibly partial reads:
//! - A read returns between 0 and `buf.len()` bytes.
//! - Returning fewer bytes than requested means the transport timeout elapsed.
//! - A read never blocks longer than the transport's configured timeout.
//!
//! Sources provided here:
//! - Serial devices (Linux termios, `serial`)
//! - Any `std::io::Read` (capture replay, stdin)
//! - Scripted chunk playback (tests and bench replays)

#[cfg(target_os = "linux")]
pub mod serial;

use std::collections::VecDeque;
use std::io::{self, Read};

#[cfg(target_os = "linux")]
pub use serial::{SerialConfig, SerialPort};

/// Bounded, possibly partial byte reads.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes, waiting at most one transport timeout.
    ///
    /// `Ok(n)` with `n < buf.len()` signals a timeout, not an error.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// True once the source can never produce another byte (end of a replay).
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

// ----------------------------------------------------------------------------
// ReaderSource: adapter over std::io::Read
// ----------------------------------------------------------------------------

/// Adapts any blocking reader. End of input behaves like a timeout and marks
/// the source exhausted.
pub struct ReaderSource<R> {
    reader: R,
    eof: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, eof: false }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() && !self.eof {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => self.eof = true,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn is_exhausted(&self) -> bool {
        self.eof
    }
}

// ----------------------------------------------------------------------------
// ChunkedSource: scripted read boundaries
// ----------------------------------------------------------------------------

/// Replays a fixed sequence of transport bursts.
///
/// A single read never crosses from one burst into the next, so burst
/// boundaries behave like timeouts in the middle of the stream. An empty
/// burst is a read that times out with no data.
#[derive(Debug, Default)]
pub struct ChunkedSource {
    bursts: VecDeque<Vec<u8>>,
}

impl ChunkedSource {
    pub fn new<I, B>(bursts: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self {
            bursts: bursts.into_iter().map(Into::into).collect(),
        }
    }

    /// Append another burst to the end of the script.
    pub fn push(&mut self, burst: impl Into<Vec<u8>>) {
        self.bursts.push_back(burst.into());
    }
}

impl ByteSource for ChunkedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(front) = self.bursts.front_mut() else {
            return Ok(0);
        };
        let n = buf.len().min(front.len());
        buf[..n].copy_from_slice(&front[..n]);
        front.drain(..n);
        if front.is_empty() {
            self.bursts.pop_front();
        }
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.bursts.is_empty()
    }
}
