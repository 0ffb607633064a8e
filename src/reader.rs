//! Buffered line extraction over an arbitrary byte source.
//!
//! `LineReader` turns any `Read` into successive line slices without ever
//! holding more than one line plus one refill buffer in memory, so
//! multi-gigabyte inputs stream in bounded space.

use std::io::{ErrorKind, Read};

use memchr::memchr;

/// Refill buffer size. Large enough that per-line cost is dominated by the
/// delimiter scan rather than syscalls.
const REFILL_CAPACITY: usize = 4 * 1024 * 1024;

/// Streaming line reader.
///
/// Lines keep their trailing `\n` when one was present; the final line may
/// lack one. An empty slice signals end-of-stream. `\0` bytes pass through
/// untouched, and `\r` is not stripped here; trimming is the matcher's
/// business.
pub struct LineReader<R> {
    source: R,
    /// Refill buffer; `pos..len` is the unconsumed region.
    buf: Vec<u8>,
    len: usize,
    pos: usize,
    /// Accumulates the current line, growing to the longest line seen.
    line: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_capacity(source, REFILL_CAPACITY)
    }

    /// Reader with a custom refill size. Tests use tiny capacities to
    /// exercise lines that straddle refill boundaries.
    pub fn with_capacity(source: R, capacity: usize) -> Self {
        Self {
            source,
            buf: vec![0; capacity.max(1)],
            len: 0,
            pos: 0,
            line: Vec::new(),
        }
    }

    /// One `read` call into the full buffer, retrying on `Interrupted`.
    /// A short read is fine; zero bytes means end-of-stream.
    fn refill(&mut self) -> std::io::Result<()> {
        self.pos = 0;
        self.len = loop {
            match self.source.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        Ok(())
    }

    /// Next line from the source, including its `\n` if one was present.
    /// An empty slice signals end-of-stream.
    pub fn next_line(&mut self) -> std::io::Result<&[u8]> {
        self.line.clear();
        if self.pos >= self.len {
            self.refill()?;
        }
        while self.len > 0 {
            match memchr(b'\n', &self.buf[self.pos..self.len]) {
                Some(at) => {
                    let end = self.pos + at + 1;
                    self.line.extend_from_slice(&self.buf[self.pos..end]);
                    self.pos = end;
                    return Ok(&self.line);
                }
                None => {
                    self.line.extend_from_slice(&self.buf[self.pos..self.len]);
                    self.pos = self.len;
                    self.refill()?;
                }
            }
        }
        Ok(&self.line)
    }
}
