// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Output buffering.
//
// Two pieces work together so that a frame reaches the terminal in one
// write() syscall:
//
//   OutputBuffer — accumulates every escape sequence and glyph of a frame
//   in memory. It is built fresh for each frame and consumed by the flush,
//   so a half-written frame can never be sent twice or leak into the next.
//
//   TtyWriter — a `Write` over a raw file descriptor. `io::stdout()` is
//   line-buffered and would split a frame at every `\r\n`; writing the fd
//   directly keeps the frame in a single syscall.

use std::io::{self, Write};

use crate::error::{Result, TerminalError};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates one frame of output for a single `write()`.
///
/// Writing each escape sequence individually makes the terminal show
/// intermediate states (cursor jumping, half-drawn rows). Everything goes
/// into this buffer first; [`flush_to`](Self::flush_to) hands the whole
/// frame to the terminal at once.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append raw bytes to the end of the frame.
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write the whole frame to `w` and discard the buffer.
    ///
    /// An empty buffer writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Write`] if writing to `w` fails.
    pub fn flush_to(self, w: &mut impl Write) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        tracing::trace!(bytes = self.buf.len(), "flushing frame");
        w.write_all(&self.buf).map_err(TerminalError::Write)?;
        w.flush().map_err(TerminalError::Write)
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing to do until the frame is handed over via flush_to().
        Ok(())
    }
}

// ─── TtyWriter ───────────────────────────────────────────────────────────────

/// Unbuffered writer over a terminal file descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TtyWriter {
    fd: libc::c_int,
}

impl TtyWriter {
    /// Writer for standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            fd: libc::STDOUT_FILENO,
        }
    }
}

impl Write for TtyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.fd, buf.as_ptr().cast::<libc::c_void>(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
