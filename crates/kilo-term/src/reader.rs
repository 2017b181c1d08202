// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Byte sources for the key decoder and the cursor-position probe.
//
// In raw mode stdin is configured with VMIN=0 / VTIME=1: a read() returns
// as soon as one byte is available, or after ~100ms with nothing. That
// timeout is surfaced as `Ok(None)` so callers can choose between polling
// again (waiting for a keypress) and giving up (the tail of an escape
// sequence that never came).
//
// No background thread and no channel: the editor is a single-threaded
// poll loop and the read timeout is its only suspension point.

use std::io;

/// Something that yields terminal input one byte at a time.
pub trait ByteSource {
    /// Read a single byte.
    ///
    /// Returns `Ok(None)` if no byte arrived within the read timeout.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for any failure other than a
    /// timeout.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

// ─── Stdin ───────────────────────────────────────────────────────────────────

/// Raw, unbuffered stdin.
///
/// Reads go straight to `read(2)` on fd 0. `io::stdin()` would put a
/// `BufReader` in between and swallow the bytes of a cursor-position
/// report meant for the next caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdin;

impl Stdin {
    /// Handle to the process's stdin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ByteSource for Stdin {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                // Some platforms (Cygwin) report the VTIME timeout as EAGAIN.
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

// ─── In-memory ───────────────────────────────────────────────────────────────

/// Reads bytes off the front of a slice. An exhausted slice behaves like a
/// terminal with no pending input.
impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
