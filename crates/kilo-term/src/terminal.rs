// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr) and ioctl (TIOCGWINSZ). These are the standard POSIX
// interfaces for terminal control; there is no safe alternative. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// The terminal's original mode is captured once, before raw mode is
// entered, and lives inside a `RawMode` guard. The guard restores it
// exactly once: either through an explicit `restore()` (so the caller
// sees a failure) or on drop. Drop covers every other way out of the
// session: an early return, a `?` on a fatal error, or a panic that
// unwinds through `main`.
//
// Mode changes go through the `ModeControl` trait so the lifecycle can
// be exercised without a real TTY.

use std::fmt;
use std::io::{self, Write};

use crate::ansi;
use crate::error::{Result, TerminalError};
use crate::output::{OutputBuffer, TtyWriter};
use crate::reader::{ByteSource, Stdin};

/// `VTIME` in raw mode, in tenths of a second: how long a read waits for
/// input before returning empty-handed.
pub const READ_TIMEOUT_DECISECONDS: u8 = 1;

/// Capacity of the cursor-position reply buffer. One byte is reserved,
/// so at most 31 bytes of reply are read.
const PROBE_CAPACITY: usize = 32;

/// How far the probe pushes the cursor right and down. The terminal clamps
/// the move to its last column and row.
const PROBE_DISTANCE: u16 = 999;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Original mode ──────────────────────────────────────────────────────────

/// The terminal attributes captured before entering raw mode.
///
/// Opaque on purpose: the only things to do with it are to derive raw
/// attributes from it and to put it back.
#[derive(Clone, Copy)]
pub struct OriginalMode {
    termios: libc::termios,
}

impl fmt::Debug for OriginalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginalMode").finish_non_exhaustive()
    }
}

/// Derive raw-mode attributes from the original ones.
///
/// Input: no break-to-SIGINT, no CR→NL translation, no parity check, no
/// 8th-bit stripping, no XON/XOFF flow control. Output: no post-processing
/// (so `\n` does not imply `\r`). Control: 8-bit characters. Local: no
/// echo, no canonical line buffering, no Ctrl-V, no signal keys.
///
/// `VMIN = 0` with `VTIME = 1` makes `read()` return after at most ~100ms
/// whether or not input arrived.
#[must_use]
pub fn make_raw(original: &OriginalMode) -> libc::termios {
    let mut raw = original.termios;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = READ_TIMEOUT_DECISECONDS;
    raw
}

// ─── Mode control ───────────────────────────────────────────────────────────

/// The three terminal-mode operations the session needs.
pub trait ModeControl {
    /// Read the current terminal attributes.
    ///
    /// # Errors
    ///
    /// [`TerminalError::Capture`] if the attributes cannot be read (for
    /// example, stdin is not a terminal).
    fn capture_mode(&mut self) -> Result<OriginalMode>;

    /// Switch to raw mode, derived from `original` via [`make_raw`].
    ///
    /// # Errors
    ///
    /// [`TerminalError::EnterRaw`] if the attributes cannot be set.
    fn enter_raw_mode(&mut self, original: &OriginalMode) -> Result<()>;

    /// Put `original` back.
    ///
    /// # Errors
    ///
    /// [`TerminalError::Restore`] if the attributes cannot be set.
    fn restore_mode(&mut self, original: &OriginalMode) -> Result<()>;
}

/// Mode control on stdin's termios.
///
/// Changes use `TCSAFLUSH`: pending output is drained and unread input is
/// discarded, so keys typed before the switch are not misinterpreted.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinTermios;

impl StdinTermios {
    fn set(termios: &libc::termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl ModeControl for StdinTermios {
    fn capture_mode(&mut self) -> Result<OriginalMode> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
            return Err(TerminalError::Capture(io::Error::last_os_error()));
        }
        Ok(OriginalMode { termios })
    }

    fn enter_raw_mode(&mut self, original: &OriginalMode) -> Result<()> {
        Self::set(&make_raw(original)).map_err(TerminalError::EnterRaw)
    }

    fn restore_mode(&mut self, original: &OriginalMode) -> Result<()> {
        Self::set(&original.termios).map_err(TerminalError::Restore)
    }
}

// ─── RawMode guard ──────────────────────────────────────────────────────────

/// Raw mode, held for as long as this value lives.
///
/// Created by [`enable`](Self::enable), which captures the original mode
/// before touching anything. The original mode is restored exactly once:
/// by [`restore`](Self::restore) or, failing that, on drop. A second
/// restore is a no-op.
pub struct RawMode<C: ModeControl = StdinTermios> {
    control: C,
    /// `Some` while raw mode is active; taken by the first restore.
    original: Option<OriginalMode>,
}

impl<C: ModeControl> RawMode<C> {
    /// Capture the current mode and switch to raw mode.
    ///
    /// # Errors
    ///
    /// Returns the capture or raw-entry error. Nothing needs restoring in
    /// either case: the terminal was not changed.
    pub fn enable(mut control: C) -> Result<Self> {
        let original = control.capture_mode()?;
        control.enter_raw_mode(&original)?;
        tracing::debug!("raw mode entered");

        Ok(Self {
            control,
            original: Some(original),
        })
    }

    /// Whether raw mode is still in effect.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.original.is_some()
    }

    /// Restore the original mode now. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Restore`] if the attributes cannot be set.
    /// The restore is not attempted again on drop.
    pub fn restore(&mut self) -> Result<()> {
        if let Some(original) = self.original.take() {
            self.control.restore_mode(&original)?;
            tracing::debug!("terminal mode restored");
        }
        Ok(())
    }
}

impl<C: ModeControl> Drop for RawMode<C> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(%err, "failed to restore terminal mode");
        }
    }
}

// ─── Window size ────────────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if the query fails or reports a zero dimension.
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

/// Determine the terminal size.
///
/// Tries the ioctl first. Some terminals don't support it, so on failure
/// the size is probed through the terminal itself with
/// [`probe_size`]. Raw mode must already be active for the probe, or the
/// reply would sit in the line buffer.
///
/// # Errors
///
/// Returns an error if both strategies fail.
pub fn query_size() -> Result<Size> {
    if let Some(size) = ioctl_size() {
        tracing::debug!(cols = size.cols, rows = size.rows, "window size from ioctl");
        return Ok(size);
    }

    tracing::debug!("ioctl window size unavailable, probing cursor position");
    probe_size(&mut TtyWriter::stdout(), &mut Stdin::new())
}

/// Find the size by parking the cursor in the bottom-right corner and
/// asking where it ended up.
///
/// Writes `ESC[999C ESC[999B ESC[6n`, then reads the reply up to and
/// excluding the terminating `R`.
///
/// # Errors
///
/// [`TerminalError::Write`] / [`TerminalError::Read`] on I/O failure,
/// [`TerminalError::WindowSize`] if the reply is not a usable report.
pub fn probe_size(out: &mut impl Write, input: &mut impl ByteSource) -> Result<Size> {
    let mut frame = OutputBuffer::new();
    ansi::cursor_forward(&mut frame, PROBE_DISTANCE).map_err(TerminalError::Write)?;
    ansi::cursor_down(&mut frame, PROBE_DISTANCE).map_err(TerminalError::Write)?;
    ansi::request_cursor_position(&mut frame).map_err(TerminalError::Write)?;
    frame.flush_to(out)?;

    let mut reply = [0u8; PROBE_CAPACITY];
    let mut len = 0;
    while len < PROBE_CAPACITY - 1 {
        match input.read_byte().map_err(TerminalError::Read)? {
            Some(b'R') | None => break,
            Some(byte) => {
                reply[len] = byte;
                len += 1;
            }
        }
    }

    let size = parse_cursor_report(&reply[..len])
        .ok_or(TerminalError::WindowSize("malformed cursor position report"))?;
    tracing::debug!(cols = size.cols, rows = size.rows, "window size from cursor probe");
    Ok(size)
}

/// Parse a cursor-position report `ESC [ rows ; cols` (the `R` already
/// stripped).
///
/// Anything after the column number is ignored. Returns `None` if the
/// prefix is wrong, a number is missing or out of range, or a dimension
/// is zero.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let (rows, rest) = parse_u16(body)?;
    let rest = rest.strip_prefix(b";")?;
    let (cols, _) = parse_u16(rest)?;

    (rows > 0 && cols > 0).then_some(Size { cols, rows })
}

/// Parse leading ASCII digits as a `u16`, returning the value and the rest.
fn parse_u16(buf: &[u8]) -> Option<(u16, &[u8])> {
    let end = buf.iter().position(|b| !b.is_ascii_digit()).unwrap_or(buf.len());
    if end == 0 {
        return None;
    }
    let mut value: u16 = 0;
    for &digit in &buf[..end] {
        value = value.checked_mul(10)?.checked_add(u16::from(digit - b'0'))?;
    }
    Some((value, &buf[end..]))
}

// ─── Session ────────────────────────────────────────────────────────────────

/// A terminal session: raw mode plus the screen size measured at startup.
///
/// The size is not re-queried on resize.
pub struct Session {
    raw: RawMode,
    size: Size,
}

impl Session {
    /// Enter raw mode on stdin and measure the screen.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal for the editor. If raw mode was entered
    /// before the failure, it has already been undone when this returns.
    pub fn start() -> Result<Self> {
        let raw = RawMode::enable(StdinTermios)?;
        let size = query_size()?;
        Ok(Self { raw, size })
    }

    /// Screen size measured at startup.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// End the session, restoring the original terminal mode.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Restore`] if the mode cannot be restored.
    pub fn end(mut self) -> Result<()> {
        self.raw.restore()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
