// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. This module just knows the byte-level
// encoding of the VT100 subset the editor needs.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed. Coordinates are
/// not clamped: a cursor that wandered to `-1` is emitted as `0`, which
/// terminals treat the same as `1`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: i32, y: i32) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", i64::from(y) + 1, i64::from(x) + 1)
}

/// Move the cursor to the top-left cell (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Move the cursor `n` columns right (CUF). The terminal stops at the edge.
#[inline]
pub fn cursor_forward(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "\x1b[{n}C")
}

/// Move the cursor `n` rows down (CUD). The terminal stops at the edge.
#[inline]
pub fn cursor_down(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "\x1b[{n}B")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on stdin as `ESC [ row ; col R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2). Does not move the cursor.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// End a screen row. Raw mode disables `OPOST`, so `\n` alone would not
/// return the carriage.
#[inline]
pub fn newline(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\r\n")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
