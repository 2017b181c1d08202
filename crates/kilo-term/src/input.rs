// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into logical keys. Terminals send arrow keys as
// three-byte escape sequences (`ESC [ A` etc.), and the bytes arrive one
// read at a time with no framing, so the decoder has to consume exactly
// the bytes of one key before returning.
//
// # Escape vs escape-sequence ambiguity
//
// A lone ESC byte could be the Escape key or the start of a sequence.
// After an ESC the decoder makes exactly one read attempt for each of the
// next two bytes. With the VMIN=0 / VTIME=1 terminal settings a missing
// byte costs at most ~100ms, and the key decodes as a bare Escape. Pressing
// Escape can therefore never hang the editor.
//
// Unknown sequences (`ESC [ Z`, `ESC O P`, ...) are not errors: they are
// absorbed and decode as Escape.

use crate::error::{Result, TerminalError};
use crate::reader::ByteSource;

/// The escape byte that starts every control sequence.
pub const ESC: u8 = 0x1b;

/// Map a letter to the byte produced by holding Ctrl while typing it.
///
/// Ctrl clears the top three bits of the ASCII code: `ctrl_key(b'q')`
/// is `0x11`.
#[inline]
#[must_use]
pub const fn ctrl_key(k: u8) -> u8 {
    k & 0x1f
}

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that is not the start of an escape sequence, passed through
    /// verbatim (control codes included).
    Char(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A bare Escape, or an escape sequence we don't recognize.
    Escape,
}

/// Read one complete key from `src`.
///
/// Polls until the first byte arrives: each timed-out read is simply
/// retried. Once a byte is in hand, at most two more reads are made.
///
/// # Errors
///
/// Returns [`TerminalError::Read`] if waiting for the first byte fails
/// with anything other than a timeout. Failures while reading the tail of
/// an escape sequence are not errors; the key decodes as
/// [`Key::Escape`].
pub fn read_key(src: &mut impl ByteSource) -> Result<Key> {
    let byte = loop {
        if let Some(b) = src.read_byte().map_err(TerminalError::Read)? {
            break b;
        }
    };

    let key = if byte == ESC {
        decode_escape(src)
    } else {
        Key::Char(byte)
    };
    tracing::trace!(?key, "decoded key");
    Ok(key)
}

/// Decode what follows an ESC byte. One read attempt per byte, no retries.
fn decode_escape(src: &mut impl ByteSource) -> Key {
    let mut next = || src.read_byte().ok().flatten();

    let Some(first) = next() else {
        return Key::Escape;
    };
    let Some(second) = next() else {
        return Key::Escape;
    };

    match (first, second) {
        (b'[', b'A') => Key::ArrowUp,
        (b'[', b'B') => Key::ArrowDown,
        (b'[', b'C') => Key::ArrowRight,
        (b'[', b'D') => Key::ArrowLeft,
        _ => Key::Escape,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Helper: decode the first key from a byte slice.
    fn decode(data: &[u8]) -> Key {
        let mut src = data;
        read_key(&mut src).unwrap()
    }

    /// Helper: decode and also report what was left unread.
    fn decode_rest(data: &[u8]) -> (Key, Vec<u8>) {
        let mut src = data;
        let key = read_key(&mut src).unwrap();
        (key, src.to_vec())
    }

    /// Replays a script of read results, then times out forever.
    struct Script(Vec<io::Result<Option<u8>>>);

    impl ByteSource for Script {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            if self.0.is_empty() {
                Ok(None)
            } else {
                self.0.remove(0)
            }
        }
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn printable_byte() {
        assert_eq!(decode(b"a"), Key::Char(b'a'));
    }

    #[test]
    fn control_byte_passes_through() {
        assert_eq!(decode(&[ctrl_key(b'q')]), Key::Char(0x11));
    }

    #[test]
    fn high_byte_passes_through() {
        assert_eq!(decode(&[0xc3]), Key::Char(0xc3));
    }

    #[test]
    fn consumes_exactly_one_byte() {
        let (key, rest) = decode_rest(b"wasd");
        assert_eq!(key, Key::Char(b'w'));
        assert_eq!(rest, b"asd");
    }

    // ── Arrows ──────────────────────────────────────────────────────────

    #[test]
    fn arrow_up() {
        assert_eq!(decode(b"\x1b[A"), Key::ArrowUp);
    }

    #[test]
    fn arrow_down() {
        assert_eq!(decode(b"\x1b[B"), Key::ArrowDown);
    }

    #[test]
    fn arrow_right() {
        assert_eq!(decode(b"\x1b[C"), Key::ArrowRight);
    }

    #[test]
    fn arrow_left() {
        assert_eq!(decode(b"\x1b[D"), Key::ArrowLeft);
    }

    #[test]
    fn arrow_consumes_three_bytes() {
        let (key, rest) = decode_rest(b"\x1b[Ax");
        assert_eq!(key, Key::ArrowUp);
        assert_eq!(rest, b"x");
    }

    // ── Escape degradation ──────────────────────────────────────────────

    #[test]
    fn lone_escape() {
        assert_eq!(decode(b"\x1b"), Key::Escape);
    }

    #[test]
    fn escape_bracket_then_nothing() {
        assert_eq!(decode(b"\x1b["), Key::Escape);
    }

    #[test]
    fn unknown_final_byte() {
        assert_eq!(decode(b"\x1b[Z"), Key::Escape);
    }

    #[test]
    fn non_csi_introducer() {
        assert_eq!(decode(b"\x1bOP"), Key::Escape);
    }

    #[test]
    fn unknown_sequence_is_absorbed() {
        let (key, rest) = decode_rest(b"\x1b[Zq");
        assert_eq!(key, Key::Escape);
        assert_eq!(rest, b"q");
    }

    #[test]
    fn tail_read_error_is_escape() {
        let mut src = Script(vec![
            Ok(Some(ESC)),
            Err(io::Error::other("gone")),
        ]);
        assert_eq!(read_key(&mut src).unwrap(), Key::Escape);
    }

    #[test]
    fn tail_is_not_retried() {
        // A timeout between ESC and '[' ends the sequence even though the
        // rest shows up on the next read.
        let mut src = Script(vec![Ok(Some(ESC)), Ok(None), Ok(Some(b'[')), Ok(Some(b'A'))]);
        assert_eq!(read_key(&mut src).unwrap(), Key::Escape);
        assert_eq!(read_key(&mut src).unwrap(), Key::Char(b'['));
    }

    // ── Polling ─────────────────────────────────────────────────────────

    #[test]
    fn first_byte_is_polled_through_timeouts() {
        let mut src = Script(vec![Ok(None), Ok(None), Ok(None), Ok(Some(b'x'))]);
        assert_eq!(read_key(&mut src).unwrap(), Key::Char(b'x'));
    }

    #[test]
    fn first_byte_read_error_is_fatal() {
        let mut src = Script(vec![Err(io::Error::from(io::ErrorKind::BrokenPipe))]);
        let err = read_key(&mut src).unwrap_err();
        assert!(matches!(err, TerminalError::Read(_)));
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    #[test]
    fn ctrl_key_masks_letters() {
        assert_eq!(ctrl_key(b'q'), 0x11);
        assert_eq!(ctrl_key(b'a'), 0x01);
        assert_eq!(ctrl_key(b'Q'), 0x11);
    }
}
