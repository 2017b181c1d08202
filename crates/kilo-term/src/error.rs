// SPDX-License-Identifier: MIT
//
// The one error type of the terminal layer.
//
// Every variant names the operation that failed, so the top-level
// diagnostic reads like `tcsetattr: Input/output error` without the
// caller having to add context. Unrecognized escape sequences are not
// errors and never show up here: the key decoder degrades them to a
// bare Escape key.

use std::io;

use thiserror::Error;

/// A failed terminal operation.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// `tcgetattr` failed (stdin is not a terminal, or the fd is invalid).
    #[error("tcgetattr: {0}")]
    Capture(#[source] io::Error),

    /// `tcsetattr` failed while entering raw mode.
    #[error("tcsetattr (raw mode): {0}")]
    EnterRaw(#[source] io::Error),

    /// `tcsetattr` failed while restoring the original mode.
    #[error("tcsetattr (restore): {0}")]
    Restore(#[source] io::Error),

    /// Neither `ioctl(TIOCGWINSZ)` nor the cursor-position probe produced
    /// a usable size.
    #[error("getWindowSize: {0}")]
    WindowSize(&'static str),

    /// Reading from the terminal failed for a reason other than a timeout.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing to the terminal failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, TerminalError>;

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_names_the_failing_operation() {
        let err = TerminalError::Capture(io::Error::from_raw_os_error(libc::ENOTTY));
        assert!(err.to_string().starts_with("tcgetattr: "));

        let err = TerminalError::WindowSize("bad cursor report");
        assert_eq!(err.to_string(), "getWindowSize: bad cursor report");
    }

    #[test]
    fn io_variants_expose_source() {
        let err = TerminalError::Read(io::Error::other("boom"));
        assert!(err.source().is_some());

        let err = TerminalError::WindowSize("nope");
        assert!(err.source().is_none());
    }
}
