// SPDX-License-Identifier: MIT
//
// Event loop — render, read a key, dispatch, repeat.
//
// One iteration:
//
//   1. The application paints a complete frame into a fresh OutputBuffer,
//      which goes to the terminal in a single write.
//   2. The key decoder polls stdin until one whole key has arrived. Each
//      empty read costs ~100ms (VTIME) and is simply retried.
//   3. The application handles the key and says whether to keep going.
//
// Single-threaded and synchronous: the read timeout is the only place the
// loop ever waits. Quitting returns from `run` instead of exiting the
// process, so the raw-mode guard held by the caller gets to restore the
// terminal on the way out.

use std::io::Write;

use crate::ansi;
use crate::error::{Result, TerminalError};
use crate::input::{self, Key};
use crate::output::OutputBuffer;
use crate::reader::ByteSource;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Clear the screen and leave the loop.
    Quit,
}

/// Application interface for the event loop.
pub trait App {
    /// Handle one decoded key.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, key: Key) -> Action;

    /// Paint the whole screen into `out`.
    ///
    /// Called once per iteration with an empty buffer; everything the
    /// terminal should show, cursor placement included, goes in here.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Write`] if an escape sequence cannot be
    /// encoded. Never happens with an in-memory buffer.
    fn paint(&mut self, out: &mut OutputBuffer) -> Result<()>;
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The editor's main loop over an input source and an output sink.
///
/// Generic so tests can drive it with byte slices and a `Vec<u8>`; the
/// binary uses [`Stdin`](crate::reader::Stdin) and
/// [`TtyWriter`](crate::output::TtyWriter).
pub struct EventLoop<I, O> {
    input: I,
    output: O,
}

impl<I: ByteSource, O: Write> EventLoop<I, O> {
    /// Create a loop reading keys from `input` and writing frames to `output`.
    pub const fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// The output sink (for inspecting what was written in tests).
    pub const fn output(&self) -> &O {
        &self.output
    }

    /// Run until the application returns [`Action::Quit`].
    ///
    /// On quit, the screen is cleared and the cursor sent home before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns the first read or write failure. These are fatal: the
    /// caller should restore the terminal and exit non-zero.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        loop {
            self.refresh(app)?;

            let key = input::read_key(&mut self.input)?;
            if app.on_key(key) == Action::Quit {
                tracing::debug!("quit requested");
                return self.clear_screen();
            }
        }
    }

    /// Paint one frame and flush it.
    fn refresh(&mut self, app: &mut impl App) -> Result<()> {
        let mut frame = OutputBuffer::new();
        app.paint(&mut frame)?;
        frame.flush_to(&mut self.output)
    }

    fn clear_screen(&mut self) -> Result<()> {
        let mut frame = OutputBuffer::new();
        ansi::clear_screen(&mut frame).map_err(TerminalError::Write)?;
        ansi::cursor_home(&mut frame).map_err(TerminalError::Write)?;
        frame.flush_to(&mut self.output)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
