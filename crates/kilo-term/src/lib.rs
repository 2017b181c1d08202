// SPDX-License-Identifier: MIT
//
// kilo-term — terminal plumbing for the kilo editor.
//
// Raw termios, ANSI escape sequences, and a byte-at-a-time key decoder.
// No TUI framework in between: the editor owns every byte it sends and
// reads. A frame is assembled in memory and written with one syscall;
// raw mode is held by a guard that restores the terminal however the
// session ends.

#[cfg(not(unix))]
compile_error!("kilo-term drives the terminal through POSIX termios and requires a unix target");

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;

pub use error::{Result, TerminalError};
