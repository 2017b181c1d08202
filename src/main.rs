// SPDX-License-Identifier: MIT
//
// kilo — a minimal terminal screen editor.
//
// Wires the two crates together:
//
//   kilo-term   → raw mode, window size, key decoding, the event loop
//   kilo-editor → cursor state, key dispatch, frame rendering
//
// Exit status is 0 after Ctrl-Q and 1 after any terminal failure. In both
// cases the raw-mode guard inside `Session` has restored the terminal by
// the time `run` returns, because `process::exit` skips destructors and
// is only called after that point.

use std::env;
use std::fs::OpenOptions;
use std::process;
use std::sync::Mutex;

use kilo_editor::editor::Editor;
use kilo_term::ansi;
use kilo_term::event_loop::EventLoop;
use kilo_term::output::{OutputBuffer, TtyWriter};
use kilo_term::reader::Stdin;
use kilo_term::terminal::Session;
use kilo_term::TerminalError;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the log file. Logging is off when unset:
/// stderr is the screen while raw mode is active.
const LOG_FILE_VAR: &str = "KILO_LOG_FILE";

/// Environment variable holding the `EnvFilter` directives.
const LOG_FILTER_VAR: &str = "KILO_LOG";

/// Send `tracing` output to the file named by `KILO_LOG_FILE`, if any.
fn init_logging() {
    let Some(path) = env::var_os(LOG_FILE_VAR) else {
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("kilo: cannot open log file {}: {e}", path.to_string_lossy());
            return;
        }
    };

    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// One editing session, from raw mode on to raw mode off.
fn run() -> Result<(), TerminalError> {
    let session = Session::start()?;
    let size = session.size();
    tracing::info!(cols = size.cols, rows = size.rows, "session started");

    let mut editor = Editor::new(size);
    EventLoop::new(Stdin::new(), TtyWriter::stdout()).run(&mut editor)?;

    session.end()
}

/// Best-effort clear before the diagnostic, so it isn't lost among `~` rows.
fn clear_screen() {
    let mut frame = OutputBuffer::new();
    if ansi::clear_screen(&mut frame).is_ok() && ansi::cursor_home(&mut frame).is_ok() {
        let _ = frame.flush_to(&mut TtyWriter::stdout());
    }
}

fn main() {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kilo starting");

    if let Err(e) = run() {
        tracing::error!(%e, "fatal terminal error");
        clear_screen();
        eprintln!("kilo: {e}");
        process::exit(1);
    }
}
