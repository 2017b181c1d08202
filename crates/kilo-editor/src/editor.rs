//! The editor application: key dispatch on top of a [`View`].
//!
//! | Key                  | Effect                 |
//! |----------------------|------------------------|
//! | `Ctrl-Q`             | quit                   |
//! | `w` / Up arrow       | cursor up              |
//! | `s` / Down arrow     | cursor down            |
//! | `a` / Left arrow     | cursor left            |
//! | `d` / Right arrow    | cursor right           |
//!
//! Everything else is ignored.

use kilo_term::error::{Result, TerminalError};
use kilo_term::event_loop::{Action, App};
use kilo_term::input::{Key, ctrl_key};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;

use crate::render;
use crate::view::{Direction, View};

/// The quit key: Ctrl-Q.
pub const QUIT_KEY: u8 = ctrl_key(b'q');

/// Map a key to a cursor movement, if it is one.
#[must_use]
pub const fn direction_for(key: Key) -> Option<Direction> {
    match key {
        Key::ArrowUp | Key::Char(b'w') => Some(Direction::Up),
        Key::ArrowDown | Key::Char(b's') => Some(Direction::Down),
        Key::ArrowLeft | Key::Char(b'a') => Some(Direction::Left),
        Key::ArrowRight | Key::Char(b'd') => Some(Direction::Right),
        _ => None,
    }
}

/// Editor state for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    view: View,
}

impl Editor {
    /// An editor for a screen of `size`, cursor at the origin.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            view: View::new(size),
        }
    }

    /// The cursor and screen state.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    /// Apply one key to the editor state.
    pub fn dispatch(&mut self, key: Key) -> Action {
        if key == Key::Char(QUIT_KEY) {
            return Action::Quit;
        }
        if let Some(dir) = direction_for(key) {
            self.view.move_cursor(dir);
            tracing::trace!(
                ?dir,
                x = self.view.cursor_x(),
                y = self.view.cursor_y(),
                "cursor moved"
            );
        }
        Action::Continue
    }
}

impl App for Editor {
    fn on_key(&mut self, key: Key) -> Action {
        self.dispatch(key)
    }

    fn paint(&mut self, out: &mut OutputBuffer) -> Result<()> {
        render::refresh_screen(&self.view, out).map_err(TerminalError::Write)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use kilo_term::event_loop::EventLoop;
    use pretty_assertions::assert_eq;

    const SIZE: Size = Size { cols: 80, rows: 24 };

    fn cursor(e: &Editor) -> (i32, i32) {
        (e.view().cursor_x(), e.view().cursor_y())
    }

    fn feed(e: &mut Editor, keys: &[Key]) {
        for &k in keys {
            assert_eq!(e.dispatch(k), Action::Continue);
        }
    }

    #[test]
    fn quit_key_is_ctrl_q() {
        assert_eq!(QUIT_KEY, 0x11);
        let mut e = Editor::new(SIZE);
        assert_eq!(e.dispatch(Key::Char(0x11)), Action::Quit);
    }

    #[test]
    fn plain_q_does_not_quit() {
        let mut e = Editor::new(SIZE);
        assert_eq!(e.dispatch(Key::Char(b'q')), Action::Continue);
    }

    #[test]
    fn letter_aliases_move() {
        let mut e = Editor::new(SIZE);
        feed(&mut e, &[Key::Char(b'd'), Key::Char(b'd'), Key::Char(b's')]);
        assert_eq!(cursor(&e), (2, 1));
        feed(&mut e, &[Key::Char(b'a'), Key::Char(b'w')]);
        assert_eq!(cursor(&e), (1, 0));
    }

    #[test]
    fn arrows_move() {
        let mut e = Editor::new(SIZE);
        feed(&mut e, &[Key::ArrowRight, Key::ArrowDown, Key::ArrowDown]);
        assert_eq!(cursor(&e), (1, 2));
        feed(&mut e, &[Key::ArrowLeft, Key::ArrowUp]);
        assert_eq!(cursor(&e), (0, 1));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut e = Editor::new(SIZE);
        feed(&mut e, &[Key::Escape, Key::Char(b'x'), Key::Char(b'W'), Key::Char(0x01)]);
        assert_eq!(e, Editor::new(SIZE));
    }

    #[test]
    fn direction_mapping() {
        assert_eq!(direction_for(Key::Char(b'w')), Some(Direction::Up));
        assert_eq!(direction_for(Key::ArrowLeft), Some(Direction::Left));
        assert_eq!(direction_for(Key::Escape), None);
    }

    #[test]
    fn paint_renders_current_cursor() {
        let mut e = Editor::new(Size { cols: 20, rows: 3 });
        feed(&mut e, &[Key::ArrowDown]);
        let mut out = OutputBuffer::new();
        e.paint(&mut out).unwrap();
        assert!(out.as_bytes().ends_with(b"\x1b[2;1H\x1b[?25h"));
    }

    #[test]
    fn session_over_scripted_input() {
        let input: &[u8] = b"\x1b[Bdd\x11";
        let mut event_loop = EventLoop::new(input, Vec::<u8>::new());
        let mut e = Editor::new(Size { cols: 40, rows: 5 });
        event_loop.run(&mut e).unwrap();

        assert_eq!(cursor(&e), (2, 1));
        let written = event_loop.output();
        // Four frames (one per key) and then the clear-screen on quit.
        let frames = written.windows(6).filter(|w| *w == b"\x1b[?25l").count();
        assert_eq!(frames, 4);
        assert!(written.ends_with(b"\x1b[2;3H\x1b[?25h\x1b[2J\x1b[H"));
    }
}
