//! Screen rendering.
//!
//! Every refresh redraws the whole screen into one [`OutputBuffer`]:
//!
//! 1. hide the cursor, so it doesn't flicker across the screen mid-draw
//! 2. move to the top-left cell
//! 3. draw every row: a `~` in the first column, and on row `rows / 3` the
//!    welcome banner, centered horizontally
//! 4. put the cursor back where the user left it
//! 5. show the cursor
//!
//! Rows are separated by `\r\n`, with none after the last row, so the
//! bottom line never scrolls the screen.
//!
//! The banner sits a third of the way down rather than in the middle.
//! That placement is long-standing behavior and is kept as is.

use std::io::{self, Write};

use kilo_term::ansi;
use kilo_term::output::OutputBuffer;
use unicode_width::UnicodeWidthChar;

use crate::view::View;

/// Editor version shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The welcome banner text.
#[must_use]
pub fn welcome_message() -> String {
    format!("Kilo editor -- version {VERSION}")
}

/// Cut `text` down to at most `cols` terminal columns.
///
/// Never splits a character; a double-width character that would straddle
/// the limit is dropped.
#[must_use]
pub fn truncate_to_width(text: &str, cols: usize) -> &str {
    let mut width = 0;
    for (idx, ch) in text.char_indices() {
        width += ch.width().unwrap_or(0);
        if width > cols {
            return &text[..idx];
        }
    }
    text
}

/// Write the welcome row: `~`, padding, then the banner centered in
/// `cols` columns.
///
/// Padding is `(cols - banner_width) / 2`; the `~` takes the first column
/// of it. When the banner fills the row there is no room for the `~`.
fn draw_welcome(out: &mut impl Write, cols: u16) -> io::Result<()> {
    let message = welcome_message();
    let banner = truncate_to_width(&message, usize::from(cols));
    let banner_width: usize = banner.chars().filter_map(UnicodeWidthChar::width).sum();

    let mut padding = (usize::from(cols) - banner_width) / 2;
    if padding > 0 {
        out.write_all(b"~")?;
        padding -= 1;
    }
    write!(out, "{:padding$}", "")?;
    out.write_all(banner.as_bytes())
}

/// Draw every screen row.
pub fn draw_rows(view: &View, out: &mut impl Write) -> io::Result<()> {
    let rows = view.screen_rows();
    let banner_row = rows / 3;

    for y in 0..rows {
        if y == banner_row {
            draw_welcome(out, view.screen_cols())?;
        } else {
            out.write_all(b"~")?;
        }

        if y + 1 < rows {
            ansi::newline(out)?;
        }
    }
    Ok(())
}

/// Compose a full frame for `view` into `out`.
pub fn refresh_screen(view: &View, out: &mut OutputBuffer) -> io::Result<()> {
    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;
    draw_rows(view, out)?;
    ansi::cursor_to(out, view.cursor_x(), view.cursor_y())?;
    ansi::cursor_show(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Direction;
    use kilo_term::terminal::Size;
    use pretty_assertions::assert_eq;

    fn view(cols: u16, rows: u16) -> View {
        View::new(Size { cols, rows })
    }

    fn rows_of(view: &View) -> String {
        let mut out = Vec::new();
        draw_rows(view, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn frame_of(view: &View) -> String {
        let mut out = OutputBuffer::new();
        refresh_screen(view, &mut out).unwrap();
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    // ── Banner ──────────────────────────────────────────────────────

    #[test]
    fn banner_text() {
        assert_eq!(welcome_message(), "Kilo editor -- version 0.0.1");
    }

    #[test]
    fn banner_is_centered_in_80_columns() {
        let mut out = Vec::new();
        draw_welcome(&mut out, 80).unwrap();
        let line = String::from_utf8(out).unwrap();

        let banner_len = welcome_message().len();
        assert!(banner_len <= 80);
        let padding = (80 - banner_len) / 2;
        let expected = format!("~{}{}", " ".repeat(padding - 1), welcome_message());
        assert_eq!(line, expected);
        assert_eq!(line.len(), padding + banner_len);
    }

    #[test]
    fn banner_truncated_to_narrow_screen() {
        let mut out = Vec::new();
        draw_welcome(&mut out, 10).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Kilo edito");
    }

    #[test]
    fn banner_with_one_column_of_padding() {
        let width = u16::try_from(welcome_message().len()).unwrap() + 3;
        let mut out = Vec::new();
        draw_welcome(&mut out, width).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("~{}", welcome_message()));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_to_width("héllo", 2), "hé");
        assert_eq!(truncate_to_width("abc", 10), "abc");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn truncate_drops_straddling_wide_char() {
        assert_eq!(truncate_to_width("a日本", 2), "a");
        assert_eq!(truncate_to_width("a日本", 3), "a日");
    }

    // ── Rows ────────────────────────────────────────────────────────

    #[test]
    fn three_rows_two_terminators() {
        let s = rows_of(&view(80, 3));
        assert_eq!(s.matches("\r\n").count(), 2);
        assert!(!s.ends_with("\r\n"));

        let rows: Vec<&str> = s.split("\r\n").collect();
        assert_eq!(rows.len(), 3);
        // 3 / 3 == 1: the banner is on the second row.
        assert_eq!(rows[0], "~");
        assert!(rows[1].ends_with(&welcome_message()));
        assert_eq!(rows[2], "~");
    }

    #[test]
    fn banner_row_is_a_third_down() {
        let s = rows_of(&view(80, 24));
        let rows: Vec<&str> = s.split("\r\n").collect();
        assert_eq!(rows.len(), 24);
        let banner_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.contains("Kilo"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(banner_rows, vec![8]);
    }

    #[test]
    fn single_row_screen_has_only_banner() {
        let s = rows_of(&view(80, 1));
        assert!(!s.contains("\r\n"));
        assert!(s.ends_with(&welcome_message()));
    }

    // ── Frame ───────────────────────────────────────────────────────

    #[test]
    fn frame_is_wrapped_in_cursor_hide_and_show() {
        let s = frame_of(&view(80, 3));
        assert!(s.starts_with("\x1b[?25l\x1b[H~\r\n"));
        assert!(s.ends_with("~\x1b[1;1H\x1b[?25h"));
    }

    #[test]
    fn frame_places_cursor_one_based() {
        let mut v = view(80, 3);
        v.move_cursor(Direction::Right);
        v.move_cursor(Direction::Right);
        v.move_cursor(Direction::Down);
        let s = frame_of(&v);
        assert!(s.ends_with("\x1b[2;3H\x1b[?25h"));
    }

    #[test]
    fn frame_exact_bytes_for_tiny_screen() {
        // 2 rows: banner on row 0, truncated to 4 columns (no room for `~`).
        let s = frame_of(&view(4, 2));
        assert_eq!(s, "\x1b[?25l\x1b[HKilo\r\n~\x1b[1;1H\x1b[?25h");
    }
}
