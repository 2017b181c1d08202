//! Cursor and screen state.
//!
//! The cursor is a pair of 0-indexed screen coordinates. Movement is not
//! clamped to the screen: there is no text yet to clamp against, and
//! bounds checks belong with whatever ends up owning the content. A cursor
//! moved off the top-left simply goes negative.
//!
//! The screen size is fixed at construction (the terminal is measured once
//! at startup).

use kilo_term::terminal::Size;

/// One step of cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Cursor position plus the dimensions of the screen it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    cx: i32,
    cy: i32,
    size: Size,
}

impl View {
    /// A view of the given size with the cursor in the top-left cell.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self { cx: 0, cy: 0, size }
    }

    // -- Accessors ----------------------------------------------------------

    /// Cursor column (0-indexed).
    #[inline]
    #[must_use]
    pub const fn cursor_x(&self) -> i32 {
        self.cx
    }

    /// Cursor row (0-indexed).
    #[inline]
    #[must_use]
    pub const fn cursor_y(&self) -> i32 {
        self.cy
    }

    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> u16 {
        self.size.rows
    }

    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> u16 {
        self.size.cols
    }

    // -- Movement -----------------------------------------------------------

    /// Move the cursor one cell in `dir`. Only one axis changes.
    pub const fn move_cursor(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.cx = self.cx.saturating_sub(1),
            Direction::Right => self.cx = self.cx.saturating_add(1),
            Direction::Up => self.cy = self.cy.saturating_sub(1),
            Direction::Down => self.cy = self.cy.saturating_add(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
