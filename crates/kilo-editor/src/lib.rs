//! # kilo-editor — Editor core for kilo
//!
//! - **[`view`]** — cursor position and screen size, with unclamped movement
//! - **[`render`]** — composes each frame: placeholder rows, welcome banner, cursor
//! - **[`editor`]** — `Editor`, which dispatches keys and plugs into
//!   kilo-term's event loop
//!
//! Text storage and file I/O are not part of this crate yet; the screen
//! shows `~` placeholder rows.

pub mod editor;
pub mod render;
pub mod view;
