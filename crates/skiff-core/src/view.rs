//! Cursor and viewport state.
//!
//! The cursor lives in *raw* character coordinates: `cx` is a char offset
//! into the row at `cy`. Rendering derives the tab-aware render column
//! `rx` from it each frame. `cy` ranges over `[0, num_rows]` inclusive —
//! one past the last row is the append position, where new text starts a
//! fresh row.
//!
//! The viewport tracks the top-left corner of the visible window in
//! row/render-column units and clamps it around the cursor once per frame
//! with the minimal scroll needed — no smooth scrolling, no margins.

use crate::buffer::Buffer;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Cursor position in raw character coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Char offset into the row at `cy`. Always within `[0, raw_len]`.
    pub cx: usize,
    /// Row index. Within `[0, num_rows]` — the top boundary inclusive of
    /// the append position one past the last row.
    pub cy: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { cx: 0, cy: 0 }
    }

    /// Char length of the current row (0 on the append line).
    fn row_len(self, buf: &Buffer) -> usize {
        buf.row(self.cy).map_or(0, crate::row::Row::char_len)
    }

    /// Clamp `cx` into the current row. Called after every vertical move —
    /// neighboring lines differ in length.
    pub fn snap_x(&mut self, buf: &Buffer) {
        let len = self.row_len(buf);
        if self.cx > len {
            self.cx = len;
        }
    }

    /// Move one position left, wrapping to the end of the previous row.
    pub fn move_left(&mut self, buf: &Buffer) {
        if self.cx > 0 {
            self.cx -= 1;
        } else if self.cy > 0 {
            self.cy -= 1;
            self.cx = self.row_len(buf);
        }
    }

    /// Move one position right, wrapping to the start of the next row.
    pub fn move_right(&mut self, buf: &Buffer) {
        if self.cy >= buf.num_rows() {
            return;
        }
        if self.cx < self.row_len(buf) {
            self.cx += 1;
        } else {
            self.cy += 1;
            self.cx = 0;
        }
    }

    /// Move one row up, clamping the column.
    pub fn move_up(&mut self, buf: &Buffer) {
        if self.cy > 0 {
            self.cy -= 1;
            self.snap_x(buf);
        }
    }

    /// Move one row down (at most to the append position), clamping the
    /// column.
    pub fn move_down(&mut self, buf: &Buffer) {
        if self.cy < buf.num_rows() {
            self.cy += 1;
            self.snap_x(buf);
        }
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window: scroll offsets plus the text-area dimensions
/// (status and message lines excluded).
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport {
    /// First visible row.
    pub(crate) row_offset: usize,
    /// First visible render column.
    pub(crate) col_offset: usize,
    /// Visible text rows.
    screen_rows: usize,
    /// Visible text columns.
    screen_cols: usize,
}

impl Viewport {
    /// Create a viewport of the given text-area size.
    #[must_use]
    pub const fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            screen_rows,
            screen_cols,
        }
    }

    /// First visible row.
    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// First visible render column.
    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Visible text rows.
    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> usize {
        self.screen_rows
    }

    /// Visible text columns.
    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> usize {
        self.screen_cols
    }

    /// Resize the text area (after SIGWINCH). Offsets are left alone; the
    /// next [`scroll`](Self::scroll) re-clamps them around the cursor.
    pub const fn set_size(&mut self, screen_rows: usize, screen_cols: usize) {
        self.screen_rows = screen_rows;
        self.screen_cols = screen_cols;
    }

    /// Scroll a row to the top of the window on the next clamp by pushing
    /// the offset past it. Used by search to surface a match.
    pub const fn scroll_row_to_top(&mut self, past_end: usize) {
        self.row_offset = past_end;
    }

    /// Clamp the window around the cursor with the minimal scroll needed.
    ///
    /// Applied once per frame before drawing. Returns the cursor's render
    /// column, which the compositor reuses for hardware-cursor placement.
    /// Degenerate (zero-sized) windows leave the offsets untouched.
    pub fn scroll(&mut self, cursor: Cursor, buf: &Buffer) -> usize {
        let rx = buf
            .row(cursor.cy)
            .map_or(0, |row| row.cx_to_rx(cursor.cx));

        if self.screen_rows > 0 {
            if cursor.cy < self.row_offset {
                self.row_offset = cursor.cy;
            }
            if cursor.cy >= self.row_offset + self.screen_rows {
                self.row_offset = cursor.cy - self.screen_rows + 1;
            }
        }
        if self.screen_cols > 0 {
            if rx < self.col_offset {
                self.col_offset = rx;
            }
            if rx >= self.col_offset + self.screen_cols {
                self.col_offset = rx - self.screen_cols + 1;
            }
        }

        rx
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
