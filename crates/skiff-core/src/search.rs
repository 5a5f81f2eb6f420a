//! Search — incremental find with a transient match overlay.
//!
//! A [`Search`] session is created when the user opens the find prompt
//! and driven by callback notifications from it: every keystroke, the
//! match-navigation arrows, confirm, and cancel all arrive as
//! [`SearchTrigger`]s paired with the current query text.
//!
//! # Search flow
//!
//! 1. [`Search::begin`] snapshots the cursor and scroll position
//! 2. Each keystroke re-runs the search from the top (fresh query);
//!    navigate-next/previous resume from the last matched row
//! 3. Confirm leaves the cursor on the match
//! 4. Cancel restores the cursor and scroll position exactly
//!
//! Matches are located per row, as a literal substring of the row's
//! *rendered* text — what the user sees is what matches — and the cursor
//! lands on the raw character occupying the matched render column.
//!
//! # Match highlighting
//!
//! The matched span gets a [`Highlight::Match`] overlay distinct from
//! persistent syntax highlighting: the span's previous tags are saved
//! when the overlay is applied and written back before the next step (or
//! on confirm/cancel), so the syntax pass never has to re-run just
//! because the search moved on.

use crate::buffer::Buffer;
use crate::highlight::Highlight;
use crate::view::{Cursor, Viewport};

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// What the prompt is telling the search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTrigger {
    /// The query text changed (a keystroke or deletion).
    Edited,
    /// Jump to the next match (wrapping forward).
    Next,
    /// Jump to the previous match (wrapping backward).
    Prev,
    /// The query was accepted; the cursor stays on the match.
    Confirm,
    /// The query was aborted; cursor and scroll state are restored.
    Cancel,
}

// ---------------------------------------------------------------------------
// Saved overlay span
// ---------------------------------------------------------------------------

/// The highlight tags a match overlay replaced, for exact restoration.
struct SavedSpan {
    row: usize,
    start: usize,
    tags: Vec<Highlight>,
}

// ---------------------------------------------------------------------------
// Search session
// ---------------------------------------------------------------------------

/// One interactive search session.
pub struct Search {
    /// Row of the most recent match; the next/previous step resumes here.
    last_match: Option<usize>,
    /// Current scan direction.
    forward: bool,
    /// Overlay to undo before the next step.
    saved_span: Option<SavedSpan>,
    /// Cursor position when the session opened (for cancel).
    saved_cursor: Cursor,
    /// Scroll offsets when the session opened (for cancel).
    saved_row_offset: usize,
    saved_col_offset: usize,
}

impl Search {
    /// Open a session, snapshotting cursor and scroll state.
    #[must_use]
    pub const fn begin(cursor: Cursor, view: &Viewport) -> Self {
        Self {
            last_match: None,
            forward: true,
            saved_span: None,
            saved_cursor: cursor,
            saved_row_offset: view.row_offset(),
            saved_col_offset: view.col_offset(),
        }
    }

    /// Handle one prompt notification.
    ///
    /// Always unwinds the previous overlay first, then acts on the
    /// trigger: moving the cursor to a match (and queuing the matched row
    /// to surface at the top of the window), or restoring the saved state
    /// on cancel.
    pub fn on_query(
        &mut self,
        buf: &mut Buffer,
        cursor: &mut Cursor,
        view: &mut Viewport,
        query: &str,
        trigger: SearchTrigger,
    ) {
        self.restore_overlay(buf);

        match trigger {
            SearchTrigger::Confirm => {
                self.last_match = None;
                return;
            }
            SearchTrigger::Cancel => {
                *cursor = self.saved_cursor;
                view.row_offset = self.saved_row_offset;
                view.col_offset = self.saved_col_offset;
                self.last_match = None;
                return;
            }
            SearchTrigger::Next => self.forward = true,
            SearchTrigger::Prev => self.forward = false,
            SearchTrigger::Edited => {
                self.last_match = None;
                self.forward = true;
            }
        }

        if query.is_empty() || buf.is_empty() {
            return;
        }

        // A fresh query has nowhere to step backward from.
        if self.last_match.is_none() {
            self.forward = true;
        }

        let num_rows = buf.num_rows();
        let mut current = self.last_match;

        for _ in 0..num_rows {
            let row_idx = match current {
                None => {
                    if self.forward {
                        0
                    } else {
                        num_rows - 1
                    }
                }
                Some(i) => {
                    if self.forward {
                        (i + 1) % num_rows
                    } else {
                        (i + num_rows - 1) % num_rows
                    }
                }
            };
            current = Some(row_idx);

            let row = &buf.rows()[row_idx];
            if let Some(byte_pos) = row.rendered().find(query) {
                let start = row.rendered()[..byte_pos].chars().count();
                let len = query.chars().count();

                self.last_match = Some(row_idx);
                cursor.cy = row_idx;
                cursor.cx = row.rx_to_cx(start);
                // Push the offset past the end so the next clamp brings
                // the matched row to the top of the window.
                view.scroll_row_to_top(num_rows);

                self.apply_overlay(buf, row_idx, start, len);
                return;
            }
        }
    }

    /// Tag the matched span, saving what it covered.
    fn apply_overlay(&mut self, buf: &mut Buffer, row_idx: usize, start: usize, len: usize) {
        let Some(row) = buf.row_mut(row_idx) else {
            return;
        };
        let end = (start + len).min(row.hl.len());
        let tags = row.hl[start..end].to_vec();
        for slot in &mut row.hl[start..end] {
            *slot = Highlight::Match;
        }
        self.saved_span = Some(SavedSpan {
            row: row_idx,
            start,
            tags,
        });
    }

    /// Write the saved tags back over the previous match span, if its row
    /// still holds them (an edit between steps may have shrunk it).
    fn restore_overlay(&mut self, buf: &mut Buffer) {
        let Some(span) = self.saved_span.take() else {
            return;
        };
        if let Some(row) = buf.row_mut(span.row) {
            let end = (span.start + span.tags.len()).min(row.hl.len());
            if span.start <= end {
                for (slot, tag) in row.hl[span.start..end].iter_mut().zip(span.tags) {
                    *slot = tag;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn setup(lines: &[&str]) -> (Buffer, Cursor, Viewport) {
        (
            Buffer::from_lines(lines.iter().copied()),
            Cursor::new(),
            Viewport::new(10, 40),
        )
    }

    fn step(
        s: &mut Search,
        buf: &mut Buffer,
        cursor: &mut Cursor,
        view: &mut Viewport,
        query: &str,
        trigger: SearchTrigger,
    ) {
        s.on_query(buf, cursor, view, query, trigger);
    }

    // -- Locating matches ---------------------------------------------------

    #[test]
    fn fresh_query_finds_first_match_from_top() {
        let (mut buf, mut cursor, mut view) = setup(&["alpha", "beta", "gamma"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "beta", SearchTrigger::Edited);
        assert_eq!(cursor.cy, 1);
        assert_eq!(cursor.cx, 0);
    }

    #[test]
    fn match_mid_row_sets_column() {
        let (mut buf, mut cursor, mut view) = setup(&["say hello there"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "hello", SearchTrigger::Edited);
        assert_eq!(cursor.cy, 0);
        assert_eq!(cursor.cx, 4);
    }

    #[test]
    fn match_in_rendered_text_lands_on_tab() {
        // The query matches inside the tab-expanded render; the cursor
        // must land on the raw character occupying that column.
        let (mut buf, mut cursor, mut view) = setup(&["\thello"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "hello", SearchTrigger::Edited);
        assert_eq!(cursor.cx, 1, "raw offset of 'h' after the tab");
    }

    #[test]
    fn no_match_leaves_cursor() {
        let (mut buf, mut cursor, mut view) = setup(&["alpha"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "zzz", SearchTrigger::Edited);
        assert_eq!(cursor, Cursor::new());
    }

    #[test]
    fn empty_query_is_inert() {
        let (mut buf, mut cursor, mut view) = setup(&["alpha"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "", SearchTrigger::Edited);
        assert_eq!(cursor, Cursor::new());
    }

    // -- Navigation and wraparound ------------------------------------------

    #[test]
    fn next_advances_and_wraps() {
        let (mut buf, mut cursor, mut view) = setup(&["x a", "none", "x b"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "x", SearchTrigger::Edited);
        assert_eq!(cursor.cy, 0);

        step(&mut s, &mut buf, &mut cursor, &mut view, "x", SearchTrigger::Next);
        assert_eq!(cursor.cy, 2);

        step(&mut s, &mut buf, &mut cursor, &mut view, "x", SearchTrigger::Next);
        assert_eq!(cursor.cy, 0, "forward search wraps to the top");
    }

    #[test]
    fn prev_wraps_backward() {
        let (mut buf, mut cursor, mut view) = setup(&["x a", "none", "x b"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "x", SearchTrigger::Edited);
        assert_eq!(cursor.cy, 0);

        step(&mut s, &mut buf, &mut cursor, &mut view, "x", SearchTrigger::Prev);
        assert_eq!(cursor.cy, 2, "backward search wraps to the bottom");
    }

    #[test]
    fn edited_query_restarts_from_top() {
        let (mut buf, mut cursor, mut view) = setup(&["ab", "a", "ab"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "a", SearchTrigger::Edited);
        step(&mut s, &mut buf, &mut cursor, &mut view, "a", SearchTrigger::Next);
        assert_eq!(cursor.cy, 1);

        // Typing another character resets the scan.
        step(&mut s, &mut buf, &mut cursor, &mut view, "ab", SearchTrigger::Edited);
        assert_eq!(cursor.cy, 0);
    }

    #[test]
    fn match_row_surfaces_at_window_top() {
        let lines: Vec<String> = (0..40)
            .map(|i| if i == 30 { "needle".into() } else { format!("line {i}") })
            .collect();
        let mut buf = Buffer::from_lines(lines);
        let mut cursor = Cursor::new();
        let mut view = Viewport::new(10, 40);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "needle", SearchTrigger::Edited);
        view.scroll(cursor, &buf);
        assert_eq!(view.row_offset(), 30);
    }

    // -- Overlay ------------------------------------------------------------

    #[test]
    fn overlay_tags_exactly_the_span() {
        let (mut buf, mut cursor, mut view) = setup(&["say hello there"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "hello", SearchTrigger::Edited);
        let tags = buf.rows()[0].highlight();
        assert_eq!(tags[3], Highlight::Normal);
        for i in 4..9 {
            assert_eq!(tags[i], Highlight::Match, "offset {i}");
        }
        assert_eq!(tags[9], Highlight::Normal);
    }

    #[test]
    fn overlay_restored_on_next_step() {
        let (mut buf, mut cursor, mut view) = setup(&["aa", "aa"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "aa", SearchTrigger::Edited);
        assert_eq!(buf.rows()[0].highlight()[0], Highlight::Match);

        step(&mut s, &mut buf, &mut cursor, &mut view, "aa", SearchTrigger::Next);
        assert_eq!(buf.rows()[0].highlight()[0], Highlight::Normal);
        assert_eq!(buf.rows()[1].highlight()[0], Highlight::Match);
    }

    #[test]
    fn overlay_restores_syntax_tags_not_normal() {
        let mut buf = Buffer::from_lines(["int x;"]);
        buf.set_path("t.c".into());
        let mut cursor = Cursor::new();
        let mut view = Viewport::new(10, 40);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "int", SearchTrigger::Edited);
        assert_eq!(buf.rows()[0].highlight()[0], Highlight::Match);

        step(&mut s, &mut buf, &mut cursor, &mut view, "int", SearchTrigger::Confirm);
        assert_eq!(buf.rows()[0].highlight()[0], Highlight::Type);
    }

    #[test]
    fn overlay_does_not_dirty_the_buffer() {
        let (mut buf, mut cursor, mut view) = setup(&["hello"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "hello", SearchTrigger::Edited);
        step(&mut s, &mut buf, &mut cursor, &mut view, "hello", SearchTrigger::Confirm);
        assert!(!buf.is_dirty());
    }

    // -- Confirm / cancel ---------------------------------------------------

    #[test]
    fn confirm_keeps_cursor_on_match() {
        let (mut buf, mut cursor, mut view) = setup(&["a", "needle"]);
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "needle", SearchTrigger::Edited);
        step(&mut s, &mut buf, &mut cursor, &mut view, "needle", SearchTrigger::Confirm);
        assert_eq!(cursor.cy, 1);
    }

    #[test]
    fn cancel_restores_cursor_and_scroll() {
        let lines: Vec<String> = (0..40)
            .map(|i| if i == 30 { "needle".into() } else { format!("line {i}") })
            .collect();
        let mut buf = Buffer::from_lines(lines);
        let mut cursor = Cursor { cx: 3, cy: 5 };
        let mut view = Viewport::new(10, 40);
        view.scroll(cursor, &buf);
        let offsets = (view.row_offset(), view.col_offset());
        let mut s = Search::begin(cursor, &view);

        step(&mut s, &mut buf, &mut cursor, &mut view, "needle", SearchTrigger::Edited);
        assert_eq!(cursor.cy, 30);

        step(&mut s, &mut buf, &mut cursor, &mut view, "needle", SearchTrigger::Cancel);
        assert_eq!(cursor, Cursor { cx: 3, cy: 5 });
        assert_eq!((view.row_offset(), view.col_offset()), offsets);
        assert_eq!(buf.rows()[30].highlight()[0], Highlight::Normal);
    }
}
