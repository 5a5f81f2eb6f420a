//! Row — one logical line of text.
//!
//! Each row owns three aligned representations:
//!
//! - `raw` — the literal file content of the line, no trailing terminator
//! - `rendered` — `raw` with every tab expanded to the next 8-column stop;
//!   recomputed whenever `raw` changes, never edited directly
//! - `hl` — one highlight tag per `rendered` character, same length,
//!   recomputed by the highlight engine whenever `rendered` changes
//!
//! # Design choices
//!
//! - **Columns are char offsets**, not byte offsets. The cursor column `cx`
//!   counts characters of `raw`; the render column `rx` counts characters of
//!   `rendered`. Tabs make these differ, and [`cx_to_rx`](Row::cx_to_rx) /
//!   [`rx_to_cx`](Row::rx_to_cx) convert between them.
//!
//! - **The inverse map is deliberately asymmetric through tabs.** Every
//!   render column inside a tab's span maps back to the tab character
//!   itself, so `rx_to_cx(cx_to_rx(cx)) == cx` holds everywhere *except*
//!   for columns a tab occupies — those all resolve to the tab's own raw
//!   offset. Cursor placement from a rendered-text hit (search) depends on
//!   this.
//!
//! - **Mutation goes through the buffer.** Row exposes read accessors
//!   publicly; the editing methods are crate-private so the row store can
//!   keep indices, dirty state, and the highlight cascade consistent.

use crate::highlight::Highlight;

/// Tab stop width in render columns. A tab advances the render column to
/// the next multiple of this.
pub const TAB_STOP: usize = 8;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One logical line: raw text plus derived rendering and highlight data.
#[derive(Debug, Clone)]
pub struct Row {
    /// Literal line content, no line terminator.
    pub(crate) raw: String,
    /// `raw` with tabs expanded to spaces. Derived, never edited.
    pub(crate) rendered: String,
    /// One tag per `rendered` character. Derived, never edited directly —
    /// except by the search overlay, which snapshots and restores spans.
    pub(crate) hl: Vec<Highlight>,
    /// True when this row ends while still inside an unterminated block
    /// comment. Input state for the next row's highlight pass and the
    /// change signal for the cross-row cascade.
    pub(crate) open_comment: bool,
    /// Position in the row store. Kept dense (0..N-1) under insert/delete.
    pub(crate) idx: usize,
}

impl Row {
    /// Create a row from line text. The text must not contain a line
    /// terminator — splitting is the buffer's job.
    pub(crate) fn new(idx: usize, text: impl Into<String>) -> Self {
        let raw = text.into();
        debug_assert!(
            !raw.contains('\n') && !raw.contains('\r'),
            "row text must not contain a line terminator"
        );
        let mut row = Self {
            raw,
            rendered: String::new(),
            hl: Vec::new(),
            open_comment: false,
            idx,
        };
        row.update_render();
        row
    }

    // -- Read access --------------------------------------------------------

    /// The literal line content.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The tab-expanded display form of the line.
    #[inline]
    #[must_use]
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Highlight tags, one per [`rendered`](Self::rendered) character.
    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &[Highlight] {
        &self.hl
    }

    /// Whether the row ends inside an unterminated block comment.
    #[inline]
    #[must_use]
    pub const fn continues_block_comment(&self) -> bool {
        self.open_comment
    }

    /// The row's position in the store.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.idx
    }

    /// Number of characters in the raw line.
    #[inline]
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.raw.chars().count()
    }

    /// Number of characters in the rendered line.
    #[inline]
    #[must_use]
    pub fn render_len(&self) -> usize {
        self.rendered.chars().count()
    }

    // -- Raw ↔ render column conversion --------------------------------------

    /// Convert a raw char offset to a render column.
    ///
    /// Walks raw characters left to right; each tab advances the running
    /// render column to the next multiple of [`TAB_STOP`], every other
    /// character advances by one.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize) -> usize {
        let mut rx = 0;
        for ch in self.raw.chars().take(cx) {
            if ch == '\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx
    }

    /// Convert a render column back to a raw char offset.
    ///
    /// Returns the offset of the first raw character whose cumulative
    /// render column exceeds `rx` — i.e. the character *occupying* that
    /// column. Columns inside a tab's span all map to the tab itself;
    /// this asymmetry is intentional. A column at or past the end of the
    /// rendered line maps to the raw length (cursor-after-last position).
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, ch) in self.raw.chars().enumerate() {
            if ch == '\t' {
                cur_rx += (TAB_STOP - 1) - (cur_rx % TAB_STOP);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.char_len()
    }

    // -- Mutation (crate-private; the buffer drives these) -------------------

    /// Insert a character at a raw char offset, clamped to `[0, len]`.
    pub(crate) fn insert_char(&mut self, at: usize, ch: char) {
        let at = at.min(self.char_len());
        let byte = self.byte_index(at);
        self.raw.insert(byte, ch);
        self.update_render();
    }

    /// Delete the character at a raw char offset. Out-of-range offsets
    /// are a no-op. Returns whether anything was removed.
    pub(crate) fn delete_char(&mut self, at: usize) -> bool {
        if at >= self.char_len() {
            return false;
        }
        let byte = self.byte_index(at);
        self.raw.remove(byte);
        self.update_render();
        true
    }

    /// Append text to the end of the raw line.
    pub(crate) fn append(&mut self, text: &str) {
        self.raw.push_str(text);
        self.update_render();
    }

    /// Split the raw line at a char offset (clamped), keeping the head and
    /// returning the tail.
    pub(crate) fn split_off(&mut self, at: usize) -> String {
        let at = at.min(self.char_len());
        let byte = self.byte_index(at);
        let tail = self.raw.split_off(byte);
        self.update_render();
        tail
    }

    /// Recompute `rendered` from `raw`, expanding tabs. Resets `hl` to all
    /// normal tags of matching length so the alignment invariant holds even
    /// before the highlight engine runs.
    pub(crate) fn update_render(&mut self) {
        let mut rendered = String::with_capacity(self.raw.len());
        let mut col = 0;
        for ch in self.raw.chars() {
            if ch == '\t' {
                rendered.push(' ');
                col += 1;
                while col % TAB_STOP != 0 {
                    rendered.push(' ');
                    col += 1;
                }
            } else {
                rendered.push(ch);
                col += 1;
            }
        }
        self.rendered = rendered;
        self.hl = vec![Highlight::Normal; col];
    }

    /// Byte offset of the char at `at` (or the string length past the end).
    fn byte_index(&self, at: usize) -> usize {
        self.raw
            .char_indices()
            .nth(at)
            .map_or(self.raw.len(), |(byte, _)| byte)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
