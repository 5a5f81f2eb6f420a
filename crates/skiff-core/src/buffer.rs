//! The row store — an ordered sequence of logical lines.
//!
//! A `Buffer` owns every [`Row`] exclusively; other components re-fetch
//! rows by index each frame and never hold pointers across a mutation.
//!
//! # Design choices
//!
//! - **A plain `Vec<Row>` with O(N) shifts.** Rows are inserted and
//!   deleted far less often than characters are edited within them, so
//!   array semantics with renumbering is the right trade. Row indices
//!   stay dense (0..N-1) at all times.
//!
//! - **Every mutation finishes the derived data before returning.** The
//!   mutated row's rendered text is recomputed, the highlight engine
//!   re-tags it, and — when its trailing block-comment state changed —
//!   the re-tagging cascades down through following rows until the carry
//!   settles. Callers never observe a half-updated store.
//!
//! - **Out-of-range character offsets clamp, never fail.** Cursor motion
//!   routinely probes boundary positions; the store's operations are
//!   total functions over well-formed state.
//!
//! - **The cascade is a loop, not recursion.** Carry state propagates
//!   strictly downward one row at a time, so the worklist is just "the
//!   next index"; the loop stops at the first row whose trailing state
//!   did not change. A single edit that opens or closes a block comment
//!   can ripple to the end of the file without touching the call stack.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::highlight;
use crate::row::Row;
use crate::syntax::{self, Syntax};

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// The ordered row store, plus file metadata.
pub struct Buffer {
    rows: Vec<Row>,
    path: Option<PathBuf>,
    dirty: bool,
    syntax: Option<&'static Syntax>,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// Create an empty buffer with no file path and no rows.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            path: None,
            dirty: false,
            syntax: None,
        }
    }

    /// Build a buffer from pre-split lines (no terminators). The buffer
    /// starts clean and without a file path.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut buf = Self::new();
        for (idx, line) in lines.into_iter().enumerate() {
            buf.rows.push(Row::new(idx, line));
        }
        buf.rehighlight_all();
        buf
    }

    /// Load a buffer from a file.
    ///
    /// Lines are split on `\n` with a preceding `\r` stripped. The syntax
    /// profile is selected from the filename and the buffer starts clean.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid
    /// UTF-8.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut buf = Self::from_lines(text.lines());
        buf.set_path(path.to_path_buf());
        Ok(buf)
    }

    // -- Row access ---------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// True when the buffer holds no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fetch a row by index.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable row access for the search overlay. Highlight-only edits —
    /// raw text must go through the operations below.
    pub(crate) fn row_mut(&mut self, at: usize) -> Option<&mut Row> {
        self.rows.get_mut(at)
    }

    // -- Metadata -----------------------------------------------------------

    /// The file path this buffer is associated with, if any.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The filename component of the path, for the status bar.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.as_deref().and_then(Path::file_name)?.to_str()
    }

    /// Associate the buffer with a file path. The new name re-selects the
    /// syntax profile and re-highlights every row.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.select_syntax();
    }

    /// True if the buffer has been mutated since load or the last
    /// successful save.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The active syntax profile, if any.
    #[inline]
    #[must_use]
    pub const fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    /// The active profile's display name.
    #[must_use]
    pub fn syntax_name(&self) -> Option<&'static str> {
        self.syntax.map(Syntax::name)
    }

    // -- Serialization & saving ---------------------------------------------

    /// Concatenate every row's raw text with a trailing `\n` per row.
    /// Used for saving and for byte-length reporting.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.len_bytes());
        for row in &self.rows {
            out.push_str(&row.raw);
            out.push('\n');
        }
        out
    }

    /// Byte length of the serialized buffer.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rows.iter().map(|row| row.raw.len() + 1).sum()
    }

    /// Save to the associated path. Clears the dirty flag on success and
    /// returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the buffer has no path, or the underlying
    /// write error.
    pub fn save(&mut self) -> io::Result<usize> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "buffer has no file path"))?;
        self.write_to(&path)
    }

    /// Save to a specific path, adopting it as the buffer's path.
    ///
    /// The new name re-selects the syntax profile (and re-highlights every
    /// row) before the write, so a failed write still leaves the buffer
    /// rendering as its new file type.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_as(&mut self, path: &Path) -> io::Result<usize> {
        self.set_path(path.to_path_buf());
        self.write_to(path)
    }

    fn write_to(&mut self, path: &Path) -> io::Result<usize> {
        let content = self.serialize();
        fs::write(path, &content)?;
        self.dirty = false;
        Ok(content.len())
    }

    // -- Syntax selection ---------------------------------------------------

    /// Re-select the syntax profile from the current filename and re-run
    /// the highlight pass over every row, top to bottom.
    pub fn select_syntax(&mut self) {
        self.syntax = self.file_name().and_then(syntax::select);
        self.rehighlight_all();
    }

    fn rehighlight_all(&mut self) {
        for at in 0..self.rows.len() {
            let carry = at > 0 && self.rows[at - 1].open_comment;
            highlight::update_row(&mut self.rows[at], self.syntax, carry);
        }
    }

    // -- Editing operations -------------------------------------------------

    /// Insert a new row at `at` (clamped to `[0, num_rows]`).
    pub fn insert_row(&mut self, at: usize, text: impl Into<String>) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(at, text));
        self.reindex(at + 1);
        self.dirty = true;
        self.rehighlight_from(at);
    }

    /// Delete the row at `at`. Out of range is a no-op.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.reindex(at);
        self.dirty = true;
        // The row that moved up may now carry a different comment state in.
        self.rehighlight_from(at);
    }

    /// Insert a character into a row at a raw char offset (clamped).
    /// A nonexistent row is a no-op — appending a fresh row first is the
    /// caller's decision.
    pub fn insert_char(&mut self, row: usize, at: usize, ch: char) {
        if row >= self.rows.len() {
            return;
        }
        self.rows[row].insert_char(at, ch);
        self.dirty = true;
        self.rehighlight_from(row);
    }

    /// Delete the character at a raw char offset. Out-of-range row or
    /// offset is a no-op.
    pub fn delete_char(&mut self, row: usize, at: usize) {
        if row >= self.rows.len() {
            return;
        }
        if self.rows[row].delete_char(at) {
            self.dirty = true;
            self.rehighlight_from(row);
        }
    }

    /// Append text to the end of a row. A nonexistent row is a no-op.
    pub fn append_text(&mut self, row: usize, text: &str) {
        if row >= self.rows.len() || text.is_empty() {
            return;
        }
        self.rows[row].append(text);
        self.dirty = true;
        self.rehighlight_from(row);
    }

    /// Split a row at a raw char offset: the row keeps the head, a new
    /// row below receives the tail. Used for newline insertion.
    pub fn split_row(&mut self, row: usize, at: usize) {
        if row >= self.rows.len() {
            return;
        }
        let tail = self.rows[row].split_off(at);
        self.rows.insert(row + 1, Row::new(row + 1, tail));
        self.reindex(row + 2);
        self.dirty = true;
        // Both halves changed: scan the head, then cascade from the tail
        // row unconditionally — it has never been scanned at all.
        let carry = row > 0 && self.rows[row - 1].open_comment;
        highlight::update_row(&mut self.rows[row], self.syntax, carry);
        self.rehighlight_from(row + 1);
    }

    /// Join a row with the one below it: the row absorbs the next row's
    /// raw text and the next row disappears. Used for backspace at the
    /// start of a line; the caller repositions the cursor to the join
    /// point. A missing next row is a no-op.
    pub fn join_with_next(&mut self, row: usize) {
        if row + 1 >= self.rows.len() {
            return;
        }
        let next = self.rows.remove(row + 1);
        self.rows[row].append(&next.raw);
        self.reindex(row + 1);
        self.dirty = true;
        self.rehighlight_from(row);
    }

    // -- Internals ----------------------------------------------------------

    /// Restore dense indices from `from` downward.
    fn reindex(&mut self, from: usize) {
        for at in from..self.rows.len() {
            self.rows[at].idx = at;
        }
    }

    /// Re-highlight the row at `at`, then keep walking down while each
    /// row's trailing block-comment state keeps changing.
    fn rehighlight_from(&mut self, mut at: usize) {
        while at < self.rows.len() {
            let carry = at > 0 && self.rows[at - 1].open_comment;
            let changed = highlight::update_row(&mut self.rows[at], self.syntax, carry);
            if !changed {
                break;
            }
            at += 1;
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
