// SPDX-License-Identifier: MIT
//
// skiff — a small terminal text editor with incremental syntax highlighting.
//
// This is the main binary that wires together the crates:
//
//   skiff-term → terminal control, ANSI output, key input parsing
//   skiff-core → rows, highlighting, viewport, compositor, search
//
// The Editor struct owns all state and runs one synchronous loop:
//
//   stdin → parser → process_key → buffer/cursor mutation
//   refresh → compositor → output buffer → one write() to the terminal
//
// There is no frame thread and no diffing — every keypress repaints the
// visible window, which is linear in screen rows, not file size.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 2 (managed by the compositor)
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message line                 │  ← 1 row
//   └──────────────────────────────┘

use std::collections::VecDeque;
use std::env;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use skiff_core::buffer::Buffer;
use skiff_core::screen::{self, StatusMessage};
use skiff_core::search::{Search, SearchTrigger};
use skiff_core::view::{Cursor, Viewport};

use skiff_term::input::{Key, Parser};
use skiff_term::output::OutputBuffer;
use skiff_term::terminal::{self, Terminal};

/// How many extra Ctrl-Q presses a dirty buffer demands before quitting.
const QUIT_CONFIRMATIONS: u8 = 3;

/// Rows reserved below the text area: status bar + message line.
const RESERVED_ROWS: usize = 2;

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The whole editor: terminal, input, buffer, cursor, viewport, messages.
struct Editor {
    term: Terminal,
    parser: Parser,
    out: OutputBuffer,
    /// Decoded keys not yet consumed (a single read can yield several).
    pending: VecDeque<Key>,
    buf: Buffer,
    cursor: Cursor,
    view: Viewport,
    message: StatusMessage,
    /// Remaining Ctrl-Q confirmations while the buffer is dirty.
    quit_times: u8,
}

impl Editor {
    /// Build an editor around a loaded (or empty) buffer. Does not touch
    /// terminal modes — `run` does that.
    fn new(buf: Buffer) -> io::Result<Self> {
        let term = Terminal::new()?;
        let size = term.size();
        let view = Viewport::new(
            usize::from(size.rows).saturating_sub(RESERVED_ROWS),
            usize::from(size.cols),
        );

        Ok(Self {
            term,
            parser: Parser::new(),
            out: OutputBuffer::new(),
            pending: VecDeque::new(),
            buf,
            cursor: Cursor::new(),
            view,
            message: StatusMessage::new(),
            quit_times: QUIT_CONFIRMATIONS,
        })
    }

    // ── Main loop ───────────────────────────────────────────────────

    /// Enter raw mode and run until quit. The terminal is restored even
    /// when the loop errors.
    fn run(&mut self) -> io::Result<()> {
        self.term.enter()?;
        let result = self.run_inner();
        self.term.leave()?;
        result
    }

    fn run_inner(&mut self) -> io::Result<()> {
        loop {
            self.refresh()?;
            let key = self.read_key()?;
            if !self.process_key(key)? {
                return Ok(());
            }
        }
    }

    /// Compose and (on a live terminal) flush one frame.
    fn refresh(&mut self) -> io::Result<()> {
        screen::refresh(
            &mut self.out,
            &self.buf,
            self.cursor,
            &mut self.view,
            self.message.current(),
        )?;
        if self.term.is_active() {
            self.out.flush_stdout()
        } else {
            // Off-tty (tests) there is nowhere to draw — drop the frame.
            self.out.clear();
            Ok(())
        }
    }

    /// Block until one key event is available.
    ///
    /// Raw mode uses a 100ms read timeout, so this loop doubles as the
    /// escape-sequence disambiguator (a pending lone ESC is flushed as a
    /// real Escape once the timeout fires) and as the place resizes are
    /// noticed.
    fn read_key(&mut self) -> io::Result<Key> {
        loop {
            if let Some(key) = self.pending.pop_front() {
                return Ok(key);
            }

            if terminal::take_resize() {
                self.handle_resize();
                self.refresh()?;
            }

            let mut chunk = [0u8; 64];
            let n = io::stdin().lock().read(&mut chunk)?;
            if n == 0 {
                if self.parser.has_pending() {
                    self.pending.extend(self.parser.flush());
                    continue;
                }
                if !self.term.is_active() {
                    // Without a terminal a zero-byte read is EOF, not a
                    // timeout — treat exhausted input as cancel.
                    return Ok(Key::Escape);
                }
                continue;
            }
            self.pending.extend(self.parser.advance(&chunk[..n]));
        }
    }

    fn handle_resize(&mut self) {
        let size = self.term.refresh_size();
        self.view.set_size(
            usize::from(size.rows).saturating_sub(RESERVED_ROWS),
            usize::from(size.cols),
        );
    }

    // ── Key dispatch ────────────────────────────────────────────────

    /// Handle one key. Returns `false` when the editor should exit.
    fn process_key(&mut self, key: Key) -> io::Result<bool> {
        match key {
            Key::Ctrl('q') => {
                if self.buf.is_dirty() && self.quit_times > 0 {
                    self.message.set(format!(
                        "WARNING!!! File has unsaved changes. \
                         Press Ctrl-Q {} more times to quit.",
                        self.quit_times
                    ));
                    self.quit_times -= 1;
                    return Ok(true);
                }
                return Ok(false);
            }

            Key::Ctrl('s') => self.save()?,
            Key::Ctrl('f') => self.find()?,

            Key::Enter => self.insert_newline(),
            Key::Backspace | Key::Ctrl('h') => self.delete_backward(),
            Key::Delete => self.delete_forward(),
            Key::Tab => self.insert_char('\t'),
            Key::Char(ch) => self.insert_char(ch),

            Key::Left => self.cursor.move_left(&self.buf),
            Key::Right => self.cursor.move_right(&self.buf),
            Key::Up => self.cursor.move_up(&self.buf),
            Key::Down => self.cursor.move_down(&self.buf),
            Key::Home => self.cursor.cx = 0,
            Key::End => {
                if let Some(row) = self.buf.row(self.cursor.cy) {
                    self.cursor.cx = row.char_len();
                }
            }
            Key::PageUp | Key::PageDown => self.page_move(key),

            // Escape and unbound control chords are consumed quietly
            // (Ctrl-L would force a repaint, which happens anyway).
            Key::Escape | Key::Ctrl(_) => {}
        }

        // Any key other than Ctrl-Q rewinds the quit countdown.
        self.quit_times = QUIT_CONFIRMATIONS;
        Ok(true)
    }

    // ── Editing ─────────────────────────────────────────────────────

    fn insert_char(&mut self, ch: char) {
        if self.cursor.cy == self.buf.num_rows() {
            self.buf.insert_row(self.cursor.cy, "");
        }
        self.buf.insert_char(self.cursor.cy, self.cursor.cx, ch);
        self.cursor.cx += 1;
    }

    fn insert_newline(&mut self) {
        if self.cursor.cx == 0 {
            self.buf.insert_row(self.cursor.cy, "");
        } else {
            self.buf.split_row(self.cursor.cy, self.cursor.cx);
        }
        self.cursor.cy += 1;
        self.cursor.cx = 0;
    }

    /// Backspace: delete the character before the cursor, joining with
    /// the previous row at column zero. A no-op at the very start of the
    /// buffer and on the append line past the last row.
    fn delete_backward(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        if cy == self.buf.num_rows() {
            return;
        }
        if cx == 0 && cy == 0 {
            return;
        }

        if cx > 0 {
            self.buf.delete_char(cy, cx - 1);
            self.cursor.cx -= 1;
        } else {
            let join_at = self
                .buf
                .row(cy - 1)
                .map_or(0, skiff_core::row::Row::char_len);
            self.buf.join_with_next(cy - 1);
            self.cursor.cy -= 1;
            self.cursor.cx = join_at;
        }
    }

    /// Delete-forward: remove the character under the cursor, joining the
    /// next row up at end of line. A no-op past the end of the last row.
    fn delete_forward(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        let Some(row) = self.buf.row(cy) else {
            return;
        };
        if cx < row.char_len() {
            self.buf.delete_char(cy, cx);
        } else {
            self.buf.join_with_next(cy);
        }
    }

    fn page_move(&mut self, key: Key) {
        // Jump the cursor to the window edge, then move a full screen of
        // rows — the scroll clamp does the rest.
        self.cursor.cy = match key {
            Key::PageUp => self.view.row_offset(),
            _ => (self.view.row_offset() + self.view.screen_rows())
                .saturating_sub(1)
                .min(self.buf.num_rows()),
        };
        self.cursor.snap_x(&self.buf);

        for _ in 0..self.view.screen_rows() {
            match key {
                Key::PageUp => self.cursor.move_up(&self.buf),
                _ => self.cursor.move_down(&self.buf),
            }
        }
    }

    // ── Saving ──────────────────────────────────────────────────────

    fn save(&mut self) -> io::Result<()> {
        let result = if self.buf.path().is_some() {
            self.buf.save()
        } else {
            let Some(name) = self.prompt("Save as (ESC to cancel): ", |_, _, _| {})? else {
                self.message.set("Save aborted");
                return Ok(());
            };
            self.buf.save_as(Path::new(&name))
        };

        match result {
            Ok(bytes) => self.message.set(format!("{bytes} bytes written to disk")),
            Err(err) => self.message.set(format!("Can't save! I/O error: {err}")),
        }
        Ok(())
    }

    // ── Search ──────────────────────────────────────────────────────

    fn find(&mut self) -> io::Result<()> {
        let mut search = Search::begin(self.cursor, &self.view);
        self.prompt("Search (Use ESC/Arrows/Enter): ", |editor, query, trigger| {
            search.on_query(
                &mut editor.buf,
                &mut editor.cursor,
                &mut editor.view,
                query,
                trigger,
            );
        })?;
        Ok(())
    }

    // ── Prompt ──────────────────────────────────────────────────────

    /// A line-editing prompt on the message line.
    ///
    /// Every state change notifies `callback` with the query text and a
    /// trigger: edits, match navigation (arrows), confirm (Enter), or
    /// cancel (Escape). Returns the confirmed input, or `None` on cancel.
    /// Enter on an empty input stays in the prompt.
    fn prompt(
        &mut self,
        prefix: &str,
        mut callback: impl FnMut(&mut Self, &str, SearchTrigger),
    ) -> io::Result<Option<String>> {
        let mut input = String::new();
        loop {
            self.message.set(format!("{prefix}{input}"));
            self.refresh()?;

            match self.read_key()? {
                Key::Enter => {
                    if !input.is_empty() {
                        self.message.clear();
                        callback(self, &input, SearchTrigger::Confirm);
                        return Ok(Some(input));
                    }
                }
                Key::Escape => {
                    self.message.clear();
                    callback(self, &input, SearchTrigger::Cancel);
                    return Ok(None);
                }
                Key::Backspace | Key::Ctrl('h') | Key::Delete => {
                    input.pop();
                    callback(self, &input, SearchTrigger::Edited);
                }
                Key::Right | Key::Down => callback(self, &input, SearchTrigger::Next),
                Key::Left | Key::Up => callback(self, &input, SearchTrigger::Prev),
                Key::Char(ch) => {
                    input.push(ch);
                    callback(self, &input, SearchTrigger::Edited);
                }
                _ => {}
            }
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let args: Vec<String> = env::args().collect();

    let buf = if let Some(path) = args.get(1) {
        Buffer::from_file(Path::new(path)).unwrap_or_else(|err| {
            eprintln!("skiff: {path}: {err}");
            process::exit(1);
        })
    } else {
        Buffer::new()
    };

    let mut editor = Editor::new(buf).unwrap_or_else(|err| {
        eprintln!("skiff: failed to initialize terminal: {err}");
        process::exit(1);
    });
    editor
        .message
        .set("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");

    if let Err(err) = editor.run() {
        eprintln!("skiff: {err}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
