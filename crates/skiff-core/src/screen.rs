//! The screen compositor — one output buffer per frame.
//!
//! Builds a complete frame into an in-memory [`OutputBuffer`] rather than
//! issuing many small writes, so the terminal never renders a torn frame.
//! The sequence per frame is fixed:
//!
//! 1. hide cursor, home
//! 2. every visible text row
//! 3. status bar (inverse video)
//! 4. message bar
//! 5. reposition the hardware cursor, show it
//!
//! The caller flushes the buffer with a single write afterwards.
//!
//! Escape output is kept minimal the same way the row scanner keeps its
//! tags: the active color changes only when a cell's highlight class
//! differs from the previous cell's, and resets to the default at the end
//! of each row. Control characters (which survive tab expansion
//! untouched) render as `@`-offset placeholders in reverse video, with
//! the previously active color restored transparently after.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use skiff_term::ansi::{self, Color};
use skiff_term::output::OutputBuffer;

use crate::buffer::Buffer;
use crate::view::{Cursor, Viewport};

/// Version string shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

/// How long a status message stays visible.
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// A transient message for the bottom line of the screen.
///
/// The message carries its own timestamp; [`current`](Self::current)
/// returns it only while fresh, so stale text disappears on the next
/// repaint without anyone having to clear it.
#[derive(Debug, Default)]
pub struct StatusMessage {
    slot: Option<(String, Instant)>,
}

impl StatusMessage {
    /// An empty message slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Set the message and restart its display clock.
    pub fn set(&mut self, text: impl Into<String>) {
        self.slot = Some((text.into(), Instant::now()));
    }

    /// Drop the message immediately.
    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// The message, while it is still fresh.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.slot
            .as_ref()
            .and_then(|(text, since)| (since.elapsed() < MESSAGE_TIMEOUT).then_some(text.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Frame composition
// ---------------------------------------------------------------------------

/// Compose one full frame into `out`.
///
/// Scrolls the viewport around the cursor first (the once-per-frame
/// clamp), then emits the whole frame. The caller owns the flush.
///
/// # Errors
///
/// Propagates writer errors; never fails when writing to an
/// [`OutputBuffer`].
pub fn refresh(
    out: &mut OutputBuffer,
    buf: &Buffer,
    cursor: Cursor,
    view: &mut Viewport,
    message: Option<&str>,
) -> io::Result<()> {
    let rx = view.scroll(cursor, buf);

    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;

    draw_rows(out, buf, view)?;
    draw_status_bar(out, buf, cursor, view)?;
    draw_message_bar(out, view, message)?;

    let x = u16::try_from(rx.saturating_sub(view.col_offset())).unwrap_or(u16::MAX);
    let y = u16::try_from(cursor.cy.saturating_sub(view.row_offset())).unwrap_or(u16::MAX);
    ansi::cursor_to(out, x, y)?;
    ansi::cursor_show(out)?;

    Ok(())
}

/// Draw every visible text row: buffer content where the window overlaps
/// the buffer, `~` markers past its end, and the welcome banner on one
/// specific blank row when the buffer is empty.
fn draw_rows(out: &mut OutputBuffer, buf: &Buffer, view: &Viewport) -> io::Result<()> {
    for y in 0..view.screen_rows() {
        let filerow = y + view.row_offset();

        if filerow >= buf.num_rows() {
            if buf.is_empty() && y == view.screen_rows() / 3 {
                draw_banner(out, view.screen_cols())?;
            } else {
                out.write_all(b"~")?;
            }
        } else {
            draw_text_row(out, buf, filerow, view)?;
        }

        ansi::clear_line(out)?;
        out.write_all(b"\r\n")?;
    }
    Ok(())
}

/// The centered version banner for empty buffers.
fn draw_banner(out: &mut OutputBuffer, cols: usize) -> io::Result<()> {
    let mut banner = format!("skiff editor -- version {VERSION}");
    banner.truncate(cols);

    let mut padding = (cols - banner.len()) / 2;
    if padding > 0 {
        out.write_all(b"~")?;
        padding -= 1;
    }
    for _ in 0..padding {
        out.write_all(b" ")?;
    }
    out.write_all(banner.as_bytes())
}

/// One buffer row: the visible rendered slice with minimal color changes.
fn draw_text_row(
    out: &mut OutputBuffer,
    buf: &Buffer,
    filerow: usize,
    view: &Viewport,
) -> io::Result<()> {
    let row = &buf.rows()[filerow];
    let cells = row
        .rendered()
        .chars()
        .zip(row.highlight().iter().copied())
        .skip(view.col_offset())
        .take(view.screen_cols());

    let mut current = Color::Default;
    for (ch, tag) in cells {
        if ch.is_control() {
            // Printable stand-in: Ctrl-A .. Ctrl-Z as @-offset letters,
            // anything else as '?', in reverse video. SGR 0 wipes the
            // color, so restore the active one afterwards.
            let code = u32::from(ch);
            let sym = if code < 27 {
                char::from_u32(u32::from('@') + code).unwrap_or('?')
            } else {
                '?'
            };
            ansi::inverse(out)?;
            write!(out, "{sym}")?;
            ansi::reset(out)?;
            if current != Color::Default {
                ansi::fg(out, current)?;
            }
        } else {
            let color = tag.color();
            if color != current {
                ansi::fg(out, color)?;
                current = color;
            }
            write!(out, "{ch}")?;
        }
    }

    if current != Color::Default {
        ansi::fg(out, Color::Default)?;
    }
    Ok(())
}

/// The inverse-video status line: filename, line count, dirty marker on
/// the left; syntax profile and cursor position on the right.
fn draw_status_bar(
    out: &mut OutputBuffer,
    buf: &Buffer,
    cursor: Cursor,
    view: &Viewport,
) -> io::Result<()> {
    ansi::inverse(out)?;

    let name = buf.file_name().unwrap_or("[No Name]");
    let modified = if buf.is_dirty() { " (modified)" } else { "" };
    let left = format!("{name:.20} - {} lines{modified}", buf.num_rows());
    let right = format!(
        "{} | {}/{}",
        buf.syntax_name().unwrap_or("no ft"),
        cursor.cy + 1,
        buf.num_rows()
    );

    let cols = view.screen_cols();
    let left: String = left.chars().take(cols).collect();
    let mut len = left.chars().count();
    out.write_all(left.as_bytes())?;

    let right_len = right.chars().count();
    while len < cols {
        if cols - len == right_len {
            out.write_all(right.as_bytes())?;
            break;
        }
        out.write_all(b" ")?;
        len += 1;
    }

    ansi::reset(out)?;
    out.write_all(b"\r\n")
}

/// The transient message line. The caller passes only still-fresh text.
fn draw_message_bar(
    out: &mut OutputBuffer,
    view: &Viewport,
    message: Option<&str>,
) -> io::Result<()> {
    ansi::clear_line(out)?;
    if let Some(msg) = message {
        let visible: String = msg.chars().take(view.screen_cols()).collect();
        out.write_all(visible.as_bytes())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn frame(buf: &Buffer, cursor: Cursor, view: &mut Viewport, msg: Option<&str>) -> String {
        let mut out = OutputBuffer::new();
        refresh(&mut out, buf, cursor, view, msg).unwrap();
        String::from_utf8_lossy(out.as_bytes()).into_owned()
    }

    fn c_buf(lines: &[&str]) -> Buffer {
        let mut b = Buffer::from_lines(lines.iter().copied());
        b.set_path("test.c".into());
        b
    }

    // -- Frame envelope -----------------------------------------------------

    #[test]
    fn frame_hides_cursor_first_and_shows_last() {
        let buf = Buffer::new();
        let mut view = Viewport::new(5, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.starts_with("\x1b[?25l\x1b[H"));
        assert!(f.ends_with("\x1b[?25h"));
    }

    #[test]
    fn frame_repositions_cursor_at_origin() {
        let buf = Buffer::new();
        let mut view = Viewport::new(5, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.ends_with("\x1b[1;1H\x1b[?25h"));
    }

    #[test]
    fn cursor_position_respects_offsets() {
        let lines: Vec<String> = (0..40).map(|i| format!("line {i}")).collect();
        let buf = Buffer::from_lines(lines);
        let mut view = Viewport::new(10, 40);
        let f = frame(&buf, Cursor { cx: 2, cy: 25 }, &mut view, None);
        // row_offset becomes 16, so the cursor paints at screen row 9.
        assert!(f.ends_with("\x1b[10;3H\x1b[?25h"));
    }

    // -- Empty buffer rows --------------------------------------------------

    #[test]
    fn empty_buffer_draws_tildes_and_banner() {
        let buf = Buffer::new();
        let mut view = Viewport::new(6, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.contains("skiff editor -- version"));
        // Banner row is screen_rows/3 = 2; the other five rows get tildes.
        assert_eq!(f.matches('~').count(), 6, "five tilde rows plus banner pad");
    }

    #[test]
    fn nonempty_buffer_has_no_banner() {
        let buf = Buffer::from_lines(["hello"]);
        let mut view = Viewport::new(6, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(!f.contains("skiff editor"));
        assert!(f.contains("hello"));
    }

    #[test]
    fn banner_truncates_on_narrow_window() {
        let buf = Buffer::new();
        let mut view = Viewport::new(6, 10);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.contains("skiff edit"));
        assert!(!f.contains("version"));
    }

    // -- Color minimization -------------------------------------------------

    #[test]
    fn plain_rows_emit_no_color_codes() {
        let buf = Buffer::from_lines(["just text"]);
        let mut view = Viewport::new(3, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(!f.contains("\x1b[39m"), "no reset without a prior color");
        assert!(!f.contains("\x1b[31m"));
    }

    #[test]
    fn color_emitted_once_per_run() {
        // "int" is one three-character Type run — one green escape.
        let buf = c_buf(&["int x;"]);
        let mut view = Viewport::new(3, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert_eq!(f.matches("\x1b[32m").count(), 1);
    }

    #[test]
    fn row_resets_to_default_after_trailing_color() {
        let buf = c_buf(&["return"]);
        let mut view = Viewport::new(3, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.contains("\x1b[33mreturn\x1b[39m"));
    }

    // -- Control characters -------------------------------------------------

    #[test]
    fn control_char_renders_reverse_video_placeholder() {
        let buf = Buffer::from_lines(["a\u{1}b"]);
        let mut view = Viewport::new(3, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.contains("a\x1b[7mA\x1b[mb"));
    }

    #[test]
    fn control_char_restores_active_color() {
        // Ctrl-B inside a string literal: the magenta must come back.
        let buf = c_buf(&["\"a\u{2}b\""]);
        let mut view = Viewport::new(3, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.contains("\x1b[7mB\x1b[m\x1b[35m"));
    }

    // -- Horizontal slicing -------------------------------------------------

    #[test]
    fn columns_before_offset_are_not_drawn() {
        let buf = Buffer::from_lines(["abcdefghij"]);
        let mut view = Viewport::new(3, 4);
        let f = frame(&buf, Cursor { cx: 8, cy: 0 }, &mut view, None);
        // col_offset = 8 - 4 + 1 = 5 → visible slice "fghi".
        assert!(f.contains("fghi"));
        assert!(!f.contains("abcde"));
    }

    // -- Status bar ---------------------------------------------------------

    #[test]
    fn status_shows_placeholder_name_and_no_ft() {
        let buf = Buffer::from_lines(["x"]);
        let mut view = Viewport::new(3, 60);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.contains("[No Name] - 1 lines"));
        assert!(f.contains("no ft | 1/1"));
    }

    #[test]
    fn status_shows_filename_syntax_and_dirty() {
        let mut buf = c_buf(&["int x;"]);
        buf.insert_char(0, 0, ' ');
        let mut view = Viewport::new(3, 60);
        let f = frame(&buf, Cursor { cx: 0, cy: 0 }, &mut view, None);
        assert!(f.contains("test.c - 1 lines (modified)"));
        assert!(f.contains("c | 1/1"));
    }

    #[test]
    fn status_bar_is_inverse_video() {
        let buf = Buffer::new();
        let mut view = Viewport::new(3, 40);
        let f = frame(&buf, Cursor::new(), &mut view, None);
        assert!(f.contains("\x1b[7m"));
        assert!(f.contains("\x1b[m"));
    }

    // -- Message bar --------------------------------------------------------

    #[test]
    fn message_is_drawn_when_present() {
        let buf = Buffer::new();
        let mut view = Viewport::new(3, 40);
        let f = frame(&buf, Cursor::new(), &mut view, Some("HELP: Ctrl-Q = quit"));
        assert!(f.contains("HELP: Ctrl-Q = quit"));
    }

    #[test]
    fn message_truncates_to_width() {
        let buf = Buffer::new();
        let mut view = Viewport::new(3, 10);
        let f = frame(&buf, Cursor::new(), &mut view, Some("0123456789abcdef"));
        assert!(f.contains("0123456789"));
        assert!(!f.contains("abcdef"));
    }

    // -- StatusMessage ------------------------------------------------------

    #[test]
    fn status_message_fresh_then_cleared() {
        let mut msg = StatusMessage::new();
        assert!(msg.current().is_none());

        msg.set("saved");
        assert_eq!(msg.current(), Some("saved"));

        msg.clear();
        assert!(msg.current().is_none());
    }

    #[test]
    fn status_message_replacement_restarts() {
        let mut msg = StatusMessage::new();
        msg.set("one");
        msg.set("two");
        assert_eq!(msg.current(), Some("two"));
    }
}
