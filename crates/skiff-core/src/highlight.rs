//! The highlight engine — a per-row lexical classifier.
//!
//! Re-tags a row's rendered characters with color classes in a single
//! left-to-right scan. The scanner carries three pieces of local state:
//! whether it is inside a string (and which quote opened it), whether it
//! is inside a block comment (seeded from the *previous* row's trailing
//! state), and whether the previous character was a separator (keyword
//! and number starts are only legal at separator boundaries).
//!
//! The scan itself is row-local; the cross-row cascade — re-running the
//! scanner on following rows while the carried block-comment flag keeps
//! changing — lives in [`Buffer`](crate::buffer::Buffer), which owns the
//! rows.
//!
//! Rows without a syntax profile get every character tagged [`Normal`]
//! (and never carry comment state), so the compositor can treat the tag
//! array as always present.
//!
//! [`Normal`]: Highlight::Normal

use skiff_term::ansi::Color;

use crate::row::Row;
use crate::syntax::Syntax;

// ---------------------------------------------------------------------------
// Highlight tags
// ---------------------------------------------------------------------------

/// Color class of one rendered character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    /// Plain text — the terminal's default foreground.
    #[default]
    Normal,
    /// A comment running to the end of the row.
    LineComment,
    /// Inside a block comment (possibly spanning rows).
    BlockComment,
    /// A primary keyword (`if`, `return`, …).
    Keyword,
    /// A type-name keyword (`int`, `u32`, …).
    Type,
    /// Inside a string literal, quotes and escapes included.
    String,
    /// A numeric literal.
    Number,
    /// A transient search-match overlay (applied by the search session,
    /// never produced by the scanner).
    Match,
}

impl Highlight {
    /// The terminal color this class renders with.
    ///
    /// Classes map onto the user's 16-color palette rather than fixed RGB,
    /// so the editor inherits the terminal theme.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Normal => Color::Default,
            Self::LineComment | Self::BlockComment => Color::Ansi(6), // cyan
            Self::Keyword => Color::Ansi(3),                          // yellow
            Self::Type => Color::Ansi(2),                             // green
            Self::String => Color::Ansi(5),                           // magenta
            Self::Number => Color::Ansi(1),                           // red
            Self::Match => Color::Ansi(4),                            // blue
        }
    }
}

// ---------------------------------------------------------------------------
// The scanner
// ---------------------------------------------------------------------------

/// Characters that terminate a token. Keyword and number starts are only
/// recognized after one of these (or at the start of the row); keywords
/// also require one after their last character.
fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '\0' || ",.()+-/*=~%<>[];".contains(ch)
}

/// Does `token` appear in `chars` starting at `at`?
fn matches_at(chars: &[char], at: usize, token: &str) -> bool {
    let mut i = at;
    for tc in token.chars() {
        if chars.get(i) != Some(&tc) {
            return false;
        }
        i += 1;
    }
    !token.is_empty()
}

/// Re-tag one row.
///
/// `starts_in_comment` is the previous row's trailing block-comment state
/// (false for the first row). Returns whether this row's *own* trailing
/// state changed — the caller keeps cascading down while that keeps
/// happening.
pub(crate) fn update_row(
    row: &mut Row,
    syntax: Option<&Syntax>,
    starts_in_comment: bool,
) -> bool {
    let chars: Vec<char> = row.rendered.chars().collect();
    let mut hl = vec![Highlight::Normal; chars.len()];

    let Some(syntax) = syntax else {
        // No profile: everything normal, no comment carry.
        row.hl = hl;
        let changed = row.open_comment;
        row.open_comment = false;
        return changed;
    };

    let line_comment = syntax.line_comment();
    let block_comment = syntax.block_comment();

    let mut prev_sep = true;
    let mut in_string: Option<char> = None;
    let mut in_comment = starts_in_comment;

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        // Line comment: tags the remainder of the row and ends the scan.
        if in_string.is_none() && !in_comment {
            if let Some(token) = line_comment {
                if matches_at(&chars, i, token) {
                    for slot in &mut hl[i..] {
                        *slot = Highlight::LineComment;
                    }
                    break;
                }
            }
        }

        // Block comments. Strings win over comment openers ("/*" inside a
        // string literal is text), hence the in_string guard.
        if let Some((open, close)) = block_comment {
            if in_string.is_none() {
                if in_comment {
                    if matches_at(&chars, i, close) {
                        let len = close.chars().count();
                        for slot in &mut hl[i..i + len] {
                            *slot = Highlight::BlockComment;
                        }
                        i += len;
                        in_comment = false;
                        prev_sep = true;
                        continue;
                    }
                    hl[i] = Highlight::BlockComment;
                    i += 1;
                    continue;
                } else if matches_at(&chars, i, open) {
                    let len = open.chars().count();
                    for slot in &mut hl[i..i + len] {
                        *slot = Highlight::BlockComment;
                    }
                    i += len;
                    in_comment = true;
                    continue;
                }
            }
        }

        // Strings, with one-character backslash escapes.
        if syntax.highlights_strings() {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                if ch == '\\' && i + 1 < chars.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if ch == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if ch == '"' || ch == '\'' {
                in_string = Some(ch);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        // Numbers: a digit at a separator boundary or continuing a number,
        // or a decimal point continuing a number.
        if syntax.highlights_numbers()
            && ((ch.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (ch == '.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        // Keywords: only at a separator boundary, and only when followed by
        // a separator (end of row counts).
        if prev_sep {
            let mut matched = false;
            for &entry in syntax.keywords() {
                let (word, class) = match entry.strip_suffix('|') {
                    Some(word) => (word, Highlight::Type),
                    None => (entry, Highlight::Keyword),
                };
                let len = word.chars().count();
                if matches_at(&chars, i, word)
                    && chars.get(i + len).is_none_or(|&next| is_separator(next))
                {
                    for slot in &mut hl[i..i + len] {
                        *slot = class;
                    }
                    i += len;
                    matched = true;
                    break;
                }
            }
            if matched {
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(ch);
        i += 1;
    }

    row.hl = hl;
    let changed = row.open_comment != in_comment;
    row.open_comment = in_comment;
    changed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::syntax;

    fn c_syntax() -> &'static Syntax {
        syntax::select("test.c").expect("C profile must exist")
    }

    /// Build a row and run one highlight pass over it.
    fn highlighted(text: &str) -> Row {
        let mut row = Row::new(0, text);
        update_row(&mut row, Some(c_syntax()), false);
        row
    }

    fn tags(row: &Row) -> Vec<Highlight> {
        row.highlight().to_vec()
    }

    // -- Basic classes ------------------------------------------------------

    #[test]
    fn plain_text_is_normal() {
        let row = highlighted("plain words");
        assert!(tags(&row).iter().all(|&t| t == Highlight::Normal));
    }

    #[test]
    fn no_syntax_means_all_normal() {
        let mut row = Row::new(0, "if (x) return 1;");
        update_row(&mut row, None, false);
        assert!(tags(&row).iter().all(|&t| t == Highlight::Normal));
    }

    #[test]
    fn numbers_at_separator_boundary() {
        let row = highlighted("x = 42;");
        let t = tags(&row);
        assert_eq!(t[4], Highlight::Number);
        assert_eq!(t[5], Highlight::Number);
        assert_eq!(t[0], Highlight::Normal);
    }

    #[test]
    fn digit_inside_identifier_not_number() {
        let row = highlighted("var1 = 2;");
        let t = tags(&row);
        assert_eq!(t[3], Highlight::Normal, "the 1 in var1 is part of a word");
        assert_eq!(t[7], Highlight::Number);
    }

    #[test]
    fn decimal_point_continues_number() {
        let row = highlighted("pi = 3.14;");
        let t = tags(&row);
        for i in 5..9 {
            assert_eq!(t[i], Highlight::Number, "offset {i} of 3.14");
        }
    }

    #[test]
    fn string_literal_with_quotes() {
        let row = highlighted("s = \"hi\";");
        let t = tags(&row);
        for i in 4..8 {
            assert_eq!(t[i], Highlight::String, "offset {i}");
        }
        assert_eq!(t[8], Highlight::Normal);
    }

    #[test]
    fn escaped_quote_stays_in_string() {
        let row = highlighted(r#"s = "a\"b";"#);
        let t = tags(&row);
        // Everything from the opening quote through the closing quote.
        for i in 4..10 {
            assert_eq!(t[i], Highlight::String, "offset {i}");
        }
        assert_eq!(t[10], Highlight::Normal);
    }

    #[test]
    fn single_quotes_open_strings_too() {
        let row = highlighted("c = 'x';");
        let t = tags(&row);
        for i in 4..7 {
            assert_eq!(t[i], Highlight::String, "offset {i}");
        }
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        let row = highlighted("s = \"oops");
        let t = tags(&row);
        for i in 4..9 {
            assert_eq!(t[i], Highlight::String, "offset {i}");
        }
    }

    // -- Keywords -----------------------------------------------------------

    #[test]
    fn keyword_with_trailing_separator() {
        let row = highlighted("if (x)");
        let t = tags(&row);
        assert_eq!(t[0], Highlight::Keyword);
        assert_eq!(t[1], Highlight::Keyword);
        assert_eq!(t[2], Highlight::Normal);
    }

    #[test]
    fn keyword_without_boundary_not_tagged() {
        let row = highlighted("ifx = 1");
        let t = tags(&row);
        assert_eq!(t[0], Highlight::Normal);
        assert_eq!(t[1], Highlight::Normal);
    }

    #[test]
    fn keyword_at_end_of_row() {
        let row = highlighted("return");
        assert!(tags(&row).iter().all(|&t| t == Highlight::Keyword));
    }

    #[test]
    fn type_keyword_class() {
        let row = highlighted("int x;");
        let t = tags(&row);
        assert_eq!(t[0], Highlight::Type);
        assert_eq!(t[2], Highlight::Type);
        assert_eq!(t[4], Highlight::Normal);
    }

    #[test]
    fn keyword_mid_row_after_separator() {
        let row = highlighted("x = if;");
        let t = tags(&row);
        assert_eq!(t[4], Highlight::Keyword);
        assert_eq!(t[5], Highlight::Keyword);
    }

    // -- Comments -----------------------------------------------------------

    #[test]
    fn line_comment_to_end_of_row() {
        let row = highlighted("x; // rest is comment");
        let t = tags(&row);
        assert_eq!(t[0], Highlight::Normal);
        for i in 3..t.len() {
            assert_eq!(t[i], Highlight::LineComment, "offset {i}");
        }
    }

    #[test]
    fn line_comment_token_inside_string_is_text() {
        let row = highlighted("s = \"//not a comment\";");
        let t = tags(&row);
        assert_eq!(t[5], Highlight::String);
        assert_eq!(t[6], Highlight::String);
    }

    #[test]
    fn block_comment_within_one_row() {
        let row = highlighted("a /* b */ c");
        let t = tags(&row);
        assert_eq!(t[0], Highlight::Normal);
        for i in 2..9 {
            assert_eq!(t[i], Highlight::BlockComment, "offset {i}");
        }
        assert_eq!(t[10], Highlight::Normal);
        assert!(!row.continues_block_comment());
    }

    #[test]
    fn unclosed_block_comment_sets_carry() {
        let row = highlighted("a /* open");
        assert!(row.continues_block_comment());
        let t = tags(&row);
        for i in 2..t.len() {
            assert_eq!(t[i], Highlight::BlockComment, "offset {i}");
        }
    }

    #[test]
    fn carried_comment_tags_from_row_start() {
        let mut row = Row::new(1, "still inside */ out");
        update_row(&mut row, Some(c_syntax()), true);
        let t = tags(&row);
        for i in 0..15 {
            assert_eq!(t[i], Highlight::BlockComment, "offset {i}");
        }
        for i in 15..t.len() {
            assert_eq!(t[i], Highlight::Normal, "offset {i}");
        }
        assert!(!row.continues_block_comment());
    }

    #[test]
    fn carried_comment_with_no_close_keeps_carry() {
        let mut row = Row::new(1, "no close here");
        let changed = update_row(&mut row, Some(c_syntax()), true);
        assert!(changed, "carry flipped false → true");
        assert!(row.continues_block_comment());
        assert!(tags(&row).iter().all(|&t| t == Highlight::BlockComment));
    }

    #[test]
    fn update_reports_carry_transitions() {
        let mut row = Row::new(0, "/*");
        assert!(update_row(&mut row, Some(c_syntax()), false));
        // Unchanged input → unchanged trailing state.
        assert!(!update_row(&mut row, Some(c_syntax()), false));
    }

    // -- Idempotence --------------------------------------------------------

    #[test]
    fn rescan_of_unchanged_row_is_identical() {
        let mut row = Row::new(0, "int x = 42; /* c */ \"s\" // t");
        update_row(&mut row, Some(c_syntax()), false);
        let first = tags(&row);
        update_row(&mut row, Some(c_syntax()), false);
        assert_eq!(first, tags(&row));
    }

    // -- Colors -------------------------------------------------------------

    #[test]
    fn every_class_has_a_stable_color() {
        assert_eq!(Highlight::Normal.color(), Color::Default);
        assert_eq!(Highlight::Number.color(), Color::Ansi(1));
        assert_eq!(Highlight::Match.color(), Color::Ansi(4));
        assert_eq!(
            Highlight::LineComment.color(),
            Highlight::BlockComment.color()
        );
    }

    // -- Separators ---------------------------------------------------------

    #[test]
    fn separator_set() {
        for ch in [' ', '\0', ',', '.', '(', ')', '+', '-', '/', '*', '=', '~',
                   '%', '<', '>', '[', ']', ';'] {
            assert!(is_separator(ch), "{ch:?} must separate");
        }
        for ch in ['a', '_', '0', '"'] {
            assert!(!is_separator(ch), "{ch:?} must not separate");
        }
    }
}
