//! Syntax profiles — per-language highlight configuration.
//!
//! A [`Syntax`] describes what the highlight engine should recognize for
//! one language: keyword lists, comment tokens, and feature flags. Profiles
//! live in the static [`SYNTAXES`] registry and are selected once per file
//! by matching the filename against each profile's patterns. No profile
//! match means no highlighting — every character stays normal.
//!
//! Keywords come in two classes in a single list: plain entries are primary
//! keywords, entries carrying a trailing `|` are type names. The marker is
//! stripped at match time.

use bitflags::bitflags;

bitflags! {
    /// Which optional token classes a profile highlights.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HighlightFlags: u8 {
        /// Highlight numeric literals.
        const NUMBERS = 0b0000_0001;
        /// Highlight string literals (`"…"` and `'…'`).
        const STRINGS = 0b0000_0010;
    }
}

// ---------------------------------------------------------------------------
// Syntax
// ---------------------------------------------------------------------------

/// Highlight configuration for one language.
#[derive(Debug)]
pub struct Syntax {
    /// Display name for the status bar (e.g. `"c"`, `"rust"`).
    name: &'static str,
    /// Filename patterns. A pattern starting with `.` matches as a file
    /// extension; anything else matches as a substring of the filename.
    patterns: &'static [&'static str],
    /// Keywords. A trailing `|` marks a type-name keyword.
    keywords: &'static [&'static str],
    /// Token that starts a comment running to end of line.
    line_comment: Option<&'static str>,
    /// Open/close token pair for block comments.
    block_comment: Option<(&'static str, &'static str)>,
    /// Enabled optional token classes.
    flags: HighlightFlags,
}

impl Syntax {
    /// Display name for the status bar.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The keyword list, trailing-`|` type markers included.
    #[inline]
    #[must_use]
    pub const fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }

    /// The line-comment token, if the language has one.
    #[inline]
    #[must_use]
    pub const fn line_comment(&self) -> Option<&'static str> {
        self.line_comment
    }

    /// The block-comment open/close pair, if the language has one.
    #[inline]
    #[must_use]
    pub const fn block_comment(&self) -> Option<(&'static str, &'static str)> {
        self.block_comment
    }

    /// Whether numeric literals are highlighted.
    #[inline]
    #[must_use]
    pub const fn highlights_numbers(&self) -> bool {
        self.flags.contains(HighlightFlags::NUMBERS)
    }

    /// Whether string literals are highlighted.
    #[inline]
    #[must_use]
    pub const fn highlights_strings(&self) -> bool {
        self.flags.contains(HighlightFlags::STRINGS)
    }

    /// Whether this profile applies to the given filename.
    fn matches(&self, filename: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            if pattern.starts_with('.') {
                filename.ends_with(pattern)
            } else {
                filename.contains(pattern)
            }
        })
    }
}

/// Select the profile for a filename, or `None` for no highlighting.
#[must_use]
pub fn select(filename: &str) -> Option<&'static Syntax> {
    SYNTAXES.iter().find(|syntax| syntax.matches(filename))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The built-in profile table. First match wins.
pub static SYNTAXES: &[Syntax] = &[
    Syntax {
        name: "c",
        patterns: &[".c", ".h", ".cpp"],
        keywords: &[
            "switch", "if", "while", "for", "break", "continue", "return", "else",
            "struct", "union", "typedef", "static", "enum", "class", "case",
            "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|",
            "void|",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Syntax {
        name: "rust",
        patterns: &[".rs"],
        keywords: &[
            "as", "break", "const", "continue", "crate", "else", "enum", "extern",
            "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
            "mut", "pub", "ref", "return", "self", "static", "struct", "trait",
            "type", "unsafe", "use", "where", "while",
            "bool|", "char|", "str|", "i8|", "i16|", "i32|", "i64|", "u8|", "u16|",
            "u32|", "u64|", "f32|", "f64|", "usize|", "isize|", "String|", "Vec|",
            "Option|", "Result|",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
