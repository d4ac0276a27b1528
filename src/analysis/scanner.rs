//! Qualified-reference scanner.
//!
//! Finds `module.function` tokens in a single line of text. Identifiers
//! start with an ASCII letter, `_` or a Cyrillic letter (U+0400..=U+04FF)
//! and continue with ASCII word characters or Cyrillic letters.
//!
//! Offsets are character offsets into the line, in and out.
//!
//! Three entry points with deliberately different matching windows:
//! - [`find_module_and_prefix`]: completion; the match must end exactly at
//!   the cursor and the part after the dot may be empty.
//! - [`find_qualified_at`]: hover and definition; the cursor may be anywhere
//!   inside the token.
//! - [`find_all_references`]: diagnostics; every token on the line. The
//!   module identifier here is ASCII-only, so `игрок.сообщение` is never
//!   reported even though it resolves for hover and completion.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `module.` or `module.partial`
static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_\x{0400}-\x{04FF}][0-9A-Za-z_\x{0400}-\x{04FF}]*)\.([0-9A-Za-z_\x{0400}-\x{04FF}]*)")
        .unwrap()
});

/// `module.function`, both parts non-empty
static QUALIFIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_\x{0400}-\x{04FF}][0-9A-Za-z_\x{0400}-\x{04FF}]*)\.([0-9A-Za-z_\x{0400}-\x{04FF}]+)")
        .unwrap()
});

/// `module.function` with an ASCII-only module
static DIAGNOSTIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_][0-9A-Za-z_]*)\.([0-9A-Za-z_\x{0400}-\x{04FF}]+)").unwrap()
});

/// A `module.function` (or `module.prefix`) token found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedReference {
    pub module: String,
    /// Function name, or the typed prefix in completion mode
    pub name: String,
    /// Character offset of the first character
    pub start: usize,
    /// Character offset one past the last character
    pub end: usize,
    /// The whole matched token
    pub text: String,
}

impl QualifiedReference {
    fn from_captures(line: &str, caps: &Captures<'_>) -> Option<Self> {
        let whole = caps.get(0)?;
        let start = char_offset(line, whole.start());
        Some(Self {
            module: caps[1].to_string(),
            name: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            start,
            end: start + whole.as_str().chars().count(),
            text: whole.as_str().to_string(),
        })
    }

    /// Character range of the token.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// True if `position` lies inside the token, ends included.
    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Completion scan: the last `module.` / `module.prefix` left of `cursor`,
/// only if it ends exactly at the cursor.
pub fn find_module_and_prefix(line: &str, cursor: usize) -> Option<QualifiedReference> {
    let left = &line[..byte_offset(line, cursor)];
    let caps = PREFIX_RE.captures_iter(left).last()?;
    if caps.get(0)?.end() != left.len() {
        return None;
    }
    QualifiedReference::from_captures(left, &caps)
}

/// Hover/definition scan: the first token on the line containing `position`.
pub fn find_qualified_at(line: &str, position: usize) -> Option<QualifiedReference> {
    QUALIFIED_RE
        .captures_iter(line)
        .filter_map(|caps| QualifiedReference::from_captures(line, &caps))
        .find(|r| r.contains(position))
}

/// Diagnostics scan: every token on the line.
pub fn find_all_references(line: &str) -> Vec<QualifiedReference> {
    DIAGNOSTIC_RE
        .captures_iter(line)
        .filter_map(|caps| QualifiedReference::from_captures(line, &caps))
        .collect()
}

/// Byte index of the `chars`-th character, clamped to the line end.
fn byte_offset(line: &str, chars: usize) -> usize {
    line.char_indices()
        .nth(chars)
        .map_or(line.len(), |(idx, _)| idx)
}

fn char_offset(line: &str, byte: usize) -> usize {
    line[..byte].chars().count()
}
