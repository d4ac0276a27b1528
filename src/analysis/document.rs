//! Document state tracking.
//!
//! Scanners work in character offsets (Unicode scalar values). LSP columns
//! are in the negotiated [`PositionEncoding`], UTF-16 code units unless the
//! client offers UTF-32, and are converted here at the boundary.

use tower_lsp::lsp_types::{
    ClientCapabilities, Position, PositionEncodingKind, Range, TextDocumentContentChangeEvent,
};

/// Unit of `Position::character` agreed with the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionEncoding {
    /// LSP default
    #[default]
    Utf16,
    /// One column per Unicode scalar value
    Utf32,
}

impl PositionEncoding {
    /// Prefer UTF-32 when the client offers it, else fall back to UTF-16.
    pub fn negotiate(capabilities: &ClientCapabilities) -> Self {
        let offered = capabilities
            .general
            .as_ref()
            .and_then(|g| g.position_encodings.as_ref());
        match offered {
            Some(kinds) if kinds.contains(&PositionEncodingKind::UTF32) => PositionEncoding::Utf32,
            _ => PositionEncoding::Utf16,
        }
    }

    pub fn kind(self) -> PositionEncodingKind {
        match self {
            PositionEncoding::Utf16 => PositionEncodingKind::UTF16,
            PositionEncoding::Utf32 => PositionEncodingKind::UTF32,
        }
    }

    /// LSP column of the `chars`-th character of `line`.
    pub fn column(self, line: &str, chars: usize) -> u32 {
        match self {
            PositionEncoding::Utf32 => chars as u32,
            PositionEncoding::Utf16 => line
                .chars()
                .take(chars)
                .map(|c| c.len_utf16() as u32)
                .sum(),
        }
    }

    /// Character index for an LSP column, clamped to the line end.
    ///
    /// A UTF-16 column inside a surrogate pair lands after that character.
    pub fn char_index(self, line: &str, column: u32) -> usize {
        match self {
            PositionEncoding::Utf32 => (column as usize).min(line.chars().count()),
            PositionEncoding::Utf16 => {
                let mut units = 0u32;
                let mut index = 0;
                for c in line.chars() {
                    if units >= column {
                        break;
                    }
                    units += c.len_utf16() as u32;
                    index += 1;
                }
                index
            }
        }
    }

    /// LSP range on `line_num` for the character span `start..end` of `line`.
    pub fn range(self, line_num: u32, line: &str, start: usize, end: usize) -> Range {
        line_range(line_num, self.column(line, start) as usize, self.column(line, end) as usize)
    }
}

/// State of an open document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Full document text
    pub text: String,
    /// Client version of the text, if known
    pub version: Option<i32>,
    pub encoding: PositionEncoding,
}

impl DocumentState {
    /// Create a new document state.
    pub fn new(text: String) -> Self {
        Self {
            text,
            version: None,
            encoding: PositionEncoding::default(),
        }
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_encoding(mut self, encoding: PositionEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Get the line at a position.
    pub fn get_line(&self, line: u32) -> Option<&str> {
        self.text.lines().nth(line as usize)
    }

    /// Iterate over all lines with their numbers.
    pub fn lines(&self) -> impl Iterator<Item = (u32, &str)> {
        self.text.lines().enumerate().map(|(n, l)| (n as u32, l))
    }

    /// The line under `position` and the cursor as a character index into it.
    pub fn cursor(&self, position: Position) -> Option<(&str, usize)> {
        let line = self.get_line(position.line)?;
        Some((line, self.encoding.char_index(line, position.character)))
    }

    /// LSP range for a character span on one line.
    pub fn range_on_line(&self, line_num: u32, start: usize, end: usize) -> Range {
        let line = self.get_line(line_num).unwrap_or("");
        self.encoding.range(line_num, line, start, end)
    }

    /// Apply incremental (or full) content changes in order.
    pub fn apply_changes(&mut self, changes: Vec<TextDocumentContentChangeEvent>) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = self.offset_from_position(range.start);
                    let end = self.offset_from_position(range.end);
                    let end = end.max(start);
                    self.text.replace_range(start..end, &change.text);
                }
                None => self.text = change.text,
            }
        }
    }

    /// Convert position to byte offset, clamped to the document end.
    pub fn offset_from_position(&self, position: Position) -> usize {
        let mut offset = 0;
        for (line_num, line) in self.text.split_inclusive('\n').enumerate() {
            if line_num == position.line as usize {
                let content = line.trim_end_matches(['\n', '\r']);
                let chars = self.encoding.char_index(content, position.character);
                let char_offset: usize = content.chars().take(chars).map(|c| c.len_utf8()).sum();
                return offset + char_offset;
            }
            offset += line.len();
        }
        self.text.len()
    }
}

/// Build an LSP range on one line from already-encoded columns.
pub fn line_range(line: u32, start: usize, end: usize) -> Range {
    Range {
        start: Position {
            line,
            character: start as u32,
        },
        end: Position {
            line,
            character: end as u32,
        },
    }
}
