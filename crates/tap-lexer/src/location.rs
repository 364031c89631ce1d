//! Source positions and token locations.

/// A cursor position inside the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Character offset from the start of the document.
    pub offset: u32,
    /// 1-based line number.
    pub line: u32,
    /// Characters consumed on the current line (0 at the start of a line).
    pub column: u32,
}

impl Position {
    /// The position of the first character of a document.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 0,
    };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

/// Where a token sits in the source text.
///
/// `start` and `end` are character offsets and `end` is inclusive: a
/// one-character token has `start == end`, and so does a zero-width
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// 1-based line the token starts on.
    pub line: u32,
    /// 1-based column of the token's first character.
    pub column: u32,
    /// Offset of the first character.
    pub start: u32,
    /// Offset of the last character.
    pub end: u32,
}

impl Location {
    /// Location of a token that starts at `start` and spans `len` characters.
    #[inline]
    pub fn new(start: Position, len: u32) -> Self {
        Self {
            line: start.line,
            column: start.column + 1,
            start: start.offset,
            end: start.offset + len.saturating_sub(1),
        }
    }
}
