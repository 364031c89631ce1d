//! Token types for the TAP lexer.

use std::fmt;

use crate::Location;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    // Special tokens
    /// End of input, always alone in the last chunk.
    Eof,
    /// Zero-width end of a final line that has no newline character.
    Eol,
    /// `\n` or `\r`
    Newline,

    // Generic tokens
    /// A run of ASCII digits.
    Numeric,
    /// A run of literal characters, or a demoted special character.
    Literal,
    /// Reserved; keywords are emitted with their TAP kind.
    Keyword,
    /// A single space or tab.
    Whitespace,
    /// `#` opening a comment line.
    Comment,
    /// `-`
    Dash,
    /// `+`
    Plus,
    /// `#` introducing a plan reason or a test point directive.
    Hash,
    /// `\` escaping the next special character.
    Escape,
    /// Reserved for consumers that need an "unclassified" marker.
    Unknown,

    // TAP keywords
    /// `TAP` at the start of a line.
    Tap,
    /// `version` after `TAP`.
    TapVersion,
    /// `..` after a number.
    TapPlan,
    /// Reserved; test points are realized as `TapTestOk`/`TapTestNotOk`.
    TapTestPoint,
    /// `ok` at the start of a line or after `not`.
    TapTestOk,
    /// `not` at the start of a line.
    TapTestNotOk,
    /// `---`
    TapYamlStart,
    /// `...`
    TapYamlEnd,
    /// `pragma` at the start of a line.
    TapPragma,
    /// Reserved; subtests are recognized by the parser from comment lines.
    TapSubtestPoint,
}

impl TokenKind {
    /// Human-readable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Eol => "EOL",
            TokenKind::Newline => "NewLine",
            TokenKind::Numeric => "Numeric",
            TokenKind::Literal => "Literal",
            TokenKind::Keyword => "Keyword",
            TokenKind::Whitespace => "Whitespace",
            TokenKind::Comment => "Comment",
            TokenKind::Dash => "Dash",
            TokenKind::Plus => "Plus",
            TokenKind::Hash => "Hash",
            TokenKind::Escape => "Escape",
            TokenKind::Unknown => "Unknown",
            TokenKind::Tap => "TAPKeyword",
            TokenKind::TapVersion => "VersionKeyword",
            TokenKind::TapPlan => "PlanKeyword",
            TokenKind::TapTestPoint => "TestPointKeyword",
            TokenKind::TapTestOk => "TestOkKeyword",
            TokenKind::TapTestNotOk => "TestNotOkKeyword",
            TokenKind::TapYamlStart => "YamlStartKeyword",
            TokenKind::TapYamlEnd => "YamlEndKeyword",
            TokenKind::TapPragma => "PragmaKeyword",
            TokenKind::TapSubtestPoint => "SubTestPointKeyword",
        }
    }

    /// Whether this token ends a line (`Newline`, `Eol` or `Eof`).
    pub fn is_line_end(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Eol | TokenKind::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with its kind, source text and location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The source text of this token (empty for `Eol` and `Eof`).
    pub value: &'src str,
    /// Where the token sits in the source.
    pub location: Location,
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(kind: TokenKind, value: &'src str, location: Location) -> Self {
        Self {
            kind,
            value,
            location,
        }
    }
}

/// The tokens of one physical line, including its `Newline` or `Eol`.
pub type Chunk<'src> = Vec<Token<'src>>;
