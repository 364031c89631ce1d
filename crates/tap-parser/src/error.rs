//! Parse errors.

use tap_lexer::{LexError, Location, Token, TokenKind};

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A YAML block was interrupted before its `...` line.
    UnclosedYamlBlock,
    /// A production saw a token it cannot continue with.
    UnexpectedToken {
        /// What the production wanted.
        expected: &'static str,
    },
}

/// A parse error, naming the token that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Kind of the offending token.
    pub received: TokenKind,
    /// Text of the offending token.
    pub value: String,
    pub location: Location,
}

impl ParseError {
    /// Error classification shared with other TAP tooling.
    pub const CODE: &'static str = "ERR_TAP_PARSER_ERROR";

    /// Create a new parse error.
    pub fn new(
        kind: ParseErrorKind,
        received: TokenKind,
        value: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            kind,
            received,
            value: value.into(),
            location,
        }
    }

    pub(crate) fn at(kind: ParseErrorKind, token: &Token<'_>) -> Self {
        Self::new(kind, token.kind, token.value, token.location)
    }

    pub(crate) fn unexpected(expected: &'static str, token: &Token<'_>) -> Self {
        Self::at(ParseErrorKind::UnexpectedToken { expected }, token)
    }

    /// The error classification.
    pub fn code(&self) -> &'static str {
        Self::CODE
    }

    fn expected(&self) -> &'static str {
        match &self.kind {
            ParseErrorKind::UnclosedYamlBlock => "end of YAML block",
            ParseErrorKind::UnexpectedToken { expected } => expected,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expected {}, received \"{}\" ({}) at line {}, column {} (start {}, end {})",
            self.expected(),
            self.value,
            self.received,
            self.location.line,
            self.location.column,
            self.location.start,
            self.location.end
        )
    }
}

impl std::error::Error for ParseError {}

/// Any error raised while turning text into nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
}

impl Error {
    /// The error classification.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Lex(err) => err.code(),
            Error::Parse(err) => err.code(),
        }
    }

    /// Where the error was found.
    pub fn location(&self) -> Location {
        match self {
            Error::Lex(err) => err.location,
            Error::Parse(err) => err.location,
        }
    }
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Lex(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Lex(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(err) => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}
