//! Lexer errors.

use crate::Location;

/// A character the lexer has no class for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// The offending character.
    pub character: char,
    /// Where it was found.
    pub location: Location,
}

impl LexError {
    /// Error classification shared with other TAP tooling.
    pub const CODE: &'static str = "ERR_TAP_LEXER_ERROR";

    /// Create a new lex error.
    pub fn new(character: char, location: Location) -> Self {
        Self {
            character,
            location,
        }
    }

    /// The error classification.
    pub fn code(&self) -> &'static str {
        Self::CODE
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unexpected character: {:?} at line {}, column {}",
            self.character, self.location.line, self.location.column
        )
    }
}

impl std::error::Error for LexError {}
