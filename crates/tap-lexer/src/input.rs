//! Character cursor over the raw input.

use crate::Position;

/// A cursor over the input text that tracks offset, line and column.
///
/// Never fails: reading past the end yields `None` and leaves the
/// position untouched.
#[derive(Debug, Clone)]
pub struct InputStream<'src> {
    /// The text being read.
    source: &'src str,
    /// The unread suffix of `source`.
    remaining: &'src str,
    /// Byte offset of `remaining` in `source`.
    byte_pos: usize,
    position: Position,
    /// The last character returned by `next`.
    previous: Option<char>,
}

impl<'src> InputStream<'src> {
    /// Create a stream positioned at the start of a document.
    pub fn new(source: &'src str) -> Self {
        Self::with_origin(source, Position::START)
    }

    /// Create a stream whose first character sits at `origin`.
    ///
    /// Used to lex a later slice of a document with locations that
    /// continue from an earlier slice.
    pub fn with_origin(source: &'src str, origin: Position) -> Self {
        Self {
            source,
            remaining: source,
            byte_pos: 0,
            position: origin,
            previous: None,
        }
    }

    /// The current position.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// The current byte offset into the text given to the stream.
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.byte_pos
    }

    /// Whether every character has been consumed.
    #[inline]
    pub fn eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Character `offset` places ahead of the cursor, without consuming.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.remaining.chars().nth(offset)
    }

    /// The most recently consumed character.
    #[inline]
    pub fn previous(&self) -> Option<char> {
        self.previous
    }

    /// Text consumed since the byte offset `start`.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.byte_pos]
    }
}

impl Iterator for InputStream<'_> {
    type Item = char;

    /// Consume and return the current character.
    fn next(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.byte_pos += c.len_utf8();
        self.remaining = &self.remaining[c.len_utf8()..];
        self.position.offset += 1;
        self.position.column += 1;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        }
        self.previous = Some(c);
        Some(c)
    }
}
