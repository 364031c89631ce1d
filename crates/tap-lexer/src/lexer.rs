//! Lexer for TAP documents.

use tracing::trace;

use crate::{Chunk, InputStream, LexError, Location, Position, Token, TokenKind};

/// Pending `\` markers on the current line.
///
/// A non-zero depth means the previous character escaped the one being
/// scanned. Cleared at every newline.
#[derive(Debug, Clone, Default)]
struct EscapeStack {
    depth: usize,
}

impl EscapeStack {
    #[inline]
    fn push(&mut self) {
        self.depth += 1;
    }

    #[inline]
    fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    fn clear(&mut self) {
        self.depth = 0;
    }

    #[inline]
    fn is_escaping(&self) -> bool {
        self.depth > 0
    }
}

/// A lexer that turns TAP text into line chunks of tokens.
///
/// Keywords are contextual: `ok`, `not`, `TAP`, `pragma` and friends are
/// only recognized where the previous non-whitespace token allows them,
/// everything else stays a `Literal`.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    input: InputStream<'src>,
    escapes: EscapeStack,
    /// Something other than whitespace was emitted on the current line.
    line_started: bool,
    /// Kind of the most recent non-whitespace token.
    last_kind: TokenKind,
    /// The EOF chunk has been produced.
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self::with_origin(source, Position::START)
    }

    /// Create a lexer whose first character sits at `origin`.
    pub fn with_origin(source: &'src str, origin: Position) -> Self {
        Self {
            input: InputStream::with_origin(source, origin),
            escapes: EscapeStack::default(),
            line_started: false,
            last_kind: TokenKind::Eol,
            finished: false,
        }
    }

    /// The current position of the underlying stream.
    #[inline]
    pub fn position(&self) -> Position {
        self.input.position()
    }

    /// Lex the whole input into line chunks, the last one holding `Eof`.
    pub fn scan(self) -> Result<Vec<Chunk<'src>>, LexError> {
        self.collect()
    }

    /// Lex the next physical line.
    ///
    /// Returns the tokens of the line including its `Newline`, or ending
    /// with a synthetic `Eol` when the input stops without one. Once the
    /// input is exhausted a single-token `Eof` chunk is returned, then
    /// `None`.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk<'src>>, LexError> {
        if self.finished {
            return Ok(None);
        }
        if self.input.eof() {
            self.finished = true;
            return Ok(Some(vec![self.eof_token()]));
        }

        let mut chunk = Vec::new();
        loop {
            let token = self.next_token()?;
            let kind = token.kind;
            chunk.push(token);
            if kind == TokenKind::Newline {
                return Ok(Some(chunk));
            }
            if self.input.eof() {
                chunk.push(self.eol_token());
                return Ok(Some(chunk));
            }
        }
    }

    /// Get the next token. Returns `Eof` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.input.position();
        let mark = self.input.byte_offset();
        let before = self.input.previous();

        let Some(c) = self.input.next() else {
            return Ok(self.eof_token());
        };

        let kind = match c {
            '\n' | '\r' => {
                // An odd number of trailing escapes does not carry over.
                self.escapes.clear();
                TokenKind::Newline
            }
            '0'..='9' => {
                while matches!(self.input.peek(0), Some('0'..='9')) {
                    self.input.next();
                }
                TokenKind::Numeric
            }
            '-' if self.input.peek(0) == Some('-') && self.input.peek(1) == Some('-') => {
                self.input.next();
                self.input.next();
                TokenKind::TapYamlStart
            }
            '-' => TokenKind::Dash,
            '+' => TokenKind::Plus,
            '#' => self.classify_hash(before),
            '\\' => self.classify_backslash(),
            ' ' | '\t' => TokenKind::Whitespace,
            _ if is_literal_char(c) => {
                while let Some(next) = self.input.peek(0)
                    && is_literal_char(next)
                {
                    self.input.next();
                }
                let word = self.input.slice_from(mark).trim();
                match self.keyword(word) {
                    Some(kind) => kind,
                    None if word == "..." => TokenKind::TapYamlEnd,
                    None => TokenKind::Literal,
                }
            }
            _ => return Err(LexError::new(c, Location::new(start, 1))),
        };

        Ok(self.token(kind, start, mark))
    }

    /// Create a token from `start` to the current position and update the
    /// lookback state.
    fn token(&mut self, kind: TokenKind, start: Position, mark: usize) -> Token<'src> {
        let value = self.input.slice_from(mark);
        let location = Location::new(start, value.chars().count() as u32);
        trace!("Token {:?} at {:?}: {:?}", kind, location, value);

        match kind {
            TokenKind::Whitespace => {}
            TokenKind::Newline => {
                self.line_started = false;
                self.last_kind = kind;
            }
            _ => {
                self.line_started = true;
                self.last_kind = kind;
            }
        }

        Token::new(kind, value, location)
    }

    fn eol_token(&mut self) -> Token<'src> {
        let location = Location::new(self.input.position(), 0);
        trace!("Token Eol at {:?}", location);
        self.line_started = false;
        self.escapes.clear();
        self.last_kind = TokenKind::Eol;
        Token::new(TokenKind::Eol, "", location)
    }

    /// EOF sits one past the end of the input.
    fn eof_token(&mut self) -> Token<'src> {
        let position = self.input.position();
        let location = Location {
            line: position.line,
            column: position.column + 1,
            start: position.offset + 1,
            end: position.offset + 1,
        };
        trace!("Token Eof at {:?}", location);
        self.last_kind = TokenKind::Eof;
        Token::new(TokenKind::Eof, "", location)
    }

    /// `#` opens a comment at the start of a line, marks a directive after
    /// whitespace, and is plain text everywhere else.
    fn classify_hash(&mut self, before: Option<char>) -> TokenKind {
        if !self.line_started {
            return TokenKind::Comment;
        }

        if matches!(before, Some(' ' | '\t')) && self.input.peek(0) != Some('#') {
            return TokenKind::Hash;
        }

        if self.escapes.is_escaping() {
            self.escapes.pop();
        }
        TokenKind::Literal
    }

    fn classify_backslash(&mut self) -> TokenKind {
        if self.escapes.is_escaping() {
            self.escapes.pop();
            return TokenKind::Literal;
        }

        if matches!(self.input.peek(0), Some(' ' | '\t')) {
            return TokenKind::Literal;
        }

        self.escapes.push();
        TokenKind::Escape
    }

    /// Resolve a literal word to a keyword given the previous token.
    fn keyword(&self, word: &str) -> Option<TokenKind> {
        let at_line_start = matches!(self.last_kind, TokenKind::Eol | TokenKind::Newline);
        match word {
            "TAP" if at_line_start => Some(TokenKind::Tap),
            "version" if self.last_kind == TokenKind::Tap => Some(TokenKind::TapVersion),
            ".." if self.last_kind == TokenKind::Numeric => Some(TokenKind::TapPlan),
            "not" if at_line_start => Some(TokenKind::TapTestNotOk),
            "ok" if at_line_start || self.last_kind == TokenKind::TapTestNotOk => {
                Some(TokenKind::TapTestOk)
            }
            "pragma" if at_line_start => Some(TokenKind::TapPragma),
            _ => None,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Chunk<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// Lex `source` into line chunks.
pub fn scan(source: &str) -> Result<Vec<Chunk<'_>>, LexError> {
    Lexer::new(source).scan()
}

/// Check if a character can be part of a literal run.
fn is_literal_char(c: char) -> bool {
    if c == ' ' || c == '\t' || is_zero_width(c) {
        return false;
    }
    if !c.is_ascii() {
        return true;
    }
    !matches!(c, '0'..='9' | '#' | '\\' | '+' | '-')
}

/// Control characters, combining marks and invisible modifiers.
fn is_zero_width(c: char) -> bool {
    matches!(
        c as u32,
        0x00..=0x1F
            | 0x7F..=0x9F
            | 0x300..=0x36F
            | 0x200B..=0x200F
            | 0x20D0..=0x20FF
            | 0xFE00..=0xFE0F
            | 0xFE20..=0xFE2F
            | 0xE0100..=0xE01EF
    )
}
