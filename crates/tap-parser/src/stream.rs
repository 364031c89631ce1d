//! Incremental parsing of TAP output as it arrives.

use tap_lexer::{Lexer, Position, TokenKind};

use crate::{Error, Node, Parser};

/// Parses a TAP document that arrives in pieces.
///
/// Text is only lexed one complete physical line at a time, so a line
/// split across two `feed` calls is handled exactly like the whole line.
/// Locations count from the start of the document.
///
/// ```
/// use tap_parser::StreamParser;
///
/// let mut stream = StreamParser::new();
/// assert!(stream.feed("ok 1 - fi").unwrap().is_empty());
/// assert!(stream.feed("rst\nok 2").unwrap().is_empty());
/// let nodes = stream.finish().unwrap();
/// assert_eq!(nodes.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamParser {
    /// Text after the last line ending seen so far.
    buffer: String,
    /// Position of the first character of `buffer`.
    origin: Position,
    parser: Parser,
}

impl StreamParser {
    /// Create a parser at the start of a document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add text, returning the nodes that became final.
    pub fn feed(&mut self, text: &str) -> Result<Vec<Node>, Error> {
        self.buffer.push_str(text);
        let Some(end) = self.buffer.rfind(['\n', '\r']) else {
            return Ok(Vec::new());
        };

        let rest = self.buffer.split_off(end + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        let mut lexer = Lexer::with_origin(&complete, self.origin);
        while let Some(chunk) = lexer.next_chunk()? {
            // The slice's own end of input is not the document's.
            if chunk.first().is_some_and(|t| t.kind == TokenKind::Eof) {
                break;
            }
            self.parser.push_chunk(&chunk)?;
        }
        self.origin = lexer.position();

        Ok(self.parser.drain())
    }

    /// Parse whatever is left and end the document.
    pub fn finish(mut self) -> Result<Vec<Node>, Error> {
        let mut lexer = Lexer::with_origin(&self.buffer, self.origin);
        while let Some(chunk) = lexer.next_chunk()? {
            self.parser.push_chunk(&chunk)?;
        }
        Ok(self.parser.drain())
    }
}
