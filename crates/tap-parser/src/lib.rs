#![doc = include_str!("../README.md")]

pub use tap_lexer::{Chunk, LexError, Lexer, Location, Position, Token, TokenKind, scan};

mod ast;
pub use ast::{Node, NodeKind, Payload, Plan, Status, TestPoint};

mod diagnostic;

mod error;
pub use error::{Error, ParseError, ParseErrorKind};

mod parser;
pub use parser::Parser;

mod stream;
pub use stream::StreamParser;

/// Parse a complete TAP document.
pub fn parse(source: &str) -> Result<Vec<Node>, Error> {
    Parser::parse(source)
}
