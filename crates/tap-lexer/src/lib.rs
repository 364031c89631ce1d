//! A lexer for the Test Anything Protocol.
//!
//! The input is split into line chunks: each chunk holds the tokens of one
//! physical line, ending in `Newline` or, for a final unterminated line,
//! a zero-width `Eol`. The last chunk always holds a single `Eof`.
//!
//! ```
//! use tap_lexer::{TokenKind, scan};
//!
//! let chunks = scan("ok 1 - fine\n").unwrap();
//! assert_eq!(chunks[0][0].kind, TokenKind::TapTestOk);
//! assert_eq!(chunks.last().unwrap()[0].kind, TokenKind::Eof);
//! ```

mod error;
pub use error::LexError;

mod input;
pub use input::InputStream;

mod lexer;
pub use lexer::{Lexer, scan};

mod location;
pub use location::{Location, Position};

mod token;
pub use token::{Chunk, Token, TokenKind};
