//! Line-driven TAP parser.

use std::collections::{BTreeMap, VecDeque};

use tap_lexer::{Lexer, Location, Token, TokenKind};
use tracing::{debug, trace};

use crate::{Error, Node, ParseError, ParseErrorKind, Payload, Plan, Status, TestPoint};


/// A subtest that is still open.
#[derive(Debug, Clone, Copy)]
struct Subtest {
    /// Indentation of its `# Subtest:` line.
    indent: usize,
    /// Nesting of its `# Subtest:` line.
    depth: usize,
}

/// A test point waiting to see whether a YAML block follows it.
#[derive(Debug, Clone)]
struct Pending {
    node: Node,
    indent: usize,
}

/// An open `---` block.
#[derive(Debug, Clone)]
struct YamlBlock {
    indent: usize,
    lines: Vec<String>,
    /// The test point the block belongs to.
    target: Option<Node>,
    /// Nesting and comments for a block that stands alone.
    nesting: usize,
    comments: Vec<String>,
}

/// The last non-line-end token, kept for end-of-input errors.
#[derive(Debug, Clone)]
struct LastToken {
    kind: TokenKind,
    value: String,
    location: Location,
}

/// A TAP parser fed one line chunk at a time.
///
/// Nodes become available from [`Parser::drain`] as soon as nothing later
/// in the document can change them.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    stack: Vec<Subtest>,
    /// Comment nodes waiting for the node they belong to.
    comments: Vec<Node>,
    pending: Option<Pending>,
    yaml: Option<YamlBlock>,
    last: Option<LastToken>,
    output: VecDeque<Node>,
    finished: bool,
}

impl Parser {
    /// Create a parser at the start of a document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete document.
    pub fn parse(source: &str) -> Result<Vec<Node>, Error> {
        let mut parser = Parser::new();
        for chunk in Lexer::new(source) {
            parser.push_chunk(&chunk?)?;
        }
        Ok(parser.drain())
    }

    /// Take every node that is final so far.
    pub fn drain(&mut self) -> Vec<Node> {
        self.output.drain(..).collect()
    }

    /// Feed the tokens of one physical line, or the final `Eof` chunk.
    pub fn push_chunk(&mut self, chunk: &[Token<'_>]) -> Result<(), ParseError> {
        if self.finished {
            return Ok(());
        }

        let line = Line::new(chunk);
        if line.is_eof() {
            return self.finish(&chunk[0]);
        }

        if let Some(last) = chunk[..line.end].last() {
            self.last = Some(LastToken {
                kind: last.kind,
                value: last.value.to_owned(),
                location: last.location,
            });
        }

        if self.yaml.is_some() {
            return self.yaml_line(&line);
        }

        let Some(first) = line.first() else {
            self.release();
            return Ok(());
        };

        match first.kind {
            TokenKind::TapYamlStart => self.yaml_start(&line),
            TokenKind::Comment => {
                self.release();
                self.comment(&line);
                Ok(())
            }
            TokenKind::Tap => {
                self.release();
                self.version(&line)
            }
            TokenKind::Numeric if line.body().get(1).is_some_and(|t| t.kind == TokenKind::TapPlan) => {
                self.release();
                self.plan(&line)
            }
            TokenKind::TapTestOk | TokenKind::TapTestNotOk => {
                self.release();
                self.test_point(&line);
                Ok(())
            }
            TokenKind::TapPragma => {
                self.release();
                self.pragma(&line)
            }
            TokenKind::Literal if line.text_from(0).starts_with("Bail out!") => {
                self.release();
                self.bail_out(&line);
                Ok(())
            }
            _ if line.is_literal() => {
                self.release();
                self.literal(&line);
                Ok(())
            }
            _ => {
                self.release();
                trace!("Skipping line {}: {:?}", first.location.line, line.text());
                self.flush_comments();
                Ok(())
            }
        }
    }

    fn finish(&mut self, eof: &Token<'_>) -> Result<(), ParseError> {
        if self.yaml.is_some() {
            return Err(match &self.last {
                Some(last) => ParseError::new(
                    ParseErrorKind::UnclosedYamlBlock,
                    last.kind,
                    last.value.clone(),
                    last.location,
                ),
                None => ParseError::at(ParseErrorKind::UnclosedYamlBlock, eof),
            });
        }

        self.release();
        self.flush_comments();
        self.stack.clear();
        self.finished = true;
        Ok(())
    }

    /// Nesting of a line with the given indentation, closing every subtest
    /// it is not inside of.
    fn resolve(&mut self, indent: usize) -> usize {
        while self.stack.last().is_some_and(|open| open.indent >= indent) {
            self.stack.pop();
        }
        self.stack.last().map_or(0, |open| open.depth + 1)
    }

    fn emit(&mut self, node: Node) {
        debug!(
            "Node {} at nesting {}: {:?}",
            node.kind(),
            node.nesting,
            node.lexeme
        );
        self.output.push_back(node);
    }

    /// Build a node that takes the buffered comments.
    fn node(&mut self, nesting: usize, payload: Payload, line: &Line<'_, '_>) -> Node {
        Node {
            nesting,
            payload,
            lexeme: line.text(),
            comments: self.take_comments(),
        }
    }

    fn take_comments(&mut self) -> Vec<String> {
        self.comments
            .drain(..)
            .filter_map(|node| match node.payload {
                Payload::Comment { comment } => Some(comment),
                _ => None,
            })
            .collect()
    }

    fn flush_comments(&mut self) {
        for node in std::mem::take(&mut self.comments) {
            self.emit(node);
        }
    }

    /// Emit the held test point, without diagnostics.
    fn release(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.emit(pending.node);
        }
    }

    fn comment(&mut self, line: &Line<'_, '_>) {
        let nesting = self.resolve(line.indent);
        let text = line.text_from(1);
        let text = text.trim();

        if let Some(name) = text.strip_prefix("Subtest:") {
            let payload = Payload::SubTestPoint {
                name: name.trim().to_owned(),
            };
            let node = self.node(nesting, payload, line);
            self.emit(node);
            self.stack.push(Subtest {
                indent: line.indent,
                depth: nesting,
            });
            return;
        }

        self.comments.push(Node {
            nesting,
            payload: Payload::Comment {
                comment: text.to_owned(),
            },
            lexeme: line.text(),
            comments: Vec::new(),
        });
    }

    /// Free text outside any TAP construct is kept as a comment.
    fn literal(&mut self, line: &Line<'_, '_>) {
        let nesting = self.resolve(line.indent);
        self.comments.push(Node {
            nesting,
            payload: Payload::Comment {
                comment: line.text_from(0).trim().to_owned(),
            },
            lexeme: line.text(),
            comments: Vec::new(),
        });
    }

    fn version(&mut self, line: &Line<'_, '_>) -> Result<(), ParseError> {
        let body = line.body();
        let at = skip_whitespace(body, 1);
        let keyword = line.expect(at, TokenKind::TapVersion, "version keyword")?;
        let at = skip_whitespace(body, keyword + 1);
        let number = line.expect(at, TokenKind::Numeric, "version number")?;

        let nesting = self.resolve(line.indent);
        let payload = Payload::Version {
            version: body[number].value.to_owned(),
        };
        let node = self.node(nesting, payload, line);
        self.emit(node);
        Ok(())
    }

    fn plan(&mut self, line: &Line<'_, '_>) -> Result<(), ParseError> {
        let body = line.body();
        let end = line.expect(2, TokenKind::Numeric, "plan end")?;

        let at = skip_whitespace(body, end + 1);
        let reason = match body.get(at) {
            Some(token) if token.kind == TokenKind::Hash => Some(unescape(&body[at + 1..])),
            _ => None,
        };

        let nesting = self.resolve(line.indent);
        let payload = Payload::Plan(Plan {
            start: body[0].value.to_owned(),
            end: body[end].value.to_owned(),
            reason,
        });
        let node = self.node(nesting, payload, line);
        self.emit(node);
        Ok(())
    }

    fn test_point(&mut self, line: &Line<'_, '_>) {
        let body = line.body();
        let fail = body[0].kind == TokenKind::TapTestNotOk;

        let mut at = 1;
        if fail {
            let next = skip_whitespace(body, at);
            if body.get(next).is_some_and(|t| t.kind == TokenKind::TapTestOk) {
                at = next + 1;
            }
        }

        let mut id = String::new();
        let next = skip_whitespace(body, at);
        if let Some(token) = body.get(next)
            && token.kind == TokenKind::Numeric
        {
            id = token.value.to_owned();
            at = next + 1;
        }

        // An optional `- ` before the description.
        let next = skip_whitespace(body, at);
        if body.get(next).is_some_and(|t| t.kind == TokenKind::Dash) {
            at = next + 1;
        }

        let hash = body[at..]
            .iter()
            .position(|t| t.kind == TokenKind::Hash)
            .map(|offset| at + offset);
        let (description, directive) = match hash {
            Some(hash) => (unescape(&body[at..hash]), unescape(&body[hash + 1..])),
            None => (unescape(&body[at..]), String::new()),
        };

        let mut status = Status {
            pass: !fail,
            fail,
            todo: false,
            skip: false,
        };
        let reason = match directive.get(..4) {
            Some(word) if word.eq_ignore_ascii_case("skip") => {
                status.skip = true;
                directive[4..].trim().to_owned()
            }
            Some(word) if word.eq_ignore_ascii_case("todo") => {
                status.todo = true;
                directive[4..].trim().to_owned()
            }
            _ => directive,
        };

        let nesting = self.resolve(line.indent);
        let payload = Payload::TestPoint(TestPoint {
            status,
            id,
            description,
            reason,
            time: 0.0,
            diagnostics: Vec::new(),
        });
        let node = self.node(nesting, payload, line);
        self.pending = Some(Pending {
            node,
            indent: line.indent,
        });
    }

    fn pragma(&mut self, line: &Line<'_, '_>) -> Result<(), ParseError> {
        let body = line.body();
        let mut pragmas = BTreeMap::new();
        let mut at = 1;

        loop {
            while body
                .get(at)
                .is_some_and(|t| t.kind == TokenKind::Whitespace || is_commas(t))
            {
                at += 1;
            }
            let Some(marker) = body.get(at) else {
                break;
            };
            let value = match marker.kind {
                TokenKind::Plus => true,
                TokenKind::Dash => false,
                _ => return Err(line.unexpected(at, "pragma flag")),
            };
            at += 1;

            let start = at;
            while body.get(at).is_some_and(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Whitespace | TokenKind::Plus | TokenKind::Dash
                )
            }) {
                at += 1;
            }
            let text: String = body[start..at].iter().map(|t| t.value).collect();
            let name = text.trim_end_matches(',');
            if name.is_empty() || name.contains(',') {
                return Err(line.unexpected(start, "pragma name"));
            }
            pragmas.insert(name.to_owned(), value);
        }

        let nesting = self.resolve(line.indent);
        let node = self.node(nesting, Payload::Pragma { pragmas }, line);
        self.emit(node);
        Ok(())
    }

    fn bail_out(&mut self, line: &Line<'_, '_>) {
        let text = line.text_from(0);
        let reason = text
            .strip_prefix("Bail out!")
            .unwrap_or_default()
            .trim()
            .to_owned();

        let nesting = self.resolve(line.indent);
        let payload = Payload::BailOut {
            bailout: true,
            reason,
        };
        let node = self.node(nesting, payload, line);
        self.emit(node);
    }

    fn yaml_start(&mut self, line: &Line<'_, '_>) -> Result<(), ParseError> {
        let target = match self.pending.take() {
            Some(pending) if line.indent >= pending.indent => Some(pending.node),
            Some(pending) => {
                self.emit(pending.node);
                None
            }
            None => None,
        };

        let (nesting, comments) = match target {
            Some(_) => (0, Vec::new()),
            None => (self.resolve(line.indent), self.take_comments()),
        };

        self.yaml = Some(YamlBlock {
            indent: line.indent,
            lines: Vec::new(),
            target,
            nesting,
            comments,
        });
        Ok(())
    }

    fn yaml_line(&mut self, line: &Line<'_, '_>) -> Result<(), ParseError> {
        let Some(block) = self.yaml.as_mut() else {
            return Ok(());
        };
        let text = line.text();

        let Some(first) = line.first() else {
            let strip = block.indent.min(text.len());
            block.lines.push(text[strip..].to_owned());
            return Ok(());
        };

        if line.indent < block.indent {
            return Err(ParseError::at(ParseErrorKind::UnclosedYamlBlock, first));
        }

        if line.indent == block.indent {
            match first.kind {
                TokenKind::TapYamlEnd if line.body().len() == 1 => {
                    return self.yaml_end(line);
                }
                TokenKind::Tap
                | TokenKind::TapTestOk
                | TokenKind::TapTestNotOk
                | TokenKind::TapPragma
                | TokenKind::TapYamlStart => {
                    return Err(ParseError::at(ParseErrorKind::UnclosedYamlBlock, first));
                }
                _ => {}
            }
        }

        // The indentation is made of single-byte whitespace tokens.
        block.lines.push(text[block.indent..].to_owned());
        Ok(())
    }

    fn yaml_end(&mut self, line: &Line<'_, '_>) -> Result<(), ParseError> {
        let Some(block) = self.yaml.take() else {
            return Ok(());
        };

        match block.target {
            Some(mut node) => {
                if let Payload::TestPoint(point) = &mut node.payload {
                    point.time = duration_ms(&block.lines).unwrap_or(0.0);
                    point.diagnostics = block.lines;
                }
                self.emit(node);
            }
            None => {
                let node = Node {
                    nesting: block.nesting,
                    payload: Payload::YamlEnd {
                        diagnostics: block.lines,
                    },
                    lexeme: line.text(),
                    comments: block.comments,
                };
                self.emit(node);
            }
        }
        Ok(())
    }
}

/// The tokens of one physical line.
struct Line<'t, 'src> {
    tokens: &'t [Token<'src>],
    /// Number of leading whitespace tokens.
    indent: usize,
    /// Index of the line ending.
    end: usize,
}

impl<'t, 'src> Line<'t, 'src> {
    fn new(tokens: &'t [Token<'src>]) -> Self {
        let end = tokens
            .iter()
            .position(|t| t.kind.is_line_end())
            .unwrap_or(tokens.len());
        let indent = tokens[..end]
            .iter()
            .take_while(|t| t.kind == TokenKind::Whitespace)
            .count();
        Self {
            tokens,
            indent,
            end,
        }
    }

    fn is_eof(&self) -> bool {
        self.tokens
            .first()
            .is_some_and(|t| t.kind == TokenKind::Eof)
    }

    /// Tokens after the indentation, without the line ending.
    fn body(&self) -> &'t [Token<'src>] {
        &self.tokens[self.indent..self.end]
    }

    /// Whether the body is only free text.
    fn is_literal(&self) -> bool {
        self.body().iter().all(|t| {
            matches!(
                t.kind,
                TokenKind::Literal | TokenKind::Comment | TokenKind::Whitespace
            )
        })
    }

    fn first(&self) -> Option<&'t Token<'src>> {
        self.body().first()
    }

    /// The line as written, without the line ending.
    fn text(&self) -> String {
        self.tokens[..self.end].iter().map(|t| t.value).collect()
    }

    /// Text from the body token at `index` to the end of the line.
    fn text_from(&self, index: usize) -> String {
        self.body()
            .get(index..)
            .unwrap_or_default()
            .iter()
            .map(|t| t.value)
            .collect()
    }

    /// Check that the body token at `index` has `kind`.
    fn expect(
        &self,
        index: usize,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<usize, ParseError> {
        match self.body().get(index) {
            Some(token) if token.kind == kind => Ok(index),
            _ => Err(self.unexpected(index, expected)),
        }
    }

    /// An error at the body token `index`, or at the line ending past it.
    fn unexpected(&self, index: usize, expected: &'static str) -> ParseError {
        let token = self
            .body()
            .get(index)
            .or_else(|| self.tokens.get(self.end))
            .or_else(|| self.tokens.last());
        match token {
            Some(token) => ParseError::unexpected(expected, token),
            None => ParseError::new(
                ParseErrorKind::UnexpectedToken { expected },
                TokenKind::Eol,
                "",
                Location::default(),
            ),
        }
    }
}

fn skip_whitespace(tokens: &[Token<'_>], mut at: usize) -> usize {
    while tokens
        .get(at)
        .is_some_and(|t| t.kind == TokenKind::Whitespace)
    {
        at += 1;
    }
    at
}

fn is_commas(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Literal && token.value.chars().all(|c| c == ',')
}

/// Join token text, dropping escape markers, and trim it.
fn unescape(tokens: &[Token<'_>]) -> String {
    let text: String = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Escape)
        .map(|t| t.value)
        .collect();
    text.trim().to_owned()
}

/// The first `duration_ms: <number>` value among diagnostic lines.
fn duration_ms(lines: &[String]) -> Option<f64> {
    lines.iter().find_map(|line| {
        let value = line.trim().strip_prefix("duration_ms:")?;
        value.trim().parse::<f64>().ok().filter(|ms| ms.is_finite())
    })
}
