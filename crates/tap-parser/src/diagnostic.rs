//! Diagnostic rendering for lex and parse errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::{Error, ParseErrorKind};

impl Error {
    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename, source);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        source: &str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = clamp(self.location(), source);

        match self {
            Error::Lex(err) => Report::build(ReportKind::Error, (filename, range.clone()))
                .with_code(err.code())
                .with_message(format!("unexpected character {:?}", err.character))
                .with_label(
                    Label::new((filename, range))
                        .with_message("not allowed in TAP text")
                        .with_color(Color::Red),
                )
                .with_help("control characters and combining marks cannot appear in a TAP document"),

            Error::Parse(err) => match &err.kind {
                ParseErrorKind::UnclosedYamlBlock => {
                    Report::build(ReportKind::Error, (filename, range.clone()))
                        .with_code(err.code())
                        .with_message("unclosed YAML block")
                        .with_label(
                            Label::new((filename, range))
                                .with_message(format!("found {} before the closing '...'", err.received))
                                .with_color(Color::Red),
                        )
                        .with_help("close the block with '...' at the indentation of its '---'")
                }

                ParseErrorKind::UnexpectedToken { expected } => {
                    Report::build(ReportKind::Error, (filename, range.clone()))
                        .with_code(err.code())
                        .with_message(format!("expected {}", expected))
                        .with_label(
                            Label::new((filename, range))
                                .with_message(format!("unexpected {}", err.received))
                                .with_color(Color::Red),
                        )
                }
            },
        }
    }
}

/// Character range of a location, kept inside the source so that the
/// one-past-the-end EOF location still renders.
fn clamp(location: tap_lexer::Location, source: &str) -> std::ops::Range<usize> {
    let len = source.chars().count();
    let start = (location.start as usize).min(len);
    let end = (location.end as usize + 1).min(len).max(start);
    start..end
}
