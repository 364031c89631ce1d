#![doc = include_str!("../README.md")]

use std::io::{self, Read, Write};

use clap::Parser as _;
use tap_parser::{Lexer, Node, Parser, StreamParser};
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI arguments
// ============================================================================

/// Parse Test Anything Protocol output and print it as JSON.
#[derive(clap::Parser, Debug)]
#[command(name = "tap", version)]
struct Args {
    /// Input file path (or "-" for stdin)
    #[arg(default_value = "-")]
    input: String,

    /// Print tokens instead of parsed nodes
    #[arg(long)]
    tokens: bool,

    /// Parse incrementally, one line at a time
    #[arg(long)]
    stream: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .init();

    let result = read_input(&args.input)
        .map_err(CliError::Io)
        .and_then(|source| run(&args, &source).map_err(|e| e.with_source(&args.input, source)));

    match result {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(output.as_bytes()) {
                eprintln!("error: {e}");
                std::process::exit(EXIT_IO_ERROR);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Err(e) => {
            match &e {
                CliError::Syntax {
                    error,
                    source,
                    filename,
                } => error.write_report(filename, source, io::stderr()),
                _ => eprintln!("error: {e}"),
            }
            std::process::exit(e.exit_code());
        }
    }
}

/// Produce the output for `source`.
fn run(args: &Args, source: &str) -> Result<String, CliError> {
    if args.tokens {
        return dump_tokens(source);
    }

    let nodes = if args.stream {
        parse_streamed(source)?
    } else {
        Parser::parse(source).map_err(CliError::parse)?
    };
    debug!("Parsed {} nodes", nodes.len());

    let json = if args.compact {
        serde_json::to_string(&nodes)
    } else {
        serde_json::to_string_pretty(&nodes)
    }
    .map_err(|e| CliError::Io(io::Error::other(e)))?;

    Ok(json + "\n")
}

fn dump_tokens(source: &str) -> Result<String, CliError> {
    let mut output = String::new();
    for chunk in Lexer::new(source) {
        let chunk = chunk.map_err(|e| CliError::parse(e.into()))?;
        for token in chunk {
            output.push_str(&format!(
                "{}@{}:{} {:?}\n",
                token.kind, token.location.line, token.location.column, token.value
            ));
        }
    }
    Ok(output)
}

fn parse_streamed(source: &str) -> Result<Vec<Node>, CliError> {
    let mut parser = StreamParser::new();
    let mut nodes = Vec::new();
    for line in source.split_inclusive('\n') {
        nodes.extend(parser.feed(line).map_err(CliError::parse)?);
    }
    nodes.extend(parser.finish().map_err(CliError::parse)?);
    Ok(nodes)
}

fn read_input(file: &str) -> Result<String, io::Error> {
    match file {
        "-" => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        path => std::fs::read_to_string(path),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    /// A syntax error not yet paired with its source text.
    Parse(tap_parser::Error),
    Syntax {
        error: tap_parser::Error,
        source: String,
        filename: String,
    },
}

impl CliError {
    fn parse(error: tap_parser::Error) -> Self {
        CliError::Parse(error)
    }

    /// Attach the input so the error can be rendered as a report.
    fn with_source(self, input: &str, source: String) -> Self {
        match self {
            CliError::Parse(error) => CliError::Syntax {
                error,
                source,
                filename: if input == "-" { "<stdin>" } else { input }.to_owned(),
            },
            other => other,
        }
    }

    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Parse(_) | CliError::Syntax { .. } => EXIT_SYNTAX_ERROR,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Parse(e) => write!(f, "{e}"),
            CliError::Syntax { error, .. } => write!(f, "{error}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
