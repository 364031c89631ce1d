use proptest::prelude::*;
use tap_parser::{Node, NodeKind, Parser, Payload, StreamParser};

const REPORT: &str = "TAP version 14
# Subtest: math
    # Subtest: adds numbers
    ok 1 - adds numbers
      ---
      duration_ms: 0.5
      ...
    # Subtest: divides by zero
    not ok 2 - divides by zero
      ---
      duration_ms: 1.25
      failureType: 'testCodeFailure'
      error: 'expected 1 to equal 2'
      code: 'ERR_ASSERTION'
      stack: |-
        at divide (file:///math.test.js:12:3)
      ...
    ok 3 - flaky # SKIP network is down
    ok 4 - pending # TODO write it
    1..4
not ok 1 - math
  ---
  duration_ms: 3
  failureType: 'subtestsFailed'
  ...
1..1
# tests 4
# pass 1
# fail 1
# skipped 1
# todo 1
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn stream(source: &str, sizes: &[usize]) -> Result<Vec<Node>, tap_parser::Error> {
    let mut parser = StreamParser::new();
    let mut nodes = Vec::new();
    let mut rest = source;
    for &size in sizes.iter().cycle().take(source.len()) {
        if rest.is_empty() {
            break;
        }
        let mut split = size.clamp(1, rest.len());
        while !rest.is_char_boundary(split) {
            split += 1;
        }
        let (piece, tail) = rest.split_at(split);
        nodes.extend(parser.feed(piece)?);
        rest = tail;
    }
    nodes.extend(parser.feed(rest)?);
    nodes.extend(parser.finish()?);
    Ok(nodes)
}

#[test]
fn test_full_report() {
    init_tracing();
    let nodes = Parser::parse(REPORT).unwrap();

    let outline: Vec<_> = nodes.iter().map(|n| (n.nesting, n.kind())).collect();
    assert_eq!(
        outline,
        vec![
            (0, NodeKind::Version),
            (0, NodeKind::SubTestPoint),
            (1, NodeKind::SubTestPoint),
            (1, NodeKind::TestPoint),
            (1, NodeKind::SubTestPoint),
            (1, NodeKind::TestPoint),
            (1, NodeKind::TestPoint),
            (1, NodeKind::TestPoint),
            (1, NodeKind::Plan),
            (0, NodeKind::TestPoint),
            (0, NodeKind::Plan),
            (0, NodeKind::Comment),
            (0, NodeKind::Comment),
            (0, NodeKind::Comment),
            (0, NodeKind::Comment),
            (0, NodeKind::Comment),
        ]
    );

    let failed = nodes[5].as_test_point().unwrap();
    assert!(failed.status.fail);
    assert_eq!(failed.id, "2");
    assert_eq!(failed.time, 1.25);
    assert_eq!(failed.diagnostics.len(), 6);
    assert_eq!(failed.diagnostics[5], "  at divide (file:///math.test.js:12:3)");

    let skipped = nodes[6].as_test_point().unwrap();
    assert!(skipped.status.skip);
    assert_eq!(skipped.description, "flaky");
    assert_eq!(skipped.reason, "network is down");

    let todo = nodes[7].as_test_point().unwrap();
    assert!(todo.status.todo);
    assert_eq!(todo.reason, "write it");

    let outer = nodes[9].as_test_point().unwrap();
    assert_eq!(outer.description, "math");
    assert_eq!(outer.time, 3.0);

    let Payload::Comment { comment } = &nodes[15].payload else {
        panic!("expected a comment");
    };
    assert_eq!(comment, "todo 1");
}

#[test]
fn test_lexemes_rebuild_structural_lines() {
    init_tracing();
    let nodes = Parser::parse(REPORT).unwrap();
    let lines: Vec<&str> = REPORT.lines().collect();
    for node in &nodes {
        assert!(lines.contains(&node.lexeme.as_str()), "{:?}", node.lexeme);
    }
}

#[test]
fn test_stream_in_fixed_pieces() {
    init_tracing();
    let whole = Parser::parse(REPORT);
    for size in [1, 2, 3, 7, 64, 4096] {
        assert_eq!(stream(REPORT, &[size]), whole, "pieces of {size}");
    }
}

#[test]
fn test_crlf_documents() {
    init_tracing();
    let nodes = Parser::parse("TAP version 14\r\nok 1 - a\r\n1..1\r\n").unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[1].lexeme, "ok 1 - a");
}

fn tap_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("TAP version 14".to_owned()),
        Just("1..3 # reason".to_owned()),
        Just("ok 1 - passes".to_owned()),
        Just("not ok 2 - fails # TODO later".to_owned()),
        Just("# Subtest: nested".to_owned()),
        Just("    ok 1 - inner".to_owned()),
        Just("  ---".to_owned()),
        Just("  duration_ms: 4".to_owned()),
        Just("  ...".to_owned()),
        Just("    ---".to_owned()),
        Just("    ...".to_owned()),
        Just("pragma +strict".to_owned()),
        Just("Bail out! stop".to_owned()),
        Just(String::new()),
        "[ -~]{0,20}",
    ]
}

proptest! {
    #[test]
    fn prop_streamed_parse_matches_whole_parse(
        lines in prop::collection::vec(tap_line(), 0..24),
        sizes in prop::collection::vec(1usize..16, 1..8),
        trailing_newline in any::<bool>(),
    ) {
        let mut source = lines.join("\n");
        if trailing_newline {
            source.push('\n');
        }
        prop_assert_eq!(stream(&source, &sizes), Parser::parse(&source));
    }

    #[test]
    fn prop_nesting_grows_one_level_at_a_time(
        lines in prop::collection::vec(tap_line(), 0..24),
    ) {
        let source = lines.join("\n");
        if let Ok(nodes) = Parser::parse(&source) {
            let mut previous = 0;
            for node in nodes {
                prop_assert!(node.nesting <= previous + 1);
                previous = node.nesting;
            }
        }
    }
}
