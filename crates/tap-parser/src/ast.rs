//! AST nodes produced by the parser.

use std::collections::BTreeMap;
use std::time::Duration;

/// One node of a parsed TAP document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Number of subtest levels open around this node.
    pub nesting: usize,
    /// What the line was, and what it said.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub payload: Payload,
    /// The source line, including indentation but not the line ending.
    pub lexeme: String,
    /// Comment lines that directly preceded this node.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub comments: Vec<String>,
}

impl Node {
    /// The kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self.payload {
            Payload::Comment { .. } => NodeKind::Comment,
            Payload::Version { .. } => NodeKind::Version,
            Payload::Plan(_) => NodeKind::Plan,
            Payload::TestPoint(_) => NodeKind::TestPoint,
            Payload::SubTestPoint { .. } => NodeKind::SubTestPoint,
            Payload::YamlEnd { .. } => NodeKind::YamlEnd,
            Payload::Pragma { .. } => NodeKind::Pragma,
            Payload::BailOut { .. } => NodeKind::BailOut,
        }
    }

    /// The test point payload, if this node is one.
    pub fn as_test_point(&self) -> Option<&TestPoint> {
        match &self.payload {
            Payload::TestPoint(point) => Some(point),
            _ => None,
        }
    }
}

/// The payload of a node, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "node"))]
pub enum Payload {
    /// A `# text` line that is not a subtest header.
    Comment { comment: String },

    /// `TAP version <n>`
    #[cfg_attr(feature = "serde", serde(rename = "VersionKeyword"))]
    Version { version: String },

    /// `<start>..<end> [# reason]`
    #[cfg_attr(feature = "serde", serde(rename = "PlanKeyword"))]
    Plan(Plan),

    /// `ok` / `not ok`
    #[cfg_attr(feature = "serde", serde(rename = "TestPointKeyword"))]
    TestPoint(TestPoint),

    /// `# Subtest: <name>`
    #[cfg_attr(feature = "serde", serde(rename = "SubTestPointKeyword"))]
    SubTestPoint { name: String },

    /// A `---`/`...` block that does not belong to a test point.
    #[cfg_attr(feature = "serde", serde(rename = "YamlEndKeyword"))]
    YamlEnd { diagnostics: Vec<String> },

    /// `pragma +flag, -flag`
    #[cfg_attr(feature = "serde", serde(rename = "PragmaKeyword"))]
    Pragma { pragmas: BTreeMap<String, bool> },

    /// `Bail out! <reason>`
    #[cfg_attr(feature = "serde", serde(rename = "BailOutKeyword"))]
    BailOut { bailout: bool, reason: String },
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Comment,
    Version,
    Plan,
    TestPoint,
    SubTestPoint,
    YamlEnd,
    Pragma,
    BailOut,
}

impl NodeKind {
    /// The tag this kind is known by in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Comment => "Comment",
            NodeKind::Version => "VersionKeyword",
            NodeKind::Plan => "PlanKeyword",
            NodeKind::TestPoint => "TestPointKeyword",
            NodeKind::SubTestPoint => "SubTestPointKeyword",
            NodeKind::YamlEnd => "YamlEndKeyword",
            NodeKind::Pragma => "PragmaKeyword",
            NodeKind::BailOut => "BailOutKeyword",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A plan line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    pub start: String,
    pub end: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub reason: Option<String>,
}

/// The outcome flags of a test point.
///
/// `pass` and `fail` are always opposites; `todo` and `skip` come from the
/// directive and never change them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    pub pass: bool,
    pub fail: bool,
    pub todo: bool,
    pub skip: bool,
}

/// An `ok` or `not ok` line together with its diagnostics block.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestPoint {
    pub status: Status,
    /// The test number, or empty when the line has none.
    pub id: String,
    pub description: String,
    /// Text after a `SKIP`/`TODO` directive, or the whole directive.
    pub reason: String,
    /// `duration_ms` from the diagnostics, in milliseconds.
    pub time: f64,
    /// Raw lines of the attached YAML block.
    pub diagnostics: Vec<String>,
}

impl TestPoint {
    /// The reported duration, zero when absent.
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.time / 1000.0).unwrap_or_default()
    }
}
