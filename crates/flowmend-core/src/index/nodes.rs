use super::{Diagnostic, DiagnosticKind};
use crate::lines::LineMap;
use crate::pattern::{NodeContent, ShapeKind, match_node};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

/// Read-optimized view of one node, taken from its defining occurrence.
///
/// Byte ranges are absolute offsets into the indexed text. `source_line` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub id: String,
    pub shape_kind: ShapeKind,
    pub display_text: String,
    pub source_line: usize,
    pub span: Range<usize>,
    pub text_span: Range<usize>,
    pub quoted: bool,
    /// The node is only ever referenced by its bare id; Mermaid draws it as a rectangle
    /// labelled with the id.
    pub implicit: bool,
    pub comment: Option<String>,
}

/// A node definition (`id` + shape) found somewhere in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOccurrence {
    pub id: String,
    pub kind: ShapeKind,
    pub content: NodeContent,
    pub span: Range<usize>,
    pub id_span: Range<usize>,
    /// Everything between the delimiters.
    pub inner: Range<usize>,
    pub text_span: Range<usize>,
    pub line: usize,
}

impl NodeOccurrence {
    pub fn display_text(&self) -> &str {
        let text = self.content.text.trim();
        if text.is_empty() { &self.id } else { text }
    }
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("valid regex"))
}

#[derive(Debug, Default)]
pub(crate) struct NodeScan {
    pub occurrences: Vec<NodeOccurrence>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scans the node and edge statements of `text` for `id` + shape definitions.
///
/// `regions` are the absolute, ordered statement ranges; a quoted label may run past the end
/// of its region onto following lines. A match consumes its span, so words inside a label
/// are never taken for nodes. Words that fall inside `skip` (edge labels) are ignored.
pub(crate) fn scan_nodes(
    text: &str,
    lines: &LineMap<'_>,
    regions: &[Range<usize>],
    skip: &[Range<usize>],
) -> NodeScan {
    let mut scan = NodeScan::default();
    let mut pos = 0usize;
    let mut region_at = 0usize;

    while let Some(word) = word_re().find_at(text, pos) {
        while regions
            .get(region_at)
            .is_some_and(|r| r.end <= word.start())
        {
            region_at += 1;
        }
        let Some(region) = regions.get(region_at) else {
            break;
        };
        if word.start() < region.start {
            pos = region.start;
            continue;
        }
        let line = lines.line_of(word.start());
        if let Some(label) = skip.iter().find(|r| r.contains(&word.start())) {
            pos = label.end.max(word.end());
            continue;
        }

        match match_node(&text[word.start()..]) {
            Some(m) => {
                let m = m.shifted(word.start());
                scan.occurrences.push(NodeOccurrence {
                    id: text[m.id.clone()].to_string(),
                    kind: m.kind,
                    content: m.content,
                    span: m.span.clone(),
                    id_span: m.id,
                    inner: m.inner,
                    text_span: m.text,
                    line,
                });
                pos = m.span.end;
            }
            None => {
                let opens_shape = text[word.end()..].starts_with(['[', '(', '{']);
                if opens_shape {
                    scan.diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticKind::NodeParseMiss,
                        format!("unrecognised node shape after `{}`", word.as_str()),
                    ));
                    tracing::debug!(line, id = word.as_str(), "node parse miss");
                }
                pos = word.end();
            }
        }
    }
    scan
}
