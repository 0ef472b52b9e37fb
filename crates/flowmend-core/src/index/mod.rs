//! Read-only scan of flowchart text into node and edge descriptors.

pub(crate) mod annotations;
mod edges;
mod nodes;

use crate::lines::{LineKind, LineMap, classify_lines, statement_regions};
use crate::pattern::ShapeKind;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub use annotations::{ANNOTATION_TAG, Annotation};
pub use edges::EdgeDescriptor;
pub use nodes::{NodeDescriptor, NodeOccurrence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// An identifier followed by an opening delimiter that no shape pattern accepts.
    NodeParseMiss,
    /// A statement containing a link operator that no edge pattern accepts.
    EdgeParseMiss,
}

/// Non-fatal finding produced while indexing; the element is left out of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(line: usize, kind: DiagnosticKind, message: String) -> Self {
        Self {
            line,
            kind,
            message,
        }
    }
}

/// A bare id reference (edge endpoint or standalone statement without a shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdReference {
    pub id: String,
    pub span: Range<usize>,
    pub line: usize,
}

/// Node and edge view of one version of a document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphIndex {
    pub nodes: IndexMap<String, NodeDescriptor>,
    pub edges: IndexMap<String, EdgeDescriptor>,
    pub annotations: IndexMap<String, Annotation>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub(crate) occurrences: Vec<NodeOccurrence>,
    #[serde(skip)]
    pub(crate) references: Vec<IdReference>,
    #[serde(skip)]
    pub(crate) line_kinds: Vec<LineKind>,
    #[serde(skip)]
    pub(crate) used_ids: FxHashSet<String>,
}

impl GraphIndex {
    pub fn node(&self, id: &str) -> Option<&NodeDescriptor> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeDescriptor> {
        self.edges.get(id)
    }

    /// Whether `id` is taken by a node, an edge endpoint or a subgraph.
    pub fn is_id_used(&self, id: &str) -> bool {
        self.used_ids.contains(id)
    }

    pub fn used_ids(&self) -> impl Iterator<Item = &str> {
        self.used_ids.iter().map(String::as_str)
    }

    /// Outgoing connections of `node_id`, in document order.
    pub fn edges_from<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a EdgeDescriptor> {
        self.edges.values().filter(move |e| e.source_id == node_id)
    }

    pub fn edges_to<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a EdgeDescriptor> {
        self.edges.values().filter(move |e| e.target_id == node_id)
    }

    pub fn occurrences(&self) -> &[NodeOccurrence] {
        &self.occurrences
    }

    pub fn line_kind(&self, line: usize) -> Option<LineKind> {
        self.line_kinds.get(line).copied()
    }

    /// Every shaped definition of `id`, in document order.
    pub(crate) fn occurrences_of<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a NodeOccurrence> {
        self.occurrences.iter().filter(move |o| o.id == id)
    }

    pub(crate) fn references_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a IdReference> {
        self.references.iter().filter(move |r| r.id == id)
    }
}

fn subgraph_id(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("subgraph")?.trim_start();
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Indexes `text`.
///
/// The first shaped occurrence of an id defines its descriptor; ids that are only referenced
/// bare get an implicit rectangle descriptor at their first reference.
pub fn index(text: &str) -> GraphIndex {
    let lines = LineMap::new(text);
    let line_kinds = classify_lines(&lines);

    let edge_scan = edges::scan_edges(&lines, &line_kinds);
    let regions = statement_regions(&lines, &line_kinds);
    let node_scan = nodes::scan_nodes(text, &lines, &regions, &edge_scan.label_spans);
    let annotations = annotations::collect(&lines, &line_kinds);

    let mut references = Vec::new();
    for edge in edge_scan.edges.values() {
        for (id, span) in [
            (&edge.source_id, &edge.source_span),
            (&edge.target_id, &edge.target_span),
        ] {
            let start = edge.line_offset + span.start;
            references.push(IdReference {
                id: id.clone(),
                span: start..start + id.len(),
                line: edge.line_number,
            });
        }
    }
    for span in &edge_scan.bare_ids {
        references.push(IdReference {
            id: text[span.clone()].to_string(),
            span: span.clone(),
            line: lines.line_of(span.start),
        });
    }
    // Endpoints with a shape are also occurrences; keep only the bare ones.
    references.retain(|r| {
        !node_scan
            .occurrences
            .iter()
            .any(|o| o.id_span.start == r.span.start)
    });
    references.sort_by_key(|r| r.span.start);
    references.dedup_by_key(|r| r.span.start);

    let mut nodes: IndexMap<String, NodeDescriptor> = IndexMap::new();
    let mut first_seen: Vec<(usize, &str)> = node_scan
        .occurrences
        .iter()
        .map(|o| (o.span.start, o.id.as_str()))
        .chain(references.iter().map(|r| (r.span.start, r.id.as_str())))
        .collect();
    first_seen.sort_by_key(|(start, _)| *start);

    for (_, id) in first_seen {
        if nodes.contains_key(id) {
            continue;
        }
        let comment = annotations.get(id).map(|a| a.text.clone());
        let descriptor = match node_scan.occurrences.iter().find(|o| o.id == id) {
            Some(occ) => NodeDescriptor {
                id: id.to_string(),
                shape_kind: occ.kind,
                display_text: occ.display_text().to_string(),
                source_line: occ.line,
                span: occ.span.clone(),
                text_span: occ.text_span.clone(),
                quoted: occ.content.quoted,
                implicit: false,
                comment,
            },
            None => {
                let Some(reference) = references.iter().find(|r| r.id == id) else {
                    continue;
                };
                NodeDescriptor {
                    id: id.to_string(),
                    shape_kind: ShapeKind::Rectangle,
                    display_text: id.to_string(),
                    source_line: reference.line,
                    span: reference.span.clone(),
                    text_span: reference.span.end..reference.span.end,
                    quoted: false,
                    implicit: true,
                    comment,
                }
            }
        };
        nodes.insert(id.to_string(), descriptor);
    }

    let mut used_ids: FxHashSet<String> = nodes.keys().cloned().collect();
    for (i, line) in lines.iter() {
        if line_kinds[i] == LineKind::Subgraph {
            if let Some(id) = subgraph_id(line) {
                used_ids.insert(id.to_string());
            }
        }
    }

    let mut diagnostics = edge_scan.diagnostics;
    diagnostics.extend(node_scan.diagnostics);
    diagnostics.sort_by_key(|d| d.line);

    tracing::debug!(
        nodes = nodes.len(),
        edges = edge_scan.edges.len(),
        diagnostics = diagnostics.len(),
        "indexed flowchart"
    );

    GraphIndex {
        nodes,
        edges: edge_scan.edges,
        annotations,
        diagnostics,
        occurrences: node_scan.occurrences,
        references,
        line_kinds,
        used_ids,
    }
}
