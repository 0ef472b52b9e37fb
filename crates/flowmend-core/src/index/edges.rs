use super::{Diagnostic, DiagnosticKind};
use crate::lines::{LineKind, LineMap, node_statements};
use crate::pattern::{Connector, EdgeStyle, node_ref_fragment};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

/// One connection, addressed by `{source}-{target}-{ordinal}`.
///
/// Spans are byte ranges inside `raw_line`; `line_offset` is where that line starts in the
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDescriptor {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub label: Option<String>,
    pub style_kind: EdgeStyle,
    /// Position among the edges sharing this (source, target) pair. `linkStyle` does not use
    /// it; see `link_index`.
    pub ordinal: usize,
    /// Position among all edges of the document; the number `linkStyle` statements use.
    pub link_index: usize,
    pub line_number: usize,
    pub raw_line: String,
    pub line_offset: usize,
    pub source_span: Range<usize>,
    /// Operator plus label and surrounding whitespace, between the two endpoints.
    pub connector: Range<usize>,
    pub target_span: Range<usize>,
    pub label_span: Option<Range<usize>>,
}

impl EdgeDescriptor {
    pub fn connector_text(&self) -> &str {
        &self.raw_line[self.connector.clone()]
    }

    /// Source endpoint as written, shape definition included.
    pub fn source_def(&self) -> &str {
        &self.raw_line[self.source_span.clone()]
    }

    pub fn target_def(&self) -> &str {
        &self.raw_line[self.target_span.clone()]
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }

    pub(crate) fn absolute(&self, range: &Range<usize>) -> Range<usize> {
        self.line_offset + range.start..self.line_offset + range.end
    }
}

pub(crate) fn edge_id(source: &str, target: &str, ordinal: usize) -> String {
    format!("{source}-{target}-{ordinal}")
}

const OP: &str = r"<?(?:-{2,}>|-{3,}|-\.+->|-\.+-|={2,}>|={3,}|-{2}[xo]|={2}[xo])|~{3,}";

struct EdgeRegexes {
    start: Regex,
    pipe: Regex,
    dash: Regex,
    plain: Regex,
    operator: Regex,
}

fn regexes() -> &'static EdgeRegexes {
    static RES: OnceLock<EdgeRegexes> = OnceLock::new();
    RES.get_or_init(|| {
        let node = node_ref_fragment();
        EdgeRegexes {
            start: Regex::new(&format!(r"^\s*(?P<node>{node})")).expect("valid regex"),
            pipe: Regex::new(&format!(
                r"^\s*(?P<op>{OP})\s*\|(?P<label>[^|]*)\|\s*(?P<node>{node})"
            ))
            .expect("valid regex"),
            dash: Regex::new(&format!(
                r"^\s*(?P<open><?(?:-{{2}}|={{2}}|-\.))\s+(?P<label>[^-=.|>\s][^|]*?)\s*(?P<close>-{{2,}}[>xo]?|={{2,}}[>xo]?|\.-+[>xo]?)\s*(?P<node>{node})"
            ))
            .expect("valid regex"),
            plain: Regex::new(&format!(r"^\s*(?P<op>{OP})\s*(?P<node>{node})"))
                .expect("valid regex"),
            operator: Regex::new(r"-{2,}|={2,}|-\.|~{3,}").expect("valid regex"),
        }
    })
}

/// One `operator [label] target` step of an edge chain, relative to the text it was
/// matched in.
struct Step {
    op: String,
    label: Option<(String, Range<usize>)>,
    target: Range<usize>,
    end: usize,
}

fn unquote_label(raw: &str) -> String {
    let t = raw.trim();
    let unquoted = t
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(t);
    unquoted.replace("#quot;", "\"")
}

fn head_runs_into_id(op: &str, rest: &str, op_end: usize) -> bool {
    op.ends_with(['x', 'o'])
        && rest[op_end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

fn step_from(caps: &Captures<'_>, op: String) -> Option<Step> {
    let node = caps.name("node")?;
    let label = caps
        .name("label")
        .map(|m| (unquote_label(m.as_str()), m.range()))
        .filter(|(text, _)| !text.is_empty());
    Some(Step {
        op,
        label,
        target: node.range(),
        end: caps.get(0)?.end(),
    })
}

/// Tries the three edge forms in precedence order: pipe label, dash label, plain.
fn next_step(rest: &str) -> Option<Step> {
    let res = regexes();
    if let Some(caps) = res.pipe.captures(rest) {
        let op = caps.name("op")?;
        if !head_runs_into_id(op.as_str(), rest, op.end()) {
            return step_from(&caps, op.as_str().to_string());
        }
    }
    if let Some(caps) = res.dash.captures(rest) {
        let op = format!("{}{}", caps.name("open")?.as_str(), caps.name("close")?.as_str());
        return step_from(&caps, op);
    }
    if let Some(caps) = res.plain.captures(rest) {
        let op = caps.name("op")?;
        if !head_runs_into_id(op.as_str(), rest, op.end()) {
            return step_from(&caps, op.as_str().to_string());
        }
    }
    None
}

fn leading_id(def: &str) -> &str {
    let end = def
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(def.len());
    &def[..end]
}

#[derive(Debug, Default)]
pub(crate) struct EdgeScan {
    pub edges: IndexMap<String, EdgeDescriptor>,
    /// Absolute ranges of edge labels; node scanning and id rewriting skip them.
    pub label_spans: Vec<Range<usize>>,
    /// Absolute id ranges of bare node statements (`A` alone on a line).
    pub bare_ids: Vec<Range<usize>>,
    pub diagnostics: Vec<Diagnostic>,
}

pub(crate) fn scan_edges(lines: &LineMap<'_>, kinds: &[LineKind]) -> EdgeScan {
    let mut scan = EdgeScan::default();
    let mut counters = Counters::default();

    for (line_no, line) in lines.iter() {
        for statement in node_statements(line, kinds[line_no]) {
            let offset = lines.start(line_no);
            scan_statement(&mut scan, &mut counters, line, offset, line_no, statement);
        }
    }
    scan
}

#[derive(Debug, Default)]
struct Counters {
    pairs: FxHashMap<(String, String), usize>,
    link_index: usize,
}

/// Scans one `;`-delimited statement of `line`; spans stay relative to the whole line.
fn scan_statement(
    scan: &mut EdgeScan,
    counters: &mut Counters,
    line: &str,
    line_offset: usize,
    line_no: usize,
    statement: Range<usize>,
) {
    let res = regexes();
    let base = statement.start;
    let text = &line[statement];

    let Some(first) = res.start.captures(text).and_then(|c| c.name("node")) else {
        if res.operator.is_match(text) {
            scan.diagnostics.push(Diagnostic::new(
                line_no,
                DiagnosticKind::EdgeParseMiss,
                format!("unrecognised connection: {}", text.trim()),
            ));
        }
        return;
    };

    let mut source = first.range();
    let mut pos = source.end;
    let mut found = 0usize;

    while let Some(step) = next_step(&text[pos..]) {
        let target = pos + step.target.start..pos + step.target.end;
        let source_id = leading_id(&text[source.clone()]).to_string();
        let target_id = leading_id(&text[target.clone()]).to_string();

        let Some(connector) = Connector::parse(&step.op) else {
            break;
        };
        let style_kind = connector.style(source_id == target_id);

        let counter = counters
            .pairs
            .entry((source_id.clone(), target_id.clone()))
            .or_insert(0);
        let ordinal = *counter;
        *counter += 1;

        let label_span = step
            .label
            .as_ref()
            .map(|(_, range)| base + pos + range.start..base + pos + range.end);
        if let Some(span) = &label_span {
            scan.label_spans
                .push(line_offset + span.start..line_offset + span.end);
        }

        let id = edge_id(&source_id, &target_id, ordinal);
        scan.edges.insert(
            id.clone(),
            EdgeDescriptor {
                id,
                source_id,
                target_id: target_id.clone(),
                label: step.label.map(|(text, _)| text),
                style_kind,
                ordinal,
                link_index: counters.link_index,
                line_number: line_no,
                raw_line: line.to_string(),
                line_offset,
                source_span: base + source.start..base + source.end,
                connector: base + source.end..base + target.start,
                target_span: base + target.start..base + target.end,
                label_span,
            },
        );
        counters.link_index += 1;
        found += 1;

        pos += step.end;
        source = target;
    }

    let tail = text[pos..].trim();
    if found == 0 {
        if res.operator.is_match(&text[pos..]) {
            scan.diagnostics.push(Diagnostic::new(
                line_no,
                DiagnosticKind::EdgeParseMiss,
                format!("unrecognised connection: {}", text.trim()),
            ));
            tracing::debug!(line = line_no, "edge parse miss");
        } else if tail.is_empty() && first.as_str() == leading_id(first.as_str()) {
            let start = line_offset + base + first.start();
            scan.bare_ids.push(start..start + first.len());
        }
    } else if !tail.is_empty() {
        scan.diagnostics.push(Diagnostic::new(
            line_no,
            DiagnosticKind::EdgeParseMiss,
            format!("unrecognised trailing text after connection: {tail}"),
        ));
        tracing::debug!(line = line_no, tail, "edge parse miss");
    }
}
