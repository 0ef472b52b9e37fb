use crate::pattern::starts_with_kw;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte offsets of every line in a document.
///
/// Lines are split on `\n`; a trailing `\r` is not part of the line. A final newline does not
/// start an extra empty line, so line numbers agree with [`crate::edit`]'s line buffer.
#[derive(Debug, Clone)]
pub(crate) struct LineMap<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineMap<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut starts = Vec::new();
        if !text.is_empty() {
            starts.push(0);
        }
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' && i + 1 < text.len() {
                starts.push(i + 1);
            }
        }
        Self { text, starts }
    }

    pub(crate) fn len(&self) -> usize {
        self.starts.len()
    }

    pub(crate) fn start(&self, line: usize) -> usize {
        self.starts[line]
    }

    pub(crate) fn line(&self, line: usize) -> &'a str {
        let start = self.starts[line];
        let end = self
            .starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        raw.strip_suffix('\r').unwrap_or(raw)
    }

    /// Line containing byte `offset`.
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        (0..self.len()).map(move |i| (i, self.line(i)))
    }
}

/// What a source line holds, as far as the editor is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineKind {
    Blank,
    FrontMatter,
    Comment,
    Annotation,
    Header,
    Accessibility,
    Subgraph,
    End,
    Direction,
    Style,
    ClassDef,
    Class,
    Click,
    LinkStyle,
    Statement,
}

impl LineKind {
    /// Lines that may define nodes or edges.
    pub fn is_statement(self) -> bool {
        self == LineKind::Statement
    }

    /// Lines whose `;`-separated tail may carry node or edge statements
    /// (`graph TD; A --> B`).
    fn may_chain(self) -> bool {
        matches!(
            self,
            LineKind::Statement
                | LineKind::Header
                | LineKind::Subgraph
                | LineKind::End
                | LineKind::Direction
        )
    }
}

/// Bracket, quote and pipe state while scanning a statement.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Nesting {
    pub depth: usize,
    quoted: bool,
    piped: bool,
}

impl Nesting {
    pub(crate) fn feed(&mut self, c: char) {
        match c {
            '"' => self.quoted = !self.quoted,
            _ if self.quoted => {}
            '[' | '(' | '{' => self.depth += 1,
            ']' | ')' | '}' => self.depth = self.depth.saturating_sub(1),
            '|' if self.depth == 0 => self.piped = !self.piped,
            _ => {}
        }
    }

    pub(crate) fn top_level(&self) -> bool {
        self.depth == 0 && !self.quoted && !self.piped
    }
}

/// Byte ranges of the `;`-separated statements of `line`, separators excluded.
///
/// A `;` inside brackets, quotes or an edge label does not separate. Blank pieces are
/// skipped.
pub(crate) fn statement_ranges(line: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut nesting = Nesting::default();
    let mut start = 0usize;
    for (i, c) in line.char_indices() {
        if c == ';' && nesting.top_level() {
            if !line[start..i].trim().is_empty() {
                out.push(start..i);
            }
            start = i + 1;
            continue;
        }
        nesting.feed(c);
    }
    if !line[start..].trim().is_empty() {
        out.push(start..line.len());
    }
    out
}

/// Pieces of `line` that may define nodes or edges, given the line's kind.
pub(crate) fn node_statements(line: &str, kind: LineKind) -> Vec<Range<usize>> {
    if !kind.may_chain() {
        return Vec::new();
    }
    statement_ranges(line)
        .into_iter()
        .filter(|r| classify_line(&line[r.clone()]) == LineKind::Statement)
        .collect()
}

/// Absolute ranges of every node or edge statement in the document, in order.
pub(crate) fn statement_regions(lines: &LineMap<'_>, kinds: &[LineKind]) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    for (i, line) in lines.iter() {
        let offset = lines.start(i);
        regions.extend(
            node_statements(line, kinds[i])
                .into_iter()
                .map(|r| offset + r.start..offset + r.end),
        );
    }
    regions
}

pub(crate) fn classify_line(line: &str) -> LineKind {
    let t = line.trim();
    if t.is_empty() {
        return LineKind::Blank;
    }
    if t.starts_with("%%") {
        if crate::index::annotations::parse_annotation(t).is_some() {
            return LineKind::Annotation;
        }
        return LineKind::Comment;
    }
    if starts_with_kw(t, "graph") || starts_with_kw(t, "flowchart") || t.starts_with("flowchart-elk")
    {
        return LineKind::Header;
    }
    if t.starts_with("accTitle") || t.starts_with("accDescr") {
        return LineKind::Accessibility;
    }
    let keywords = [
        ("subgraph", LineKind::Subgraph),
        ("end", LineKind::End),
        ("direction", LineKind::Direction),
        ("style", LineKind::Style),
        ("classDef", LineKind::ClassDef),
        ("class", LineKind::Class),
        ("click", LineKind::Click),
        ("linkStyle", LineKind::LinkStyle),
    ];
    for (kw, kind) in keywords {
        if starts_with_kw(t, kw) {
            return kind;
        }
    }
    LineKind::Statement
}

/// Classifies every line, tracking front matter and multi-line `accDescr { ... }` blocks.
pub(crate) fn classify_lines(lines: &LineMap<'_>) -> Vec<LineKind> {
    let mut kinds = Vec::with_capacity(lines.len());
    let mut in_front_matter = false;
    let mut in_acc_block = false;
    let mut seen_content = false;

    for (_, line) in lines.iter() {
        let t = line.trim();
        if in_front_matter {
            if t == "---" {
                in_front_matter = false;
            }
            kinds.push(LineKind::FrontMatter);
            continue;
        }
        if in_acc_block {
            if t.contains('}') {
                in_acc_block = false;
            }
            kinds.push(LineKind::Accessibility);
            continue;
        }
        if !seen_content && t == "---" {
            in_front_matter = true;
            seen_content = true;
            kinds.push(LineKind::FrontMatter);
            continue;
        }

        let kind = classify_line(line);
        if kind == LineKind::Accessibility {
            if let Some(after) = t.strip_prefix("accDescr") {
                let after = after.trim_start();
                if after.starts_with('{') && !after.contains('}') {
                    in_acc_block = true;
                }
            }
        }
        if kind != LineKind::Blank {
            seen_content = true;
        }
        kinds.push(kind);
    }
    kinds
}

pub(crate) fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
