//! Layout normalizer: merges statements split across lines and re-indents the result.
//!
//! Only whitespace, line breaks and statement separators change; ids, labels and styles are
//! emitted exactly as written. `format(format(x)) == format(x)` for every input.

use crate::config::FormatOptions;
use crate::lines::{LineKind, Nesting, classify_line};
use regex::Regex;
use std::sync::OnceLock;

/// Formats `text` with the default options (two-space indent).
pub fn format(text: &str) -> String {
    format_with(text, &FormatOptions::default())
}

pub fn format_with(text: &str, options: &FormatOptions) -> String {
    let mut segments = segments(text, options.split_statements);
    if options.max_blank_lines == 0 {
        // Blank runs are dropped on output; fragments on either side must merge now.
        segments.retain(|seg| *seg != Segment::Blank);
    }
    let segments = merge_fragments(segments);
    let lines = emit(segments, options);

    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = lines.join(newline);
    if text.ends_with('\n') && !out.is_empty() {
        out.push_str(newline);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Front matter, copied unchanged.
    Verbatim(String),
    Blank,
    /// `%%{init: ...}%%`
    Directive(String),
    Comment(String),
    /// One statement; continuation lines of an unclosed bracket follow after `\n`.
    Statement(String),
}

fn push_piece(out: &mut Vec<Segment>, piece: &mut String) {
    let t = piece.trim();
    if !t.is_empty() {
        out.push(Segment::Statement(t.to_string()));
    }
    piece.clear();
}

/// Splits the text into segments: one per statement, with `;` separators resolved and
/// multi-line labels kept together.
fn segments(text: &str, split_statements: bool) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut in_front_matter = false;
    let mut seen_content = false;
    let mut piece = String::new();
    let mut nesting = Nesting::default();
    let mut open = false;

    for raw in text.lines() {
        let line = raw.trim_end();
        if in_front_matter {
            if line.trim() == "---" {
                in_front_matter = false;
            }
            out.push(Segment::Verbatim(line.to_string()));
            continue;
        }

        if open {
            piece.push('\n');
        } else {
            let t = line.trim();
            if t.is_empty() {
                out.push(Segment::Blank);
                continue;
            }
            if !seen_content && t == "---" {
                in_front_matter = true;
                seen_content = true;
                out.push(Segment::Verbatim(t.to_string()));
                continue;
            }
            seen_content = true;
            if t.starts_with("%%{") {
                out.push(Segment::Directive(t.to_string()));
                continue;
            }
            if t.starts_with("%%") {
                out.push(Segment::Comment(t.to_string()));
                continue;
            }
        }

        for c in line.chars() {
            if c == ';' && split_statements && nesting.top_level() {
                push_piece(&mut out, &mut piece);
                continue;
            }
            nesting.feed(c);
            piece.push(c);
        }

        open = nesting.depth > 0;
        if !open {
            nesting = Nesting::default();
            push_piece(&mut out, &mut piece);
        }
    }
    if open {
        push_piece(&mut out, &mut piece);
    }
    out
}

struct FragmentRegexes {
    direction: Regex,
    dangling: Regex,
    leading: Regex,
}

fn fragment_regexes() -> &'static FragmentRegexes {
    static RES: OnceLock<FragmentRegexes> = OnceLock::new();
    RES.get_or_init(|| FragmentRegexes {
        direction: Regex::new(r"^(?:TB|TD|BT|RL|LR)$").expect("valid regex"),
        dangling: Regex::new(r"(?:<?(?:-{2,}|-\.+-*|={2,})[>xo]?|~{3,}|\|[^|]*\|)$")
            .expect("valid regex"),
        leading: Regex::new(r"^(?:<?(?:-{2,}|-\.|={2,})|~{3,})").expect("valid regex"),
    })
}

fn first_line(s: &str) -> &str {
    s.split('\n').next().unwrap_or(s)
}

fn is_bare_header(s: &str) -> bool {
    matches!(s, "graph" | "flowchart" | "flowchart-elk")
}

/// How `cur` continues `prev`, if it is a fragment of the same statement.
fn join_separator(prev: &str, cur: &str) -> Option<&'static str> {
    let res = fragment_regexes();
    let cur_kind = classify_line(first_line(cur));
    if is_bare_header(prev) && res.direction.is_match(cur) {
        return Some(" ");
    }
    if prev == "subgraph" && cur_kind == LineKind::Statement {
        return Some(" ");
    }
    if classify_line(first_line(prev)) != LineKind::Statement || cur_kind != LineKind::Statement {
        return None;
    }
    if cur.starts_with('|') {
        return Some("");
    }
    if res.dangling.is_match(prev) || res.leading.is_match(cur) {
        return Some(" ");
    }
    None
}

fn merge_fragments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if let (Segment::Statement(cur), Some(Segment::Statement(prev))) = (&seg, out.last_mut()) {
            if let Some(sep) = join_separator(prev, cur) {
                prev.push_str(sep);
                prev.push_str(cur);
                continue;
            }
        }
        out.push(seg);
    }
    out
}

fn emit(segments: Vec<Segment>, options: &FormatOptions) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut pending_blanks = 0usize;
    let mut header_seen = false;
    let mut nest = 0usize;
    let pad = |level: usize| " ".repeat(level * options.indent);

    for seg in segments {
        if seg == Segment::Blank {
            pending_blanks += 1;
            continue;
        }
        if !out.is_empty() {
            for _ in 0..pending_blanks.min(options.max_blank_lines) {
                out.push(String::new());
            }
        }
        pending_blanks = 0;

        let base = usize::from(header_seen);
        match seg {
            Segment::Blank => {}
            Segment::Verbatim(line) | Segment::Directive(line) => out.push(line),
            Segment::Comment(line) => out.push(format!("{}{line}", pad(base + nest))),
            Segment::Statement(stmt) => {
                let level = match classify_line(first_line(&stmt)) {
                    LineKind::Header => {
                        header_seen = true;
                        nest = 0;
                        0
                    }
                    LineKind::Subgraph => {
                        nest += 1;
                        base + nest - 1
                    }
                    LineKind::End => {
                        nest = nest.saturating_sub(1);
                        base + nest
                    }
                    _ => base + nest,
                };
                let mut lines = stmt.split('\n');
                if let Some(first) = lines.next() {
                    out.push(format!("{}{first}", pad(level)));
                }
                out.extend(lines.map(str::to_string));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolons_inside_labels_do_not_split() {
        let segs = segments(r#"A["x;y"] -->|a;b| B; C(c;d)"#, true);
        assert_eq!(
            segs,
            vec![
                Segment::Statement(r#"A["x;y"] -->|a;b| B"#.to_string()),
                Segment::Statement("C(c;d)".to_string()),
            ]
        );
    }

    #[test]
    fn operator_fragments_join_their_neighbours() {
        assert_eq!(join_separator("A -->", "B"), Some(" "));
        assert_eq!(join_separator("A -->", "|yes| B"), Some(""));
        assert_eq!(join_separator("A", "--> B"), Some(" "));
        assert_eq!(join_separator("A --> B", "C"), None);
        assert_eq!(join_separator("A -->", "end"), None);
        assert_eq!(join_separator("graph", "LR"), Some(" "));
        assert_eq!(join_separator("subgraph", "one [Title]"), Some(" "));
    }
}
