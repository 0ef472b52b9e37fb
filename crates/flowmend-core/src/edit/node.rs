use super::buffer::{TextBuffer, splice};
use super::edge::{Fate, rebuild_line};
use super::require_node;
use super::statements::{class_line_without, clean_style, target_ranges, targets};
use crate::error::{EditError, Result};
use crate::index::GraphIndex;
use crate::index::annotations::parse_annotation;
use crate::lines::{LineKind, LineMap, leading_whitespace};
use crate::pattern::{
    NodeContent, ShapeKind, is_valid_id, needs_quotes, synthesize, synthesize_content,
};
use std::collections::BTreeSet;
use std::ops::Range;

/// Redraws every shaped occurrence of the node with the delimiters of `kind`.
///
/// A node that is only referenced by id gets the shape attached to its first reference,
/// labelled with the id so that the displayed text stays the same.
pub(super) fn change_node_type(
    text: &str,
    index: &GraphIndex,
    node_id: &str,
    kind: ShapeKind,
) -> Result<String> {
    let node = require_node(index, node_id)?;
    let mut edits: Vec<(Range<usize>, String)> = index
        .occurrences_of(node_id)
        .map(|occ| (occ.id_span.end..occ.span.end, synthesize_content(kind, &occ.content)))
        .collect();
    if edits.is_empty() {
        let at = node.span.end;
        edits.push((at..at, synthesize(kind, &node.display_text)));
    }
    Ok(splice(text, edits))
}

pub(super) fn rename_node_text(
    text: &str,
    index: &GraphIndex,
    node_id: &str,
    new_text: &str,
) -> Result<String> {
    let node = require_node(index, node_id)?;
    let mut edits: Vec<(Range<usize>, String)> = index
        .occurrences_of(node_id)
        .map(|occ| {
            let content = NodeContent {
                icon: occ.content.icon,
                text: new_text.to_string(),
                quoted: occ.content.quoted || needs_quotes(new_text),
            };
            (occ.inner.clone(), content.render())
        })
        .collect();
    if edits.is_empty() {
        let at = node.span.end;
        edits.push((at..at, synthesize(ShapeKind::Rectangle, new_text)));
    }
    Ok(splice(text, edits))
}

/// Renames every code occurrence of `old_id`: definitions, edge endpoints, `style`, `class`
/// and `click` targets and annotations. Label text is left alone.
pub(super) fn rename_node_id(
    text: &str,
    index: &GraphIndex,
    old_id: &str,
    new_id: &str,
) -> Result<String> {
    require_node(index, old_id)?;
    if new_id == old_id {
        return Ok(text.to_string());
    }
    if !is_valid_id(new_id) {
        return Err(EditError::InvalidId {
            id: new_id.to_string(),
        });
    }
    if index.is_id_used(new_id) {
        return Err(EditError::DuplicateId {
            id: new_id.to_string(),
        });
    }

    let mut ranges: Vec<Range<usize>> = index
        .occurrences_of(old_id)
        .map(|o| o.id_span.clone())
        .chain(index.references_of(old_id).map(|r| r.span.clone()))
        .collect();

    let lines = LineMap::new(text);
    for (i, line) in lines.iter() {
        let start = lines.start(i);
        let kind = index.line_kinds[i];
        let found = match kind {
            LineKind::Style | LineKind::Class | LineKind::Click => target_ranges(line, kind),
            LineKind::Annotation => parse_annotation(line)
                .map(|(range, _)| vec![range])
                .unwrap_or_default(),
            _ => continue,
        };
        ranges.extend(
            found
                .into_iter()
                .filter(|r| &line[r.clone()] == old_id)
                .map(|r| start + r.start..start + r.end),
        );
    }

    ranges.sort_by_key(|r| r.start);
    ranges.dedup();
    Ok(splice(
        text,
        ranges.into_iter().map(|r| (r, new_id.to_string())).collect(),
    ))
}

/// Removes the node with its connections, `style`/`click` lines, `class` targets and
/// annotation. Other edges sharing a chain with the node are kept.
pub(super) fn delete_node(text: &str, index: &GraphIndex, node_id: &str) -> Result<String> {
    require_node(index, node_id)?;
    let lines = LineMap::new(text);
    let kinds = &index.line_kinds;
    let mut buf = TextBuffer::new(text);

    let touches = |source: &str, target: &str| source == node_id || target == node_id;
    let mut rebuilt: BTreeSet<usize> = index
        .edges
        .values()
        .filter(|e| touches(e.source_id.as_str(), e.target_id.as_str()))
        .map(|e| e.line_number)
        .collect();
    let edge_lines = rebuilt.clone();

    for occ in index.occurrences_of(node_id) {
        let last = lines.line_of(occ.span.end.saturating_sub(1));
        if last == occ.line {
            rebuilt.insert(occ.line);
        } else if !edge_lines.contains(&occ.line) {
            buf.remove_range(occ.line..last + 1);
        }
    }
    rebuilt.extend(index.references_of(node_id).map(|r| r.line));

    for &line in &rebuilt {
        let replacement = rebuild_line(
            index,
            &lines,
            line,
            |e| {
                if touches(e.source_id.as_str(), e.target_id.as_str()) {
                    Fate::Drop
                } else {
                    Fate::Keep
                }
            },
            Some(node_id),
        );
        buf.replace_with(line, replacement);
    }

    for (i, line) in lines.iter() {
        match kinds[i] {
            kind @ (LineKind::Style | LineKind::Click) if targets(line, kind, node_id) => {
                buf.remove(i);
            }
            LineKind::Class if targets(line, LineKind::Class, node_id) => {
                match class_line_without(line, node_id) {
                    Some(rest) => buf.replace(i, rest),
                    None => buf.remove(i),
                }
            }
            LineKind::Annotation => {
                if parse_annotation(line).is_some_and(|(r, _)| &line[r] == node_id) {
                    buf.remove(i);
                }
            }
            _ => {}
        }
    }

    Ok(buf.finish())
}

/// Upserts the node's `style` line; an empty style removes it.
pub(super) fn colorize_node(
    text: &str,
    index: &GraphIndex,
    node_id: &str,
    style: &str,
) -> Result<String> {
    require_node(index, node_id)?;
    let style = clean_style(style);
    let kinds = &index.line_kinds;
    let mut buf = TextBuffer::new(text);

    let mut written = style.is_empty();
    for i in 0..buf.len() {
        if kinds.get(i) != Some(&LineKind::Style) || !targets(buf.line(i), LineKind::Style, node_id)
        {
            continue;
        }
        if written {
            buf.remove(i);
            continue;
        }
        let indent = leading_whitespace(buf.line(i)).to_string();
        buf.replace(i, format!("{indent}style {node_id} {style}"));
        written = true;
    }
    if !written {
        let indent = buf.statement_indent(kinds);
        buf.push(format!("{indent}style {node_id} {style}"));
    }
    Ok(buf.finish())
}
