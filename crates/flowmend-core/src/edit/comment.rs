use super::buffer::TextBuffer;
use super::require_node;
use crate::error::Result;
use crate::index::GraphIndex;
use crate::index::annotations::{parse_annotation, render_annotation};
use crate::lines::{LineKind, LineMap, leading_whitespace};

/// Sets the node's annotation, or removes it when `comment` is blank.
///
/// A new annotation goes right below the line that defines the node.
pub(super) fn add_comment(
    text: &str,
    index: &GraphIndex,
    node_id: &str,
    comment: &str,
) -> Result<String> {
    let node = require_node(index, node_id)?;
    let comment = comment.trim();
    let lines = LineMap::new(text);
    let mut buf = TextBuffer::new(text);

    let existing: Vec<usize> = lines
        .iter()
        .filter(|(i, _)| index.line_kinds[*i] == LineKind::Annotation)
        .filter(|(_, line)| parse_annotation(line).is_some_and(|(r, _)| &line[r] == node_id))
        .map(|(i, _)| i)
        .collect();

    let (first, rest) = match existing.split_first() {
        Some((first, rest)) if !comment.is_empty() => (Some(*first), rest),
        _ => (None, existing.as_slice()),
    };
    for &line in rest {
        buf.remove(line);
    }
    if comment.is_empty() {
        return Ok(buf.finish());
    }

    match first {
        Some(line) => {
            let indent = leading_whitespace(lines.line(line));
            buf.replace(line, render_annotation(indent, node_id, comment));
        }
        None => {
            let indent = leading_whitespace(lines.line(node.source_line));
            let last = lines.line_of(node.span.end.saturating_sub(1));
            buf.insert_after(last, render_annotation(indent, node_id, comment));
        }
    }
    Ok(buf.finish())
}
