use super::buffer::TextBuffer;
use super::{Applied, require_node};
use crate::config::IdOptions;
use crate::error::Result;
use crate::ids::IdGenerator;
use crate::index::GraphIndex;
use crate::pattern::{EdgeStyle, ShapeKind, synthesize};

const NEW_DOCUMENT_HEADER: &str = "flowchart TD";

/// Appends a new node, optionally connected from an existing one, under a fresh id.
pub(super) fn insert_node(
    text: &str,
    index: &GraphIndex,
    ids: &IdOptions,
    kind: ShapeKind,
    label: Option<&str>,
    connect_from: Option<&str>,
) -> Result<Applied> {
    if let Some(from) = connect_from {
        require_node(index, from)?;
    }
    let label = label.map(str::trim).filter(|l| !l.is_empty());
    let id = IdGenerator::with_options(index, ids.clone()).generate(kind, label);
    let def = format!("{id}{}", synthesize(kind, label.unwrap_or_default()));

    let mut buf = TextBuffer::new(text);
    let indent = if text.trim().is_empty() {
        buf.push(NEW_DOCUMENT_HEADER.to_string());
        "    ".to_string()
    } else {
        buf.statement_indent(&index.line_kinds)
    };
    let line = match connect_from {
        Some(from) => format!("{indent}{from} {} {def}", EdgeStyle::Solid.operator()),
        None => format!("{indent}{def}"),
    };
    buf.push(line);

    tracing::debug!(id = %id, kind = %kind, "inserted node");
    Ok(Applied {
        text: buf.finish(),
        created_id: Some(id),
    })
}
