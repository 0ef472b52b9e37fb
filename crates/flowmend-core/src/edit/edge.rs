use super::buffer::{TextBuffer, splice};
use super::statements::{LinkStyleLine, clean_style};
use super::{require_edge, require_node};
use crate::error::{EditError, Result};
use crate::index::{EdgeDescriptor, GraphIndex};
use crate::lines::{LineKind, LineMap, leading_whitespace, statement_ranges};
use crate::pattern::EdgeStyle;
use rustc_hash::FxHashSet;
use std::ops::Range;

/// What happens to one edge when its line is rebuilt.
pub(super) enum Fate {
    Keep,
    Drop,
    /// Emit this text (source endpoint included) on a line of its own.
    Replace(String),
}

/// Operator plus optional label between two endpoints, e.g. ` -->|yes| `.
fn render_connector(style: EdgeStyle, label: Option<&str>) -> String {
    match label.filter(|l| !l.is_empty() && !style.is_invisible()) {
        Some(label) => format!(
            " {}|{}| ",
            style.operator(),
            label.replace('|', "#124;").replace('"', "#quot;")
        ),
        None => format!(" {} ", style.operator()),
    }
}

fn referenced_elsewhere(index: &GraphIndex, id: &str, statement: &Range<usize>) -> bool {
    index
        .occurrences_of(id)
        .any(|o| !statement.contains(&o.span.start))
        || index
            .references_of(id)
            .any(|r| !statement.contains(&r.span.start))
}

/// Whether the statement at `statement` (absolute) defines or names `id`.
fn mentions(index: &GraphIndex, id: &str, statement: &Range<usize>) -> bool {
    index
        .occurrences_of(id)
        .any(|o| statement.contains(&o.span.start))
        || index
            .references_of(id)
            .any(|r| statement.contains(&r.span.start))
}

/// Re-emits `line` with each edge's [`Fate`] applied.
///
/// Runs of kept edges stay chained. An endpoint that loses all its edges survives as a
/// standalone statement when it carries a shape, or when the node would otherwise disappear
/// from the document. Endpoints of `drop_node` never survive, nor do edge-free statements
/// that name it. A line holding several `;`-separated statements stays one line.
pub(super) fn rebuild_line(
    index: &GraphIndex,
    lines: &LineMap<'_>,
    line: usize,
    mut fate: impl FnMut(&EdgeDescriptor) -> Fate,
    drop_node: Option<&str>,
) -> Vec<String> {
    let raw = lines.line(line);
    let offset = lines.start(line);
    let indent = leading_whitespace(raw);
    let statements = statement_ranges(raw);

    let mut pieces: Vec<String> = Vec::new();
    for statement in &statements {
        let absolute = offset + statement.start..offset + statement.end;
        let edges: Vec<&EdgeDescriptor> = index
            .edges
            .values()
            .filter(|e| e.line_number == line && statement.contains(&e.source_span.start))
            .collect();
        if !edges.is_empty() {
            pieces.extend(rebuild_statement(index, raw, &absolute, &edges, &mut fate, drop_node));
        } else if !drop_node.is_some_and(|id| mentions(index, id, &absolute)) {
            pieces.push(raw[statement.clone()].trim().to_string());
        }
    }

    if statements.len() > 1 && !pieces.is_empty() {
        return vec![format!("{indent}{}", pieces.join("; "))];
    }
    pieces
        .into_iter()
        .map(|text| format!("{indent}{text}"))
        .collect()
}

/// Rebuilds one edge statement into standalone pieces, in source order.
fn rebuild_statement(
    index: &GraphIndex,
    raw: &str,
    statement: &Range<usize>,
    edges: &[&EdgeDescriptor],
    fate: &mut impl FnMut(&EdgeDescriptor) -> Fate,
    drop_node: Option<&str>,
) -> Vec<String> {
    let mut pieces: Vec<(usize, String)> = Vec::new();
    let mut covered: Vec<Range<usize>> = Vec::new();
    let mut kept_ids: FxHashSet<&str> = FxHashSet::default();
    let mut chain: Option<(usize, String, Range<usize>)> = None;

    for &edge in edges {
        match fate(edge) {
            Fate::Keep => {
                match chain.as_mut() {
                    Some((_, text, last)) if *last == edge.source_span => {
                        text.push_str(edge.connector_text());
                        text.push_str(edge.target_def());
                        *last = edge.target_span.clone();
                    }
                    _ => {
                        if let Some((start, text, _)) = chain.take() {
                            pieces.push((start, text));
                        }
                        chain = Some((
                            edge.source_span.start,
                            format!(
                                "{}{}{}",
                                edge.source_def(),
                                edge.connector_text(),
                                edge.target_def()
                            ),
                            edge.target_span.clone(),
                        ));
                    }
                }
                covered.push(edge.source_span.clone());
                covered.push(edge.target_span.clone());
                kept_ids.insert(edge.source_id.as_str());
                kept_ids.insert(edge.target_id.as_str());
            }
            Fate::Drop => {
                if let Some((start, text, _)) = chain.take() {
                    pieces.push((start, text));
                }
            }
            Fate::Replace(text) => {
                if let Some((start, text, _)) = chain.take() {
                    pieces.push((start, text));
                }
                pieces.push((edge.source_span.start, text));
                covered.push(edge.source_span.clone());
                kept_ids.insert(edge.source_id.as_str());
            }
        }
    }
    if let Some((start, text, _)) = chain.take() {
        pieces.push((start, text));
    }

    for &edge in edges {
        for (id, span) in [
            (edge.source_id.as_str(), &edge.source_span),
            (edge.target_id.as_str(), &edge.target_span),
        ] {
            if Some(id) == drop_node || covered.contains(span) {
                continue;
            }
            let def = &raw[span.clone()];
            let shaped = def != id;
            if shaped || !(kept_ids.contains(id) || referenced_elsewhere(index, id, statement)) {
                covered.push(span.clone());
                pieces.push((span.start, def.to_string()));
            }
        }
    }

    pieces.sort_by_key(|(start, _)| *start);
    pieces.into_iter().map(|(_, text)| text).collect()
}

fn rebuild_single(
    index: &GraphIndex,
    text: &str,
    edge: &EdgeDescriptor,
    replacement: Fate,
) -> String {
    let mut replacement = Some(replacement);
    let lines = rebuild_line(
        index,
        &LineMap::new(text),
        edge.line_number,
        |e| {
            if e.id == edge.id {
                replacement.take().unwrap_or(Fate::Drop)
            } else {
                Fate::Keep
            }
        },
        None,
    );
    let mut buf = TextBuffer::new(text);
    buf.replace_with(edge.line_number, lines);
    buf.finish()
}

/// Drops `link_index` from every `linkStyle` line that names it.
pub(super) fn remove_link_style(buf: &mut TextBuffer, kinds: &[LineKind], link_index: usize) {
    for i in 0..buf.len() {
        if kinds.get(i) != Some(&LineKind::LinkStyle) {
            continue;
        }
        let Some(parsed) = LinkStyleLine::parse(buf.line(i)) else {
            continue;
        };
        if !parsed.targets_index(link_index) {
            continue;
        }
        match parsed.without(link_index) {
            Some(rest) => buf.replace(i, rest.render()),
            None => buf.remove(i),
        }
    }
}

pub(super) fn change_edge_type(
    text: &str,
    index: &GraphIndex,
    edge_id: &str,
    style: EdgeStyle,
) -> Result<String> {
    let edge = require_edge(index, edge_id)?;

    if style.is_self() && !edge.is_self_loop() {
        let replacement = format!(
            "{}{}{}",
            edge.source_def(),
            render_connector(style, edge.label.as_deref()),
            edge.source_id
        );
        return Ok(rebuild_single(index, text, edge, Fate::Replace(replacement)));
    }

    let connector = render_connector(style, edge.label.as_deref());
    let spliced = splice(text, vec![(edge.absolute(&edge.connector), connector)]);
    if !style.is_invisible() {
        return Ok(spliced);
    }

    // A surviving linkStyle would draw the invisible edge again.
    let mut buf = TextBuffer::new(&spliced);
    remove_link_style(&mut buf, &index.line_kinds, edge.link_index);
    Ok(buf.finish())
}

pub(super) fn retarget_edge(
    text: &str,
    index: &GraphIndex,
    edge_id: &str,
    target_id: &str,
) -> Result<String> {
    let edge = require_edge(index, edge_id)?;
    require_node(index, target_id)?;
    if edge.target_id == target_id {
        return Ok(text.to_string());
    }
    let replacement = format!("{}{}{}", edge.source_def(), edge.connector_text(), target_id);
    Ok(rebuild_single(index, text, edge, Fate::Replace(replacement)))
}

pub(super) fn colorize_edge(
    text: &str,
    index: &GraphIndex,
    edge_id: &str,
    style: &str,
) -> Result<String> {
    let edge = require_edge(index, edge_id)?;
    if edge.style_kind.is_invisible() {
        return Err(EditError::InvisibleEdgeStyle {
            edge_id: edge.id.clone(),
        });
    }
    let style = clean_style(style);
    let k = edge.link_index;
    let kinds = &index.line_kinds;

    let mut buf = TextBuffer::new(text);
    let mut written = style.is_empty();
    for i in 0..buf.len() {
        if kinds.get(i) != Some(&LineKind::LinkStyle) {
            continue;
        }
        let Some(parsed) = LinkStyleLine::parse(buf.line(i)) else {
            continue;
        };
        if !parsed.targets_index(k) {
            continue;
        }
        if !written && parsed.targets.as_deref() == Some(&[k][..]) {
            buf.replace(
                i,
                LinkStyleLine {
                    style: style.to_string(),
                    ..parsed
                }
                .render(),
            );
            written = true;
            continue;
        }
        match parsed.without(k) {
            Some(rest) => buf.replace(i, rest.render()),
            None => buf.remove(i),
        }
    }
    if !written {
        let indent = buf.statement_indent(kinds);
        buf.push(format!("{indent}linkStyle {k} {style}"));
    }
    Ok(buf.finish())
}

pub(super) fn delete_edge(text: &str, index: &GraphIndex, edge_id: &str) -> Result<String> {
    let edge = require_edge(index, edge_id)?;
    let lines = rebuild_line(
        index,
        &LineMap::new(text),
        edge.line_number,
        |e| {
            if e.id == edge.id {
                Fate::Drop
            } else {
                Fate::Keep
            }
        },
        None,
    );
    let mut buf = TextBuffer::new(text);
    buf.replace_with(edge.line_number, lines);
    Ok(buf.finish())
}

pub(super) fn insert_edge(
    text: &str,
    index: &GraphIndex,
    source_id: &str,
    target_id: &str,
    style: EdgeStyle,
    label: Option<&str>,
) -> Result<String> {
    require_node(index, source_id)?;
    require_node(index, target_id)?;
    let mut buf = TextBuffer::new(text);
    let indent = buf.statement_indent(&index.line_kinds);
    buf.push(format!(
        "{indent}{source_id}{}{target_id}",
        render_connector(style, label)
    ));
    Ok(buf.finish())
}
