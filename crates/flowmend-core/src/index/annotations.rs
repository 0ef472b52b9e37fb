//! Side annotations attached to nodes, stored as `%% @note <id>: <text>` comment lines.

use crate::lines::{LineKind, LineMap};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

pub const ANNOTATION_TAG: &str = "@note";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub node_id: String,
    pub text: String,
    pub line: usize,
}

fn annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*%%\s*@note\s+(?P<id>\w+)\s*:[ \t]?(?P<text>.*)$").expect("valid regex")
    })
}

/// Returns the id range and the text of an annotation line.
pub(crate) fn parse_annotation(line: &str) -> Option<(Range<usize>, String)> {
    let caps = annotation_re().captures(line)?;
    let id = caps.name("id")?.range();
    let text = caps.name("text")?.as_str().trim_end().to_string();
    Some((id, text))
}

pub(crate) fn render_annotation(indent: &str, node_id: &str, text: &str) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{indent}%% {ANNOTATION_TAG} {node_id}: {text}")
}

/// Collects annotations in document order; the last annotation for an id wins.
pub(crate) fn collect(lines: &LineMap<'_>, kinds: &[LineKind]) -> IndexMap<String, Annotation> {
    let mut out = IndexMap::new();
    for (i, line) in lines.iter() {
        if kinds[i] != LineKind::Annotation {
            continue;
        }
        let Some((id, text)) = parse_annotation(line) else {
            continue;
        };
        let node_id = line[id].to_string();
        out.insert(
            node_id.clone(),
            Annotation {
                node_id,
                text,
                line: i,
            },
        );
    }
    out
}
