//! Node-shape and link-operator grammar.
//!
//! Both indexers and the mutation engine go through this module, so the text an index entry
//! was extracted from and the text an edit writes back always agree on delimiters.

mod edge;
mod shape;

pub use edge::{Connector, EdgeStyle, Stroke, UnknownEdgeStyle};
pub use shape::{
    Icon, NodeContent, SHAPE_PRECEDENCE, ShapeKind, ShapeMatch, UnknownShape, match_node,
    needs_quotes, node_ref_fragment, synthesize, synthesize_content,
};

/// Mermaid statement keywords that can never be used as node ids.
pub const RESERVED_WORDS: [&str; 10] = [
    "end",
    "graph",
    "flowchart",
    "subgraph",
    "style",
    "classDef",
    "class",
    "click",
    "linkStyle",
    "direction",
];

pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !RESERVED_WORDS.contains(&id)
}

/// Whether `input` begins with the keyword `kw` followed by a non-identifier character.
pub(crate) fn starts_with_kw(input: &str, kw: &str) -> bool {
    let Some(rest) = input.strip_prefix(kw) else {
        return false;
    };
    match rest.as_bytes().first() {
        None => true,
        Some(b) => !b.is_ascii_alphanumeric() && *b != b'_' && *b != b'-',
    }
}
