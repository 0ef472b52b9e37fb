//! Atomic text edits addressed by node and edge id.
//!
//! Every entry point re-indexes the text it is given, so node spans, edge ordinals and
//! `linkStyle` indexes are never carried over from a previous version of the document.
//! A rejected edit returns an [`EditError`] and no text.

mod buffer;
mod comment;
mod edge;
mod insert;
mod node;
mod statements;

use crate::config::EditorConfig;
use crate::error::{EditError, Result};
use crate::index::{EdgeDescriptor, GraphIndex, NodeDescriptor, index};
use crate::pattern::{EdgeStyle, ShapeKind};
use serde::{Deserialize, Serialize};

/// One mutation request, as a host would send it.
///
/// Serialized with an `op` tag: `{"op":"changeNodeType","nodeId":"B","shape":"hexagon"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOp {
    ChangeNodeType {
        node_id: String,
        shape: ShapeKind,
    },
    RenameNodeText {
        node_id: String,
        text: String,
    },
    RenameNodeId {
        old_id: String,
        new_id: String,
    },
    ChangeEdgeType {
        edge_id: String,
        style: EdgeStyle,
    },
    RetargetEdge {
        edge_id: String,
        target_id: String,
    },
    /// An empty style removes the edge's `linkStyle`.
    ColorizeEdge {
        edge_id: String,
        style: String,
    },
    /// An empty style removes the node's `style` line.
    ColorizeNode {
        node_id: String,
        style: String,
    },
    DeleteNode {
        node_id: String,
    },
    DeleteEdge {
        edge_id: String,
    },
    InsertNode {
        shape: ShapeKind,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        connect_from: Option<String>,
    },
    InsertEdge {
        source_id: String,
        target_id: String,
        #[serde(default = "default_edge_style")]
        style: EdgeStyle,
        #[serde(default)]
        label: Option<String>,
    },
    /// An empty text removes the annotation.
    AddComment {
        node_id: String,
        text: String,
    },
}

fn default_edge_style() -> EdgeStyle {
    EdgeStyle::Solid
}

impl EditOp {
    pub fn name(&self) -> &'static str {
        match self {
            EditOp::ChangeNodeType { .. } => "changeNodeType",
            EditOp::RenameNodeText { .. } => "renameNodeText",
            EditOp::RenameNodeId { .. } => "renameNodeId",
            EditOp::ChangeEdgeType { .. } => "changeEdgeType",
            EditOp::RetargetEdge { .. } => "retargetEdge",
            EditOp::ColorizeEdge { .. } => "colorizeEdge",
            EditOp::ColorizeNode { .. } => "colorizeNode",
            EditOp::DeleteNode { .. } => "deleteNode",
            EditOp::DeleteEdge { .. } => "deleteEdge",
            EditOp::InsertNode { .. } => "insertNode",
            EditOp::InsertEdge { .. } => "insertEdge",
            EditOp::AddComment { .. } => "addComment",
        }
    }
}

/// Result of a successful edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applied {
    pub text: String,
    /// Id generated for an inserted node.
    pub created_id: Option<String>,
}

impl Applied {
    fn from_text(text: String) -> Self {
        Self {
            text,
            created_id: None,
        }
    }
}

pub(crate) fn require_node<'a>(index: &'a GraphIndex, id: &str) -> Result<&'a NodeDescriptor> {
    index.node(id).ok_or_else(|| EditError::NodeNotFound { id: id.to_string() })
}

pub(crate) fn require_edge<'a>(index: &'a GraphIndex, id: &str) -> Result<&'a EdgeDescriptor> {
    index.edge(id).ok_or_else(|| EditError::EdgeNotFound { id: id.to_string() })
}

/// Applies `op` to `text` with the default configuration.
pub fn apply(text: &str, op: &EditOp) -> Result<Applied> {
    apply_with(text, op, &EditorConfig::default())
}

pub fn apply_with(text: &str, op: &EditOp, config: &EditorConfig) -> Result<Applied> {
    apply_indexed(text, &index(text), op, config)
}

/// `index` must have been built from exactly `text`.
pub(crate) fn apply_indexed(
    text: &str,
    index: &GraphIndex,
    op: &EditOp,
    config: &EditorConfig,
) -> Result<Applied> {
    let result = match op {
        EditOp::ChangeNodeType { node_id, shape } => {
            node::change_node_type(text, index, node_id, *shape).map(Applied::from_text)
        }
        EditOp::RenameNodeText { node_id, text: new } => {
            node::rename_node_text(text, index, node_id, new).map(Applied::from_text)
        }
        EditOp::RenameNodeId { old_id, new_id } => {
            node::rename_node_id(text, index, old_id, new_id).map(Applied::from_text)
        }
        EditOp::ChangeEdgeType { edge_id, style } => {
            edge::change_edge_type(text, index, edge_id, *style).map(Applied::from_text)
        }
        EditOp::RetargetEdge { edge_id, target_id } => {
            edge::retarget_edge(text, index, edge_id, target_id).map(Applied::from_text)
        }
        EditOp::ColorizeEdge { edge_id, style } => {
            edge::colorize_edge(text, index, edge_id, style).map(Applied::from_text)
        }
        EditOp::ColorizeNode { node_id, style } => {
            node::colorize_node(text, index, node_id, style).map(Applied::from_text)
        }
        EditOp::DeleteNode { node_id } => {
            node::delete_node(text, index, node_id).map(Applied::from_text)
        }
        EditOp::DeleteEdge { edge_id } => {
            edge::delete_edge(text, index, edge_id).map(Applied::from_text)
        }
        EditOp::InsertNode {
            shape,
            text: label,
            connect_from,
        } => insert::insert_node(
            text,
            index,
            &config.ids,
            *shape,
            label.as_deref(),
            connect_from.as_deref(),
        ),
        EditOp::InsertEdge {
            source_id,
            target_id,
            style,
            label,
        } => edge::insert_edge(text, index, source_id, target_id, *style, label.as_deref())
            .map(Applied::from_text),
        EditOp::AddComment { node_id, text: comment } => {
            comment::add_comment(text, index, node_id, comment).map(Applied::from_text)
        }
    };

    match &result {
        Ok(applied) => tracing::debug!(
            op = op.name(),
            changed = applied.text != text,
            "applied edit"
        ),
        Err(err) => tracing::debug!(op = op.name(), error = %err, "edit rejected"),
    }
    result
}
