#![forbid(unsafe_code)]

//! Mermaid flowchart text editing engine (headless).
//!
//! The document text is the only source of truth. [`index`] derives a node/edge view from it,
//! [`apply`] rewrites exactly the spans an [`EditOp`] touches, and [`format()`] normalizes
//! layout. All three are pure `text -> value` functions; [`IndexCache`] and [`Editor`] add
//! memoization for hosts that re-read the same text often.

pub mod cache;
pub mod config;
pub mod edit;
pub mod error;
pub mod format;
pub mod ids;
pub mod index;
mod lines;
pub mod pattern;

pub use cache::{CacheStats, Editor, IndexCache};
pub use config::{ConfigLayers, EditorConfig, FormatOptions, IdOptions};
pub use edit::{Applied, EditOp, apply, apply_with};
pub use error::{ConfigError, EditError, Result};
pub use format::{format, format_with};
pub use ids::IdGenerator;
pub use index::{
    Annotation, Diagnostic, DiagnosticKind, EdgeDescriptor, GraphIndex, NodeDescriptor, index,
};
pub use lines::LineKind;
pub use pattern::{EdgeStyle, Icon, NodeContent, ShapeKind};

#[cfg(test)]
mod tests;
