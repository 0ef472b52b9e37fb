use crate::config::EditorConfig;
use crate::edit::{Applied, EditOp, apply_indexed};
use crate::error::Result;
use crate::ids::IdGenerator;
use crate::index::{GraphIndex, index};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes the index of the most recent text value.
///
/// A lookup with different text rebuilds the index, so an entry can never outlive the text
/// it was built from.
#[derive(Debug, Default)]
pub struct IndexCache {
    last: Option<(String, Arc<GraphIndex>)>,
    stats: CacheStats,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, text: &str) -> Arc<GraphIndex> {
        if let Some((cached_text, cached)) = &self.last {
            if cached_text == text {
                self.stats.hits += 1;
                tracing::trace!("index cache hit");
                return Arc::clone(cached);
            }
        }
        self.stats.misses += 1;
        tracing::trace!(len = text.len(), "index cache miss");
        let fresh = Arc::new(index(text));
        self.last = Some((text.to_string(), Arc::clone(&fresh)));
        fresh
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Owns one document and applies edits to it, reusing the cached index between reads.
#[derive(Debug, Default)]
pub struct Editor {
    text: String,
    cache: IndexCache,
    config: EditorConfig,
}

impl Editor {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_config(text, EditorConfig::default())
    }

    pub fn with_config(text: impl Into<String>, config: EditorConfig) -> Self {
        Self {
            text: text.into(),
            cache: IndexCache::new(),
            config,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn index(&mut self) -> Arc<GraphIndex> {
        self.cache.get(&self.text)
    }

    /// Applies `op`; on error the document is left as it was.
    pub fn apply(&mut self, op: &EditOp) -> Result<Applied> {
        let index = self.cache.get(&self.text);
        let applied = apply_indexed(&self.text, &index, op, &self.config)?;
        self.text.clone_from(&applied.text);
        Ok(applied)
    }

    /// Reformats the document in place; returns whether anything changed.
    pub fn format(&mut self) -> bool {
        let formatted = crate::format::format_with(&self.text, &self.config.format);
        let changed = formatted != self.text;
        self.text = formatted;
        changed
    }

    pub fn id_generator(&mut self) -> IdGenerator {
        let index = self.index();
        IdGenerator::with_options(&index, self.config.ids.clone())
    }
}
