//! Unique node id generation.

use crate::config::IdOptions;
use crate::index::GraphIndex;
use crate::pattern::ShapeKind;
use rustc_hash::{FxHashMap, FxHashSet};

/// Hands out node ids that collide neither with a document snapshot nor with each other.
///
/// The used-id set is copied once from the index, so repeated calls never rescan the text.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    taken: FxHashSet<String>,
    counters: FxHashMap<&'static str, usize>,
    options: IdOptions,
}

impl IdGenerator {
    pub fn new(index: &GraphIndex) -> Self {
        Self::with_options(index, IdOptions::default())
    }

    pub fn with_options(index: &GraphIndex, options: IdOptions) -> Self {
        Self {
            taken: index.used_ids.clone(),
            counters: FxHashMap::default(),
            options,
        }
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    /// Returns `prefix + Slug` when `seed` has usable words (`rectUserLogin`), otherwise
    /// `prefix + counter` (`rect1`). The id is reserved before it is returned.
    pub fn generate(&mut self, kind: ShapeKind, seed: Option<&str>) -> String {
        let prefix = kind.id_prefix();
        let slug = seed
            .map(|s| slug(s, self.options.slug_words))
            .filter(|s| !s.is_empty());

        let id = match slug {
            Some(slug) => {
                let base = format!("{prefix}{slug}");
                let mut candidate = base.clone();
                let mut n = 2usize;
                while self.taken.contains(&candidate) {
                    candidate = format!("{base}{n}");
                    n += 1;
                }
                candidate
            }
            None => {
                let counter = self
                    .counters
                    .entry(prefix)
                    .or_insert(self.options.counter_start);
                loop {
                    let candidate = format!("{prefix}{counter}");
                    *counter += 1;
                    if !self.taken.contains(&candidate) {
                        break candidate;
                    }
                }
            }
        };

        tracing::trace!(id = %id, kind = %kind, "generated node id");
        self.taken.insert(id.clone());
        id
    }
}

/// Camel-cases the first `words` ASCII-alphanumeric words of `seed`.
fn slug(seed: &str, words: usize) -> String {
    seed.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(words)
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
