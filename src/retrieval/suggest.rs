//! Autocomplete: capped per-category lookups merged into one ordered list.

use crate::lexicon::Lexicon;
use crate::storage::{CatalogSource, Partition, SuggestionKind};
use crate::text::normalize_query;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;

pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub value: String,
}

pub struct AutoCompleteSuggester {
    catalog: Arc<dyn CatalogSource>,
    lexicon: Arc<Lexicon>,
    category_limit: usize,
}

impl AutoCompleteSuggester {
    pub fn new(catalog: Arc<dyn CatalogSource>, lexicon: Arc<Lexicon>, category_limit: usize) -> Self {
        Self {
            catalog,
            lexicon,
            category_limit: category_limit.max(1),
        }
    }

    /// Query text plus registered expansions, so "AIIMS" also suggests the full name.
    fn needles(&self, query: &str) -> Vec<String> {
        let normalized = normalize_query(query);
        let mut needles = vec![normalized.clone()];
        if let Some(expansions) = self.lexicon.expansions_of(&normalized) {
            needles.extend(expansions.iter().cloned());
        }
        needles
    }

    pub async fn suggest(
        &self,
        query: &str,
        stream: Option<Partition>,
        limit: usize,
    ) -> Vec<Suggestion> {
        if query.trim().chars().count() < MIN_QUERY_CHARS || limit == 0 {
            return Vec::new();
        }

        let mut set = JoinSet::new();
        for (needle_index, needle) in self.needles(query).into_iter().enumerate() {
            for kind in SuggestionKind::ALL {
                let catalog = self.catalog.clone();
                let needle = needle.clone();
                let cap = self.category_limit;
                set.spawn_blocking(move || {
                    let values = catalog.suggest(kind, &needle, stream, cap);
                    (needle_index, kind, values)
                });
            }
        }

        let mut gathered = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((needle_index, kind, Ok(values))) => gathered.push((needle_index, kind, values)),
                Ok((_, kind, Err(err))) => {
                    tracing::warn!(kind = ?kind, error = %err, "Suggestion lookup failed");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Suggestion lookup did not complete");
                }
            }
        }
        gathered.sort_by_key(|(needle_index, kind, _)| (*needle_index, kind.priority()));

        let mut unique: IndexSet<Suggestion> = IndexSet::new();
        for (_, kind, values) in gathered {
            for value in values {
                unique.insert(Suggestion { kind, value });
            }
        }

        let mut out: Vec<Suggestion> = unique.into_iter().collect();
        out.sort_by(|a, b| {
            a.kind
                .priority()
                .cmp(&b.kind.priority())
                .then_with(|| a.value.to_uppercase().cmp(&b.value.to_uppercase()))
                .then_with(|| a.value.cmp(&b.value))
        });
        out.truncate(limit);
        out
    }
}
