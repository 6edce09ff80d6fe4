//! Corpus ranking
//!
//! Scores every parseable document against one query vector and returns the
//! best `limit` of them, highest similarity first. Results below the threshold
//! are kept and flagged rather than dropped, so a query that matches nothing
//! still shows its closest candidates.

use crate::config::SearchConfig;
use embedrank_core::{
    cosine_similarity_with, parse_embedding, CanonicalVector, Document, DocumentId, Filter, Result,
};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, warn};

/// One ranked document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: DocumentId,
    pub text_snippet: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub similarity: f64,
    /// `similarity >= threshold`
    pub passed_threshold: bool,
}

/// Candidate before it is materialized into a [`SearchResult`].
#[derive(Debug, Clone, Copy)]
struct Scored {
    index: usize,
    similarity: f64,
}

/// Similarity descending, then corpus position ascending. Total, so any
/// sort or selection over it is deterministic.
fn rank_order(a: &Scored, b: &Scored) -> Ordering {
    OrderedFloat(b.similarity)
        .cmp(&OrderedFloat(a.similarity))
        .then_with(|| a.index.cmp(&b.index))
}

/// Non-positive limits select nothing; limits beyond `usize` select everything.
fn effective_limit(limit: i64) -> usize {
    if limit <= 0 {
        0
    } else {
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}

/// Ranks a corpus snapshot against query vectors.
#[derive(Debug, Clone, Default)]
pub struct CorpusRanker {
    config: SearchConfig,
}

impl CorpusRanker {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Like [`CorpusRanker::new`] but validates the config first.
    pub fn try_new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rank the whole corpus.
    pub fn search(&self, query: &CanonicalVector, corpus: &[Document]) -> Vec<SearchResult> {
        self.search_filtered(query, corpus, None)
    }

    /// Rank the documents accepted by `filter`.
    ///
    /// Documents rejected by the filter, and documents whose embedding does not
    /// parse, are skipped without error.
    pub fn search_filtered(
        &self,
        query: &CanonicalVector,
        corpus: &[Document],
        filter: Option<&dyn Filter>,
    ) -> Vec<SearchResult> {
        let limit = match effective_limit(self.config.limit) {
            0 => return Vec::new(),
            limit => limit,
        };

        let start = Instant::now();
        let parallel = corpus.len() >= self.config.parallel_min_docs;

        let mut scored: Vec<Scored> = if parallel {
            corpus
                .par_iter()
                .enumerate()
                .filter_map(|(index, doc)| self.score(query, index, doc, filter))
                .collect()
        } else {
            corpus
                .iter()
                .enumerate()
                .filter_map(|(index, doc)| self.score(query, index, doc, filter))
                .collect()
        };
        let candidates = scored.len();

        if scored.len() > limit {
            scored.select_nth_unstable_by(limit - 1, rank_order);
            scored.truncate(limit);
        }
        scored.sort_unstable_by(rank_order);

        let results: Vec<SearchResult> = scored
            .into_iter()
            .map(|s| {
                let doc = &corpus[s.index];
                SearchResult {
                    id: doc.id.clone(),
                    text_snippet: doc.snippet(self.config.snippet_chars),
                    similarity: s.similarity,
                    passed_threshold: s.similarity >= self.config.threshold,
                }
            })
            .collect();

        let elapsed = start.elapsed();
        debug!(
            corpus = corpus.len(),
            candidates,
            returned = results.len(),
            matches = results.iter().filter(|r| r.passed_threshold).count(),
            parallel,
            elapsed_us = elapsed.as_micros() as u64,
            "corpus search complete"
        );
        if elapsed > self.config.slow_search_warn {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.config.slow_search_warn.as_millis() as u64,
                corpus = corpus.len(),
                "corpus search exceeded its time budget"
            );
        }

        results
    }

    fn score(
        &self,
        query: &CanonicalVector,
        index: usize,
        doc: &Document,
        filter: Option<&dyn Filter>,
    ) -> Option<Scored> {
        if let Some(f) = filter {
            if !f.matches(doc) {
                return None;
            }
        }
        let vector = parse_embedding(&doc.embedding)?;
        let similarity =
            cosine_similarity_with(query.as_slice(), vector.as_slice(), self.config.length_policy);
        Some(Scored { index, similarity })
    }
}

/// Rank `corpus` against `query` with default settings apart from
/// `threshold` and `limit`.
pub fn search(
    query: &CanonicalVector,
    corpus: &[Document],
    threshold: f64,
    limit: i64,
) -> Vec<SearchResult> {
    let config = SearchConfig::default()
        .with_threshold(threshold)
        .with_limit(limit);
    CorpusRanker::new(config).search(query, corpus)
}
