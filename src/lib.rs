//! # embedrank
//!
//! Semantic similarity search over an in-memory corpus whose embeddings may
//! have been exported inconsistently.
//!
//! embedrank takes a corpus snapshot and a query vector, parses each
//! document's embedding whatever form it arrived in, scores it by cosine
//! similarity and returns the best matches, flagging which clear a threshold.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cargo install embedrank
//! embedrank audit corpus.json
//! embedrank search corpus.json --vector '[0.1, 0.2, 0.3]' --adaptive --limit 5
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use embedrank::prelude::*;
//! use serde_json::json;
//!
//! let corpus = vec![
//!     Document::new(1, "JavaScript developer", RawEmbedding::from(json!([1, 0]))),
//!     Document::new(2, "Data scientist", RawEmbedding::from(json!([0, 1]))),
//!     Document::new(3, "UX designer", RawEmbedding::Absent),
//! ];
//!
//! let query = CanonicalVector::new(vec![1.0, 0.0]).unwrap();
//! let results = search(&query, &corpus, 0.5, 2);
//!
//! assert_eq!(results[0].id, DocumentId::Integer(1));
//! assert!(results[0].passed_threshold);
//! assert!(!results[1].passed_threshold);
//! ```
//!
//! ## Crate Structure
//!
//! - [`embedrank-core`](https://docs.rs/embedrank-core) - Document model, embedding parser, cosine similarity
//! - [`embedrank-search`](https://docs.rs/embedrank-search) - Corpus ranker, format auditor, result summaries
//! - [`embedrank-corpus`](https://docs.rs/embedrank-corpus) - Corpus sources and query vectorizers

// Re-export core types
pub use embedrank_core::{
    cosine_similarity, cosine_similarity_with, parse_embedding, CanonicalVector, Document,
    DocumentId, EmbeddingClass, Error, Filter, LengthPolicy, ProfileFilter, RawEmbedding, Result,
};

// Re-export search
pub use embedrank_search::{
    audit, search, AuditConfig, AuditReport, CorpusRanker, FormatAuditor, SearchConfig,
    SearchResult, SearchSummary, ThresholdPolicy,
};

// Re-export corpus adapters
pub use embedrank_corpus::{
    CorpusSource, HashingVectorizer, InMemorySource, JsonFileSource, QueryVectorizer,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        audit, cosine_similarity, parse_embedding, search, AuditConfig, AuditReport,
        CanonicalVector, CorpusRanker, CorpusSource, Document, DocumentId, Error, Filter,
        FormatAuditor, JsonFileSource, LengthPolicy, ProfileFilter, QueryVectorizer, RawEmbedding,
        Result, SearchConfig, SearchResult, SearchSummary, ThresholdPolicy,
    };
}
