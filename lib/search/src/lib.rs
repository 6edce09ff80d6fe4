//! # embedrank Search
//!
//! Corpus-level operations on top of `embedrank-core`.
//!
//! - [`CorpusRanker`] - Ranks a corpus snapshot against a query vector
//! - [`FormatAuditor`] - Classifies embedding encodings and recommends a threshold
//! - [`SearchSummary`] - Match / near-miss breakdown of a result list
//!
//! ## Example
//!
//! ```rust
//! use embedrank_core::{CanonicalVector, Document, RawEmbedding};
//! use embedrank_search::{audit, search, ThresholdPolicy};
//! use serde_json::json;
//!
//! let corpus = vec![
//!     Document::new(1, "first", RawEmbedding::from(json!([1, 0]))),
//!     Document::new(2, "second", RawEmbedding::from(json!("[0, 1]"))),
//!     Document::new(3, "third", RawEmbedding::Absent),
//! ];
//!
//! // Pick a threshold from what the corpus looks like
//! let report = audit(&corpus, 10);
//! let threshold = report.recommended_threshold(&ThresholdPolicy::default());
//! assert_eq!(threshold, 0.05);
//!
//! let query = CanonicalVector::new(vec![1.0, 0.0]).unwrap();
//! let results = search(&query, &corpus, threshold, 5);
//! assert_eq!(results.len(), 2);
//! assert!(results[0].passed_threshold);
//! assert!(!results[1].passed_threshold);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   Corpus    │────>│   Auditor   │──── threshold
//! │ (documents) │     └─────────────┘        │
//! └─────────────┘                            v
//!       │              ┌─────────────┐     ┌─────────────┐
//!       └─────────────>│   Ranker    │────>│   Summary   │
//!                      │ parse+score │     │ (results)   │
//!                      └─────────────┘     └─────────────┘
//! ```

pub mod audit;
pub mod config;
pub mod ranker;
mod serde_millis;
pub mod summary;

pub use audit::{audit, AuditReport, ClassCounts, FormatAuditor, ParseErrorSample, VectorPrefix};
pub use config::{
    AuditConfig, SearchConfig, ThresholdPolicy, DEFAULT_LIMIT, DEFAULT_THRESHOLD,
    DEGRADED_THRESHOLD,
};
pub use ranker::{search, CorpusRanker, SearchResult};
pub use summary::{matches, near_misses, SearchSummary};
