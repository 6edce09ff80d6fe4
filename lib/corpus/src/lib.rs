//! # embedrank Corpus
//!
//! Adapters for the collaborators around the search core: where the corpus
//! comes from and how query text becomes a vector.
//!
//! - [`CorpusSource`] - [`JsonFileSource`] for store exports, [`InMemorySource`] for tests
//! - [`QueryVectorizer`] - [`HashingVectorizer`] as an offline, deterministic embedder

pub mod source;
pub mod vectorizer;

pub use source::{CorpusSource, InMemorySource, JsonFileSource};
pub use vectorizer::{normalize_text, HashingVectorizer, QueryVectorizer};
