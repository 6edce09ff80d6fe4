//! # embedrank Core
//!
//! Core library for embedrank.
//!
//! This crate provides the data model and the per-pair math:
//!
//! - [`Document`] - A corpus entry whose embedding is still in its raw, store-exported form
//! - [`RawEmbedding`] - The closed set of encodings an embedding field arrives in
//! - [`CanonicalVector`] - A parsed embedding with only finite components
//! - [`parse_embedding`] - Format-tolerant normalization of a raw embedding
//! - [`cosine_similarity`] - Clamped cosine similarity with a length-mismatch policy
//! - [`Filter`] - Pre-filters such as [`ProfileFilter`]
//!
//! ## Example
//!
//! ```rust
//! use embedrank_core::{parse_embedding, CanonicalVector, Document};
//!
//! let doc = Document::new(1, "Rust developer", "[1.0, 0.0, 0.0]");
//! let vector = parse_embedding(&doc.embedding).unwrap();
//!
//! let query = CanonicalVector::new(vec![1.0, 0.0]).unwrap();
//! // truncating policy: only the first two dimensions are compared
//! assert!((query.cosine_similarity(&vector) - 1.0).abs() < 1e-9);
//! ```

pub mod document;
pub mod error;
pub mod filter;
pub mod parser;
pub mod similarity;
pub mod vector;

pub use document::{Document, DocumentId, RawEmbedding, DEFAULT_SNIPPET_CHARS};
pub use error::{Error, Result};
pub use filter::{Filter, ProfileFilter};
pub use parser::{classify_embedding, diagnose_embedding, parse_embedding, EmbeddingClass, ParseFailure};
pub use similarity::{cosine_similarity, cosine_similarity_with, dot_product, norm, LengthPolicy};
pub use vector::CanonicalVector;
