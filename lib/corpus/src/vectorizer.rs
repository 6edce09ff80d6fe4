//! Query vectorizers
//!
//! Production queries are embedded by an external provider with the same
//! model that embedded the corpus. [`HashingVectorizer`] is a local,
//! deterministic stand-in for tests, demos and offline corpora that were
//! themselves hashed: it only matches documents embedded by the same scheme.
//! Features are bucketed with seeded XXH3, so vectors stay identical across
//! toolchains and platforms.

use embedrank_core::{CanonicalVector, Error, Result};
use std::collections::HashSet;
use xxhash_rust::xxh3::xxh3_64_with_seed;

const FEATURE_SEED: u64 = 0;

/// Stable 64-bit hash of a text feature.
#[inline]
fn feature_hash(feature: &str) -> u64 {
    xxh3_64_with_seed(feature.as_bytes(), FEATURE_SEED)
}

/// Turns query text into a vector comparable with the corpus embeddings.
pub trait QueryVectorizer {
    /// Dimension of produced vectors.
    fn dim(&self) -> usize;

    fn vectorize(&self, text: &str) -> Result<CanonicalVector>;
}

/// Clean text before embedding: drop punctuation other than `.,!?-`,
/// collapse whitespace, lowercase.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace() || ".,!?-".contains(*c))
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Feature-hashing embedder over character trigrams and words.
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    dim: usize,
}

impl HashingVectorizer {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("vectorizer dimension must be positive".to_string()));
        }
        Ok(Self { dim })
    }

    fn bucket(&self, feature: &str) -> usize {
        (feature_hash(feature) % self.dim as u64) as usize
    }
}

impl QueryVectorizer for HashingVectorizer {
    fn dim(&self) -> usize {
        self.dim
    }

    fn vectorize(&self, text: &str) -> Result<CanonicalVector> {
        let normalized = normalize_text(text);
        let mut data = vec![0.0f64; self.dim];

        for trigram in trigrams(&normalized) {
            data[self.bucket(&trigram)] += 1.0;
        }
        // words weigh more than their trigrams
        for word in normalized.split_whitespace() {
            data[self.bucket(word)] += 2.0;
        }

        let mut vector = CanonicalVector::new(data)?;
        vector.normalize();
        Ok(vector)
    }
}

fn trigrams(s: &str) -> HashSet<String> {
    if s.is_empty() {
        return HashSet::new();
    }
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();
    chars.windows(3).map(|w| w.iter().collect()).collect()
}
