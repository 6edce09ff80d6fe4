//! Cosine similarity between canonical vectors
//!
//! Scores are always finite and within `[-1.0, 1.0]`. Empty vectors and
//! zero-norm vectors score `0.0` because they have no direction.
//!
//! Vectors of different lengths show up when a corpus mixes embeddings from
//! different model versions. [`LengthPolicy`] decides what happens then:
//!
//! - [`LengthPolicy::Truncate`] (default) compares the shared prefix
//!   `min(len a, len b)` and ignores the tail of the longer vector.
//! - [`LengthPolicy::Reject`] treats the pair as non-comparable and scores it
//!   `0.0`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    #[default]
    Truncate,
    Reject,
}

impl FromStr for LengthPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "truncate" => Ok(LengthPolicy::Truncate),
            "reject" => Ok(LengthPolicy::Reject),
            other => Err(Error::InvalidConfig(format!(
                "unknown length policy '{}', expected 'truncate' or 'reject'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LengthPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthPolicy::Truncate => f.write_str("truncate"),
            LengthPolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Cosine similarity using [`LengthPolicy::Truncate`].
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    cosine_similarity_with(a, b, LengthPolicy::Truncate)
}

/// Max-abs bounds inside which squares and their sums stay in normal `f64`
/// range for any realistic dimension. Outside them vectors are rescaled.
const SAFE_MAX: f64 = 1e100;
const SAFE_MIN: f64 = 1e-100;

/// Cosine similarity with an explicit length-mismatch policy.
pub fn cosine_similarity_with(a: &[f64], b: &[f64], policy: LengthPolicy) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if policy == LengthPolicy::Reject && a.len() != b.len() {
        return 0.0;
    }

    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }

    let similarity = if in_safe_range(scale_a) && in_safe_range(scale_b) {
        dot_product(a, b) / (dot_product(a, a).sqrt() * dot_product(b, b).sqrt())
    } else {
        scaled_cosine(a, scale_a, b, scale_b)
    };
    if !similarity.is_finite() {
        return 0.0;
    }

    // + 0.0 folds -0.0 into 0.0
    similarity.clamp(-1.0, 1.0) + 0.0
}

#[inline]
fn in_safe_range(scale: f64) -> bool {
    (SAFE_MIN..=SAFE_MAX).contains(&scale)
}

#[inline]
fn max_abs(a: &[f64]) -> f64 {
    a.iter().fold(0.0f64, |m, x| m.max(x.abs()))
}

/// Cosine over `a / scale_a` and `b / scale_b`. Every scaled component is in
/// `[-1, 1]`, so nothing overflows and the largest one is exactly 1.
fn scaled_cosine(a: &[f64], scale_a: f64, b: &[f64], scale_b: f64) -> f64 {
    let mut dot = 0.0f64;
    let mut sum_a = 0.0f64;
    let mut sum_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let x = x / scale_a;
        let y = y / scale_b;
        dot += x * y;
        sum_a += x * x;
        sum_b += y * y;
    }
    dot / (sum_a.sqrt() * sum_b.sqrt())
}

/// Dot product over the shared prefix of `a` and `b`.
///
/// Two accumulators over 8-wide chunks keep the adds pipelined. No scaling:
/// components beyond `1e154` in magnitude can overflow.
#[inline]
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    let mut dot0 = 0.0f64;
    let mut dot1 = 0.0f64;

    let chunks = a.chunks_exact(8);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(8);

    for (a_chunk, b_chunk) in chunks.zip(b_chunks) {
        dot0 += a_chunk[0] * b_chunk[0]
            + a_chunk[1] * b_chunk[1]
            + a_chunk[2] * b_chunk[2]
            + a_chunk[3] * b_chunk[3];

        dot1 += a_chunk[4] * b_chunk[4]
            + a_chunk[5] * b_chunk[5]
            + a_chunk[6] * b_chunk[6]
            + a_chunk[7] * b_chunk[7];
    }

    for i in (n - remainder.len())..n {
        dot0 += a[i] * b[i];
    }

    dot0 + dot1
}

/// Euclidean norm, rescaled when components are too large or too small to
/// square directly.
pub fn norm(a: &[f64]) -> f64 {
    let scale = max_abs(a);
    if scale == 0.0 {
        return 0.0;
    }
    if in_safe_range(scale) {
        return dot_product(a, a).sqrt();
    }
    let sum: f64 = a.iter().map(|x| (x / scale) * (x / scale)).sum();
    scale * sum.sqrt()
}
