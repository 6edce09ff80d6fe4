use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A fully parsed embedding: an ordered sequence of finite `f64` values.
///
/// Every constructor checks finiteness, so code holding a `CanonicalVector`
/// never has to guard against NaN or infinities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<f64>", try_from = "Vec<f64>")]
pub struct CanonicalVector {
    data: Vec<f64>,
}

impl CanonicalVector {
    /// Wrap `data`, rejecting the first non-finite component.
    pub fn new(data: Vec<f64>) -> Result<Self> {
        if let Some(index) = data.iter().position(|x| !x.is_finite()) {
            return Err(Error::NonFiniteComponent { index });
        }
        Ok(Self { data })
    }

    #[inline]
    pub fn from_slice(data: &[f64]) -> Result<Self> {
        Self::new(data.to_vec())
    }

    /// Decode a JSON numeric array, e.g. a query vector handed over as text.
    pub fn from_json(text: &str) -> Result<Self> {
        let data: Vec<f64> = serde_json::from_str(text)?;
        Self::new(data)
    }

    /// Caller guarantees every element is finite.
    #[inline]
    pub(crate) fn from_finite(data: Vec<f64>) -> Self {
        debug_assert!(data.iter().all(|x| x.is_finite()));
        Self { data }
    }

    /// Zero vector of the given dimension.
    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self { data: vec![0.0; dim] }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        crate::similarity::norm(&self.data)
    }

    /// Cosine similarity under the default truncating length policy.
    #[inline]
    pub fn cosine_similarity(&self, other: &CanonicalVector) -> f64 {
        crate::similarity::cosine_similarity(&self.data, &other.data)
    }

    /// Scale to unit length. Vectors with a near-zero norm are left untouched.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f64::EPSILON && norm.is_finite() {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x *= inv_norm;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl TryFrom<Vec<f64>> for CanonicalVector {
    type Error = Error;

    fn try_from(data: Vec<f64>) -> Result<Self> {
        Self::new(data)
    }
}

impl From<CanonicalVector> for Vec<f64> {
    fn from(v: CanonicalVector) -> Self {
        v.data
    }
}

impl AsRef<[f64]> for CanonicalVector {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}
