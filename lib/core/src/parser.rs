//! Embedding normalization
//!
//! Turns whatever a store exported in a document's embedding field into a
//! [`CanonicalVector`]. Malformed input is an expected condition here, so
//! nothing in this module returns an error to the search path: callers get
//! `None` from [`parse_embedding`], and diagnostics get a [`ParseFailure`]
//! from [`diagnose_embedding`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{CanonicalVector, RawEmbedding};

/// Encoding class of a raw embedding field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmbeddingClass {
    Absent,
    NativeSequence,
    EncodedText,
    Unsupported,
}

impl EmbeddingClass {
    pub const ALL: [EmbeddingClass; 4] = [
        EmbeddingClass::Absent,
        EmbeddingClass::NativeSequence,
        EmbeddingClass::EncodedText,
        EmbeddingClass::Unsupported,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingClass::Absent => "absent",
            EmbeddingClass::NativeSequence => "nativeSequence",
            EmbeddingClass::EncodedText => "encodedText",
            EmbeddingClass::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for EmbeddingClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an embedding field did not yield a vector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("embedding is absent")]
    Absent,

    #[error("element {index} is not a finite number")]
    NonNumericElement { index: usize },

    #[error("embedding text is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("embedding text decodes to {0}, expected an array")]
    NotAnArray(&'static str),

    #[error("unsupported embedding type: {0}")]
    UnsupportedType(&'static str),
}

pub fn classify_embedding(raw: &RawEmbedding) -> EmbeddingClass {
    match raw {
        RawEmbedding::Absent => EmbeddingClass::Absent,
        RawEmbedding::Native(_) => EmbeddingClass::NativeSequence,
        RawEmbedding::Encoded(_) => EmbeddingClass::EncodedText,
        RawEmbedding::Unsupported(_) => EmbeddingClass::Unsupported,
    }
}

/// Parse a raw embedding, reporting why it failed.
pub fn diagnose_embedding(raw: &RawEmbedding) -> Result<CanonicalVector, ParseFailure> {
    match raw {
        RawEmbedding::Absent => Err(ParseFailure::Absent),
        RawEmbedding::Native(items) => numeric_sequence(items),
        RawEmbedding::Encoded(text) => {
            let decoded: Value = serde_json::from_str(text)
                .map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
            match decoded {
                Value::Array(items) => numeric_sequence(&items),
                other => Err(ParseFailure::NotAnArray(json_type_name(&other))),
            }
        }
        RawEmbedding::Unsupported(value) => Err(ParseFailure::UnsupportedType(json_type_name(value))),
    }
}

/// Parse a raw embedding into a canonical vector.
///
/// Returns `None` for absent, malformed or unsupported input; never panics
/// and never surfaces an error.
#[inline]
pub fn parse_embedding(raw: &RawEmbedding) -> Option<CanonicalVector> {
    diagnose_embedding(raw).ok()
}

fn numeric_sequence(items: &[Value]) -> Result<CanonicalVector, ParseFailure> {
    let mut data = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_f64() {
            Some(x) if x.is_finite() => data.push(x),
            _ => return Err(ParseFailure::NonNumericElement { index }),
        }
    }
    Ok(CanonicalVector::from_finite(data))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
