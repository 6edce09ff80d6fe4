use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Default number of characters kept in a result snippet.
pub const DEFAULT_SNIPPET_CHARS: usize = 100;

/// Raw embedding field exactly as the store handed it over.
///
/// Stores disagree on how they export vectors: some return a native array,
/// some a JSON string of that array, some nothing at all. The variants keep
/// that distinction so the parser and the auditor can both see it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawEmbedding {
    /// `null` or a missing field.
    #[default]
    Absent,
    /// A JSON array. Elements are only checked when parsed.
    Native(Vec<Value>),
    /// Text that should hold a JSON numeric array.
    Encoded(String),
    /// Objects, bare numbers, booleans.
    Unsupported(Value),
}

impl RawEmbedding {
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, RawEmbedding::Absent)
    }
}

impl From<Value> for RawEmbedding {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawEmbedding::Absent,
            Value::Array(items) => RawEmbedding::Native(items),
            Value::String(text) => RawEmbedding::Encoded(text),
            other => RawEmbedding::Unsupported(other),
        }
    }
}

impl From<RawEmbedding> for Value {
    fn from(raw: RawEmbedding) -> Self {
        match raw {
            RawEmbedding::Absent => Value::Null,
            RawEmbedding::Native(items) => Value::Array(items),
            RawEmbedding::Encoded(text) => Value::String(text),
            RawEmbedding::Unsupported(other) => other,
        }
    }
}

/// Non-finite values become `null` elements and therefore fail to parse.
impl From<Vec<f64>> for RawEmbedding {
    fn from(values: Vec<f64>) -> Self {
        RawEmbedding::Native(values.into_iter().map(Value::from).collect())
    }
}

impl From<&str> for RawEmbedding {
    fn from(text: &str) -> Self {
        RawEmbedding::Encoded(text.to_string())
    }
}

impl From<String> for RawEmbedding {
    fn from(text: String) -> Self {
        RawEmbedding::Encoded(text)
    }
}

impl<T: Into<RawEmbedding>> From<Option<T>> for RawEmbedding {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawEmbedding::Absent, Into::into)
    }
}

/// Opaque document identifier. Strings are kept byte for byte; numbers
/// outside `i64` (large unsigned, fractional) keep their JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Integer(i64),
    Number(Number),
    String(String),
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentId::Integer(i) => write!(f, "{}", i),
            DocumentId::Number(n) => write!(f, "{}", n),
            DocumentId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(i: i64) -> Self {
        DocumentId::Integer(i)
    }
}

impl From<Number> for DocumentId {
    fn from(n: Number) -> Self {
        match n.as_i64() {
            Some(i) => DocumentId::Integer(i),
            None => DocumentId::Number(n),
        }
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId::String(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId::String(s.to_string())
    }
}

/// One corpus entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// Only used for result snippets, never for scoring.
    #[serde(default, deserialize_with = "nullable_string")]
    pub text: String,
    /// Owner tag. Stores export it as either a string or a number.
    #[serde(default, deserialize_with = "opaque_tag")]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub embedding: RawEmbedding,
}

impl Document {
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<DocumentId>,
        text: impl Into<String>,
        embedding: impl Into<RawEmbedding>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            profile_id: None,
            embedding: embedding.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    /// First `max_chars` characters of the text, with `...` appended when
    /// anything was cut.
    pub fn snippet(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &self.text[..byte_idx]),
            None => self.text.clone(),
        }
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn opaque_tag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "profile_id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_embedding_from_json_value() {
        assert_eq!(RawEmbedding::from(Value::Null), RawEmbedding::Absent);
        assert!(matches!(RawEmbedding::from(json!([1, 2])), RawEmbedding::Native(v) if v.len() == 2));
        assert_eq!(RawEmbedding::from(json!("[1]")), RawEmbedding::Encoded("[1]".into()));
        assert!(matches!(RawEmbedding::from(json!({"a": 1})), RawEmbedding::Unsupported(_)));
        assert!(matches!(RawEmbedding::from(json!(true)), RawEmbedding::Unsupported(_)));
    }

    #[test]
    fn test_document_deserialize_mixed_store_export() {
        let docs: Vec<Document> = serde_json::from_value(json!([
            {"id": 1, "text": "alpha", "profile_id": "p1", "embedding": [0.1, 0.2]},
            {"id": "doc-2", "text": null, "profile_id": 42, "embedding": "[0.3, 0.4]"},
            {"id": "6f1c2b8e-3d4a-4c5b-9e7f-0a1b2c3d4e5f"},
        ]))
        .unwrap();

        assert_eq!(docs[0].id, DocumentId::Integer(1));
        assert!(matches!(docs[0].embedding, RawEmbedding::Native(_)));

        assert_eq!(docs[1].id, DocumentId::String("doc-2".into()));
        assert_eq!(docs[1].text, "");
        assert_eq!(docs[1].profile_id.as_deref(), Some("42"));
        assert!(matches!(docs[1].embedding, RawEmbedding::Encoded(_)));

        assert_eq!(
            docs[2].id,
            DocumentId::String("6f1c2b8e-3d4a-4c5b-9e7f-0a1b2c3d4e5f".into())
        );
        assert!(docs[2].embedding.is_absent());
        assert_eq!(docs[2].profile_id, None);
    }

    #[test]
    fn test_profile_id_rejects_objects() {
        let res: Result<Document, _> =
            serde_json::from_value(json!({"id": 1, "profile_id": {"x": 1}}));
        assert!(res.is_err());
    }

    #[test]
    fn test_snippet() {
        let short = Document::new(1, "short text", RawEmbedding::Absent);
        assert_eq!(short.snippet(100), "short text");

        let long = Document::new(2, "a".repeat(120), RawEmbedding::Absent);
        let snippet = long.snippet(100);
        assert_eq!(snippet.len(), 103);
        assert!(snippet.ends_with("..."));

        // multi-byte characters are never split
        let accented = Document::new(3, "é".repeat(5), RawEmbedding::Absent);
        assert_eq!(accented.snippet(2), "éé...");
    }

    #[test]
    fn test_nan_becomes_null_element() {
        let raw = RawEmbedding::from(vec![1.0, f64::NAN]);
        match raw {
            RawEmbedding::Native(items) => assert_eq!(items[1], Value::Null),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_document_id_round_trips_unchanged() {
        let ids = json!([
            "6F1C2B8E-3D4A-4C5B-9E7F-0A1B2C3D4E5F",
            "6f1c2b8e3d4a4c5b9e7f0a1b2c3d4e5f",
            "{6f1c2b8e-3d4a-4c5b-9e7f-0a1b2c3d4e5f}",
            "0042",
            42,
            -7,
            1.5,
            18446744073709551615u64,
        ]);

        let parsed: Vec<DocumentId> = serde_json::from_value(ids.clone()).unwrap();
        assert_eq!(parsed[0], DocumentId::String("6F1C2B8E-3D4A-4C5B-9E7F-0A1B2C3D4E5F".into()));
        assert_eq!(parsed[3], DocumentId::String("0042".into()));
        assert_eq!(parsed[4], DocumentId::Integer(42));
        assert!(matches!(parsed[6], DocumentId::Number(_)));
        assert!(matches!(parsed[7], DocumentId::Number(_)));

        assert_eq!(serde_json::to_value(&parsed).unwrap(), ids);
    }

    #[test]
    fn test_fractional_id_loads() {
        let doc: Document =
            serde_json::from_value(json!({"id": 1.5, "embedding": [1, 0]})).unwrap();
        assert_eq!(doc.id.to_string(), "1.5");
    }

    #[test]
    fn test_document_id_display() {
        assert_eq!(DocumentId::from(5).to_string(), "5");
        assert_eq!(DocumentId::from("abc").to_string(), "abc");
    }
}
