//! Embedding format auditing
//!
//! Looks at a deterministic prefix of a corpus and reports which encodings
//! its embedding fields use, which dimensions parse out of them, and why the
//! broken ones fail. Run ahead of a search to pick a threshold: text-encoded
//! embeddings usually come from a lossy export path and score lower, so the
//! [`ThresholdPolicy`] relaxes the threshold when any are present.

use crate::config::{AuditConfig, ThresholdPolicy};
use embedrank_core::{
    classify_embedding, diagnose_embedding, Document, DocumentId, EmbeddingClass, ParseFailure,
    Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Per-class tally of embedding encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassCounts {
    pub absent: usize,
    pub native_sequence: usize,
    pub encoded_text: usize,
    pub unsupported: usize,
}

impl ClassCounts {
    fn record(&mut self, class: EmbeddingClass) {
        *self.slot(class) += 1;
    }

    fn slot(&mut self, class: EmbeddingClass) -> &mut usize {
        match class {
            EmbeddingClass::Absent => &mut self.absent,
            EmbeddingClass::NativeSequence => &mut self.native_sequence,
            EmbeddingClass::EncodedText => &mut self.encoded_text,
            EmbeddingClass::Unsupported => &mut self.unsupported,
        }
    }

    pub fn get(&self, class: EmbeddingClass) -> usize {
        match class {
            EmbeddingClass::Absent => self.absent,
            EmbeddingClass::NativeSequence => self.native_sequence,
            EmbeddingClass::EncodedText => self.encoded_text,
            EmbeddingClass::Unsupported => self.unsupported,
        }
    }

    pub fn total(&self) -> usize {
        self.absent + self.native_sequence + self.encoded_text + self.unsupported
    }
}

/// A document whose embedding is present but did not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseErrorSample {
    pub id: DocumentId,
    pub class: EmbeddingClass,
    pub reason: String,
}

/// Leading components of a parsed vector, for eyeballing value ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPrefix {
    pub id: DocumentId,
    pub dim: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Documents actually examined (`min(sample_size, corpus.len())`).
    pub examined: usize,
    pub class_counts: ClassCounts,
    pub observed_dimensions: BTreeSet<usize>,
    /// Present-but-unparseable embeddings, including those past the sample cap.
    pub parse_failures: usize,
    pub sample_errors: Vec<ParseErrorSample>,
    pub sample_prefixes: Vec<VectorPrefix>,
}

impl AuditReport {
    /// Text-encoded embeddings were seen.
    pub fn has_degraded_encodings(&self) -> bool {
        self.class_counts.encoded_text > 0
    }

    /// Parsed vectors disagree on their length.
    pub fn has_mixed_dimensions(&self) -> bool {
        self.observed_dimensions.len() > 1
    }

    pub fn parseable(&self) -> usize {
        self.examined - self.class_counts.absent - self.parse_failures
    }

    pub fn recommended_threshold(&self, policy: &ThresholdPolicy) -> f64 {
        if self.has_degraded_encodings() {
            policy.degraded
        } else {
            policy.base
        }
    }
}

/// Samples a corpus and reports on its embedding encodings.
#[derive(Debug, Clone, Default)]
pub struct FormatAuditor {
    config: AuditConfig,
}

impl FormatAuditor {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn try_new(config: AuditConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn audit(&self, corpus: &[Document]) -> AuditReport {
        let mut report = AuditReport::default();

        for doc in corpus.iter().take(self.config.sample_size) {
            report.examined += 1;
            let class = classify_embedding(&doc.embedding);
            report.class_counts.record(class);

            match diagnose_embedding(&doc.embedding) {
                Ok(vector) => {
                    report.observed_dimensions.insert(vector.dim());
                    if report.sample_prefixes.len() < self.config.max_prefix_samples {
                        report.sample_prefixes.push(VectorPrefix {
                            id: doc.id.clone(),
                            dim: vector.dim(),
                            values: vector
                                .as_slice()
                                .iter()
                                .take(self.config.prefix_len)
                                .copied()
                                .collect(),
                        });
                    }
                }
                Err(ParseFailure::Absent) => {}
                Err(failure) => {
                    report.parse_failures += 1;
                    if report.sample_errors.len() < self.config.max_error_samples {
                        report.sample_errors.push(ParseErrorSample {
                            id: doc.id.clone(),
                            class,
                            reason: failure.to_string(),
                        });
                    }
                }
            }
        }

        debug!(
            examined = report.examined,
            absent = report.class_counts.absent,
            native = report.class_counts.native_sequence,
            encoded = report.class_counts.encoded_text,
            unsupported = report.class_counts.unsupported,
            parse_failures = report.parse_failures,
            "embedding format audit complete"
        );
        if report.has_degraded_encodings() {
            warn!(
                encoded = report.class_counts.encoded_text,
                "text-encoded embeddings detected"
            );
        }
        if report.has_mixed_dimensions() {
            warn!(dimensions = ?report.observed_dimensions, "mixed embedding dimensions detected");
        }

        report
    }

    /// Threshold for a search over the audited corpus.
    pub fn recommend_threshold(&self, report: &AuditReport) -> f64 {
        report.recommended_threshold(&self.config.threshold_policy)
    }
}

/// Audit the first `sample_size` documents with default reporting limits.
pub fn audit(corpus: &[Document], sample_size: usize) -> AuditReport {
    FormatAuditor::new(AuditConfig::default().with_sample_size(sample_size)).audit(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedrank_core::RawEmbedding;
    use serde_json::json;

    fn doc(id: i64, embedding: serde_json::Value) -> Document {
        Document::new(id, "", RawEmbedding::from(embedding))
    }

    fn mixed_corpus() -> Vec<Document> {
        vec![
            doc(1, json!([0.1, 0.2, 0.3, 0.4])),
            doc(2, json!("[0.5, 0.6, 0.7, 0.8]")),
            doc(3, json!(null)),
            doc(4, json!("not json")),
            doc(5, json!({"values": [1, 2]})),
            doc(6, json!([1, "a", 3])),
            doc(7, json!([1.0, 2.0])),
        ]
    }

    #[test]
    fn test_class_counts() {
        let report = audit(&mixed_corpus(), 10);

        assert_eq!(report.examined, 7);
        assert_eq!(report.class_counts.native_sequence, 3);
        assert_eq!(report.class_counts.encoded_text, 2);
        assert_eq!(report.class_counts.absent, 1);
        assert_eq!(report.class_counts.unsupported, 1);
        assert_eq!(report.class_counts.total(), report.examined);
        for class in EmbeddingClass::ALL {
            assert!(report.class_counts.get(class) > 0, "{} never counted", class);
        }
    }

    #[test]
    fn test_dimensions_and_errors() {
        let report = audit(&mixed_corpus(), 10);

        assert_eq!(report.observed_dimensions.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
        assert!(report.has_mixed_dimensions());
        assert_eq!(report.parse_failures, 3);
        assert_eq!(report.parseable(), 3);

        let failed: Vec<String> = report.sample_errors.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(failed, vec!["4", "5", "6"]);
        assert_eq!(report.sample_errors[0].class, EmbeddingClass::EncodedText);
        assert!(report.sample_errors[2].reason.contains("element 1"));
    }

    #[test]
    fn test_sample_is_a_prefix() {
        let report = audit(&mixed_corpus(), 2);
        assert_eq!(report.examined, 2);
        assert_eq!(report.class_counts.total(), 2);
        assert!(report.sample_errors.is_empty());
        assert_eq!(report.observed_dimensions.len(), 1);
    }

    #[test]
    fn test_error_samples_are_bounded() {
        let corpus: Vec<Document> = (0..20).map(|i| doc(i, json!("broken"))).collect();
        let report = audit(&corpus, 20);
        assert_eq!(report.parse_failures, 20);
        assert_eq!(report.sample_errors.len(), AuditConfig::default().max_error_samples);
    }

    #[test]
    fn test_prefix_samples() {
        let report = audit(&mixed_corpus(), 10);
        assert_eq!(report.sample_prefixes.len(), 3);
        assert_eq!(report.sample_prefixes[0].values, vec![0.1, 0.2, 0.3]);
        assert_eq!(report.sample_prefixes[0].dim, 4);
        assert_eq!(report.sample_prefixes[2].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_threshold_policy() {
        let policy = ThresholdPolicy::default();

        let degraded = audit(&mixed_corpus(), 10);
        assert_eq!(degraded.recommended_threshold(&policy), 0.05);

        let clean = audit(&[doc(1, json!([1, 0])), doc(2, json!(null))], 10);
        assert_eq!(clean.recommended_threshold(&policy), 0.1);
    }

    #[test]
    fn test_empty_corpus_and_zero_sample() {
        let report = audit(&[], 10);
        assert_eq!(report, AuditReport::default());

        let report = audit(&mixed_corpus(), 0);
        assert_eq!(report.examined, 0);
    }

    #[test]
    fn test_audit_does_not_touch_corpus() {
        let corpus = mixed_corpus();
        let before = corpus.clone();
        let _ = audit(&corpus, 10);
        assert_eq!(corpus, before);
    }

    #[test]
    fn test_report_serializes_class_names() {
        let report = audit(&mixed_corpus(), 10);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["class_counts"]["nativeSequence"], 3);
        assert_eq!(json["class_counts"]["encodedText"], 2);
        assert_eq!(json["observed_dimensions"], json!([2, 4]));
    }
}
