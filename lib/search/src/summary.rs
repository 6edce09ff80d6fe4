//! Match / near-miss breakdown of a result list

use crate::ranker::SearchResult;
use serde::Serialize;

/// Summary statistics for one search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    /// Number of results returned
    pub results_count: usize,
    /// Results flagged as passing the threshold
    pub matches_count: usize,
    /// Score of the best result
    pub best_similarity: Option<f64>,
    /// Average score of the returned results
    pub avg_similarity: Option<f64>,
}

impl SearchSummary {
    pub fn from_results(results: &[SearchResult]) -> Self {
        if results.is_empty() {
            return Self {
                results_count: 0,
                matches_count: 0,
                best_similarity: None,
                avg_similarity: None,
            };
        }

        let total: f64 = results.iter().map(|r| r.similarity).sum();
        Self {
            results_count: results.len(),
            matches_count: matches(results).count(),
            // results are sorted
            best_similarity: Some(results[0].similarity),
            avg_similarity: Some(total / results.len() as f64),
        }
    }

    pub fn has_matches(&self) -> bool {
        self.matches_count > 0
    }
}

/// Results that passed the threshold.
pub fn matches(results: &[SearchResult]) -> impl Iterator<Item = &SearchResult> {
    results.iter().filter(|r| r.passed_threshold)
}

/// Best-available results that did not pass the threshold.
pub fn near_misses(results: &[SearchResult]) -> impl Iterator<Item = &SearchResult> {
    results.iter().filter(|r| !r.passed_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedrank_core::DocumentId;

    fn result(id: i64, similarity: f64, passed: bool) -> SearchResult {
        SearchResult {
            id: DocumentId::Integer(id),
            text_snippet: String::new(),
            similarity,
            passed_threshold: passed,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = SearchSummary::from_results(&[]);
        assert_eq!(summary.results_count, 0);
        assert_eq!(summary.best_similarity, None);
        assert!(!summary.has_matches());
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![result(1, 0.9, true), result(2, 0.3, false), result(3, 0.0, false)];
        let summary = SearchSummary::from_results(&results);

        assert_eq!(summary.results_count, 3);
        assert_eq!(summary.matches_count, 1);
        assert_eq!(summary.best_similarity, Some(0.9));
        assert!((summary.avg_similarity.unwrap() - 0.4).abs() < 1e-12);

        let misses: Vec<i64> = near_misses(&results)
            .map(|r| match r.id {
                DocumentId::Integer(i) => i,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(misses, vec![2, 3]);
        assert_eq!(matches(&results).count(), 1);
    }
}
