// Document pre-filters applied before scoring
use crate::Document;

/// Decides whether a document takes part in a search.
///
/// `Sync` so a filter can be shared across the parallel corpus scan.
pub trait Filter: Sync {
    fn matches(&self, document: &Document) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Document) -> bool + Sync,
{
    fn matches(&self, document: &Document) -> bool {
        self(document)
    }
}

/// Keeps documents owned by a single profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFilter {
    profile_id: String,
}

impl ProfileFilter {
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
        }
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }
}

impl Filter for ProfileFilter {
    fn matches(&self, document: &Document) -> bool {
        document
            .profile_id
            .as_deref()
            .map(|p| p == self.profile_id)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawEmbedding;

    #[test]
    fn test_profile_filter() {
        let filter = ProfileFilter::new("alice");
        let owned = Document::new(1, "a", RawEmbedding::Absent).with_profile("alice");
        let other = Document::new(2, "b", RawEmbedding::Absent).with_profile("bob");
        let orphan = Document::new(3, "c", RawEmbedding::Absent);

        assert!(filter.matches(&owned));
        assert!(!filter.matches(&other));
        assert!(!filter.matches(&orphan));
    }

    #[test]
    fn test_closure_filter() {
        let long_text = |d: &Document| d.text.len() > 3;
        assert!(long_text.matches(&Document::new(1, "long", RawEmbedding::Absent)));
        assert!(!long_text.matches(&Document::new(2, "no", RawEmbedding::Absent)));
    }
}
