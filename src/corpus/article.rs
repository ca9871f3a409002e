//! The canonical extracted-document record.

use serde::{Deserialize, Serialize};

/// One document extracted from a corpus source.
///
/// Every format-specific source produces these, and the indexing loop is the
/// only consumer. An article is constructed once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Document identifier, unique within its source.
    pub id: String,
    /// Plain-text content. Empty only when `failed` is set.
    pub text: String,
    /// Number of structural segments (sentences) when the format reports
    /// them; `0` otherwise. Only the size-limit policy looks at this.
    pub segments: usize,
    /// Extraction for this specific document hit a recoverable error. The
    /// article is still surfaced so the control loop can count it.
    pub failed: bool,
}

impl Article {
    /// Create a new article with no segment count.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            segments: 0,
            failed: false,
        }
    }

    /// Set the segment count.
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Create a failure marker for a document that could not be decoded.
    pub fn failed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            segments: 0,
            failed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_construction() {
        let article = Article::new("APW_ENG_20090101.0001", "Some text.").with_segments(3);
        assert_eq!(article.id, "APW_ENG_20090101.0001");
        assert_eq!(article.segments, 3);
        assert!(!article.failed);
    }

    #[test]
    fn failure_marker_has_empty_text() {
        let article = Article::failed("broken_entry");
        assert!(article.failed);
        assert!(article.text.is_empty());
        assert_eq!(article.segments, 0);
    }
}
