//! The bulk-indexing backend boundary.

use crate::corpus::Article;
use async_trait::async_trait;
use thiserror::Error;

/// One document the backend refused to index.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    pub id: String,
    pub reason: String,
}

/// Transport-level sink errors (as opposed to per-document rejections,
/// which come back in the failure listing).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bulk response error: {0}")]
    Response(String),
}

/// A backend accepting batched "create or replace document" operations
/// keyed by document id.
///
/// One call indexes one batch. The returned listing names the documents
/// the backend rejected; the control loop treats a non-empty listing as
/// fatal for the run.
#[async_trait]
pub trait BulkSink: Send + Sync {
    async fn bulk_index(
        &self,
        index: &str,
        articles: &[Article],
    ) -> Result<Vec<BulkFailure>, SinkError>;
}
