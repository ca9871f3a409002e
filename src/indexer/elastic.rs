//! Elasticsearch `_bulk` sink.
//!
//! Documents are indexed in a shape the Inception external-search feature
//! can consume: the text under `doc.text`, with an id/language/source/
//! timestamp/uri metadata envelope alongside.

use super::sink::{BulkFailure, BulkSink, SinkError};
use crate::config::ElasticsearchConfig;
use crate::corpus::Article;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Bulk sink backed by an Elasticsearch HTTP endpoint.
pub struct ElasticSink {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    language: String,
}

impl ElasticSink {
    /// Build a sink from the configured endpoint.
    pub fn new(config: &ElasticsearchConfig, language: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("corpus-indexer/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            language: language.into(),
        })
    }

    /// Build the NDJSON request body: one action line and one source line
    /// per article.
    fn bulk_body(&self, index: &str, articles: &[Article]) -> Result<String, SinkError> {
        let timestamp = Utc::now().to_rfc3339();
        let mut body = String::new();
        for article in articles {
            let action = json!({ "index": { "_index": index, "_id": article.id } });
            body.push_str(&serde_json::to_string(&action)?);
            body.push('\n');
            let source = json!({
                "doc": { "text": article.text },
                "metadata": {
                    "id": article.id,
                    "language": self.language,
                    "source": "",
                    "timestamp": timestamp,
                    "uri": "",
                }
            });
            body.push_str(&serde_json::to_string(&source)?);
            body.push('\n');
        }
        Ok(body)
    }
}

#[async_trait]
impl BulkSink for ElasticSink {
    async fn bulk_index(
        &self,
        index: &str,
        articles: &[Article],
    ) -> Result<Vec<BulkFailure>, SinkError> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }
        let body = self.bulk_body(index, articles)?;
        debug!("submitting bulk request with {} document(s)", articles.len());

        let mut request = self
            .client
            .post(format!("{}/_bulk", self.base_url))
            .header("content-type", "application/x-ndjson")
            .body(body);
        if let Some(ref username) = self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SinkError::Response(format!(
                "bulk request failed with status {status}: {detail}"
            )));
        }

        let parsed: BulkResponse = response.json().await?;
        Ok(parsed.failures())
    }
}

/// The slice of the bulk response this layer cares about.
#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<BulkItem>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    index: Option<BulkItemStatus>,
}

#[derive(Debug, Deserialize)]
struct BulkItemStatus {
    #[serde(rename = "_id")]
    id: String,
    status: u16,
    error: Option<BulkItemError>,
}

#[derive(Debug, Deserialize)]
struct BulkItemError {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    reason: String,
}

impl BulkResponse {
    fn failures(self) -> Vec<BulkFailure> {
        if !self.errors {
            return Vec::new();
        }
        self.items
            .into_iter()
            .filter_map(|item| item.index)
            .filter(|status| status.error.is_some() || status.status >= 300)
            .map(|status| {
                let reason = status
                    .error
                    .map(|e| format!("{}: {}", e.kind, e.reason))
                    .unwrap_or_else(|| format!("status {}", status.status));
                BulkFailure {
                    id: status.id,
                    reason,
                }
            })
            .collect()
    }
}
