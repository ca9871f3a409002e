//! Configuration for the corpus indexer

use crate::corpus::CorpusFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_index_name() -> String {
    "documents".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_sentence_limit() -> usize {
    100
}

fn default_max_failure_fraction() -> f64 {
    0.0
}

fn default_language() -> String {
    "EN".to_string()
}

/// Main configuration, loaded from a TOML file and overridable from the
/// command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoint configuration
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    /// Batching and failure-policy configuration
    #[serde(default)]
    pub indexing: IndexingConfig,
    /// Corpus location configuration
    #[serde(default)]
    pub corpus: CorpusConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.elasticsearch.url.is_empty() {
            errors.push("elasticsearch url must not be empty".to_string());
        }
        if self.elasticsearch.timeout_secs == 0 {
            errors.push("timeout_secs must be positive".to_string());
        }

        if self.indexing.index_name.is_empty() {
            errors.push("index_name must not be empty".to_string());
        }
        if self.indexing.batch_size == 0 {
            errors.push("batch_size must be positive".to_string());
        }
        if self.indexing.sentence_limit == 0 {
            errors.push("sentence_limit must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.indexing.max_failure_fraction) {
            errors.push("max_failure_fraction must be between 0.0 and 1.0".to_string());
        }
        if self.indexing.max_documents == Some(0) {
            errors.push("max_documents must be positive when set".to_string());
        }
        if self.indexing.language.is_empty() {
            errors.push("language must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

/// Elasticsearch endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster (e.g., "http://localhost:9200")
    #[serde(default = "default_url")]
    pub url: String,
    /// Basic-auth username (optional)
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password (optional)
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Batching and failure-policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Target index name
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Documents per bulk request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Documents with more segments than this are skipped
    #[serde(default = "default_sentence_limit")]
    pub sentence_limit: usize,
    /// Maximum tolerated failed/total ratio before the run aborts
    #[serde(default = "default_max_failure_fraction")]
    pub max_failure_fraction: f64,
    /// Stop after this many documents (optional)
    #[serde(default)]
    pub max_documents: Option<usize>,
    /// Language tag attached to every indexed document
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            batch_size: default_batch_size(),
            sentence_limit: default_sentence_limit(),
            max_failure_fraction: default_max_failure_fraction(),
            max_documents: None,
            language: default_language(),
        }
    }
}

/// Corpus location configuration; all fields can come from the command
/// line instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Corpus root directory
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Corpus layout
    #[serde(default)]
    pub format: Option<CorpusFormat>,
    /// Language subdirectory filter for ACE-style corpora
    #[serde(default)]
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.elasticsearch.url, "http://localhost:9200");
        assert_eq!(cfg.elasticsearch.timeout_secs, 30);
        assert_eq!(cfg.indexing.index_name, "documents");
        assert_eq!(cfg.indexing.batch_size, 100);
        assert_eq!(cfg.indexing.sentence_limit, 100);
        assert_eq!(cfg.indexing.max_failure_fraction, 0.0);
        assert!(cfg.indexing.max_documents.is_none());
        assert_eq!(cfg.indexing.language, "EN");
        assert!(cfg.corpus.root.is_none());
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut cfg = Config::default();
        cfg.indexing.batch_size = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size must be positive"));
    }

    #[test]
    fn validate_rejects_out_of_range_failure_fraction() {
        let mut cfg = Config::default();
        cfg.indexing.max_failure_fraction = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("max_failure_fraction must be between 0.0 and 1.0"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = Config::default();
        cfg.indexing.batch_size = 0;
        cfg.indexing.index_name.clear();
        cfg.elasticsearch.url.clear();
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("batch_size must be positive"));
        assert!(msg.contains("index_name must not be empty"));
        assert!(msg.contains("elasticsearch url must not be empty"));
    }

    #[test]
    fn load_parses_toml_with_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[elasticsearch]
url = "http://search.internal:9200"
username = "indexer"
password = "hunter2"

[indexing]
index_name = "gigaword"
max_failure_fraction = 0.05
"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.elasticsearch.url, "http://search.internal:9200");
        assert_eq!(cfg.elasticsearch.username.as_deref(), Some("indexer"));
        assert_eq!(cfg.indexing.index_name, "gigaword");
        assert_eq!(cfg.indexing.max_failure_fraction, 0.05);
        // Unspecified fields fall back to defaults.
        assert_eq!(cfg.indexing.batch_size, 100);
        assert_eq!(cfg.elasticsearch.timeout_secs, 30);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[indexing]\nbatch_size = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
