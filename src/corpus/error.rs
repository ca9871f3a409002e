//! Error taxonomy for corpus extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening or extracting a corpus source.
///
/// Per-document recoverable failures never show up here; those are turned
/// into `Article { failed: true }` markers by the archive reader. Everything
/// in this enum is fatal for the enclosing source.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing document id in {context}")]
    MissingDocumentId { context: String },

    #[error("corpus path error: {0}")]
    InvalidCorpus(String),

    #[error("archive error in {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("entry decode failure: {0}")]
    EntryDecode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<quick_xml::Error> for CorpusError {
    fn from(e: quick_xml::Error) -> Self {
        CorpusError::Xml(e.to_string())
    }
}

impl CorpusError {
    /// Shorthand for a missing-id error naming where the id was expected.
    pub fn missing_id(context: impl Into<String>) -> Self {
        CorpusError::MissingDocumentId {
            context: context.into(),
        }
    }
}
