//! Batching & indexing control loop.
//!
//! Pulls articles from one source at a time, partitions them into
//! fixed-size batches, applies the per-document size/failure policy, and
//! submits each batch as one bulk-write request. The loop owns the run
//! counters; parsers never touch them.
//!
//! Per document, in order:
//! 1. already failed in extraction → counted; the run aborts when the
//!    running failed/total ratio exceeds the configured ceiling
//! 2. oversized (more segments than the limit) → counted, never indexed
//! 3. otherwise → into the current batch
//!
//! A backend-reported failure inside a bulk response is fatal — its reasons
//! are opaque to this layer and nothing here retries.

pub mod elastic;
pub mod sink;

pub use elastic::ElasticSink;
pub use sink::{BulkFailure, BulkSink, SinkError};

use crate::config::IndexingConfig;
use crate::corpus::{self, Article, ArticleSource, CorpusError, CorpusFormat};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort an indexing run.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("failed documents exceeded threshold: {failed} of {total} (max fraction {max_fraction})")]
    FailureThresholdExceeded {
        failed: usize,
        total: usize,
        max_fraction: f64,
    },

    #[error("backend rejected {} document(s) in bulk response", failures.len())]
    BulkRejected { failures: Vec<BulkFailure> },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Counters for one run. Owned exclusively by the control loop.
///
/// `failed_documents <= total_documents` holds at every point where the
/// stats are observable from outside the loop.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Documents pulled from sources, counted unconditionally.
    pub total_documents: usize,
    /// Documents that failed extraction or exceeded the size limit.
    pub failed_documents: usize,
    /// Documents actually submitted to the backend.
    pub indexed_documents: usize,
    /// Bulk requests issued.
    pub batches_submitted: usize,
}

/// How a run ended, when it did not end in an error.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// All sources were exhausted.
    Completed(RunStats),
    /// The document cap was reached before the sources ran out.
    StoppedEarly(RunStats),
}

impl RunOutcome {
    pub fn stats(&self) -> &RunStats {
        match self {
            RunOutcome::Completed(stats) | RunOutcome::StoppedEarly(stats) => stats,
        }
    }

    pub fn stopped_early(&self) -> bool {
        matches!(self, RunOutcome::StoppedEarly(_))
    }
}

/// The control loop, generic over the bulk-indexing backend.
pub struct Indexer<S: BulkSink> {
    sink: S,
    config: IndexingConfig,
}

impl<S: BulkSink> Indexer<S> {
    pub fn new(sink: S, config: IndexingConfig) -> Self {
        Self { sink, config }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Index every source in order, one at a time.
    ///
    /// Bulk requests are issued strictly sequentially; emission order from
    /// each source is preserved into submission order.
    pub async fn run(
        &self,
        format: CorpusFormat,
        sources: &[PathBuf],
    ) -> Result<RunOutcome, IndexError> {
        let mut stats = RunStats::default();
        for path in sources {
            info!("processing source: {}", path.display());
            let mut source = corpus::open_source(format, path)?;
            if self.index_source(source.as_mut(), &mut stats).await? {
                info!(
                    "indexing stopped early after {} document(s): document cap reached",
                    stats.total_documents
                );
                return Ok(RunOutcome::StoppedEarly(stats));
            }
        }
        Ok(RunOutcome::Completed(stats))
    }

    /// Process one source to exhaustion or until the document cap.
    ///
    /// Returns `true` when the cap was reached and the run should stop.
    pub async fn index_source(
        &self,
        source: &mut (dyn ArticleSource + Send),
        stats: &mut RunStats,
    ) -> Result<bool, IndexError> {
        let mut articles = source.articles();
        loop {
            let mut batch = Vec::new();
            let mut pulled = 0;
            let mut capped = false;
            let mut exhausted = false;

            while pulled < self.config.batch_size {
                if let Some(max) = self.config.max_documents {
                    if stats.total_documents >= max {
                        capped = true;
                        break;
                    }
                }
                match articles.next() {
                    Some(next) => {
                        self.classify(next?, &mut batch, stats)?;
                        pulled += 1;
                    }
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }

            if !batch.is_empty() {
                let failures = self.sink.bulk_index(&self.config.index_name, &batch).await?;
                if !failures.is_empty() {
                    for failure in &failures {
                        warn!("backend rejected {}: {}", failure.id, failure.reason);
                    }
                    return Err(IndexError::BulkRejected { failures });
                }
                stats.indexed_documents += batch.len();
                stats.batches_submitted += 1;
            }

            if capped {
                return Ok(true);
            }
            if let Some(max) = self.config.max_documents {
                if stats.total_documents >= max {
                    return Ok(true);
                }
            }
            if exhausted {
                return Ok(false);
            }
        }
    }

    /// Apply the per-document policy and update the counters.
    fn classify(
        &self,
        article: Article,
        batch: &mut Vec<Article>,
        stats: &mut RunStats,
    ) -> Result<(), IndexError> {
        // The ratio is checked against the documents seen before this one;
        // a failed document before any clean one makes the ratio infinite
        // and aborts the run regardless of the tolerance.
        let seen_before = stats.total_documents;
        let mut threshold_hit = false;

        if article.failed {
            stats.failed_documents += 1;
            let ratio = stats.failed_documents as f64 / seen_before as f64;
            threshold_hit = ratio > self.config.max_failure_fraction;
        } else if article.segments > self.config.sentence_limit {
            stats.failed_documents += 1;
            warn!(
                "document {} not indexed: {} segments exceed the limit of {}",
                article.id, article.segments, self.config.sentence_limit
            );
        } else {
            batch.push(article);
        }

        stats.total_documents += 1;
        if threshold_hit {
            return Err(IndexError::FailureThresholdExceeded {
                failed: stats.failed_documents,
                total: stats.total_documents,
                max_fraction: self.config.max_failure_fraction,
            });
        }
        Ok(())
    }
}
