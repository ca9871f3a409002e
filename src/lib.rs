//! Corpus indexer: turn research corpora into a uniform article stream and
//! bulk-index it into Elasticsearch.
//!
//! Five corpus layouts are supported (Gigaword, Annotated Gigaword, LTF zip
//! archives, ACE SGML, CORD-19 JSON). Each becomes a sequence of
//! [`Article`](corpus::Article) records that the [`Indexer`](indexer::Indexer)
//! batches into bulk requests, under a configurable failure-tolerance policy.

pub mod config;
pub mod corpus;
pub mod indexer;

pub use config::Config;
pub use corpus::{Article, ArticleSource, CorpusError, CorpusFormat};
pub use indexer::{BulkSink, ElasticSink, IndexError, Indexer, RunOutcome, RunStats};
