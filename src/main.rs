//! Command-line entry point for the corpus indexer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use corpus_indexer::{
    config::Config,
    corpus::{self, CorpusFormat},
    indexer::{ElasticSink, Indexer, RunOutcome},
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "corpus-indexer")]
#[command(about = "Extract articles from corpus dumps and bulk-index them into Elasticsearch")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and index a corpus
    Index {
        /// Corpus root directory (overrides the config file)
        corpus: Option<PathBuf>,

        /// Corpus layout
        #[arg(short, long, value_enum)]
        format: Option<CliFormat>,

        /// Target index name
        #[arg(short, long)]
        index: Option<String>,

        /// Documents per bulk request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Skip documents with more segments than this
        #[arg(long)]
        sentence_limit: Option<usize>,

        /// Maximum tolerated failed/total ratio
        #[arg(long)]
        max_failure_fraction: Option<f64>,

        /// Stop after this many documents
        #[arg(long)]
        max_docs: Option<usize>,

        /// Language subdirectory filter for ACE corpora
        #[arg(short, long)]
        language: Option<String>,
    },

    /// List the source files a corpus would be read from, without indexing
    Scan {
        /// Corpus root directory (overrides the config file)
        corpus: Option<PathBuf>,

        /// Corpus layout
        #[arg(short, long, value_enum)]
        format: Option<CliFormat>,

        /// Language subdirectory filter for ACE corpora
        #[arg(short, long)]
        language: Option<String>,
    },
}

/// CLI corpus format enum (mirrors CorpusFormat but with clap support)
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliFormat {
    /// Concatenated newswire dumps (*.gz under data/)
    Gigaword,
    /// Tag-annotated dumps with parse-tree content
    AnnotatedGigaword,
    /// Zip archives of LTF XML entries (*.ltf.zip)
    Ltf,
    /// Single-document ACE SGML files (adj/*.sgm)
    Ace,
    /// CORD-19 style directory of JSON papers
    Cord19,
}

impl From<CliFormat> for CorpusFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Gigaword => CorpusFormat::Gigaword,
            CliFormat::AnnotatedGigaword => CorpusFormat::AnnotatedGigaword,
            CliFormat::Ltf => CorpusFormat::Ltf,
            CliFormat::Ace => CorpusFormat::Ace,
            CliFormat::Cord19 => CorpusFormat::Cord19,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Index {
            corpus,
            format,
            index,
            batch_size,
            sentence_limit,
            max_failure_fraction,
            max_docs,
            language,
        } => {
            run_index(
                config,
                corpus,
                format,
                index,
                batch_size,
                sentence_limit,
                max_failure_fraction,
                max_docs,
                language,
            )
            .await
        }
        Commands::Scan {
            corpus,
            format,
            language,
        } => run_scan(config, corpus, format, language),
    }
}

/// Resolve the corpus root/format/language from CLI arguments with the
/// config file as fallback.
fn resolve_corpus(
    config: &Config,
    corpus: Option<PathBuf>,
    format: Option<CliFormat>,
    language: Option<String>,
) -> Result<(PathBuf, CorpusFormat, Option<String>)> {
    let root = corpus
        .or_else(|| config.corpus.root.clone())
        .ok_or_else(|| anyhow::anyhow!("No corpus root given (pass one or set corpus.root)"))?;
    let format = format
        .map(CorpusFormat::from)
        .or(config.corpus.format)
        .or_else(|| corpus::detect_format(&root))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Could not detect corpus format under {}. Specify format with --format",
                root.display()
            )
        })?;
    let language = language.or_else(|| config.corpus.language.clone());
    Ok((root, format, language))
}

#[allow(clippy::too_many_arguments)]
async fn run_index(
    mut config: Config,
    corpus: Option<PathBuf>,
    format: Option<CliFormat>,
    index: Option<String>,
    batch_size: Option<usize>,
    sentence_limit: Option<usize>,
    max_failure_fraction: Option<f64>,
    max_docs: Option<usize>,
    language: Option<String>,
) -> Result<()> {
    if let Some(index) = index {
        config.indexing.index_name = index;
    }
    if let Some(batch_size) = batch_size {
        config.indexing.batch_size = batch_size;
    }
    if let Some(sentence_limit) = sentence_limit {
        config.indexing.sentence_limit = sentence_limit;
    }
    if let Some(fraction) = max_failure_fraction {
        config.indexing.max_failure_fraction = fraction;
    }
    if let Some(max_docs) = max_docs {
        config.indexing.max_documents = Some(max_docs);
    }
    config.validate()?;

    let (root, format, language) = resolve_corpus(&config, corpus, format, language)?;
    let sources = corpus::discover_sources(&root, format, language.as_deref())?;
    if sources.is_empty() {
        anyhow::bail!("No corpus sources found under {}", root.display());
    }
    info!(
        "Indexing {} source(s) into '{}' at {}",
        sources.len(),
        config.indexing.index_name,
        config.elasticsearch.url
    );

    let sink = ElasticSink::new(&config.elasticsearch, config.indexing.language.clone())?;
    let indexer = Indexer::new(sink, config.indexing.clone());
    let outcome = indexer.run(format, &sources).await?;

    let stats = outcome.stats();
    info!(
        "Done: {} document(s) seen, {} indexed, {} failed, {} batch(es) submitted",
        stats.total_documents,
        stats.indexed_documents,
        stats.failed_documents,
        stats.batches_submitted
    );
    if outcome.stopped_early() {
        warn!("Run stopped early at the configured document cap");
    }
    Ok(())
}

fn run_scan(
    config: Config,
    corpus: Option<PathBuf>,
    format: Option<CliFormat>,
    language: Option<String>,
) -> Result<()> {
    let (root, format, language) = resolve_corpus(&config, corpus, format, language)?;
    let sources = corpus::discover_sources(&root, format, language.as_deref())?;
    for source in &sources {
        println!("{}", source.display());
    }
    info!("{} source(s) under {}", sources.len(), root.display());
    Ok(())
}
