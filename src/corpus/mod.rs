//! Corpus extraction: format-specific sources producing a uniform stream of
//! [`Article`] records.
//!
//! A corpus root is resolved to zero or more source files (or, for CORD-19,
//! the root directory itself), each of which opens as a lazy, finite,
//! non-restartable sequence of articles. Recoverable per-document problems
//! surface as `Article { failed: true }` markers; everything else aborts the
//! source through [`CorpusError`].
//!
//! # Supported formats
//!
//! - **Gigaword**: gzipped files of concatenated `<DOC id=…>…</DOC>` blocks
//! - **Annotated Gigaword**: tag-structured lines with parse-tree content
//! - **LTF**: zip archives of per-document `.ltf.xml` entries
//! - **ACE**: single-document `.sgm` files under `adj/` directories
//! - **CORD-19**: a directory of structured-JSON papers

pub mod ace;
pub mod annotated;
pub mod archive;
pub mod article;
pub mod concatenated;
pub mod cord19;
pub mod error;
pub mod ltf;
pub mod penn;

pub use ace::AceSource;
pub use annotated::AnnotatedSource;
pub use archive::{ArchiveSource, EntryReader};
pub use article::Article;
pub use concatenated::ConcatenatedSource;
pub use cord19::Cord19Source;
pub use error::CorpusError;
pub use ltf::LtfReader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Something that yields articles for indexing.
///
/// Sources are iterated lazily and at most once. The underlying handle
/// (file, zip archive) is owned by the source and released when it is
/// dropped, whether iteration finished, errored, or was abandoned early.
pub trait ArticleSource {
    /// Iterate over the articles in this source.
    fn articles(&mut self) -> Box<dyn Iterator<Item = Result<Article, CorpusError>> + '_>;

    /// Name of the source for logging.
    fn source_name(&self) -> &str;
}

/// The extraction strategy for a corpus, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusFormat {
    /// Concatenated newswire dumps (`**/data/**/*.gz`).
    Gigaword,
    /// Tag-annotated dumps with parse-tree content lines (same layout).
    AnnotatedGigaword,
    /// Zip archives of LTF XML entries (`*.ltf.zip`).
    Ltf,
    /// Single-document ACE SGML files (`**/adj/*.sgm`).
    Ace,
    /// CORD-19 style directory of JSON papers.
    Cord19,
}

impl CorpusFormat {
    /// Guess the format from a path's naming conventions.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        if name.ends_with(".ltf.zip") {
            Some(CorpusFormat::Ltf)
        } else if name.ends_with(".sgm") {
            Some(CorpusFormat::Ace)
        } else if name.ends_with(".gz") {
            Some(CorpusFormat::Gigaword)
        } else if name.ends_with(".json") {
            Some(CorpusFormat::Cord19)
        } else {
            None
        }
    }

    /// Whether `path` is a source file for this format.
    ///
    /// `language` narrows the ACE walk to one language subtree (the corpus
    /// ships English/Chinese/Arabic side by side with identical layouts).
    fn matches(&self, path: &Path, language: Option<&str>) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        match self {
            CorpusFormat::Gigaword | CorpusFormat::AnnotatedGigaword => {
                name.ends_with(".gz") && has_component(path, "data")
            }
            CorpusFormat::Ltf => name.ends_with(".ltf.zip"),
            CorpusFormat::Ace => {
                let in_adj = path
                    .parent()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .map(|n| n == "adj")
                    .unwrap_or(false);
                let lang_ok = match language {
                    Some(lang) => path
                        .components()
                        .any(|c| c.as_os_str().to_str().is_some_and(|s| s.eq_ignore_ascii_case(lang))),
                    None => true,
                };
                name.ends_with(".sgm") && in_adj && lang_ok
            }
            // The CORD-19 source walks its own JSON files; the corpus root
            // is the single source.
            CorpusFormat::Cord19 => false,
        }
    }
}

/// Guess a corpus root's format from the first recognizable file under it.
///
/// Best effort: annotated dumps share the plain Gigaword naming, so they
/// still need an explicit format.
pub fn detect_format(root: &Path) -> Option<CorpusFormat> {
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().flatten() {
        if entry.file_type().is_file() {
            if let Some(format) = CorpusFormat::detect(entry.path()) {
                return Some(format);
            }
        }
    }
    None
}

fn has_component(path: &Path, wanted: &str) -> bool {
    path.components()
        .any(|c| c.as_os_str().to_str() == Some(wanted))
}

/// Walk the corpus root and collect source paths for the given format.
///
/// The root must exist and be a directory; that is checked up front, before
/// any extraction begins. Results come back in sorted walk order so a run
/// is reproducible.
pub fn discover_sources(
    root: &Path,
    format: CorpusFormat,
    language: Option<&str>,
) -> Result<Vec<PathBuf>, CorpusError> {
    if !root.exists() {
        return Err(CorpusError::InvalidCorpus(format!(
            "corpus path does not exist: {}",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(CorpusError::InvalidCorpus(format!(
            "corpus path is not a directory: {}",
            root.display()
        )));
    }

    if format == CorpusFormat::Cord19 {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| CorpusError::InvalidCorpus(e.to_string()))?;
        if entry.file_type().is_file() && format.matches(entry.path(), language) {
            sources.push(entry.path().to_path_buf());
        }
    }
    debug!("discovered {} source(s) under {}", sources.len(), root.display());
    Ok(sources)
}

/// Open one source path with the extraction strategy for `format`.
pub fn open_source(
    format: CorpusFormat,
    path: &Path,
) -> Result<Box<dyn ArticleSource + Send>, CorpusError> {
    match format {
        CorpusFormat::Gigaword => Ok(Box::new(ConcatenatedSource::open(path)?)),
        CorpusFormat::AnnotatedGigaword => Ok(Box::new(AnnotatedSource::open(path)?)),
        CorpusFormat::Ltf => Ok(Box::new(ArchiveSource::open(path, LtfReader::new())?)),
        CorpusFormat::Ace => Ok(Box::new(AceSource::open(path)?)),
        CorpusFormat::Cord19 => Ok(Box::new(Cord19Source::from_dir(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection() {
        assert_eq!(
            CorpusFormat::detect(Path::new("ltf/eng.ltf.zip")),
            Some(CorpusFormat::Ltf)
        );
        assert_eq!(
            CorpusFormat::detect(Path::new("adj/APW20001001.sgm")),
            Some(CorpusFormat::Ace)
        );
        assert_eq!(
            CorpusFormat::detect(Path::new("data/afp_eng/afp_eng_199405.gz")),
            Some(CorpusFormat::Gigaword)
        );
        assert_eq!(
            CorpusFormat::detect(Path::new("document_parses/pmc_json/PMC35282.json")),
            Some(CorpusFormat::Cord19)
        );
        assert_eq!(CorpusFormat::detect(Path::new("notes.txt")), None);
    }

    #[test]
    fn format_is_detected_from_files_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data").join("afp_eng");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("readme.txt"), b"x").unwrap();
        std::fs::write(data.join("afp_eng_199405.gz"), b"x").unwrap();

        assert_eq!(detect_format(dir.path()), Some(CorpusFormat::Gigaword));
        assert_eq!(detect_format(&dir.path().join("missing")), None);
    }

    #[test]
    fn gigaword_glob_requires_data_component() {
        let f = CorpusFormat::Gigaword;
        assert!(f.matches(Path::new("gw/data/afp_eng/afp_eng_199405.gz"), None));
        assert!(!f.matches(Path::new("gw/docs/afp_eng_199405.gz"), None));
        assert!(!f.matches(Path::new("gw/data/afp_eng/readme.txt"), None));
    }

    #[test]
    fn ace_glob_checks_adj_parent_and_language() {
        let f = CorpusFormat::Ace;
        let p = Path::new("ace/English/nw/adj/APW20001001.sgm");
        assert!(f.matches(p, None));
        assert!(f.matches(p, Some("english")));
        assert!(!f.matches(p, Some("chinese")));
        assert!(!f.matches(Path::new("ace/English/nw/fp1/APW20001001.sgm"), None));
    }

    #[test]
    fn discovery_rejects_missing_root() {
        let err = discover_sources(Path::new("/no/such/dir"), CorpusFormat::Gigaword, None)
            .unwrap_err();
        assert!(matches!(err, CorpusError::InvalidCorpus(_)));
    }

    #[test]
    fn discovery_finds_sorted_sources() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data").join("afp_eng");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("b.gz"), b"x").unwrap();
        std::fs::write(data.join("a.gz"), b"x").unwrap();
        std::fs::write(data.join("skip.txt"), b"x").unwrap();

        let sources = discover_sources(dir.path(), CorpusFormat::Gigaword, None).unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources[0].ends_with("a.gz"));
        assert!(sources[1].ends_with("b.gz"));
    }

    #[test]
    fn cord19_root_is_the_single_source() {
        let dir = tempfile::tempdir().unwrap();
        let sources = discover_sources(dir.path(), CorpusFormat::Cord19, None).unwrap();
        assert_eq!(sources, vec![dir.path().to_path_buf()]);
    }
}
