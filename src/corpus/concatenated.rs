//! Splitter for concatenated newswire dumps.
//!
//! The LDC distributes Gigaword as a moderate number of gzipped files, each
//! holding many documents concatenated together as `<DOC id="…">…</DOC>`
//! blocks. This source splits one such file into articles by scanning for
//! the end-of-document marker.

use super::article::Article;
use super::error::CorpusError;
use flate2::read::GzDecoder;
use regex_lite::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use super::ArticleSource;

/// Start-of-document marker, which also carries the document id.
static DOC_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

/// End-of-document marker.
const END_OF_DOCUMENT_MARKER: &str = "</DOC>";

/// How far into a document the id marker is expected to appear.
const ID_SEARCH_WINDOW: usize = 100;

fn doc_id_pattern() -> &'static Regex {
    DOC_ID_PATTERN.get_or_init(|| Regex::new(r#"<DOC id="(.*?)""#).expect("valid regex"))
}

/// Extract a document id from the head of a document block.
///
/// Only the first `window` bytes are searched (clamped to a char boundary):
/// if the id is not that close to the boundary, the boundary itself is
/// suspect and the source is not trusted any further.
pub(crate) fn id_from_block(block: &str, window: usize) -> Option<String> {
    let mut end = block.len().min(window);
    while end > 0 && !block.is_char_boundary(end) {
        end -= 1;
    }
    doc_id_pattern()
        .captures(&block[..end])
        .map(|c| c[1].to_string())
}

/// Read a possibly-gzipped file into a string.
pub(crate) fn read_text(path: &Path) -> Result<String, CorpusError> {
    let file = File::open(path)?;
    let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);
    let mut text = String::new();
    if is_gz {
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        let mut file = file;
        file.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// One concatenated dump file as an article source.
pub struct ConcatenatedSource {
    name: String,
    text: String,
}

impl ConcatenatedSource {
    /// Open a concatenated dump file, decompressing if it ends in `.gz`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "concatenated dump".to_string());
        Ok(Self { name, text })
    }
}

impl ArticleSource for ConcatenatedSource {
    fn articles(&mut self) -> Box<dyn Iterator<Item = Result<Article, CorpusError>> + '_> {
        Box::new(ConcatenatedIter {
            text: &self.text,
            name: &self.name,
            cursor: 0,
        })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Cursor-based iterator over marker-delimited documents.
struct ConcatenatedIter<'a> {
    text: &'a str,
    name: &'a str,
    cursor: usize,
}

impl Iterator for ConcatenatedIter<'_> {
    type Item = Result<Article, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.text.len() {
            return None;
        }
        // Trailing content with no further end marker is dropped, never
        // emitted. That matches the upstream corpus tooling.
        let marker = self.text[self.cursor..].find(END_OF_DOCUMENT_MARKER)?;
        let end = self.cursor + marker + END_OF_DOCUMENT_MARKER.len();
        let block = &self.text[self.cursor..end];
        self.cursor = end;

        match id_from_block(block, ID_SEARCH_WINDOW) {
            Some(id) => Some(Ok(Article::new(id, block))),
            None => {
                // A document boundary without an id means the boundaries
                // themselves cannot be trusted; abort the source.
                self.cursor = self.text.len();
                Some(Err(CorpusError::missing_id(self.name)))
            }
        }
    }
}
