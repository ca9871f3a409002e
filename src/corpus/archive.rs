//! Zip-archive source with per-entry fault isolation.
//!
//! Archive corpora store one structured file per document (occasionally
//! several documents per file). Iteration runs at two levels: an outer
//! cursor over matching zip entries and an inner buffer of articles already
//! decoded from the current entry. A damaged entry must not lose the rest
//! of a multi-gigabyte archive, so per-entry read/decode errors become a
//! single `failed` article and iteration moves on.

use super::article::Article;
use super::error::CorpusError;
use super::ArticleSource;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;
use zip::ZipArchive;

/// Decodes the raw bytes of one archive entry into zero or more articles.
///
/// Implementations are format collaborators (e.g. [`super::ltf::LtfReader`]);
/// the archive layer owns entry selection, error isolation, and the handle.
pub trait EntryReader {
    /// Entry-name suffix this reader handles (e.g. `.ltf.xml`).
    fn entry_suffix(&self) -> &str;

    /// Decode one entry. Errors here are recovered by the archive layer.
    fn read_entry(&self, name: &str, bytes: &[u8]) -> Result<Vec<Article>, CorpusError>;
}

/// A zip archive as an article source.
///
/// The archive handle is owned here for the source's whole lifetime and
/// released exactly once on drop, however iteration ends.
pub struct ArchiveSource<R: EntryReader> {
    name: String,
    archive: ZipArchive<File>,
    reader: R,
}

impl<R: EntryReader> ArchiveSource<R> {
    /// Open a zip archive. A structurally broken archive is fatal here;
    /// damage inside individual entries is handled during iteration.
    pub fn open(path: impl AsRef<Path>, reader: R) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(|e| CorpusError::Archive {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        Ok(Self {
            name,
            archive,
            reader,
        })
    }
}

impl<R: EntryReader> ArticleSource for ArchiveSource<R> {
    fn articles(&mut self) -> Box<dyn Iterator<Item = Result<Article, CorpusError>> + '_> {
        Box::new(ArchiveIter {
            archive: &mut self.archive,
            reader: &self.reader,
            next_index: 0,
            pending: VecDeque::new(),
        })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Two-level iterator: outer cursor over entries, inner drained buffer of
/// articles from the current entry.
struct ArchiveIter<'a, R: EntryReader> {
    archive: &'a mut ZipArchive<File>,
    reader: &'a R,
    next_index: usize,
    pending: VecDeque<Article>,
}

impl<R: EntryReader> ArchiveIter<'_, R> {
    /// Read the next matching entry's bytes, advancing the outer cursor.
    ///
    /// Returns `None` when the archive is exhausted; otherwise the entry
    /// name and either its bytes or the read failure message.
    fn next_entry(&mut self) -> Option<(String, Result<Vec<u8>, String>)> {
        while self.next_index < self.archive.len() {
            let index = self.next_index;
            self.next_index += 1;

            match self.archive.by_index(index) {
                Ok(mut entry) => {
                    let name = entry.name().to_string();
                    if !name.ends_with(self.reader.entry_suffix()) {
                        continue;
                    }
                    let mut bytes = Vec::new();
                    return match entry.read_to_end(&mut bytes) {
                        Ok(_) => Some((name, Ok(bytes))),
                        // e.g. a corrupt checksum within one entry
                        Err(e) => Some((name, Err(e.to_string()))),
                    };
                }
                Err(e) => return Some((format!("entry #{index}"), Err(e.to_string()))),
            }
        }
        None
    }
}

impl<R: EntryReader> Iterator for ArchiveIter<'_, R> {
    type Item = Result<Article, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Drain the inner buffer first.
            if let Some(article) = self.pending.pop_front() {
                return Some(Ok(article));
            }
            // Refill from the next matching entry, or finish.
            let (name, read_result) = self.next_entry()?;
            let decoded = read_result
                .map_err(CorpusError::EntryDecode)
                .and_then(|bytes| self.reader.read_entry(&name, &bytes));
            match decoded {
                Ok(articles) => self.pending.extend(articles),
                Err(e) => {
                    warn!("failed to decode archive entry {}: {}", name, e);
                    self.pending
                        .push_back(Article::failed(entry_stem(&name, self.reader.entry_suffix())));
                }
            }
        }
    }
}

/// Recoverable id for a failed entry: its base name without the suffix.
fn entry_stem(name: &str, suffix: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.strip_suffix(suffix).unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Test reader: entries are pipe-separated id lists, "BAD" is a decode
    /// error, keeping these tests independent of any real entry format.
    struct PipeReader;

    impl EntryReader for PipeReader {
        fn entry_suffix(&self) -> &str {
            ".txt"
        }

        fn read_entry(&self, _name: &str, bytes: &[u8]) -> Result<Vec<Article>, CorpusError> {
            let content = std::str::from_utf8(bytes)
                .map_err(|e| CorpusError::EntryDecode(e.to_string()))?;
            if content == "BAD" {
                return Err(CorpusError::EntryDecode("malformed record".to_string()));
            }
            Ok(content
                .split('|')
                .filter(|s| !s.is_empty())
                .map(|id| Article::new(id, format!("text of {id}")))
                .collect())
        }
    }

    fn build_archive(entries: &[(&str, &str)]) -> ArchiveSource<PipeReader> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        // Keep the temp dir alive through the archive's own handle.
        let source = ArchiveSource::open(&path, PipeReader).unwrap();
        std::mem::forget(dir);
        source
    }

    #[test]
    fn flattens_entries_into_one_sequence() {
        let mut source = build_archive(&[("a.txt", "a1|a2"), ("b.txt", "b1")]);
        let articles: Vec<_> = source.articles().map(|r| r.unwrap()).collect();
        let ids: Vec<_> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "b1"]);
    }

    #[test]
    fn skips_entries_with_other_suffixes() {
        let mut source = build_archive(&[("a.txt", "a1"), ("notes.md", "ignored")]);
        let articles: Vec<_> = source.articles().map(|r| r.unwrap()).collect();
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn empty_entries_yield_nothing() {
        let mut source = build_archive(&[("a.txt", ""), ("b.txt", "b1")]);
        let articles: Vec<_> = source.articles().map(|r| r.unwrap()).collect();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "b1");
    }

    #[test]
    fn corrupt_entry_is_isolated_as_failed_article() {
        let mut source = build_archive(&[("a.txt", "a1|a2"), ("bad.txt", "BAD"), ("c.txt", "c1")]);
        let articles: Vec<_> = source.articles().map(|r| r.unwrap()).collect();
        assert_eq!(articles.len(), 4);
        assert!(!articles[0].failed);
        assert!(articles[2].failed);
        assert_eq!(articles[2].id, "bad");
        assert_eq!(articles[3].id, "c1");
    }

    #[test]
    fn entry_stem_strips_directories_and_suffix() {
        assert_eq!(entry_stem("ltf/doc_17.ltf.xml", ".ltf.xml"), "doc_17");
        assert_eq!(entry_stem("plain", ".ltf.xml"), "plain");
    }
}
