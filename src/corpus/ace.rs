//! Single-document extractor for ACE-style SGML files.
//!
//! Each `.sgm` file under an `adj/` directory is one document; the id is
//! embedded as `<DOCID> … </DOCID>` near the top of the file.

use super::article::Article;
use super::error::CorpusError;
use super::ArticleSource;
use regex_lite::Regex;
use std::path::Path;
use std::sync::OnceLock;

static ACE_DOC_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

/// How far into the file the id marker is expected to appear.
const ID_SEARCH_WINDOW: usize = 120;

fn ace_doc_id_pattern() -> &'static Regex {
    ACE_DOC_ID_PATTERN.get_or_init(|| Regex::new(r"<DOCID> (.*?) </DOCID>").expect("valid regex"))
}

/// Extract the single article from an ACE SGML file's text.
///
/// Line endings are normalized to LF so offsets downstream are stable
/// across corpus copies produced on different platforms.
pub fn extract_ace_article(text: &str, source: &str) -> Result<Article, CorpusError> {
    let mut end = text.len().min(ID_SEARCH_WINDOW);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let id = ace_doc_id_pattern()
        .captures(&text[..end])
        .map(|c| c[1].to_string())
        .ok_or_else(|| CorpusError::missing_id(source))?;
    Ok(Article::new(id, text.replace("\r\n", "\n")))
}

/// One ACE SGML file as an article source (a degenerate, one-item source).
pub struct AceSource {
    name: String,
    text: String,
}

impl AceSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ace document".to_string());
        Ok(Self { name, text })
    }
}

impl ArticleSource for AceSource {
    fn articles(&mut self) -> Box<dyn Iterator<Item = Result<Article, CorpusError>> + '_> {
        Box::new(std::iter::once(extract_ace_article(&self.text, &self.name)))
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_and_normalizes_line_endings() {
        let text = "<DOC>\r\n<DOCID> APW20001001.2021.0521 </DOCID>\r\n<BODY>\r\nSome text.\r\n</BODY>\r\n</DOC>\r\n";
        let article = extract_ace_article(text, "test.sgm").unwrap();
        assert_eq!(article.id, "APW20001001.2021.0521");
        assert!(!article.text.contains('\r'));
        assert!(article.text.contains("Some text."));
    }

    #[test]
    fn missing_docid_is_fatal() {
        let err = extract_ace_article("<DOC><BODY>no id</BODY></DOC>", "test.sgm").unwrap_err();
        assert!(matches!(err, CorpusError::MissingDocumentId { .. }));
    }

    #[test]
    fn docid_outside_window_is_fatal() {
        let text = format!("{}<DOCID> LATE </DOCID>", "x".repeat(130));
        assert!(extract_ace_article(&text, "test.sgm").is_err());
    }

    #[test]
    fn source_yields_exactly_one_article() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("APW20001001.sgm");
        std::fs::write(&path, "<DOCID> APW20001001 </DOCID>\nbody\n").unwrap();
        let mut source = AceSource::open(&path).unwrap();
        let articles: Vec<_> = source.articles().map(|r| r.unwrap()).collect();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "APW20001001");
    }
}
