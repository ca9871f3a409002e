//! Single-document extractor for CORD-19 style JSON papers.
//!
//! Each paper is one JSON file with a `paper_id`, a metadata title, and
//! abstract/body/reference sections. The extractor concatenates those into
//! one plain-text article, separating pieces with blank lines and
//! collapsing consecutive duplicate section headers.

use super::article::Article;
use super::error::CorpusError;
use super::ArticleSource;
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Convert the content of one paper JSON file into an article.
pub fn paper_to_article(content: &str, source: &str) -> Result<Article, CorpusError> {
    let paper: Value = serde_json::from_str(content)?;

    let paper_id = paper
        .get("paper_id")
        .and_then(Value::as_str)
        .ok_or_else(|| CorpusError::missing_id(source))?
        .to_string();

    let mut text = String::new();

    // Title, then a blank line. Authors and bibliography are not carried.
    if let Some(title) = paper.pointer("/metadata/title").and_then(Value::as_str) {
        text.push_str(title);
        text.push_str("\n\n");
    }

    append_sections(&mut text, paper.get("abstract"));
    append_sections(&mut text, paper.get("body_text"));

    // Reference entries (figures, tables) keep only their text.
    if let Some(refs) = paper.get("ref_entries").and_then(Value::as_object) {
        for entry in refs.values() {
            if let Some(t) = entry.get("text").and_then(Value::as_str) {
                text.push_str(t);
                text.push_str("\n\n");
            }
        }
    }

    Ok(Article::new(paper_id, text))
}

/// Append a run of `{section, text}` paragraphs, emitting each section
/// header once per consecutive run. The duplicate-header guard is local to
/// each pass (abstract and body are collapsed independently).
fn append_sections(out: &mut String, sections: Option<&Value>) {
    let Some(sections) = sections.and_then(Value::as_array) else {
        return;
    };
    let mut last_section: Option<&str> = None;
    for paragraph in sections {
        let section = paragraph
            .get("section")
            .and_then(Value::as_str)
            .unwrap_or("");
        if last_section != Some(section) {
            out.push_str(section);
            out.push_str("\n\n");
        }
        last_section = Some(section);
        if let Some(t) = paragraph.get("text").and_then(Value::as_str) {
            out.push_str(t);
            out.push_str("\n\n");
        }
    }
}

/// A directory of CORD-19 JSON papers as one article source.
pub struct Cord19Source {
    dir: PathBuf,
    name: String,
}

impl Cord19Source {
    /// Treat `dir` as a paper collection; it must be an existing directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(CorpusError::InvalidCorpus(format!(
                "not a directory: {}",
                dir.display()
            )));
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cord19".to_string());
        Ok(Self { dir, name })
    }
}

impl ArticleSource for Cord19Source {
    fn articles(&mut self) -> Box<dyn Iterator<Item = Result<Article, CorpusError>> + '_> {
        let walker = WalkDir::new(&self.dir).sort_by_file_name().into_iter();
        Box::new(walker.filter_map(|entry| match entry {
            Err(e) => Some(Err(CorpusError::InvalidCorpus(e.to_string()))),
            Ok(entry) => {
                let path = entry.path();
                let is_json = entry.file_type().is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some("json");
                is_json.then(|| read_paper(path))
            }
        }))
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// A malformed paper file is fatal for the run, so the error names it.
fn read_paper(path: &Path) -> Result<Article, CorpusError> {
    let content = std::fs::read_to_string(path)?;
    paper_to_article(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAPER: &str = r#"{
        "paper_id": "0001f3b2",
        "metadata": { "title": "A Study of Things" },
        "abstract": [
            { "section": "Abstract", "text": "We studied things." },
            { "section": "Abstract", "text": "Things were studied." }
        ],
        "body_text": [
            { "section": "Introduction", "text": "Things matter." },
            { "section": "Methods", "text": "We did science." },
            { "section": "Methods", "text": "More science." }
        ],
        "ref_entries": {
            "FIGREF0": { "text": "Figure 1: a thing." }
        }
    }"#;

    #[test]
    fn concatenates_title_sections_and_refs() {
        let article = paper_to_article(SAMPLE_PAPER, "sample.json").unwrap();
        assert_eq!(article.id, "0001f3b2");
        assert_eq!(
            article.text,
            "A Study of Things\n\n\
             Abstract\n\nWe studied things.\n\nThings were studied.\n\n\
             Introduction\n\nThings matter.\n\n\
             Methods\n\nWe did science.\n\nMore science.\n\n\
             Figure 1: a thing.\n\n"
        );
    }

    #[test]
    fn consecutive_duplicate_headers_are_collapsed_per_pass() {
        let json = r#"{
            "paper_id": "p1",
            "metadata": { "title": "T" },
            "abstract": [ { "section": "S", "text": "a" } ],
            "body_text": [
                { "section": "S", "text": "b" },
                { "section": "Other", "text": "c" },
                { "section": "S", "text": "d" }
            ],
            "ref_entries": {}
        }"#;
        let article = paper_to_article(json, "p1.json").unwrap();
        // "S" reappears at the start of the body pass and after "Other":
        // only consecutive repeats within one pass are collapsed.
        assert_eq!(
            article.text,
            "T\n\nS\n\na\n\nS\n\nb\n\nOther\n\nc\n\nS\n\nd\n\n"
        );
    }

    #[test]
    fn missing_paper_id_is_fatal() {
        let err = paper_to_article(r#"{"metadata":{"title":"T"}}"#, "x.json").unwrap_err();
        assert!(matches!(err, CorpusError::MissingDocumentId { .. }));
    }

    #[test]
    fn invalid_json_is_fatal() {
        assert!(matches!(
            paper_to_article("not json", "x.json").unwrap_err(),
            CorpusError::Json(_)
        ));
    }

    #[test]
    fn directory_source_walks_json_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let paper = |id: &str| {
            format!(
                r#"{{"paper_id":"{id}","metadata":{{"title":"T"}},"abstract":[],"body_text":[],"ref_entries":{{}}}}"#
            )
        };
        std::fs::write(dir.path().join("b.json"), paper("b")).unwrap();
        std::fs::write(dir.path().join("a.json"), paper("a")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let mut source = Cord19Source::from_dir(dir.path()).unwrap();
        let ids: Vec<_> = source
            .articles()
            .map(|r| r.unwrap().id)
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
