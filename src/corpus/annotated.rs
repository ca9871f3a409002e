//! Splitter for tag-annotated dumps.
//!
//! Annotated Gigaword files are line oriented: documents open with
//! `<DOC id="…">`, carry a `<HEADLINE>` region and a `<TEXT>` region, and
//! encode most content lines as bracketed parse trees. This source scans
//! line by line, accumulating state, and reconstructs plain running text
//! from the tree lines via [`super::penn::tree_yield`].

use super::article::Article;
use super::concatenated::id_from_block;
use super::error::CorpusError;
use super::penn;
use super::ArticleSource;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// One annotated dump file as an article source.
pub struct AnnotatedSource {
    name: String,
    lines: LineReader,
}

/// Line reader over a possibly-gzipped file.
enum LineReader {
    Gz(Lines<BufReader<GzDecoder<File>>>),
    Plain(Lines<BufReader<File>>),
}

impl LineReader {
    fn next_line(&mut self) -> Option<std::io::Result<String>> {
        match self {
            LineReader::Gz(lines) => lines.next(),
            LineReader::Plain(lines) => lines.next(),
        }
    }
}

impl AnnotatedSource {
    /// Open an annotated dump file, decompressing if it ends in `.gz`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);
        let lines = if is_gz {
            LineReader::Gz(BufReader::new(GzDecoder::new(file)).lines())
        } else {
            LineReader::Plain(BufReader::new(file).lines())
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "annotated dump".to_string());
        Ok(Self { name, lines })
    }
}

impl ArticleSource for AnnotatedSource {
    fn articles(&mut self) -> Box<dyn Iterator<Item = Result<Article, CorpusError>> + '_> {
        Box::new(AnnotatedIter {
            lines: &mut self.lines,
            name: &self.name,
            state: SplitState::default(),
            done: false,
        })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Accumulator for the line-oriented state machine.
#[derive(Default)]
struct SplitState {
    in_headline: bool,
    in_text: bool,
    current_id: String,
    buffer: String,
}

impl SplitState {
    /// Feed one trimmed line; returns a finished article on `</TEXT>`.
    ///
    /// The checks run in the same order as the upstream corpus tooling:
    /// id tag, region closes, content accumulation, region opens.
    fn step(&mut self, line: &str, source: &str) -> Result<Option<Article>, CorpusError> {
        let mut emitted = None;

        if line.starts_with("<DOC id=") {
            match id_from_block(line, line.len()) {
                Some(id) => self.current_id = id,
                None => return Err(CorpusError::missing_id(source)),
            }
        }

        if line == "</TEXT>" {
            emitted = Some(Article::new(
                self.current_id.clone(),
                self.buffer.trim(),
            ));
            self.buffer.clear();
            self.in_text = false;
        }

        if line == "</HEADLINE>" {
            self.buffer.push_str("\n\n");
            self.in_headline = false;
        }

        if (self.in_headline || self.in_text) && !line.starts_with('<') {
            if line.is_empty() {
                self.buffer.push('\n');
            } else if line.starts_with('(') {
                let yielded = penn::tree_yield(line);
                // A tree with no content parses to the literal "null".
                if yielded != "null" {
                    self.buffer.push_str(&yielded);
                    self.buffer.push(' ');
                }
            } else {
                // Occasionally a document carries one unannotated line,
                // usable as plain text.
                self.buffer.push_str(line);
                self.buffer.push(' ');
            }
        }

        if line == "<TEXT>" {
            self.in_text = true;
        }
        if line == "<HEADLINE>" {
            self.in_headline = true;
        }

        Ok(emitted)
    }
}

struct AnnotatedIter<'a> {
    lines: &'a mut LineReader,
    name: &'a str,
    state: SplitState,
    done: bool,
}

impl Iterator for AnnotatedIter<'_> {
    type Item = Result<Article, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next_line() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                Some(Ok(line)) => line,
            };
            match self.state.step(line.trim(), self.name) {
                Ok(Some(article)) => return Some(Ok(article)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
