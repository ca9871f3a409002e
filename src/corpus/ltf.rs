//! Structured per-entry reader for LTF XML files.
//!
//! An `.ltf.xml` entry carries one (in theory several) `<DOC id=…>` blocks,
//! each segmented into `<SEG>` elements whose `<ORIGINAL_TEXT>` holds the
//! surface text. The reader reconstructs each document's text by joining
//! segment texts with newlines and reports the segment count, which the
//! indexing loop uses for its size-limit policy.

use super::archive::EntryReader;
use super::article::Article;
use super::error::CorpusError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Reader for `.ltf.xml` archive entries.
#[derive(Debug, Default)]
pub struct LtfReader;

impl LtfReader {
    pub fn new() -> Self {
        Self
    }
}

impl EntryReader for LtfReader {
    fn entry_suffix(&self) -> &str {
        ".ltf.xml"
    }

    fn read_entry(&self, name: &str, bytes: &[u8]) -> Result<Vec<Article>, CorpusError> {
        parse_ltf(name, bytes)
    }
}

/// State for the document currently being assembled.
#[derive(Default)]
struct PartialDoc {
    id: String,
    segments: Vec<String>,
}

fn parse_ltf(entry_name: &str, bytes: &[u8]) -> Result<Vec<Article>, CorpusError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut documents = Vec::new();
    let mut current: Option<PartialDoc> = None;
    let mut in_original_text = false;
    let mut text_buf = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"DOC" => {
                    let id = attribute(e, b"id")?
                        .ok_or_else(|| CorpusError::missing_id(entry_name))?;
                    current = Some(PartialDoc {
                        id,
                        segments: Vec::new(),
                    });
                }
                b"ORIGINAL_TEXT" => {
                    in_original_text = true;
                    text_buf.clear();
                }
                _ => {}
            },
            Event::Text(ref e) => {
                if in_original_text {
                    if let Ok(text) = e.unescape() {
                        text_buf.push_str(&text);
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"ORIGINAL_TEXT" => {
                    in_original_text = false;
                    if let Some(ref mut doc) = current {
                        doc.segments.push(std::mem::take(&mut text_buf));
                    }
                }
                b"DOC" => {
                    if let Some(doc) = current.take() {
                        let segment_count = doc.segments.len();
                        documents.push(
                            Article::new(doc.id, doc.segments.join("\n"))
                                .with_segments(segment_count),
                        );
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(documents)
}

/// Pull one attribute value off a start tag.
fn attribute(
    e: &quick_xml::events::BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, CorpusError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| CorpusError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| CorpusError::Xml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LTF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<LCTL_TEXT>
  <DOC id="NYT_ENG_20181231.0001" lang="eng">
    <TEXT>
      <SEG id="segment-0" start_char="0" end_char="19">
        <ORIGINAL_TEXT>The first sentence.</ORIGINAL_TEXT>
        <TOKEN id="token-0-0">The</TOKEN>
      </SEG>
      <SEG id="segment-1" start_char="20" end_char="39">
        <ORIGINAL_TEXT>And then a second.</ORIGINAL_TEXT>
      </SEG>
    </TEXT>
  </DOC>
</LCTL_TEXT>
"#;

    #[test]
    fn parses_document_with_segments() {
        let docs = parse_ltf("sample.ltf.xml", SAMPLE_LTF.as_bytes()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "NYT_ENG_20181231.0001");
        assert_eq!(docs[0].segments, 2);
        assert_eq!(docs[0].text, "The first sentence.\nAnd then a second.");
        assert!(!docs[0].failed);
    }

    #[test]
    fn multiple_documents_in_one_entry() {
        let xml = r#"<LCTL_TEXT>
  <DOC id="A"><TEXT><SEG><ORIGINAL_TEXT>one</ORIGINAL_TEXT></SEG></TEXT></DOC>
  <DOC id="B"><TEXT><SEG><ORIGINAL_TEXT>two</ORIGINAL_TEXT></SEG></TEXT></DOC>
</LCTL_TEXT>"#;
        let docs = parse_ltf("multi.ltf.xml", xml.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "A");
        assert_eq!(docs[1].id, "B");
        assert_eq!(docs[1].segments, 1);
    }

    #[test]
    fn doc_without_id_is_a_decode_error() {
        let xml = "<LCTL_TEXT><DOC><TEXT></TEXT></DOC></LCTL_TEXT>";
        let err = parse_ltf("anon.ltf.xml", xml.as_bytes()).unwrap_err();
        assert!(matches!(err, CorpusError::MissingDocumentId { .. }));
    }

    #[test]
    fn malformed_xml_is_a_decode_error() {
        let xml = "<LCTL_TEXT><DOC id=\"A\"><TEXT></DOC>";
        assert!(parse_ltf("broken.ltf.xml", xml.as_bytes()).is_err());
    }

    #[test]
    fn escaped_text_is_unescaped() {
        let xml = r#"<LCTL_TEXT><DOC id="A"><TEXT><SEG>
<ORIGINAL_TEXT>Ben &amp; Jerry</ORIGINAL_TEXT></SEG></TEXT></DOC></LCTL_TEXT>"#;
        let docs = parse_ltf("esc.ltf.xml", xml.as_bytes()).unwrap();
        assert_eq!(docs[0].text, "Ben & Jerry");
    }
}
