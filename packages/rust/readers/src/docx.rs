//! Word-processor (DOCX) reader.
//!
//! Yields the body paragraphs in order together with their human-readable
//! style names, which is all the extraction layer needs to spot headings.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use studytree_shared::{DocumentMetadata, Result, StudyTreeError, UNKNOWN_AUTHOR};

use crate::office::{self, Archive, attribute, first_element_text, open_archive, read_entry};

const NAME: &str = "docx";

/// One body paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    /// Style name (e.g. `heading 1`), or the raw style id when the style
    /// table has no entry for it.
    pub style_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordDocument {
    pub metadata: DocumentMetadata,
    pub paragraphs: Vec<Paragraph>,
}

/// Reader contract for word-processor documents.
pub trait WordReader: Send + Sync {
    fn name(&self) -> &str;

    fn read(&self, path: &Path) -> Result<WordDocument>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxReader;

impl DocxReader {
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<WordDocument> {
        let mut archive = open_archive(NAME, bytes)?;

        let body = read_entry(&mut archive, NAME, "word/document.xml")?
            .ok_or_else(|| StudyTreeError::reader(NAME, "missing word/document.xml"))?;
        let styles = read_entry(&mut archive, NAME, "word/styles.xml")?
            .map(|xml| parse_style_names(&xml))
            .unwrap_or_default();

        let paragraphs = parse_paragraphs(&body, &styles)?;
        let metadata = read_metadata(&mut archive);

        Ok(WordDocument {
            metadata,
            paragraphs,
        })
    }
}

impl WordReader for DocxReader {
    fn name(&self) -> &str {
        NAME
    }

    fn read(&self, path: &Path) -> Result<WordDocument> {
        let bytes = std::fs::read(path).map_err(|e| StudyTreeError::io(path, e))?;
        let document = self.read_bytes(&bytes)?;
        debug!(
            path = %path.display(),
            paragraphs = document.paragraphs.len(),
            "read docx"
        );
        Ok(document)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Map paragraph style ids to their display names from `word/styles.xml`.
fn parse_style_names(xml: &str) -> HashMap<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut names = HashMap::new();
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"style" => {
                current_id = attribute(e, b"styleId");
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"name" =>
            {
                if let (Some(id), Some(name)) = (current_id.as_ref(), attribute(e, b"val")) {
                    names.insert(id.clone(), name);
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => current_id = None,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    names
}

fn parse_paragraphs(xml: &str, styles: &HashMap<String, String>) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();

    // Text boxes nest paragraphs inside paragraphs; only the outermost one
    // is emitted, carrying the nested text along.
    let mut depth = 0usize;
    let mut in_text = false;
    let mut text = String::new();
    let mut style_id: Option<String> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| StudyTreeError::reader(NAME, format!("word/document.xml: {e}")))?
        {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"p" => depth += 1,
                b"t" if depth > 0 => in_text = true,
                b"pStyle" if depth == 1 => style_id = attribute(e, b"val"),
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"p" if depth == 0 => paragraphs.push(Paragraph {
                    text: String::new(),
                    style_name: None,
                }),
                b"pStyle" if depth == 1 => style_id = attribute(e, b"val"),
                b"tab" if depth > 0 => text.push('\t'),
                b"br" | b"cr" if depth > 0 => text.push('\n'),
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                let value = e
                    .unescape()
                    .map_err(|e| StudyTreeError::reader(NAME, e.to_string()))?;
                text.push_str(&value);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let style_name = style_id
                            .take()
                            .map(|id| styles.get(&id).cloned().unwrap_or(id));
                        paragraphs.push(Paragraph {
                            text: std::mem::take(&mut text),
                            style_name,
                        });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn read_metadata(archive: &mut Archive<'_>) -> DocumentMetadata {
    let author = office::core_author(archive, NAME).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let page_count = read_entry(archive, NAME, "docProps/app.xml")
        .ok()
        .flatten()
        .and_then(|xml| first_element_text(&xml, b"Pages"))
        .and_then(|pages| pages.parse().ok())
        .unwrap_or(0);

    DocumentMetadata { page_count, author }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::office::testing::{CORE_XML, archive};

    const STYLES_XML: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="a3"><w:name w:val="标题 2"/></w:style>
</w:styles>"#;

    const BODY_XML: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>开篇说明</w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>第一章 </w:t></w:r><w:r><w:t>线性表</w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="a3"/></w:pPr><w:r><w:t>顺序表</w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="Custom9"/></w:pPr><w:r><w:t>A &amp; B</w:t></w:r></w:p>
    <w:p/>
  </w:body>
</w:document>"#;

    const APP_XML: &str = r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Pages>4</Pages></Properties>"#;

    fn sample() -> WordDocument {
        let bytes = archive(&[
            ("word/document.xml", BODY_XML),
            ("word/styles.xml", STYLES_XML),
            ("docProps/core.xml", CORE_XML),
            ("docProps/app.xml", APP_XML),
        ]);
        DocxReader.read_bytes(&bytes).unwrap()
    }

    #[test]
    fn paragraphs_keep_order_and_runs_join() {
        let doc = sample();
        let texts: Vec<&str> = doc.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["开篇说明", "第一章 线性表", "顺序表", "A & B", ""]);
    }

    #[test]
    fn style_ids_resolve_to_names() {
        let doc = sample();
        assert_eq!(doc.paragraphs[0].style_name, None);
        assert_eq!(doc.paragraphs[1].style_name.as_deref(), Some("heading 1"));
        assert_eq!(doc.paragraphs[2].style_name.as_deref(), Some("标题 2"));
        // Unknown ids fall through unchanged.
        assert_eq!(doc.paragraphs[3].style_name.as_deref(), Some("Custom9"));
    }

    #[test]
    fn metadata_from_doc_props() {
        let doc = sample();
        assert_eq!(doc.metadata.author, "王老师");
        assert_eq!(doc.metadata.page_count, 4);
    }

    #[test]
    fn missing_doc_props_fall_back_to_defaults() {
        let bytes = archive(&[("word/document.xml", BODY_XML)]);
        let doc = DocxReader.read_bytes(&bytes).unwrap();
        assert_eq!(doc.metadata.author, UNKNOWN_AUTHOR);
        assert_eq!(doc.metadata.page_count, 0);
        assert_eq!(doc.paragraphs[1].style_name.as_deref(), Some("Heading1"));
    }

    #[test]
    fn archive_without_body_is_an_error() {
        let bytes = archive(&[("docProps/core.xml", CORE_XML)]);
        let err = DocxReader.read_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
