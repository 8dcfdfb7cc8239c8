//! Secondary PDF backend built on `lopdf`.
//!
//! Tolerates some malformed files the primary rejects. Its simple extraction
//! path reads string operands straight out of the content stream, skipping
//! font decoding and color handling entirely.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use studytree_shared::{Result, StudyTreeError};

use super::{PageError, PdfBackend, PdfPages, decode_text_string, non_blank};

const NAME: &str = "lopdf";

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn open(&self, path: &Path) -> Result<Box<dyn PdfPages>> {
        let doc = Document::load(path).map_err(|e| StudyTreeError::reader(NAME, e.to_string()))?;
        let pages = doc.get_pages();
        let author = info_dictionary(&doc)
            .and_then(|info| info.get(b"Author").ok())
            .and_then(|value| value.as_str().ok())
            .and_then(|bytes| non_blank(decode_text_string(bytes)));

        debug!(path = %path.display(), page_count = pages.len(), "opened with lopdf");
        Ok(Box::new(LopdfPages { doc, pages, author }))
    }
}

struct LopdfPages {
    doc: Document,
    /// One-based page number to page object.
    pages: BTreeMap<u32, ObjectId>,
    author: Option<String>,
}

impl LopdfPages {
    fn page_entry(&self, index: usize) -> std::result::Result<(u32, ObjectId), PageError> {
        self.pages
            .iter()
            .nth(index)
            .map(|(number, id)| (*number, *id))
            .ok_or_else(|| PageError::Other(format!("page index {index} out of range")))
    }
}

impl PdfPages for LopdfPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn author(&self) -> Option<String> {
        self.author.clone()
    }

    /// Full decoding surfaces font and color errors for the page, but runs
    /// its lines together, so the text itself comes from the content stream.
    fn page_text(&mut self, index: usize) -> std::result::Result<String, PageError> {
        let (number, id) = self.page_entry(index)?;
        self.doc
            .extract_text(&[number])
            .map_err(|e| PageError::classify(e.to_string()))?;
        self.content_text(id)
    }

    fn page_text_simple(&mut self, index: usize) -> std::result::Result<String, PageError> {
        let (_, id) = self.page_entry(index)?;
        self.content_text(id)
    }
}

impl LopdfPages {
    /// String operands of the page's text-showing operators, one line per
    /// text line move or text object end.
    fn content_text(&self, id: ObjectId) -> std::result::Result<String, PageError> {
        let data = self
            .doc
            .get_page_content(id)
            .map_err(|e| PageError::Other(e.to_string()))?;
        let content = Content::decode(&data).map_err(|e| PageError::Other(e.to_string()))?;
        Ok(text_lines(&content))
    }
}

fn text_lines(content: &Content) -> String {
    let mut text = String::new();
    for op in &content.operations {
        match op.operator.as_str() {
            "Tj" | "TJ" | "'" | "\"" => {
                for operand in &op.operands {
                    collect_strings(operand, &mut text);
                }
            }
            "ET" | "T*" | "Td" | "TD" => {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }
    text
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn collect_strings(operand: &Object, out: &mut String) {
    match operand {
        Object::String(bytes, _) => out.push_str(&decode_text_string(bytes)),
        Object::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        _ => {}
    }
}
