//! Primary PDF backend built on `pdf_oxide`.

use std::path::Path;

use pdf_oxide::PdfDocument;
use pdf_oxide::object::Object;
use tracing::debug;

use studytree_shared::{Result, StudyTreeError};

use super::{PageError, PdfBackend, PdfPages, decode_text_string, non_blank};

const NAME: &str = "pdf_oxide";

/// Layout-aware text extraction; handles most well-formed course material.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxidePdfBackend;

impl PdfBackend for OxidePdfBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn open(&self, path: &Path) -> Result<Box<dyn PdfPages>> {
        let mut doc =
            PdfDocument::open(path).map_err(|e| StudyTreeError::reader(NAME, e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| StudyTreeError::reader(NAME, e.to_string()))?;
        let author = read_author(&mut doc);

        debug!(path = %path.display(), page_count, "opened with pdf_oxide");
        Ok(Box::new(OxidePages {
            doc,
            page_count,
            author,
        }))
    }
}

struct OxidePages {
    doc: PdfDocument,
    page_count: usize,
    author: Option<String>,
}

impl PdfPages for OxidePages {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn author(&self) -> Option<String> {
        self.author.clone()
    }

    fn page_text(&mut self, index: usize) -> std::result::Result<String, PageError> {
        self.doc
            .extract_text(index)
            .map_err(|e| PageError::classify(e.to_string()))
    }
}

fn read_author(doc: &mut PdfDocument) -> Option<String> {
    let info = doc.trailer().as_dict()?.get("Info")?.clone();
    let info = resolve(doc, info)?;
    let author = info.as_dict()?.get("Author")?.clone();
    let author = resolve(doc, author)?;
    non_blank(decode_text_string(author.as_string()?))
}

fn resolve(doc: &mut PdfDocument, object: Object) -> Option<Object> {
    match object.as_reference() {
        Some(reference) => doc.load_object(reference).ok(),
        None => Some(object),
    }
}
