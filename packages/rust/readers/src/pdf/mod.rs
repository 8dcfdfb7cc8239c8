//! Page-description (PDF) reader contract and its two backends.
//!
//! A backend opens a file into a [`PdfPages`] handle; the extraction layer
//! walks pages one at a time so a single broken page never sinks the whole
//! document.

mod lopdf_reader;
mod oxide;

use std::path::Path;

use studytree_shared::Result;

pub use lopdf_reader::LopdfBackend;
pub use oxide::OxidePdfBackend;

// ---------------------------------------------------------------------------
// Page errors
// ---------------------------------------------------------------------------

/// Failure to pull text out of one page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The page uses a color space or image filter the backend cannot decode.
    #[error("unsupported color space: {0}")]
    ColorSpace(String),

    #[error("{0}")]
    Other(String),
}

impl PageError {
    /// Sort a backend error message into a page error kind.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("color") || lower.contains("colour") || lower.contains("gray") {
            Self::ColorSpace(message)
        } else {
            Self::Other(message)
        }
    }

    pub fn is_color_space(&self) -> bool {
        matches!(self, Self::ColorSpace(_))
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// An opened PDF, readable page by page.
pub trait PdfPages {
    fn page_count(&self) -> usize;

    /// `/Author` from the document information dictionary, if any.
    fn author(&self) -> Option<String>;

    /// Full text of the zero-based page `index`.
    fn page_text(&mut self, index: usize) -> std::result::Result<String, PageError>;

    /// Cheaper extraction for pages the full extractor cannot handle.
    fn page_text_simple(&mut self, index: usize) -> std::result::Result<String, PageError> {
        self.page_text(index)
    }
}

/// A PDF library able to open documents.
pub trait PdfBackend: Send + Sync {
    /// Human-readable backend name for tracing and error messages.
    fn name(&self) -> &str;

    fn open(&self, path: &Path) -> Result<Box<dyn PdfPages>>;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Decode a PDF text string: UTF-16BE with a byte-order mark, otherwise
/// treated as UTF-8 (PDFDocEncoding overlaps it for ASCII).
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Normalize an author string; blank values count as absent.
pub(crate) fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
