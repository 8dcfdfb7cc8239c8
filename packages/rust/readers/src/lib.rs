//! Low-level document readers.
//!
//! Each source format has a small reader contract that hands raw text back to
//! the extraction layer without deciding anything about structure:
//! - [`PdfBackend`] / [`PdfPages`] for page-description documents, with two
//!   interchangeable backends ([`OxidePdfBackend`], [`LopdfBackend`])
//! - [`WordReader`] for word-processor documents ([`DocxReader`])
//! - [`SlideReader`] for slide decks ([`PptxReader`])

pub mod docx;
mod office;
pub mod pdf;
pub mod pptx;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use docx::{DocxReader, Paragraph, WordDocument, WordReader};
pub use pdf::{LopdfBackend, OxidePdfBackend, PageError, PdfBackend, PdfPages};
pub use pptx::{PptxReader, Presentation, Shape, Slide, SlideReader};
