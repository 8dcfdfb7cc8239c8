//! Extraction pipeline and session logic for StudyTree.
//!
//! This crate ties the readers and the section builder together into
//! end-to-end workflows: extract files into documents, flatten them into a
//! knowledge tree, summarize and export it.

pub mod export;
pub mod extract;
pub mod pipeline;
pub mod session;
pub mod summarize;
pub mod tree;

#[cfg(test)]
mod testing;

pub use export::{ExportFormat, export_tree, render, render_json, render_markdown};
pub use extract::{Extractor, ReaderOutcome, SourceFormat};
pub use pipeline::{FileOutcome, IngestReport, ProgressReporter, SilentProgress, ingest_files};
pub use session::Session;
pub use summarize::{IdentitySummarizer, KeyPointSummarizer, Summarizer};
pub use tree::build_tree;
