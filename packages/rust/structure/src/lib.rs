//! Heuristic document structuring.
//!
//! Turns raw per-line text into titled sections:
//! - [`cleanup::clean`] strips page numbers, page labels and blank runs
//! - [`Classifier`] decides which lines are headings and which are concept content
//! - [`SectionBuilder`] folds a stream of [`TextUnit`]s into [`Section`]s
//!
//! [`Section`]: studytree_shared::Section

pub mod builder;
pub mod classifier;
pub mod cleanup;

pub use builder::{BuilderOptions, SectionBuilder, TextUnit, build_sections};
pub use classifier::Classifier;
pub use cleanup::clean;
