//! Shared types, error model, and configuration for StudyTree.
//!
//! This crate is the foundation depended on by all other StudyTree crates.
//! It provides:
//! - [`StudyTreeError`], the unified error type
//! - Domain types ([`Section`], [`Document`], [`KnowledgeNode`], [`NodeContent`])
//! - Configuration ([`AppConfig`], [`ClassifierConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClassifierConfig, ExportConfig, ExtractionConfig, SummarizerConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{Result, StudyTreeError};
pub use types::{
    Document, DocumentMetadata, KnowledgeNode, KnowledgeTree, NodeContent, Section,
    UNKNOWN_AUTHOR,
};
