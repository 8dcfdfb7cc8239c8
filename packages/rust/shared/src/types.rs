//! Core domain types for StudyTree documents and knowledge trees.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Author recorded when a reader exposes no author metadata.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// A titled run of retained content lines, as emitted by a section builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text (never empty).
    pub title: String,
    /// Retained content lines in source order.
    pub content: Vec<String>,
}

impl Section {
    /// Open a section with no content yet.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Vec::new(),
        }
    }

    /// Whether the section holds at least one content line.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Metadata reported by the low-level reader for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Pages (or slides) in the source file.
    pub page_count: usize,
    /// Author field, [`UNKNOWN_AUTHOR`] if the file has none.
    pub author: String,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            page_count: 0,
            author: UNKNOWN_AUTHOR.to_string(),
        }
    }
}

/// One ingested file: its metadata and the sections extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: DocumentMetadata,
    pub sections: Vec<Section>,
    /// Path the document was read from.
    pub source_path: PathBuf,
}

impl Document {
    /// File name component of the source path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.source_path.file_name().and_then(|n| n.to_str())
    }

    /// True when the document has no sections or its first section is empty.
    pub fn is_unusable(&self) -> bool {
        self.sections.first().is_none_or(|s| !s.has_content())
    }
}

// ---------------------------------------------------------------------------
// Knowledge tree
// ---------------------------------------------------------------------------

/// Node content, either a list of lines or one joined string.
///
/// Consumers call [`NodeContent::as_text`] or [`NodeContent::lines`] instead
/// of matching on the shape themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeContent {
    Lines(Vec<String>),
    Joined(String),
}

impl NodeContent {
    /// The content as a single newline-joined string.
    pub fn as_text(&self) -> String {
        match self {
            Self::Lines(lines) => lines.join("\n"),
            Self::Joined(text) => text.clone(),
        }
    }

    /// The content split into lines.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Lines(lines) => lines.clone(),
            Self::Joined(text) => text.lines().map(str::to_string).collect(),
        }
    }
}

impl Default for NodeContent {
    fn default() -> Self {
        Self::Joined(String::new())
    }
}

impl From<String> for NodeContent {
    fn from(text: String) -> Self {
        Self::Joined(text)
    }
}

impl From<&str> for NodeContent {
    fn from(text: &str) -> Self {
        Self::Joined(text.to_string())
    }
}

impl From<Vec<String>> for NodeContent {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

/// A single node in the knowledge tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    pub title: String,
    pub content: NodeContent,
    /// Always empty when produced by the assembler; carried through untouched.
    #[serde(default)]
    pub children: Vec<KnowledgeNode>,
    /// File the node's section was extracted from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl KnowledgeNode {
    /// A leaf node with no provenance.
    pub fn new(title: impl Into<String>, content: impl Into<NodeContent>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            children: Vec::new(),
            source_path: None,
        }
    }
}

/// Ordered knowledge tree, one node per section across all documents.
pub type KnowledgeTree = Vec<KnowledgeNode>;
