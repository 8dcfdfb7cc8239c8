//! Knowledge tree assembly.
//!
//! Flattens documents into one node per section, in document-then-section
//! order. Like-titled sections from different documents stay separate.

use tracing::{debug, instrument};

use studytree_shared::{Document, KnowledgeNode, KnowledgeTree, NodeContent};

/// Build a flat knowledge tree from `documents`.
///
/// Each node's content is the section's lines joined with `\n`; `children`
/// is always empty and `source_path` records the originating file.
#[instrument(skip_all, fields(document_count = documents.len()))]
pub fn build_tree(documents: &[Document]) -> KnowledgeTree {
    let tree: KnowledgeTree = documents
        .iter()
        .flat_map(|document| {
            document.sections.iter().map(|section| KnowledgeNode {
                title: section.title.clone(),
                content: NodeContent::Joined(section.content.join("\n")),
                children: Vec::new(),
                source_path: Some(document.source_path.clone()),
            })
        })
        .collect();

    debug!(node_count = tree.len(), "built knowledge tree");
    tree
}
