//! Working session: the ingested documents and the current knowledge tree.
//!
//! The session is the single owner of both lists. The tree is rebuilt
//! wholesale by [`Session::generate_tree`] and otherwise only changes through
//! index-addressed edits and the summarization pass.

use std::path::Path;

use tracing::{info, warn};

use studytree_shared::{Document, KnowledgeNode, NodeContent, Result, StudyTreeError};

use crate::extract::Extractor;
use crate::summarize::Summarizer;
use crate::tree::build_tree;

pub struct Session {
    extractor: Extractor,
    documents: Vec<Document>,
    tree: Vec<KnowledgeNode>,
}

impl Session {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            documents: Vec::new(),
            tree: Vec::new(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn tree(&self) -> &[KnowledgeNode] {
        &self.tree
    }

    /// Extract `path` and append the document. On error the session is unchanged.
    pub fn ingest(&mut self, path: &Path) -> Result<&Document> {
        let document = self.extractor.extract(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "skipping file");
        })?;
        self.documents.push(document);
        Ok(&self.documents[self.documents.len() - 1])
    }

    /// Remove every document read from a file named `file_name`.
    ///
    /// The tree is cleared since its nodes may refer to removed documents.
    /// Returns how many documents were removed.
    pub fn remove_documents_named(&mut self, file_name: &str) -> usize {
        let before = self.documents.len();
        self.documents
            .retain(|document| document.file_name() != Some(file_name));
        let removed = before - self.documents.len();
        if removed > 0 {
            self.tree.clear();
            info!(file_name, removed, "removed documents");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.tree.clear();
    }

    /// Rebuild the tree from the current documents.
    pub fn generate_tree(&mut self) -> &[KnowledgeNode] {
        self.tree = build_tree(&self.documents);
        info!(
            documents = self.documents.len(),
            nodes = self.tree.len(),
            "generated knowledge tree"
        );
        &self.tree
    }

    pub fn edit_node(
        &mut self,
        index: usize,
        title: impl Into<String>,
        content: impl Into<NodeContent>,
    ) -> Result<()> {
        let len = self.tree.len();
        let node = self
            .tree
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        node.title = title.into();
        node.content = content.into();
        Ok(())
    }

    pub fn delete_node(&mut self, index: usize) -> Result<KnowledgeNode> {
        if index >= self.tree.len() {
            return Err(out_of_range(index, self.tree.len()));
        }
        Ok(self.tree.remove(index))
    }

    /// Replace the tree with the summarizer's output.
    pub fn summarize(&mut self, summarizer: &dyn Summarizer) -> Result<()> {
        if self.tree.is_empty() {
            return Err(StudyTreeError::validation(
                "knowledge tree is empty; generate it first",
            ));
        }

        let input_len = self.tree.len();
        let tree = std::mem::take(&mut self.tree);
        match summarizer.summarize(tree.clone()) {
            Ok(summarized) => {
                if summarized.len() != input_len {
                    warn!(
                        summarizer = summarizer.name(),
                        before = input_len,
                        after = summarized.len(),
                        "summarizer changed the node count"
                    );
                }
                self.tree = summarized;
                Ok(())
            }
            Err(e) => {
                self.tree = tree;
                Err(e)
            }
        }
    }
}

fn out_of_range(index: usize, len: usize) -> StudyTreeError {
    StudyTreeError::validation(format!(
        "node index {index} out of range (tree has {len} nodes)"
    ))
}
