//! Knowledge tree export to text formats.
//!
//! Markdown carries a YAML front-matter header; JSON is the tree itself.
//! Files are written atomically (temp file, then rename).

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, instrument};

use studytree_shared::{KnowledgeNode, Result, StudyTreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
}

impl FromStr for ExportFormat {
    type Err = StudyTreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(StudyTreeError::parse(format!(
                "unknown export format '{other}' (expected markdown or json)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the tree as Markdown: front matter, then one `#` heading per node.
pub fn render_markdown(tree: &[KnowledgeNode], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!(
        "generated_at: \"{}\"\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str(&format!("node_count: {}\n", tree.len()));
    out.push_str("---\n");

    for node in tree {
        out.push('\n');
        out.push_str(&format!("# {}\n", heading_text(&node.title)));
        let content = node.content.as_text();
        let content = content.trim();
        if !content.is_empty() {
            out.push('\n');
            out.push_str(content);
            out.push('\n');
        }
    }

    out
}

/// Titles from multi-paragraph slide title shapes span lines; a Markdown
/// heading must not.
fn heading_text(title: &str) -> String {
    title
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the tree as pretty-printed JSON.
pub fn render_json(tree: &[KnowledgeNode]) -> Result<String> {
    serde_json::to_string_pretty(tree)
        .map_err(|e| StudyTreeError::Export(format!("JSON serialization failed: {e}")))
}

pub fn render(tree: &[KnowledgeNode], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Markdown => Ok(render_markdown(tree, Utc::now())),
        ExportFormat::Json => render_json(tree),
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Render `tree` and write it to `path` atomically.
#[instrument(skip_all, fields(path = %path.display(), ?format, node_count = tree.len()))]
pub fn export_tree(tree: &[KnowledgeNode], format: ExportFormat, path: &Path) -> Result<()> {
    if tree.is_empty() {
        return Err(StudyTreeError::Export("knowledge tree is empty".into()));
    }

    let rendered = render(tree, format)?;
    write_atomic(path, &rendered)?;

    info!(bytes = rendered.len(), "exported knowledge tree");
    Ok(())
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StudyTreeError::Export(format!("invalid output path {}", path.display())))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| StudyTreeError::io(&dir, e))?;

    let temp = dir.join(format!(".{file_name}.tmp"));
    std::fs::write(&temp, content).map_err(|e| StudyTreeError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| StudyTreeError::io(path, e))?;
    Ok(())
}
