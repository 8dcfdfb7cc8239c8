//! Application configuration for StudyTree.
//!
//! User config lives at `~/.studytree/studytree.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyTreeError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "studytree.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".studytree";

// ---------------------------------------------------------------------------
// Config structs (matching studytree.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Keyword sets and length limits for line classification.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Per-format section builder settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Rule-based key point summarizer settings.
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,
}

/// `[classifier]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Substrings that mark a short line as a section heading.
    #[serde(default = "default_heading_keywords")]
    pub heading_keywords: Vec<String>,

    /// Markers for examples, exercises, homework and labs.
    #[serde(default = "default_non_concept_keywords")]
    pub non_concept_keywords: Vec<String>,

    /// Markers that rescue a numbered line from the exercise filter.
    #[serde(default = "default_key_point_keywords")]
    pub key_point_keywords: Vec<String>,

    /// Keyword headings must be shorter than this many characters.
    #[serde(default = "default_heading_max_chars")]
    pub heading_max_chars: usize,

    /// Numbered headings (`1、`, `2.`, `3．`) must be shorter than this.
    #[serde(default = "default_numbered_heading_max_chars")]
    pub numbered_heading_max_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            heading_keywords: default_heading_keywords(),
            non_concept_keywords: default_non_concept_keywords(),
            key_point_keywords: default_key_point_keywords(),
            heading_max_chars: default_heading_max_chars(),
            numbered_heading_max_chars: default_numbered_heading_max_chars(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_heading_keywords() -> Vec<String> {
    strings(&[
        "目录", "章节", "节", "第", "前言", "引言", "概述", "摘要", "总结", "小结", "结论",
        "参考", "重点", "要点",
    ])
}
fn default_non_concept_keywords() -> Vec<String> {
    strings(&["例", "示例", "样例", "练习", "习题", "作业", "实验"])
}
fn default_key_point_keywords() -> Vec<String> {
    strings(&["重点", "要点", "关键", "核心"])
}
fn default_heading_max_chars() -> usize {
    50
}
fn default_numbered_heading_max_chars() -> usize {
    30
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Paragraph style names starting with one of these are headings.
    #[serde(default = "default_heading_style_prefixes")]
    pub heading_style_prefixes: Vec<String>,

    /// Open section for word-processor body text before the first heading.
    #[serde(default = "default_intro_title")]
    pub intro_title: String,

    /// Section opened to hold page failure notes when nothing is open.
    #[serde(default = "default_parse_error_title")]
    pub parse_error_title: String,

    /// Prefix for per-slide fallback titles (`幻灯片 3`).
    #[serde(default = "default_slide_title_prefix")]
    pub slide_title_prefix: String,

    /// Swallow lines under rejected headings in page-description documents.
    #[serde(default = "default_true")]
    pub pdf_skip_latch: bool,

    /// Same, for word-processor documents.
    #[serde(default)]
    pub docx_skip_latch: bool,

    /// Same, for slide decks.
    #[serde(default)]
    pub pptx_skip_latch: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            heading_style_prefixes: default_heading_style_prefixes(),
            intro_title: default_intro_title(),
            parse_error_title: default_parse_error_title(),
            slide_title_prefix: default_slide_title_prefix(),
            pdf_skip_latch: true,
            docx_skip_latch: false,
            pptx_skip_latch: false,
        }
    }
}

fn default_heading_style_prefixes() -> Vec<String> {
    strings(&["Heading", "heading", "标题", "Title"])
}
fn default_intro_title() -> String {
    "引言".into()
}
fn default_parse_error_title() -> String {
    "解析错误".into()
}
fn default_slide_title_prefix() -> String {
    "幻灯片".into()
}
fn default_true() -> bool {
    true
}

/// `[summarizer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Sentences containing one of these become key points.
    #[serde(default = "default_important_words")]
    pub important_words: Vec<String>,

    /// Maximum key points kept per node.
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Key points must be longer than this many characters.
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,

    /// Leading sentences considered when no sentence has an important word.
    #[serde(default = "default_fallback_sentences")]
    pub fallback_sentences: usize,

    /// Content used for nodes that yield no key points.
    #[serde(default = "default_empty_summary")]
    pub empty_summary: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            important_words: default_important_words(),
            max_points: default_max_points(),
            min_sentence_chars: default_min_sentence_chars(),
            fallback_sentences: default_fallback_sentences(),
            empty_summary: default_empty_summary(),
        }
    }
}

fn default_important_words() -> Vec<String> {
    strings(&[
        "重要", "关键", "核心", "主要", "首先", "其次", "最后", "总之", "因此", "所以", "特点",
        "优势", "定义", "概念",
    ])
}
fn default_max_points() -> usize {
    5
}
fn default_min_sentence_chars() -> usize {
    10
}
fn default_fallback_sentences() -> usize {
    3
}
fn default_empty_summary() -> String {
    "无具体内容".into()
}

/// `[export]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export format when none is given: "markdown" or "json".
    #[serde(default = "default_export_format")]
    pub default_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: default_export_format(),
        }
    }
}

fn default_export_format() -> String {
    "markdown".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.studytree/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StudyTreeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.studytree/studytree.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StudyTreeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        StudyTreeError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StudyTreeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StudyTreeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StudyTreeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs the builders cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.classifier.heading_keywords.iter().any(|k| k.is_empty()) {
        return Err(StudyTreeError::config(
            "classifier.heading_keywords must not contain empty strings",
        ));
    }
    if config.classifier.non_concept_keywords.iter().any(|k| k.is_empty()) {
        return Err(StudyTreeError::config(
            "classifier.non_concept_keywords must not contain empty strings",
        ));
    }
    if config.classifier.key_point_keywords.iter().any(|k| k.is_empty()) {
        return Err(StudyTreeError::config(
            "classifier.key_point_keywords must not contain empty strings",
        ));
    }

    let extraction = &config.extraction;
    for (field, title) in [
        ("intro_title", &extraction.intro_title),
        ("parse_error_title", &extraction.parse_error_title),
        ("slide_title_prefix", &extraction.slide_title_prefix),
    ] {
        if title.trim().is_empty() {
            return Err(StudyTreeError::config(format!(
                "extraction.{field} must not be empty"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("heading_keywords"));
        assert!(toml_str.contains("引言"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.classifier.heading_max_chars, 50);
        assert_eq!(parsed.classifier.numbered_heading_max_chars, 30);
        assert!(parsed.extraction.pdf_skip_latch);
        assert!(!parsed.extraction.docx_skip_latch);
        assert_eq!(parsed.summarizer.max_points, 5);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[classifier]
heading_keywords = ["Chapter", "Summary"]

[export]
default_format = "json"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.classifier.heading_keywords, vec!["Chapter", "Summary"]);
        assert_eq!(config.classifier.key_point_keywords, default_key_point_keywords());
        assert_eq!(config.export.default_format, "json");
        assert_eq!(config.extraction.intro_title, "引言");
    }

    #[test]
    fn empty_keywords_rejected() {
        let mut config = AppConfig::default();
        config.classifier.non_concept_keywords.push(String::new());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("non_concept_keywords"));
    }

    #[test]
    fn empty_key_point_keyword_rejected() {
        let mut config = AppConfig::default();
        config.classifier.key_point_keywords.push(String::new());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("key_point_keywords"));
    }

    fn extraction_error(edit: impl FnOnce(&mut ExtractionConfig)) -> String {
        let mut config = AppConfig::default();
        edit(&mut config.extraction);
        validate_config(&config).unwrap_err().to_string()
    }

    #[test]
    fn blank_placeholder_titles_rejected() {
        assert!(extraction_error(|e| e.intro_title = String::new()).contains("intro_title"));
        assert!(
            extraction_error(|e| e.parse_error_title = "  ".into()).contains("parse_error_title")
        );
        assert!(
            extraction_error(|e| e.slide_title_prefix = String::new())
                .contains("slide_title_prefix")
        );
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn blank_intro_title_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studytree.toml");
        std::fs::write(&path, "[extraction]\nintro_title = \"\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, StudyTreeError::Config { .. }));
        assert!(err.to_string().contains("intro_title"));
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/studytree.toml")).unwrap_err();
        assert!(matches!(err, StudyTreeError::Io { .. }));
    }
}
