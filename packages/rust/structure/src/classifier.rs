//! Lexical line classification.
//!
//! Page-description sources carry no font or layout signal we can trust, so
//! headings and noise are recognised from keywords, numbering and length only.

use std::sync::LazyLock;

use regex::Regex;

use studytree_shared::ClassifierConfig;

/// A numbered section marker such as `1、 概述`, `2. 定义` or `3． 小结`.
static NUMBERED_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[、.．]\s").expect("valid regex"));

/// A numbered list item such as `1. 求下列极限`, usually an exercise.
static NUMBERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("valid regex"));

/// Heading and concept-content predicates over one cleaned line.
///
/// The keyword sets are fixed at construction; build one classifier per
/// locale or subject profile.
#[derive(Debug, Clone)]
pub struct Classifier {
    heading_keywords: Vec<String>,
    non_concept_keywords: Vec<String>,
    key_point_keywords: Vec<String>,
    heading_max_chars: usize,
    numbered_heading_max_chars: usize,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            heading_keywords: config.heading_keywords.clone(),
            non_concept_keywords: config.non_concept_keywords.clone(),
            key_point_keywords: config.key_point_keywords.clone(),
            heading_max_chars: config.heading_max_chars,
            numbered_heading_max_chars: config.numbered_heading_max_chars,
        }
    }

    /// Short line carrying a heading keyword, or a short numbered marker.
    pub fn is_heading(&self, text: &str) -> bool {
        let len = text.chars().count();

        if len < self.heading_max_chars && contains_any(text, &self.heading_keywords) {
            return true;
        }

        len < self.numbered_heading_max_chars && NUMBERED_HEADING_RE.is_match(text)
    }

    /// Whether the line is study material rather than an example or exercise.
    pub fn is_concept_content(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        if self
            .non_concept_keywords
            .iter()
            .any(|k| text.starts_with(k.as_str()))
        {
            return false;
        }

        if contains_any(text, &self.non_concept_keywords) && !self.is_heading(text) {
            return false;
        }

        // Numbered items are exercises unless they flag a key point.
        if NUMBERED_ITEM_RE.is_match(text) && !contains_any(text, &self.key_point_keywords) {
            return false;
        }

        true
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}
