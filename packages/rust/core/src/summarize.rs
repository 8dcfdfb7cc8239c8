//! Summarization pass over the knowledge tree.
//!
//! A [`Summarizer`] is a `tree -> tree` transform. The session treats it as a
//! black box; the built-in [`KeyPointSummarizer`] is a rule-based stand-in
//! that reduces each node to a short bullet list of key sentences.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use studytree_shared::{
    KnowledgeNode, KnowledgeTree, NodeContent, Result, StudyTreeError, SummarizerConfig,
};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

pub trait Summarizer {
    /// Human-readable summarizer name for tracing.
    fn name(&self) -> &str;

    fn summarize(&self, tree: KnowledgeTree) -> Result<KnowledgeTree>;
}

/// Returns the tree unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySummarizer;

impl Summarizer for IdentitySummarizer {
    fn name(&self) -> &str {
        "identity"
    }

    fn summarize(&self, tree: KnowledgeTree) -> Result<KnowledgeTree> {
        Ok(tree)
    }
}

// ---------------------------------------------------------------------------
// Key-point summarizer
// ---------------------------------------------------------------------------

static SENTENCE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.。!?！？;；]").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Filler phrases that carry no information on their own.
static FILLER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"在这个.*?中",
        r"通过.*?可以发现",
        r"从.*?可以看出",
        r"根据.*?得知",
        r"由于.*?所以",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Keeps sentences that carry an importance marker, simplified, as bullets.
#[derive(Debug, Clone)]
pub struct KeyPointSummarizer {
    config: SummarizerConfig,
}

impl KeyPointSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self> {
        if config.max_points == 0 {
            return Err(StudyTreeError::Summarize(
                "max_points must be at least 1".into(),
            ));
        }
        Ok(Self { config })
    }

    /// Key points for one node's text, at most `max_points` of them.
    pub fn key_points(&self, text: &str) -> Vec<String> {
        let sentences: Vec<&str> = SENTENCE_SPLIT_RE
            .split(text)
            .map(str::trim)
            .collect();

        let mut points: Vec<String> = sentences
            .iter()
            .filter(|s| !s.is_empty() && self.is_important(s))
            .map(|s| simplify(s))
            .filter(|s| self.long_enough(s))
            .collect();

        if points.is_empty() {
            points = sentences
                .iter()
                .take(self.config.fallback_sentences)
                .filter(|s| self.long_enough(s))
                .map(|s| simplify(s))
                .filter(|s| !s.is_empty())
                .collect();
        }

        points.truncate(self.config.max_points);
        points
    }

    fn long_enough(&self, sentence: &str) -> bool {
        sentence.chars().count() > self.config.min_sentence_chars
    }

    fn is_important(&self, sentence: &str) -> bool {
        self.config
            .important_words
            .iter()
            .any(|word| sentence.contains(word.as_str()))
    }

    fn summarize_node(&self, node: KnowledgeNode) -> KnowledgeNode {
        let text = node.content.lines().join(" ");
        let points = self.key_points(&text);

        let summary = if points.is_empty() {
            self.config.empty_summary.clone()
        } else {
            points
                .iter()
                .map(|point| format!("- {point}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        KnowledgeNode {
            content: NodeContent::Joined(summary),
            ..node
        }
    }
}

impl Default for KeyPointSummarizer {
    fn default() -> Self {
        Self {
            config: SummarizerConfig::default(),
        }
    }
}

impl Summarizer for KeyPointSummarizer {
    fn name(&self) -> &str {
        "key-points"
    }

    #[instrument(skip_all, fields(node_count = tree.len()))]
    fn summarize(&self, tree: KnowledgeTree) -> Result<KnowledgeTree> {
        let summarized: KnowledgeTree = tree
            .into_iter()
            .map(|node| self.summarize_node(node))
            .collect();
        debug!("summarized knowledge tree");
        Ok(summarized)
    }
}

/// Collapse whitespace and strip filler phrases.
fn simplify(sentence: &str) -> String {
    let mut simplified = WHITESPACE_RE.replace_all(sentence, " ").trim().to_string();
    for filler in FILLER_RES.iter() {
        simplified = filler.replace_all(&simplified, "").to_string();
    }
    simplified.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> KnowledgeTree {
        vec![
            KnowledgeNode::new(
                "栈",
                "栈是一种重要的线性结构，只允许在一端操作。入栈和出栈都很快。",
            ),
            KnowledgeNode::new("空节点", ""),
            KnowledgeNode {
                children: vec![KnowledgeNode::new("子节点", "保留")],
                ..KnowledgeNode::new("队列", vec!["队列遵循先进先出的原则进行处理。".to_string()])
            },
        ]
    }

    #[test]
    fn identity_preserves_the_tree() {
        let input = tree();
        let output = IdentitySummarizer.summarize(input.clone()).unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(output, input);
    }

    #[test]
    fn key_points_keep_important_sentences() {
        let s = KeyPointSummarizer::default();
        let points = s.key_points("栈是一种重要的线性结构，只允许在一端操作。入栈和出栈都很快。");
        assert_eq!(points, vec!["栈是一种重要的线性结构，只允许在一端操作"]);
    }

    #[test]
    fn short_important_sentences_are_dropped_then_fallback_applies() {
        let s = KeyPointSummarizer::default();
        // "定义很重要" is important but too short; the fallback picks long sentences.
        let points = s.key_points("定义很重要。队列遵循先进先出的原则进行处理。短句。");
        assert_eq!(points, vec!["队列遵循先进先出的原则进行处理"]);
    }

    #[test]
    fn filler_phrases_are_removed() {
        assert_eq!(
            simplify("在这个例子中  栈的核心操作是入栈与出栈"),
            "栈的核心操作是入栈与出栈"
        );
        assert_eq!(simplify("通过实验可以发现队列是关键结构"), "队列是关键结构");
    }

    #[test]
    fn points_are_capped() {
        let s = KeyPointSummarizer::default();
        let text = (1..=8)
            .map(|i| format!("第{i}条关键结论需要认真记住并复习"))
            .collect::<Vec<_>>()
            .join("。");
        assert_eq!(s.key_points(&text).len(), 5);
    }

    #[test]
    fn summarize_preserves_shape_and_marks_empty_nodes() {
        let out = KeyPointSummarizer::default().summarize(tree()).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].title, "栈");
        assert_eq!(
            out[0].content,
            NodeContent::Joined("- 栈是一种重要的线性结构，只允许在一端操作".into())
        );
        assert_eq!(out[1].content, NodeContent::Joined("无具体内容".into()));
        assert_eq!(out[2].children.len(), 1);
        assert_eq!(out[2].children[0].title, "子节点");
    }

    #[test]
    fn zero_max_points_is_rejected() {
        let config = SummarizerConfig {
            max_points: 0,
            ..SummarizerConfig::default()
        };
        assert!(matches!(
            KeyPointSummarizer::new(config),
            Err(StudyTreeError::Summarize(_))
        ));
    }
}
