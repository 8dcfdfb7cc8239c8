//! Section builder: folds a stream of text units into titled sections.
//!
//! One state machine serves every source format. Format adapters feed it
//! [`TextUnit`]s (PDF lines, Word paragraphs, slide shapes) and pick a
//! [`BuilderOptions`] profile; the builder decides where sections start, what
//! content survives, and which sections are emitted.

use tracing::trace;

use studytree_shared::{ExtractionConfig, Section};

use crate::cleanup::clean;
use crate::classifier::Classifier;

/// One logical piece of text handed to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub text: String,
    /// The reader marked this unit as a heading (paragraph style, title shape).
    pub style_heading: bool,
}

impl TextUnit {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_heading: false,
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_heading: true,
        }
    }
}

/// Per-format behaviour switches for [`SectionBuilder`].
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    /// After a rejected heading, swallow everything until an accepted heading.
    pub skip_latch: bool,
    /// Refuse to open a section titled by a line that is not concept content.
    pub gate_untitled: bool,
    /// Section already open before the first unit arrives.
    pub initial_title: Option<String>,
    /// Title for a section opened only to hold a reader note.
    pub note_title: String,
}

impl BuilderOptions {
    /// Page-description documents: skip latch and title gate both on.
    pub fn page_description(config: &ExtractionConfig) -> Self {
        Self {
            skip_latch: config.pdf_skip_latch,
            gate_untitled: true,
            initial_title: None,
            note_title: config.parse_error_title.clone(),
        }
    }

    /// Word-processor documents start inside an introduction section.
    pub fn word_processor(config: &ExtractionConfig) -> Self {
        Self {
            skip_latch: config.docx_skip_latch,
            gate_untitled: true,
            initial_title: Some(config.intro_title.clone()),
            note_title: config.parse_error_title.clone(),
        }
    }

    pub fn slide_deck(config: &ExtractionConfig) -> Self {
        Self {
            skip_latch: config.pptx_skip_latch,
            gate_untitled: false,
            initial_title: None,
            note_title: config.parse_error_title.clone(),
        }
    }
}

/// Incremental section builder.
///
/// Feed units with [`push`](Self::push) / [`push_raw`](Self::push_raw), then
/// call [`finish`](Self::finish). Only sections holding at least one content
/// line are ever emitted.
#[derive(Debug)]
pub struct SectionBuilder<'c> {
    classifier: &'c Classifier,
    options: BuilderOptions,
    current: Option<Section>,
    skipping: bool,
    sections: Vec<Section>,
}

impl<'c> SectionBuilder<'c> {
    pub fn new(classifier: &'c Classifier, options: BuilderOptions) -> Self {
        let current = options.initial_title.clone().map(Section::new);
        Self {
            classifier,
            options,
            current,
            skipping: false,
            sections: Vec::new(),
        }
    }

    /// Clean a raw page or paragraph blob and push each of its lines.
    pub fn push_raw(&mut self, raw: &str) {
        let cleaned = clean(raw);
        for line in cleaned.lines() {
            self.push(TextUnit::plain(line));
        }
    }

    /// Push one unit through the state machine.
    pub fn push(&mut self, unit: TextUnit) {
        let text = unit.text.trim();
        if text.is_empty() {
            return;
        }

        let heading = unit.style_heading || self.classifier.is_heading(text);
        let concept = self.classifier.is_concept_content(text);

        if heading && !concept {
            trace!(title = text, "dropping non-concept section");
            self.current = None;
            if self.options.skip_latch {
                self.skipping = true;
            }
            return;
        }

        if self.skipping {
            if !heading {
                return;
            }
            self.skipping = false;
        }

        if self.current.is_none() || heading {
            self.close_current();
            if self.options.gate_untitled && !concept {
                return;
            }
            self.current = Some(Section::new(text));
            return;
        }

        if concept {
            if let Some(section) = self.current.as_mut() {
                section.content.push(text.to_string());
            }
        }
    }

    /// Record a reader note (e.g. a failed page) as content, bypassing
    /// classification. Opens a note section if nothing is open.
    pub fn push_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        match self.current.as_mut() {
            Some(section) => section.content.push(note),
            None => {
                let mut section = Section::new(self.options.note_title.clone());
                section.content.push(note);
                self.current = Some(section);
            }
        }
    }

    /// Emit the open section (if it has content) and return all sections.
    pub fn finish(mut self) -> Vec<Section> {
        self.close_current();
        self.sections
    }

    fn close_current(&mut self) {
        if let Some(section) = self.current.take() {
            if section.has_content() {
                self.sections.push(section);
            } else {
                trace!(title = %section.title, "discarding empty section");
            }
        }
    }
}

/// Run a whole unit sequence through a fresh builder.
pub fn build_sections(
    classifier: &Classifier,
    options: BuilderOptions,
    units: impl IntoIterator<Item = TextUnit>,
) -> Vec<Section> {
    let mut builder = SectionBuilder::new(classifier, options);
    for unit in units {
        builder.push(unit);
    }
    builder.finish()
}
