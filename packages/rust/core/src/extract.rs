//! Per-format extraction: reader output in, [`Document`] out.
//!
//! Each format feeds the shared [`SectionBuilder`] through its own adapter.
//! Page-description files additionally go through a two-reader fallback:
//! the primary backend runs first, and the secondary takes over when the
//! primary fails outright or produces nothing usable.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use studytree_readers::{
    DocxReader, LopdfBackend, OxidePdfBackend, PdfBackend, PptxReader, Slide, SlideReader,
    WordReader,
};
use studytree_shared::{
    AppConfig, Document, DocumentMetadata, ExtractionConfig, Result, Section, StudyTreeError,
    UNKNOWN_AUTHOR,
};
use studytree_structure::{BuilderOptions, Classifier, SectionBuilder, TextUnit, clean};

// ---------------------------------------------------------------------------
// Format dispatch
// ---------------------------------------------------------------------------

/// Supported source formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    Pptx,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            Some("pptx") => Ok(Self::Pptx),
            _ => Err(StudyTreeError::UnsupportedFormat { path: path.into() }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reader outcomes
// ---------------------------------------------------------------------------

/// What one PDF backend produced for a file.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderOutcome {
    /// A document whose first section carries content.
    Parsed(Document),
    /// The backend ran but produced no usable sections.
    Empty(Document),
    /// The backend could not open the file at all.
    Failed(String),
}

impl ReaderOutcome {
    fn from_document(document: Document) -> Self {
        if document.is_unusable() {
            Self::Empty(document)
        } else {
            Self::Parsed(document)
        }
    }
}

/// Content line recorded in place of a page the primary backend could not read.
pub fn page_failure_note(page_number: usize) -> String {
    format!("第 {page_number} 页解析失败")
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Turns source files into [`Document`]s.
///
/// Holds the classifier, the extraction settings and one reader per format.
/// Readers are swappable so tests and alternative backends can be plugged in.
pub struct Extractor {
    classifier: Classifier,
    config: ExtractionConfig,
    primary_pdf: Box<dyn PdfBackend>,
    secondary_pdf: Box<dyn PdfBackend>,
    word: Box<dyn WordReader>,
    slides: Box<dyn SlideReader>,
}

impl Extractor {
    /// Extractor with the built-in readers: `pdf_oxide` first, `lopdf` as fallback.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            classifier: Classifier::new(&config.classifier),
            config: config.extraction.clone(),
            primary_pdf: Box::new(OxidePdfBackend),
            secondary_pdf: Box::new(LopdfBackend),
            word: Box::new(DocxReader),
            slides: Box::new(PptxReader),
        }
    }

    pub fn with_pdf_backends(
        mut self,
        primary: Box<dyn PdfBackend>,
        secondary: Box<dyn PdfBackend>,
    ) -> Self {
        self.primary_pdf = primary;
        self.secondary_pdf = secondary;
        self
    }

    pub fn with_word_reader(mut self, reader: Box<dyn WordReader>) -> Self {
        self.word = reader;
        self
    }

    pub fn with_slide_reader(mut self, reader: Box<dyn SlideReader>) -> Self {
        self.slides = reader;
        self
    }

    /// Extract one file, dispatching on its extension.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn extract(&self, path: &Path) -> Result<Document> {
        let format = SourceFormat::from_path(path)?;
        let document = match format {
            SourceFormat::Pdf => self.extract_pdf(path)?,
            SourceFormat::Docx => self.extract_docx(path)?,
            SourceFormat::Pptx => self.extract_pptx(path)?,
        };

        info!(
            %format,
            sections = document.sections.len(),
            pages = document.metadata.page_count,
            "extracted document"
        );
        Ok(document)
    }

    // -----------------------------------------------------------------------
    // Page-description documents
    // -----------------------------------------------------------------------

    /// Primary backend first; the secondary takes over on failure or empty output.
    pub fn extract_pdf(&self, path: &Path) -> Result<Document> {
        let primary_name = self.primary_pdf.name();
        let secondary_name = self.secondary_pdf.name();

        match self.run_primary(path) {
            ReaderOutcome::Parsed(document) => Ok(document),
            ReaderOutcome::Empty(primary_document) => {
                warn!(reader = primary_name, "no usable sections, trying {secondary_name}");
                match self.run_secondary(path) {
                    ReaderOutcome::Parsed(document) | ReaderOutcome::Empty(document) => {
                        Ok(document)
                    }
                    ReaderOutcome::Failed(reason) => {
                        warn!(reader = secondary_name, %reason, "fallback reader failed");
                        Ok(primary_document)
                    }
                }
            }
            ReaderOutcome::Failed(primary) => {
                warn!(reader = primary_name, reason = %primary, "trying {secondary_name}");
                match self.run_secondary(path) {
                    ReaderOutcome::Parsed(document) | ReaderOutcome::Empty(document) => {
                        Ok(document)
                    }
                    ReaderOutcome::Failed(secondary) => Err(StudyTreeError::ReadersExhausted {
                        path: path.into(),
                        primary,
                        secondary,
                    }),
                }
            }
        }
    }

    /// Run the primary backend. Unreadable pages become a note line.
    fn run_primary(&self, path: &Path) -> ReaderOutcome {
        let backend = self.primary_pdf.as_ref();
        let mut pages = match backend.open(path) {
            Ok(pages) => pages,
            Err(e) => return ReaderOutcome::Failed(e.to_string()),
        };

        let mut builder = SectionBuilder::new(
            &self.classifier,
            BuilderOptions::page_description(&self.config),
        );
        for index in 0..pages.page_count() {
            match pages.page_text(index) {
                Ok(text) => builder.push_raw(&text),
                Err(e) => {
                    warn!(reader = backend.name(), page = index + 1, error = %e, "page failed to parse");
                    builder.push_note(page_failure_note(index + 1));
                }
            }
        }

        let metadata = pdf_metadata(pages.page_count(), pages.author());
        ReaderOutcome::from_document(Document {
            metadata,
            sections: builder.finish(),
            source_path: path.into(),
        })
    }

    /// Run the secondary backend. Color-space failures retry with simple
    /// extraction; any other page failure skips the page.
    fn run_secondary(&self, path: &Path) -> ReaderOutcome {
        let backend = self.secondary_pdf.as_ref();
        let mut pages = match backend.open(path) {
            Ok(pages) => pages,
            Err(e) => return ReaderOutcome::Failed(e.to_string()),
        };

        let mut builder = SectionBuilder::new(
            &self.classifier,
            BuilderOptions::page_description(&self.config),
        );
        for index in 0..pages.page_count() {
            let text = match pages.page_text(index) {
                Ok(text) => text,
                Err(e) if e.is_color_space() => {
                    debug!(page = index + 1, reason = %e, "color space error, using simple extraction");
                    pages.page_text_simple(index).unwrap_or_else(|e| {
                        warn!(reader = backend.name(), page = index + 1, error = %e, "simple extraction failed");
                        String::new()
                    })
                }
                Err(e) => {
                    warn!(reader = backend.name(), page = index + 1, error = %e, "skipping page");
                    String::new()
                }
            };
            builder.push_raw(&text);
        }

        let metadata = pdf_metadata(pages.page_count(), pages.author());
        ReaderOutcome::from_document(Document {
            metadata,
            sections: builder.finish(),
            source_path: path.into(),
        })
    }

    // -----------------------------------------------------------------------
    // Word-processor documents
    // -----------------------------------------------------------------------

    pub fn extract_docx(&self, path: &Path) -> Result<Document> {
        let word = self.word.read(path)?;

        let mut builder =
            SectionBuilder::new(&self.classifier, BuilderOptions::word_processor(&self.config));
        for paragraph in &word.paragraphs {
            if self.is_heading_style(paragraph.style_name.as_deref()) {
                let title = clean(paragraph.text.as_str()).replace('\n', " ");
                builder.push(TextUnit::heading(title));
            } else {
                builder.push_raw(&paragraph.text);
            }
        }

        Ok(Document {
            metadata: word.metadata,
            sections: builder.finish(),
            source_path: path.into(),
        })
    }

    fn is_heading_style(&self, style_name: Option<&str>) -> bool {
        style_name.is_some_and(|style| {
            self.config
                .heading_style_prefixes
                .iter()
                .any(|prefix| style.starts_with(prefix.as_str()))
        })
    }

    // -----------------------------------------------------------------------
    // Slide decks
    // -----------------------------------------------------------------------

    pub fn extract_pptx(&self, path: &Path) -> Result<Document> {
        let deck = self.slides.read(path)?;

        let units = deck.slides.iter().flat_map(|slide| {
            slide.shapes.iter().filter_map(|shape| {
                let text = shape.text.as_deref()?;
                Some(TextUnit {
                    text: text.to_string(),
                    style_heading: shape.is_title,
                })
            })
        });
        let mut sections = studytree_structure::build_sections(
            &self.classifier,
            BuilderOptions::slide_deck(&self.config),
            units,
        );

        if sections.is_empty() {
            debug!("no structural sections, falling back to one section per slide");
            sections = self.sections_per_slide(&deck.slides);
        }

        Ok(Document {
            metadata: deck.metadata,
            sections,
            source_path: path.into(),
        })
    }

    /// One section per slide: the title shape (or a numbered placeholder)
    /// over the slide's concept-content shapes.
    fn sections_per_slide(&self, slides: &[Slide]) -> Vec<Section> {
        slides
            .iter()
            .enumerate()
            .filter_map(|(index, slide)| {
                let title = slide
                    .title_shape()
                    .and_then(|shape| shape.text.as_deref())
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} {}", self.config.slide_title_prefix, index + 1));

                let content: Vec<String> = slide
                    .shapes
                    .iter()
                    .filter(|shape| !shape.is_title)
                    .filter_map(|shape| shape.text.as_deref())
                    .map(str::trim)
                    .filter(|text| self.classifier.is_concept_content(text))
                    .map(str::to_string)
                    .collect();

                (!content.is_empty()).then_some(Section { title, content })
            })
            .collect()
    }
}

fn pdf_metadata(page_count: usize, author: Option<String>) -> DocumentMetadata {
    DocumentMetadata {
        page_count,
        author: author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use studytree_readers::PageError;
    use studytree_readers::testing::{SAMPLE_LINES, sample_pdf};

    use super::*;
    use crate::testing::{FakePdf, FakeSlides, FakeWord};

    fn extractor() -> Extractor {
        Extractor::new(&AppConfig::default())
    }

    fn pdf_extractor(primary: FakePdf, secondary: FakePdf) -> Extractor {
        extractor().with_pdf_backends(Box::new(primary), Box::new(secondary))
    }

    fn path(name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    fn write_sample_pdf(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("lecture.pdf");
        std::fs::write(&path, sample_pdf(SAMPLE_LINES, Some("Jane Doe"))).unwrap();
        path
    }

    fn sample_sections() -> Vec<Section> {
        vec![Section {
            title: "Summary".into(),
            content: vec!["Stacks are LIFO structures.".into()],
        }]
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(&path("a.pdf")).unwrap(), SourceFormat::Pdf);
        assert_eq!(SourceFormat::from_path(&path("B.DOCX")).unwrap(), SourceFormat::Docx);
        assert_eq!(SourceFormat::from_path(&path("c.Pptx")).unwrap(), SourceFormat::Pptx);

        let err = SourceFormat::from_path(&path("notes.txt")).unwrap_err();
        assert!(matches!(err, StudyTreeError::UnsupportedFormat { .. }));
        assert!(SourceFormat::from_path(&path("README")).is_err());
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = extractor().extract(&path("slides.key")).unwrap_err();
        assert!(err.to_string().contains("slides.key"));
    }

    #[test]
    fn primary_result_is_used_when_usable() {
        let mut primary = FakePdf::with_pages("primary", &["引言\n这是重要内容。\n12"]);
        primary.author = Some("李老师".into());
        let secondary = FakePdf::with_pages("secondary", &["结论\n不应出现。"]);

        let doc = pdf_extractor(primary, secondary)
            .extract_pdf(&path("notes.pdf"))
            .unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "引言");
        assert_eq!(doc.sections[0].content, vec!["这是重要内容。"]);
        assert_eq!(doc.metadata.author, "李老师");
        assert_eq!(doc.metadata.page_count, 1);
    }

    #[test]
    fn empty_primary_yields_exactly_the_secondary_result() {
        let primary = FakePdf::with_pages("primary", &["", "   "]);
        let secondary = FakePdf::with_pages("secondary", &["第一节 栈\n栈是后进先出的线性表。", "小结\n栈适合处理嵌套结构。"]);

        let standalone = pdf_extractor(FakePdf::failing("none", "unused"), secondary.clone())
            .run_secondary(&path("notes.pdf"));
        let ReaderOutcome::Parsed(expected) = standalone else {
            panic!("secondary should parse: {standalone:?}");
        };

        let doc = pdf_extractor(primary, secondary)
            .extract_pdf(&path("notes.pdf"))
            .unwrap();
        assert_eq!(doc, expected);
        assert_eq!(doc.sections.len(), 2);
    }

    #[test]
    fn failed_primary_falls_back() {
        let primary = FakePdf::failing("primary", "broken xref table");
        let secondary = FakePdf::with_pages("secondary", &["概述\n数据结构研究数据的组织。"]);

        let doc = pdf_extractor(primary, secondary)
            .extract_pdf(&path("notes.pdf"))
            .unwrap();
        assert_eq!(doc.sections[0].title, "概述");
        assert_eq!(doc.metadata.author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn empty_primary_with_failed_secondary_keeps_primary() {
        let primary = FakePdf::with_pages("primary", &["例1：只有例题"]);
        let secondary = FakePdf::failing("secondary", "bad header");

        let doc = pdf_extractor(primary, secondary)
            .extract_pdf(&path("notes.pdf"))
            .unwrap();
        assert!(doc.sections.is_empty());
        assert_eq!(doc.metadata.page_count, 1);
    }

    #[test]
    fn both_readers_failing_is_an_error() {
        let primary = FakePdf::failing("primary", "encrypted");
        let secondary = FakePdf::failing("secondary", "bad header");

        let err = pdf_extractor(primary, secondary)
            .extract_pdf(&path("locked.pdf"))
            .unwrap_err();
        match err {
            StudyTreeError::ReadersExhausted {
                path,
                primary,
                secondary,
            } => {
                assert_eq!(path, PathBuf::from("locked.pdf"));
                assert!(primary.contains("encrypted"));
                assert!(secondary.contains("bad header"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn primary_page_failure_becomes_a_note() {
        let mut primary = FakePdf::with_pages("primary", &["", "第二节 队列\n队列先进先出。"]);
        primary.pages[0] = Err(PageError::Other("truncated stream".into()));
        let secondary = FakePdf::failing("secondary", "unused");

        let doc = pdf_extractor(primary, secondary)
            .extract_pdf(&path("notes.pdf"))
            .unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "解析错误");
        assert_eq!(doc.sections[0].content, vec![page_failure_note(1)]);
        assert_eq!(doc.sections[1].title, "第二节 队列");
    }

    #[test]
    fn secondary_color_space_failure_uses_simple_extraction() {
        let primary = FakePdf::with_pages("primary", &[""]);
        let mut secondary = FakePdf::with_pages("secondary", &["", ""]);
        secondary.pages[0] = Err(PageError::ColorSpace("invalid color space".into()));
        secondary.pages[1] = Err(PageError::Other("bad font".into()));
        secondary.simple = vec![Ok("引言\n图像页上的文字。".into())];

        let doc = pdf_extractor(primary, secondary)
            .extract_pdf(&path("scan.pdf"))
            .unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].content, vec!["图像页上的文字。"]);
        assert_eq!(doc.metadata.page_count, 2);
    }

    #[test]
    fn real_pdf_extracts_through_the_default_backends() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample_pdf(&dir);

        let doc = extractor().extract(&path).unwrap();
        assert_eq!(doc.sections, sample_sections());
        assert_eq!(doc.metadata.author, "Jane Doe");
        assert_eq!(doc.metadata.page_count, 1);
        assert_eq!(doc.source_path, path);
    }

    #[test]
    fn lopdf_fallback_keeps_line_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample_pdf(&dir);
        let extractor = extractor().with_pdf_backends(
            Box::new(FakePdf::failing("primary", "broken xref table")),
            Box::new(LopdfBackend),
        );

        let outcome = extractor.run_secondary(&path);
        let ReaderOutcome::Parsed(doc) = outcome else {
            panic!("lopdf should parse the sample: {outcome:?}");
        };
        assert_eq!(doc.sections, sample_sections());
        assert_eq!(doc.metadata.author, "Jane Doe");

        assert_eq!(extractor.extract_pdf(&path).unwrap(), doc);
    }

    #[test]
    fn docx_paragraph_styles_mark_headings() {
        let word = FakeWord::new(&[
            ("本讲义介绍基本数据结构。", None),
            ("线性表", Some("heading 1")),
            ("线性表是有限序列。\n5", None),
            ("课后练习", Some("标题 2")),
            ("完成第三章习题。", None),
            ("树", Some("Heading 2")),
            ("树是层次结构。", Some("Normal")),
        ]);
        let doc = extractor()
            .with_word_reader(Box::new(word))
            .extract(&path("lecture.docx"))
            .unwrap();

        // The exercise heading discards the open 线性表 section with its content.
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["引言", "树"]);
        assert_eq!(doc.sections[0].content, vec!["本讲义介绍基本数据结构。"]);
        assert_eq!(doc.sections[1].content, vec!["树是层次结构。"]);
        assert_eq!(doc.metadata.author, "测试作者");
    }

    #[test]
    fn slide_title_shapes_open_sections() {
        let slides = FakeSlides::new(&[
            &[("栈", true), ("栈是后进先出的线性表。", false)],
            &[("队列", true), ("队列先进先出。", false), ("例：排队买票", false)],
        ]);
        let doc = extractor()
            .with_slide_reader(Box::new(slides))
            .extract(&path("deck.pptx"))
            .unwrap();

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "栈");
        assert_eq!(doc.sections[1].content, vec!["队列先进先出。"]);
        assert_eq!(doc.metadata.page_count, 2);
    }

    #[test]
    fn slide_deck_falls_back_to_one_section_per_slide() {
        let slides = FakeSlides::new(&[
            &[("课堂练习", true), ("栈是后进先出的线性表", false)],
            &[("例：队列", false)],
        ]);
        let doc = extractor()
            .with_slide_reader(Box::new(slides))
            .extract(&path("deck.pptx"))
            .unwrap();

        assert_eq!(
            doc.sections,
            vec![Section {
                title: "课堂练习".into(),
                content: vec!["栈是后进先出的线性表".into()],
            }]
        );
    }

    #[test]
    fn per_slide_fallback_numbers_untitled_slides() {
        let slides = FakeSlides::new(&[&[("例：略", false)], &[("队列先进先出", false)]]);
        let sections = extractor().sections_per_slide(&slides.slides);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "幻灯片 2");
    }
}
