//! In-memory reader fakes for exercising extraction without real files.

use std::path::Path;

use studytree_readers::{
    PageError, Paragraph, PdfBackend, PdfPages, Presentation, Shape, Slide, SlideReader,
    WordDocument, WordReader,
};
use studytree_shared::{DocumentMetadata, Result, StudyTreeError};

#[derive(Debug, Clone, Default)]
pub struct FakePdf {
    pub name: &'static str,
    pub open_error: Option<String>,
    pub author: Option<String>,
    pub pages: Vec<std::result::Result<String, PageError>>,
    /// Per-page answers for `page_text_simple`; missing entries fail.
    pub simple: Vec<std::result::Result<String, PageError>>,
}

impl FakePdf {
    pub fn with_pages(name: &'static str, pages: &[&str]) -> Self {
        Self {
            name,
            pages: pages.iter().map(|p| Ok(p.to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn failing(name: &'static str, reason: &str) -> Self {
        Self {
            name,
            open_error: Some(reason.to_string()),
            ..Self::default()
        }
    }
}

impl PdfBackend for FakePdf {
    fn name(&self) -> &str {
        self.name
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn PdfPages>> {
        match &self.open_error {
            Some(reason) => Err(StudyTreeError::reader(self.name, reason.clone())),
            None => Ok(Box::new(self.clone())),
        }
    }
}

impl PdfPages for FakePdf {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn author(&self) -> Option<String> {
        self.author.clone()
    }

    fn page_text(&mut self, index: usize) -> std::result::Result<String, PageError> {
        self.pages[index].clone()
    }

    fn page_text_simple(&mut self, index: usize) -> std::result::Result<String, PageError> {
        self.simple
            .get(index)
            .cloned()
            .unwrap_or_else(|| Err(PageError::Other("no simple text".into())))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeWord {
    pub paragraphs: Vec<(String, Option<String>)>,
}

impl FakeWord {
    pub fn new(paragraphs: &[(&str, Option<&str>)]) -> Self {
        Self {
            paragraphs: paragraphs
                .iter()
                .map(|(text, style)| (text.to_string(), style.map(str::to_string)))
                .collect(),
        }
    }
}

impl WordReader for FakeWord {
    fn name(&self) -> &str {
        "fake-docx"
    }

    fn read(&self, _path: &Path) -> Result<WordDocument> {
        Ok(WordDocument {
            metadata: DocumentMetadata {
                page_count: 1,
                author: "测试作者".into(),
            },
            paragraphs: self
                .paragraphs
                .iter()
                .map(|(text, style_name)| Paragraph {
                    text: text.clone(),
                    style_name: style_name.clone(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSlides {
    pub slides: Vec<Slide>,
}

impl FakeSlides {
    /// Each slide is a list of `(text, is_title)` shapes.
    pub fn new(slides: &[&[(&str, bool)]]) -> Self {
        Self {
            slides: slides
                .iter()
                .map(|shapes| Slide {
                    shapes: shapes
                        .iter()
                        .map(|(text, is_title)| Shape {
                            text: Some(text.to_string()),
                            is_title: *is_title,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl SlideReader for FakeSlides {
    fn name(&self) -> &str {
        "fake-pptx"
    }

    fn read(&self, _path: &Path) -> Result<Presentation> {
        Ok(Presentation {
            metadata: DocumentMetadata {
                page_count: self.slides.len(),
                ..DocumentMetadata::default()
            },
            slides: self.slides.clone(),
        })
    }
}
