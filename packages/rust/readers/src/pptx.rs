//! Slide-deck (PPTX) reader.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, warn};

use studytree_shared::{DocumentMetadata, Result, StudyTreeError, UNKNOWN_AUTHOR};

use crate::office::{self, Archive, attribute, open_archive, read_entry};

const NAME: &str = "pptx";

/// One shape on a slide. `text` is `None` for shapes without a text body
/// (pictures, connectors, empty placeholders).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub text: Option<String>,
    /// The shape is the slide's title placeholder.
    pub is_title: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slide {
    pub shapes: Vec<Shape>,
}

impl Slide {
    pub fn title_shape(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_title)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub metadata: DocumentMetadata,
    pub slides: Vec<Slide>,
}

/// Reader contract for slide decks.
pub trait SlideReader: Send + Sync {
    fn name(&self) -> &str;

    fn read(&self, path: &Path) -> Result<Presentation>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PptxReader;

impl PptxReader {
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Presentation> {
        let mut archive = open_archive(NAME, bytes)?;

        let mut slides = Vec::new();
        for entry in slide_entries(&archive) {
            let Some(xml) = read_entry(&mut archive, NAME, &entry)? else {
                continue;
            };
            match parse_slide(&xml) {
                Ok(slide) => slides.push(slide),
                Err(e) => {
                    warn!(slide = %entry, error = %e, "unreadable slide, keeping it empty");
                    slides.push(Slide::default());
                }
            }
        }

        let metadata = read_metadata(&mut archive, slides.len());
        Ok(Presentation { metadata, slides })
    }
}

impl SlideReader for PptxReader {
    fn name(&self) -> &str {
        NAME
    }

    fn read(&self, path: &Path) -> Result<Presentation> {
        let bytes = std::fs::read(path).map_err(|e| StudyTreeError::io(path, e))?;
        let presentation = self.read_bytes(&bytes)?;
        debug!(
            path = %path.display(),
            slides = presentation.slides.len(),
            "read pptx"
        );
        Ok(presentation)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// `ppt/slides/slideN.xml` entries ordered by N.
fn slide_entries(archive: &Archive<'_>) -> Vec<String> {
    let mut numbered: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    numbered.sort_by_key(|(number, _)| *number);
    numbered.into_iter().map(|(_, name)| name).collect()
}

fn parse_slide(xml: &str) -> Result<Slide> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut slide = Slide::default();

    let mut in_shape = false;
    let mut is_title = false;
    let mut has_body = false;
    let mut in_text = false;
    let mut paragraphs: Vec<String> = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| StudyTreeError::reader(NAME, e.to_string()))?
        {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"sp" => {
                    in_shape = true;
                    is_title = false;
                    has_body = false;
                    paragraphs.clear();
                }
                b"ph" if in_shape => is_title = is_title_placeholder(attribute(e, b"type")),
                b"txBody" if in_shape => has_body = true,
                b"p" if has_body => paragraphs.push(String::new()),
                b"t" if has_body => in_text = true,
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"ph" if in_shape => is_title = is_title_placeholder(attribute(e, b"type")),
                b"p" if has_body => paragraphs.push(String::new()),
                b"br" if has_body => {
                    if let Some(last) = paragraphs.last_mut() {
                        last.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                let value = e
                    .unescape()
                    .map_err(|e| StudyTreeError::reader(NAME, e.to_string()))?;
                if let Some(last) = paragraphs.last_mut() {
                    last.push_str(&value);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"sp" if in_shape => {
                    let text = has_body.then(|| paragraphs.join("\n"));
                    slide.shapes.push(Shape { text, is_title });
                    in_shape = false;
                    has_body = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(slide)
}

fn is_title_placeholder(kind: Option<String>) -> bool {
    matches!(kind.as_deref(), Some("title") | Some("ctrTitle"))
}

fn read_metadata(archive: &mut Archive<'_>, slide_count: usize) -> DocumentMetadata {
    DocumentMetadata {
        page_count: slide_count,
        author: office::core_author(archive, NAME).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
    }
}
