//! Zip and XML plumbing shared by the Office Open XML readers.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use studytree_shared::{Result, StudyTreeError};

pub(crate) type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

pub(crate) fn open_archive<'a>(reader: &str, bytes: &'a [u8]) -> Result<Archive<'a>> {
    ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| StudyTreeError::reader(reader, format!("not an OOXML archive: {e}")))
}

/// Read one archive entry as UTF-8. `Ok(None)` when the entry is absent.
pub(crate) fn read_entry(archive: &mut Archive<'_>, reader: &str, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(StudyTreeError::reader(reader, format!("{name}: {e}"))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| StudyTreeError::reader(reader, format!("{name}: {e}")))?;
    Ok(Some(content))
}

/// Text of the first element with the given local name.
pub(crate) fn first_element_text(xml: &str, local_name: &[u8]) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut inside = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == local_name => inside = true,
            Ok(Event::End(ref e)) if e.local_name().as_ref() == local_name => {
                let trimmed = text.trim();
                return (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            Ok(Event::Text(e)) if inside => {
                if let Ok(value) = e.unescape() {
                    text.push_str(&value);
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// `dc:creator` from `docProps/core.xml`.
pub(crate) fn core_author(archive: &mut Archive<'_>, reader: &str) -> Option<String> {
    let xml = read_entry(archive, reader, "docProps/core.xml").ok()??;
    first_element_text(&xml, b"creator")
}

/// Attribute value by local name, ignoring any namespace prefix.
pub(crate) fn attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}
