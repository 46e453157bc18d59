//! Word-processing package (OPC zip) inspection helpers

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Result, StructureError};

/// Open handle over the package zip
pub struct Package {
    archive: ZipArchive<File>,
}

/// Created/modified timestamps from `docProps/core.xml`, raw W3CDTF strings
#[derive(Debug, Clone, Default)]
pub struct CoreProperties {
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)
            .map_err(|e| StructureError::PackageRead(e.to_string()))?;
        Ok(Self { archive })
    }

    /// A macro project resource anywhere in the package flags macro usage
    pub fn has_macro_project(&self) -> bool {
        self.archive
            .file_names()
            .any(|name| name.to_ascii_lowercase().ends_with("vbaproject.bin"))
    }

    /// Detached signature artifacts under `_xmlsignatures/`
    pub fn signature_entries(&self) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| name.starts_with("_xmlsignatures/") && name.ends_with(".sig"))
            .map(|name| name.to_string())
            .collect()
    }

    fn read_entry(&mut self, name: &str) -> Option<String> {
        let mut entry = self.archive.by_name(name).ok()?;
        let mut content = String::new();
        entry.read_to_string(&mut content).ok()?;
        Some(content)
    }

    /// Timestamps from core properties.
    ///
    /// A missing part yields empty properties; a malformed part degrades to
    /// `Err` so the caller can record the field as unknown.
    pub fn core_properties(&mut self) -> std::result::Result<CoreProperties, String> {
        let xml = match self.read_entry("docProps/core.xml") {
            Some(xml) => xml,
            None => return Ok(CoreProperties::default()),
        };
        parse_core_properties(&xml)
    }

    /// Revision-tracking flag from `word/settings.xml`.
    ///
    /// `Some(false)` when the part is absent (no settings means no tracked
    /// revisions); `Err` when the part is present but unparsable.
    pub fn track_changes(&mut self) -> std::result::Result<bool, String> {
        let xml = match self.read_entry("word/settings.xml") {
            Some(xml) => xml,
            None => return Ok(false),
        };
        parse_track_changes(&xml)
    }

    /// Paragraph text of the main document part, newline-joined
    pub fn document_text(&mut self) -> std::result::Result<String, String> {
        let xml = self
            .read_entry("word/document.xml")
            .ok_or_else(|| "word/document.xml missing".to_string())?;
        parse_document_text(&xml)
    }
}

fn parse_core_properties(xml: &str) -> std::result::Result<CoreProperties, String> {
    let mut reader = Reader::from_str(xml);
    let mut props = CoreProperties::default();
    let mut current: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = match e.local_name().as_ref() {
                    b"created" => Some("created"),
                    b"modified" => Some("modified"),
                    _ => None,
                };
            }
            Ok(Event::Text(t)) => {
                if let Some(field) = current {
                    let value = t
                        .unescape()
                        .map_err(|e| format!("core.xml text: {e}"))?
                        .into_owned();
                    match field {
                        "created" => props.created = Some(value),
                        _ => props.modified = Some(value),
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("core.xml parse: {e}")),
            _ => {}
        }
    }
    Ok(props)
}

fn parse_track_changes(xml: &str) -> std::result::Result<bool, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trackRevisions" {
                    return Ok(true);
                }
            }
            Ok(Event::Eof) => return Ok(false),
            Err(e) => return Err(format!("settings.xml parse: {e}")),
            _ => {}
        }
    }
}

fn parse_document_text(xml: &str) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Text(t)) => {
                if in_text {
                    current.push_str(
                        &t.unescape().map_err(|e| format!("document.xml text: {e}"))?,
                    );
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    paragraphs.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("document.xml parse: {e}")),
            _ => {}
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}
