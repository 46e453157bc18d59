//! In-memory fixture builders for the integration tests

use std::io::Write;
use std::path::PathBuf;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tempfile::TempDir;

/// Writes `bytes` into `dir` under `name` and returns the path
pub fn write_fixture(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A single-page PDF whose page carries the given text
pub fn text_pdf(text: &str) -> Vec<u8> {
    build_pdf(Some(text), None, false, false)
}

/// A single-page PDF with no text content; the probe marks it raster
pub fn raster_pdf() -> Vec<u8> {
    build_pdf(None, None, false, false)
}

/// A text PDF with `/Info` creation and modification dates
pub fn dated_pdf(creation: &str, modification: &str) -> Vec<u8> {
    build_pdf(Some("Dated fixture document."), Some((creation, modification)), false, false)
}

/// A text PDF carrying an OpenAction JavaScript object and a literal
/// string containing an extra end-of-file marker
pub fn javascript_incremental_pdf() -> Vec<u8> {
    build_pdf(Some("Scripted fixture document."), None, true, false)
}

/// A text PDF with an embedded signature dictionary whose byte range
/// cannot cover the document
pub fn signed_pdf() -> Vec<u8> {
    build_pdf(Some("Signed fixture document."), None, false, true)
}

fn build_pdf(
    text: Option<&str>,
    dates: Option<(&str, &str)>,
    with_javascript: bool,
    with_signature: bool,
) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    if let Some(text) = text {
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]);
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });

    if with_javascript {
        let js_id = doc.add_object(dictionary! {
            "S" => "JavaScript",
            "JS" => Object::string_literal("app.alert('fixture');"),
        });
        // a string object smuggling a second end-of-file marker into the
        // raw bytes, simulating an appended revision
        doc.add_object(dictionary! {
            "Fixture" => Object::string_literal("trailing %%EOF marker"),
        });
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.set("OpenAction", js_id);
        }
    }

    if with_signature {
        doc.add_object(dictionary! {
            "Type" => "Sig",
            "Filter" => "Adobe.PPKLite",
            "ByteRange" => vec![0.into(), 16.into(), 32.into(), 8.into()],
            "Contents" => Object::String(vec![0x30, 0x82, 0x00, 0x00], StringFormat::Hexadecimal),
            "Name" => Object::string_literal("Fixture Signer"),
            "M" => Object::string_literal("D:20240101120000"),
        });
    }

    if let Some((creation, modification)) = dates {
        let info_id = doc.add_object(dictionary! {
            "CreationDate" => Object::string_literal(creation),
            "ModDate" => Object::string_literal(modification),
        });
        doc.trailer.set("Info", info_id);
    }

    doc.trailer.set("Root", catalog_id);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Word-package options for `word_package`
#[derive(Default)]
pub struct PackageOptions {
    pub with_macros: bool,
    pub with_track_changes: bool,
    pub with_signature: bool,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// Builds a minimal OPC zip with a document body and the requested parts
pub fn word_package(body: &str, options: &PackageOptions) -> Vec<u8> {
    let cursor = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(cursor);
    let file_options = zip::write::FileOptions::default();

    writer.start_file("word/document.xml", file_options).unwrap();
    write!(
        writer,
        r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body><w:p><w:r><w:t>{body}</w:t></w:r></w:p></w:body>
</w:document>"#
    )
    .unwrap();

    if options.created.is_some() || options.modified.is_some() {
        let created = options.created.clone().unwrap_or_default();
        let modified = options.modified.clone().unwrap_or_default();
        writer.start_file("docProps/core.xml", file_options).unwrap();
        write!(
            writer,
            r#"<?xml version="1.0"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
    xmlns:dcterms="http://purl.org/dc/terms/">
  <dcterms:created>{created}</dcterms:created>
  <dcterms:modified>{modified}</dcterms:modified>
</cp:coreProperties>"#
        )
        .unwrap();
    }

    if options.with_track_changes {
        writer.start_file("word/settings.xml", file_options).unwrap();
        write!(
            writer,
            r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:trackRevisions/>
</w:settings>"#
        )
        .unwrap();
    }

    if options.with_macros {
        writer.start_file("word/vbaProject.bin", file_options).unwrap();
        writer.write_all(b"\xd0\xcf\x11\xe0 fixture macro project").unwrap();
    }

    if options.with_signature {
        writer.start_file("_xmlsignatures/sig1.sig", file_options).unwrap();
        writer.write_all(b"<Signature/>").unwrap();
    }

    writer.finish().unwrap().into_inner()
}
