//! PDF container inspection helpers
//!
//! Everything here consumes the `lopdf` object graph or the raw file
//! bytes; no byte-level parsing is reimplemented.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use lopdf::{Document, Object, ObjectId};
use regex::Regex;

/// Literal end-of-file marker; more than one means at least one
/// append-only revision is layered over the original body.
const EOF_MARKER: &[u8] = b"%%EOF";

lazy_static! {
    /// Canonical fixed-width PDF date prefix, `D:YYYYMMDDHHMMSS`
    static ref PDF_DATE: Regex = Regex::new(r"^D:\d{14}").unwrap();
}

/// Counts occurrences of `%%EOF` in the raw bytes
pub fn count_eof_markers(bytes: &[u8]) -> usize {
    if bytes.len() < EOF_MARKER.len() {
        return 0;
    }
    bytes
        .windows(EOF_MARKER.len())
        .filter(|w| *w == EOF_MARKER)
        .count()
}

/// Orders two PDF date strings.
///
/// Lexicographic comparison is correct only because the canonical form is
/// fixed-width and zero-padded; anything off-form yields `None`.
pub fn mod_after_creation(creation: &str, modification: &str) -> Option<bool> {
    if !PDF_DATE.is_match(creation) || !PDF_DATE.is_match(modification) {
        return None;
    }
    Some(modification > creation)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn string_value(doc: &Document, obj: &Object) -> Option<String> {
    match resolve(doc, obj)? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Creation and modification date strings from the trailer `/Info`
/// dictionary, raw and unparsed
pub fn trailer_dates(doc: &Document) -> (Option<String>, Option<String>) {
    let info = match doc.trailer.get(b"Info").ok().and_then(|o| resolve(doc, o)) {
        Some(Object::Dictionary(d)) => d,
        _ => return (None, None),
    };
    let creation = info.get(b"CreationDate").ok().and_then(|o| string_value(doc, o));
    let modification = info.get(b"ModDate").ok().and_then(|o| string_value(doc, o));
    (creation, modification)
}

fn collect_risky_keys(obj: &Object, risky: &BTreeSet<&[u8]>, found: &mut BTreeSet<String>) {
    match obj {
        Object::Dictionary(dict) => {
            for (key, value) in dict.iter() {
                if risky.contains(key.as_slice()) {
                    found.insert(String::from_utf8_lossy(key).into_owned());
                }
                collect_risky_keys(value, risky, found);
            }
        }
        Object::Array(items) => {
            for value in items {
                collect_risky_keys(value, risky, found);
            }
        }
        Object::Stream(stream) => {
            for (key, value) in stream.dict.iter() {
                if risky.contains(key.as_slice()) {
                    found.insert(String::from_utf8_lossy(key).into_owned());
                }
                collect_risky_keys(value, risky, found);
            }
        }
        _ => {}
    }
}

/// Scans every object dictionary for active-script trigger keys.
/// Any hit flags the document regardless of payload content.
pub fn active_content_keys(doc: &Document, risky_keys: &[String]) -> Vec<String> {
    let risky: BTreeSet<&[u8]> = risky_keys.iter().map(|k| k.as_bytes()).collect();
    let mut found = BTreeSet::new();
    for object in doc.objects.values() {
        collect_risky_keys(object, &risky, &mut found);
    }
    found.into_iter().collect()
}

fn collect_references(obj: &Object, out: &mut BTreeSet<ObjectId>) {
    match obj {
        Object::Reference(id) => {
            out.insert(*id);
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                collect_references(value, out);
            }
        }
        Object::Array(items) => {
            for value in items {
                collect_references(value, out);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                collect_references(value, out);
            }
        }
        _ => {}
    }
}

/// Counts references that resolve to free or missing objects
pub fn dangling_reference_count(doc: &Document) -> usize {
    let mut referenced = BTreeSet::new();
    for object in doc.objects.values() {
        collect_references(object, &mut referenced);
    }
    for (_, value) in doc.trailer.iter() {
        collect_references(value, &mut referenced);
    }
    referenced
        .iter()
        .filter(|id| !doc.objects.contains_key(*id))
        .count()
}

/// An embedded signature dictionary, as enumerated from the object graph
#[derive(Debug, Clone)]
pub struct EmbeddedSignature {
    pub signer: Option<String>,
    pub signing_time: Option<String>,
    /// `[offset, len, offset, len]` pairs of signed regions
    pub byte_range: Vec<i64>,
    /// DER blob from `/Contents`, still zero-padded
    pub contents: Vec<u8>,
    pub sub_filter: Option<String>,
}

fn signature_from_dict(doc: &Document, dict: &lopdf::Dictionary) -> Option<EmbeddedSignature> {
    let is_sig = match dict.get(b"Type").ok().and_then(|o| resolve(doc, o)) {
        Some(Object::Name(name)) => name.as_slice() == b"Sig",
        _ => dict.get(b"ByteRange").is_ok() && dict.get(b"Contents").is_ok(),
    };
    if !is_sig {
        return None;
    }

    let byte_range = match dict.get(b"ByteRange").ok().and_then(|o| resolve(doc, o)) {
        Some(Object::Array(items)) => items
            .iter()
            .filter_map(|o| match o {
                Object::Integer(v) => Some(*v),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let contents = match dict.get(b"Contents").ok().and_then(|o| resolve(doc, o)) {
        Some(Object::String(bytes, _)) => bytes.clone(),
        _ => Vec::new(),
    };
    let sub_filter = match dict.get(b"SubFilter").ok().and_then(|o| resolve(doc, o)) {
        Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    };

    Some(EmbeddedSignature {
        signer: dict.get(b"Name").ok().and_then(|o| string_value(doc, o)),
        signing_time: dict.get(b"M").ok().and_then(|o| string_value(doc, o)),
        byte_range,
        contents,
        sub_filter,
    })
}

/// Enumerates embedded signature dictionaries (`/Type /Sig`)
pub fn embedded_signatures(doc: &Document) -> Vec<EmbeddedSignature> {
    let mut signatures = Vec::new();
    for object in doc.objects.values() {
        if let Object::Dictionary(dict) = object {
            if let Some(sig) = signature_from_dict(doc, dict) {
                signatures.push(sig);
            }
        }
    }
    signatures
}

/// Extracted text of one page, `None` when extraction fails
pub fn page_text(doc: &Document, page_number: u32) -> Option<String> {
    doc.extract_text(&[page_number]).ok()
}
