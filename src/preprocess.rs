//! Document preprocessing: digests, container type, text-native probe
//!
//! Builds the immutable handle every analyzer consumes. The only FATAL
//! condition in the pipeline lives here: a missing or unreadable input.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, instrument, warn};

use crate::config::VerifierConfig;
use crate::container::pdf;
use crate::error::{Error, Result};
use crate::hash;
use crate::types::{DocumentHandle, DocumentType};

/// Inspects the input and builds its handle.
///
/// Digests are streamed in one pass with a bounded buffer. Probe failures
/// degrade the affected field to `None`; only an unreadable file errors.
#[instrument(skip(config), fields(path = %path.display()))]
pub fn inspect(path: &Path, config: &VerifierConfig) -> Result<DocumentHandle> {
    if !path.is_file() {
        return Err(Error::DocumentUnavailable(path.display().to_string()));
    }

    let (digests, byte_len) = hash::stream_digests(path, config.hash.chunk_size)?;
    let doc_type = DocumentType::from_path(path);

    let (page_count, text_native) = match doc_type {
        DocumentType::Pdf => probe_pdf(path, config),
        // package text lives in the XML body; always text-native
        DocumentType::WordPackage => (None, Some(true)),
        DocumentType::Unknown => (None, None),
    };

    debug!(?doc_type, byte_len, ?page_count, ?text_native, "document inspected");

    Ok(DocumentHandle {
        path: path.to_path_buf(),
        byte_len,
        sha256: digests.sha256,
        sha512: digests.sha512,
        doc_type,
        page_count,
        text_native,
    })
}

/// Page count plus the first-page text probe.
///
/// A page with no extractable text marks the document as raster-origin,
/// which gates the visual stage on.
fn probe_pdf(path: &Path, config: &VerifierConfig) -> (Option<u32>, Option<bool>) {
    let doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("pdf probe failed: {e}");
            return (None, None);
        }
    };

    let pages = doc.get_pages();
    let page_count = Some(pages.len() as u32);

    let text_native = pages.keys().next().map(|first| {
        pdf::page_text(&doc, *first)
            .map(|text| text.trim().chars().count() >= config.text.text_probe_min_chars)
            .unwrap_or(false)
    });

    (page_count, text_native)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_fatal() {
        let config = VerifierConfig::new();
        let err = inspect(Path::new("/definitely/not/here.pdf"), &config).unwrap_err();
        assert!(matches!(err, Error::DocumentUnavailable(_)));
    }

    #[test]
    fn unknown_type_still_hashed() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"opaque payload").unwrap();

        let config = VerifierConfig::new();
        let handle = inspect(file.path(), &config).unwrap();
        assert_eq!(handle.doc_type, DocumentType::Unknown);
        assert_eq!(handle.byte_len, 14);
        assert_eq!(handle.sha256.len(), 64);
        assert!(handle.text_native.is_none());
    }

    #[test]
    fn digests_are_deterministic() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4 not really parsable %%EOF").unwrap();

        let config = VerifierConfig::new();
        let a = inspect(file.path(), &config).unwrap();
        let b = inspect(file.path(), &config).unwrap();
        assert_eq!(a.sha256, b.sha256);
        assert_eq!(a.sha512, b.sha512);
    }
}
