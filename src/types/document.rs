//! Document handle and container-type detection

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Recognized container types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "WORD_PACKAGE")]
    WordPackage,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl DocumentType {
    /// Type from file extension; anything unrecognized is `Unknown`
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => DocumentType::Pdf,
            Some("docx") | Some("docm") => DocumentType::WordPackage,
            _ => DocumentType::Unknown,
        }
    }
}

/// Immutable description of the input document, built once at preprocess
///
/// The digests are pure functions of the file bytes; nothing here changes
/// after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub path: PathBuf,
    pub byte_len: u64,
    pub sha256: String,
    pub sha512: String,
    pub doc_type: DocumentType,
    /// Page count when the container parser could supply one
    pub page_count: Option<u32>,
    /// `Some(false)` marks a raster-origin document and gates the visual stage.
    /// `None` means the probe could not run.
    pub text_native: Option<bool>,
}
