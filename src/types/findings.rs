//! Findings records produced by the analyzers
//!
//! Each record is constructed once by its analyzer, owned by the
//! orchestrator for the duration of the run, and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::document::DocumentHandle;

/// Outcome of validating one embedded signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureStatus {
    #[serde(rename = "VALID")]
    Valid,
    #[serde(rename = "INVALID")]
    Invalid,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
    #[serde(rename = "PRESENT")]
    Present,
    /// Signature exists but the document layout prevents byte-range
    /// verification
    #[serde(rename = "UNVERIFIED_HYBRID")]
    UnverifiedHybrid,
}

/// One signature record; zero to many per document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signer: Option<String>,
    pub signing_time: Option<String>,
    pub status: SignatureStatus,
    pub detail: String,
}

/// Container-level findings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuralFindings {
    /// Holds exactly when `eof_markers > 1`
    pub incremental_updates: bool,
    pub eof_markers: usize,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    /// Set only when both timestamps compare in a canonical form
    pub mod_after_creation: Option<bool>,
    /// Script trigger keys (PDF) or a macro project (package)
    pub active_content: bool,
    pub suspicious_objects: Vec<String>,
    /// Package-only revision-tracking flag; `None` for PDFs or on a
    /// malformed settings part
    pub track_changes: Option<bool>,
    pub errors: Vec<String>,
}

/// A mutual keypoint match inside a single page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyMoveMatch {
    /// 1-based page index; always references an analyzed page
    pub page: usize,
    pub from: (f32, f32),
    pub to: (f32, f32),
}

/// Raster-level findings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualFindings {
    pub pages: usize,
    pub copy_move: bool,
    pub copy_move_matches: Vec<CopyMoveMatch>,
    /// `None` = unknown (capability missing or too few pages), never false
    /// by default
    pub noise_consistent: Option<bool>,
    /// Auxiliary per-page OCR word-density ratio; never drives the verdict
    pub ocr_density: Option<f64>,
    pub errors: Vec<String>,
}

/// Per-page stylometric profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylometricProfile {
    pub mean_sentence_len: f64,
    pub mean_word_len: f64,
    pub lexical_diversity: f64,
    pub readability_grade: f64,
}

/// Text-level findings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextFindings {
    pub languages: BTreeSet<String>,
    pub suspicious_terms: Vec<String>,
    /// Keyed by 1-based page index; only pages above the length floor
    pub stylometry: BTreeMap<usize, StylometricProfile>,
    pub outlier_pages: Vec<usize>,
    pub errors: Vec<String>,
}

/// Final classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictClass {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "SUSPECT")]
    Suspect,
}

/// Complete result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub document: DocumentHandle,
    pub signatures: Vec<SignatureRecord>,
    pub structure: StructuralFindings,
    /// Absent for text-native documents (visual stage gated off)
    pub visual: Option<VisualFindings>,
    pub text: TextFindings,
    pub classification: VerdictClass,
}
