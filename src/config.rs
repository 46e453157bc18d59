//! Configuration types and validation for the verification pipeline
//!
//! Every threshold the analyzers consume lives here; nothing is read from
//! process-wide state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Global pipeline configuration, one sub-config per analyzer
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub hash: HashConfig,
    pub structure: StructureConfig,
    pub visual: VisualConfig,
    pub text: TextConfig,
    /// Per-invocation budget for external tools (render, OCR). A timeout
    /// degrades that one signal to unavailable, never the whole run.
    pub tool_timeout: Duration,
}

/// Streaming digest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashConfig {
    pub chunk_size: usize,
}

/// Structure analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Dictionary keys that mark embedded active content
    pub risky_keys: Vec<String>,
}

/// Visual analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    pub render_dpi: u32,
    /// Upper bound on keypoints retained per page
    pub max_keypoints: usize,
    /// Hamming distance ceiling for an accepted descriptor match
    pub match_distance_threshold: u32,
    /// Pairs closer than this many pixels count as self-matches
    pub min_match_separation: f32,
    /// Surviving matches required on a page before copy-move is positive
    pub min_cluster: usize,
    /// Correlation floor against the noise reference
    pub noise_corr_threshold: f64,
    /// Pages averaged into the noise reference
    pub noise_reference_window: usize,
    /// Languages handed to the OCR engine
    pub ocr_languages: String,
}

/// Text analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    pub suspicious_terms: Vec<String>,
    /// Pages with fewer cleaned characters are skipped for stylometry
    pub min_page_chars: usize,
    /// Absolute z-score above which a page is an author-shift outlier
    pub style_z_threshold: f64,
    /// Leading sample length for language detection
    pub language_sample_chars: usize,
    /// Minimum extracted characters on the first page for the text-native probe
    pub text_probe_min_chars: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self { chunk_size: 8192 }
    }
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            risky_keys: [
                "JavaScript", "JS", "Launch", "OpenAction", "AA",
                "SubmitForm", "ImportData", "RichMedia", "Rendition",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_keypoints: 3000,
            match_distance_threshold: 30,
            min_match_separation: 10.0,
            min_cluster: 10,
            noise_corr_threshold: 0.7,
            noise_reference_window: 3,
            ocr_languages: "eng+por".into(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            suspicious_terms: [
                "rasura", "alterado", "adulterado", "em branco", "fotomontagem",
                "copiar", "recortar", "colar", "photoshop", "gimp", "paint",
                "tampered", "forged", "falsified",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_page_chars: 300,
            style_z_threshold: 1.2,
            language_sample_chars: 1000,
            text_probe_min_chars: 1,
        }
    }
}

impl VerifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hash.chunk_size < 512 {
            return Err(Error::Config("hash chunk size below 512 bytes".into()));
        }
        if self.visual.min_cluster == 0 {
            return Err(Error::Config("copy-move cluster minimum must be at least 1".into()));
        }
        if self.visual.noise_reference_window == 0 {
            return Err(Error::Config("noise reference window must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.visual.noise_corr_threshold) {
            return Err(Error::Config("noise correlation threshold outside [0, 1]".into()));
        }
        if self.text.style_z_threshold <= 0.0 {
            return Err(Error::Config("style z-score threshold must be positive".into()));
        }
        Ok(())
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            hash: HashConfig::default(),
            structure: StructureConfig::default(),
            visual: VisualConfig::default(),
            text: TextConfig::default(),
            tool_timeout: Duration::from_secs(60),
        }
    }
}

impl VerifierConfig {
    /// Default configuration with a bounded external-tool budget
    pub fn new() -> Self {
        Self::default()
    }
}
