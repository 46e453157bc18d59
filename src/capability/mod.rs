//! Injected external capabilities
//!
//! Each analyzer depends on abstract interfaces carrying an explicit
//! available/unavailable state resolved at construction, not discovered
//! through runtime failure. `None` in the [`Capabilities`] registry is the
//! unavailable state; a missing capability degrades only the signals that
//! depend on it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::GrayImage;
use thiserror::Error;

use crate::config::VerifierConfig;
use crate::container::pdf::EmbeddedSignature;

pub mod features;
pub mod language;
pub mod noise;
pub mod ocr;
pub mod renderer;
pub mod signature;

pub use features::FastFeatureExtractor;
pub use language::LinguaClassifier;
pub use noise::{NoiseResidual, ResidualNoiseExtractor};
pub use ocr::TesseractOcr;
pub use renderer::PdftoppmRenderer;
pub use signature::{Pkcs7Validator, SignatureVerification, ValidationError};

/// Failure of an external tool invocation
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: &'static str, seconds: u64 },

    #[error("{tool} failed: {detail}")]
    Tool { tool: &'static str, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Page images produced by a renderer, in page order.
///
/// Holds the backing temp directory alive until the caller is done.
pub struct RenderedPages {
    pub pages: Vec<PathBuf>,
    _guard: Option<tempfile::TempDir>,
}

impl RenderedPages {
    pub fn new(pages: Vec<PathBuf>, guard: Option<tempfile::TempDir>) -> Self {
        Self { pages, _guard: guard }
    }
}

/// Rasterizes document pages at a fixed resolution
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, path: &Path, dpi: u32) -> Result<RenderedPages, CapabilityError>;
}

/// Recognizes text in one page image
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<String, CapabilityError>;
}

/// A keypoint with its binary descriptor
#[derive(Debug, Clone)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub descriptor: [u8; 32],
}

impl Keypoint {
    /// Hamming distance between descriptors
    pub fn distance(&self, other: &Keypoint) -> u32 {
        self.descriptor
            .iter()
            .zip(other.descriptor.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Produces scale-bounded keypoint descriptors for one page image
pub trait KeypointExtractor: Send + Sync {
    fn extract(&self, image: &GrayImage, max_keypoints: usize) -> Vec<Keypoint>;
}

/// Extracts a per-page sensor-noise residual
pub trait NoiseExtractor: Send + Sync {
    fn residual(&self, image: &GrayImage) -> NoiseResidual;
}

/// Validates one embedded signature against the file bytes
pub trait SignatureValidator: Send + Sync {
    fn verify(
        &self,
        file_bytes: &[u8],
        signature: &EmbeddedSignature,
    ) -> Result<SignatureVerification, ValidationError>;
}

/// Classifies the language of a short text sample, ISO 639-1
pub trait LanguageClassifier: Send + Sync {
    fn classify(&self, sample: &str) -> Option<String>;
}

/// The full capability set handed to the pipeline.
///
/// `None` marks a capability as unavailable for the whole run.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub signature_validator: Option<Arc<dyn SignatureValidator>>,
    pub renderer: Option<Arc<dyn PageRenderer>>,
    pub ocr: Option<Arc<dyn OcrEngine>>,
    pub keypoints: Option<Arc<dyn KeypointExtractor>>,
    pub noise: Option<Arc<dyn NoiseExtractor>>,
    pub language: Option<Arc<dyn LanguageClassifier>>,
}

impl Capabilities {
    /// Everything unavailable; analyzers degrade every optional signal
    pub fn none() -> Self {
        Self::default()
    }

    /// Probes the environment and wires up every capability that responds
    pub fn detect(config: &VerifierConfig) -> Self {
        let renderer: Option<Arc<dyn PageRenderer>> = PdftoppmRenderer::probe()
            .then(|| Arc::new(PdftoppmRenderer::new(config.tool_timeout)) as Arc<dyn PageRenderer>);
        let ocr: Option<Arc<dyn OcrEngine>> = TesseractOcr::probe().then(|| {
            Arc::new(TesseractOcr::new(
                config.visual.ocr_languages.clone(),
                config.tool_timeout,
            )) as Arc<dyn OcrEngine>
        });

        Self {
            signature_validator: Some(Arc::new(Pkcs7Validator::new())),
            renderer,
            ocr,
            keypoints: Some(Arc::new(FastFeatureExtractor::default())),
            noise: Some(Arc::new(ResidualNoiseExtractor::default())),
            language: Some(Arc::new(LinguaClassifier::new())),
        }
    }
}
