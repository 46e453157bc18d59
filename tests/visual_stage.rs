//! Visual stage exercised end-to-end with a stub renderer
//!
//! The renderer serves pre-built synthetic pages so the copy-move and
//! sensor-noise paths run against the real extractors without any
//! external tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::{GrayImage, Luma};
use tempfile::TempDir;
use veridoc::analyzer::VisualAnalyzer;
use veridoc::capability::{
    CapabilityError, Capabilities, FastFeatureExtractor, PageRenderer, RenderedPages,
    ResidualNoiseExtractor,
};
use veridoc::{DocumentHandle, DocumentType, VerifierConfig};

/// Serves a fixed list of page images regardless of the input document
struct StubRenderer {
    pages: Vec<PathBuf>,
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, _path: &Path, _dpi: u32) -> Result<RenderedPages, CapabilityError> {
        Ok(RenderedPages::new(self.pages.clone(), None))
    }
}

fn handle() -> DocumentHandle {
    DocumentHandle {
        path: PathBuf::from("stub.pdf"),
        byte_len: 0,
        sha256: String::new(),
        sha512: String::new(),
        doc_type: DocumentType::Pdf,
        page_count: None,
        text_native: Some(false),
    }
}

/// Deterministic high-contrast noise value for pixel (x, y) of patch `seed`
fn noise(seed: u32, x: u32, y: u32) -> u8 {
    (((x.wrapping_mul(73)) ^ (y.wrapping_mul(151)) ^ seed.wrapping_mul(2897)) % 256) as u8
}

/// Flat page with a 96x96 textured patch stamped at the given offsets
fn page_with_patches(patches: &[(u32, u32, u32)]) -> GrayImage {
    let mut image = GrayImage::from_pixel(256, 256, Luma([128u8]));
    for &(seed, ox, oy) in patches {
        for py in 0..96 {
            for px in 0..96 {
                image.put_pixel(ox + px, oy + py, Luma([noise(seed, px, py)]));
            }
        }
    }
    image
}

fn save_pages(dir: &TempDir, images: &[GrayImage]) -> Vec<PathBuf> {
    images
        .iter()
        .enumerate()
        .map(|(i, img)| {
            let path = dir.path().join(format!("page-{}.png", i + 1));
            img.save(&path).unwrap();
            path
        })
        .collect()
}

fn capabilities(pages: Vec<PathBuf>) -> Capabilities {
    Capabilities {
        renderer: Some(Arc::new(StubRenderer { pages })),
        keypoints: Some(Arc::new(FastFeatureExtractor::default())),
        noise: Some(Arc::new(ResidualNoiseExtractor::default())),
        ..Capabilities::none()
    }
}

fn analyzer(capabilities: Capabilities) -> VisualAnalyzer {
    let mut config = VerifierConfig::new();
    config.visual.min_cluster = 5;
    VisualAnalyzer::new(Arc::new(config), Arc::new(capabilities))
}

#[tokio::test]
async fn duplicated_region_triggers_copy_move() {
    let dir = TempDir::new().unwrap();
    // the same textured patch stamped twice, far apart
    let page = page_with_patches(&[(7, 16, 16), (7, 144, 144)]);
    let pages = save_pages(&dir, &[page]);

    let outcome = analyzer(capabilities(pages)).analyze(&handle()).await.unwrap();
    assert!(outcome.findings.copy_move);
    assert!(!outcome.findings.copy_move_matches.is_empty());
    for m in &outcome.findings.copy_move_matches {
        assert_eq!(m.page, 1);
    }
}

#[tokio::test]
async fn distinct_regions_do_not_trigger_copy_move() {
    let dir = TempDir::new().unwrap();
    // two unrelated textures: plenty of keypoints, no duplicated content
    let page = page_with_patches(&[(7, 16, 16), (99, 144, 144)]);
    let pages = save_pages(&dir, &[page]);

    let outcome = analyzer(capabilities(pages)).analyze(&handle()).await.unwrap();
    assert!(!outcome.findings.copy_move);
    assert!(outcome.findings.copy_move_matches.is_empty());
}

#[tokio::test]
async fn identical_pages_have_consistent_noise() {
    let dir = TempDir::new().unwrap();
    let page = page_with_patches(&[(7, 32, 32)]);
    let pages = save_pages(&dir, &[page.clone(), page]);

    let outcome = analyzer(capabilities(pages)).analyze(&handle()).await.unwrap();
    assert_eq!(outcome.findings.pages, 2);
    assert_eq!(outcome.findings.noise_consistent, Some(true));
}

#[tokio::test]
async fn unrelated_pages_have_inconsistent_noise() {
    let dir = TempDir::new().unwrap();
    let first = page_with_patches(&[(7, 16, 16), (11, 144, 144)]);
    let second = page_with_patches(&[(42, 16, 144), (57, 144, 16)]);
    let pages = save_pages(&dir, &[first, second]);

    let outcome = analyzer(capabilities(pages)).analyze(&handle()).await.unwrap();
    assert_eq!(outcome.findings.noise_consistent, Some(false));
}

#[tokio::test]
async fn single_page_noise_is_unknown() {
    let dir = TempDir::new().unwrap();
    let pages = save_pages(&dir, &[page_with_patches(&[(7, 32, 32)])]);

    let outcome = analyzer(capabilities(pages)).analyze(&handle()).await.unwrap();
    // one correlatable page is below the two-page floor
    assert_eq!(outcome.findings.noise_consistent, None);
}

#[tokio::test]
async fn missing_ocr_degrades_density_only() {
    let dir = TempDir::new().unwrap();
    let pages = save_pages(&dir, &[page_with_patches(&[(7, 32, 32)])]);

    let outcome = analyzer(capabilities(pages)).analyze(&handle()).await.unwrap();
    assert!(outcome.findings.ocr_density.is_none());
    assert!(outcome.ocr_pages.is_none());
    assert!(outcome
        .findings
        .errors
        .iter()
        .any(|e| e.contains("OCR engine unavailable")));
    // copy-move still evaluated on the same run
    assert_eq!(outcome.findings.pages, 1);
}
