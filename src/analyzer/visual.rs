//! Raster-level analysis: copy-move detection, sensor-noise consistency,
//! OCR word density
//!
//! Runs only for raster-origin documents. Copy-move is a deliberately
//! noisy heuristic: textured or repetitive regions produce false
//! positives and no semantic disambiguation is attempted.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::capability::{Capabilities, CapabilityError, Keypoint, NoiseResidual};
use crate::config::{VerifierConfig, VisualConfig};
use crate::error::{Error, Result, VisualError};
use crate::types::{CopyMoveMatch, DocumentHandle, VisualFindings};

/// Findings plus the OCR hand-off consumed by the text stage
pub struct VisualOutcome {
    pub findings: VisualFindings,
    /// Recognized text keyed by 1-based page index; reused by the text
    /// analyzer to avoid a second extraction pass
    pub ocr_pages: Option<BTreeMap<usize, String>>,
}

struct PageData {
    index: usize,
    keypoints: Option<Vec<Keypoint>>,
    residual: Option<NoiseResidual>,
    error: Option<String>,
}

pub struct VisualAnalyzer {
    config: Arc<VerifierConfig>,
    capabilities: Arc<Capabilities>,
}

impl VisualAnalyzer {
    pub fn new(config: Arc<VerifierConfig>, capabilities: Arc<Capabilities>) -> Self {
        Self {
            config,
            capabilities,
        }
    }

    #[instrument(skip(self, handle), fields(path = %handle.path.display()))]
    pub async fn analyze(&self, handle: &DocumentHandle) -> Result<VisualOutcome> {
        let mut findings = VisualFindings::default();

        let renderer = match &self.capabilities.renderer {
            Some(renderer) => renderer,
            None => {
                findings
                    .errors
                    .push("page renderer unavailable; visual signals skipped".into());
                return Ok(VisualOutcome {
                    findings,
                    ocr_pages: None,
                });
            }
        };

        let rendered = match renderer.render(&handle.path, self.config.visual.render_dpi).await {
            Ok(rendered) => rendered,
            Err(timeout @ CapabilityError::Timeout { .. }) => {
                warn!("rendering timed out");
                findings.errors.push(format!("rendering degraded: {timeout}"));
                return Ok(VisualOutcome {
                    findings,
                    ocr_pages: None,
                });
            }
            Err(e) => return Err(VisualError::RenderFailed(e.to_string()).into()),
        };
        findings.pages = rendered.pages.len();

        // per-page CPU work fans out on rayon; results come back in page
        // order so downstream signals stay deterministic
        let page_data = {
            let pages = rendered.pages.clone();
            let keypoint_cap = self.capabilities.keypoints.clone();
            let noise_cap = self.capabilities.noise.clone();
            let max_keypoints = self.config.visual.max_keypoints;
            tokio::task::spawn_blocking(move || {
                pages
                    .par_iter()
                    .enumerate()
                    .map(|(i, path)| {
                        let index = i + 1;
                        let gray = match image::open(path) {
                            Ok(img) => img.to_luma8(),
                            Err(e) => {
                                return PageData {
                                    index,
                                    keypoints: None,
                                    residual: None,
                                    error: Some(format!("page {index} unreadable: {e}")),
                                }
                            }
                        };
                        PageData {
                            index,
                            keypoints: keypoint_cap
                                .as_ref()
                                .map(|cap| cap.extract(&gray, max_keypoints)),
                            residual: noise_cap.as_ref().map(|cap| cap.residual(&gray)),
                            error: None,
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(|e| Error::Visual(VisualError::RenderFailed(format!("page task: {e}"))))?
        };

        for page in &page_data {
            if let Some(error) = &page.error {
                findings.errors.push(error.clone());
            }
        }

        self.detect_copy_move(&page_data, &mut findings);
        self.check_noise_consistency(&page_data, &mut findings);
        let ocr_pages = self.run_ocr(&rendered.pages, &mut findings).await;

        Ok(VisualOutcome {
            findings,
            ocr_pages,
        })
    }

    fn detect_copy_move(&self, page_data: &[PageData], findings: &mut VisualFindings) {
        if self.capabilities.keypoints.is_none() {
            findings
                .errors
                .push("keypoint extractor unavailable; copy-move not evaluated".into());
            return;
        }

        for page in page_data {
            let keypoints = match &page.keypoints {
                Some(keypoints) => keypoints,
                None => continue,
            };
            let surviving = mutual_matches(keypoints, &self.config.visual);
            debug!(page = page.index, surviving = surviving.len(), "copy-move matching");
            if surviving.len() >= self.config.visual.min_cluster {
                findings.copy_move = true;
                findings
                    .copy_move_matches
                    .extend(surviving.into_iter().map(|(a, b)| CopyMoveMatch {
                        page: page.index,
                        from: (keypoints[a].x, keypoints[a].y),
                        to: (keypoints[b].x, keypoints[b].y),
                    }));
            }
        }
    }

    fn check_noise_consistency(&self, page_data: &[PageData], findings: &mut VisualFindings) {
        if self.capabilities.noise.is_none() {
            findings
                .errors
                .push("noise extractor unavailable; sensor-noise consistency unknown".into());
            return;
        }

        let residuals: Vec<NoiseResidual> = page_data
            .iter()
            .filter_map(|page| page.residual.clone())
            .collect();
        if residuals.len() < 2 {
            // fewer than two correlatable pages: unknown, never false
            return;
        }

        // the reference window assumes the leading pages share one capture
        // session; clamped so at least one page is left to compare
        let window = self
            .config
            .visual
            .noise_reference_window
            .min(residuals.len() - 1);
        let reference = match NoiseResidual::mean(&residuals[..window]) {
            Some(reference) => reference,
            None => return,
        };

        let mut evaluated = 0usize;
        let mut consistent = true;
        for residual in &residuals[window..] {
            if let Some(corr) = reference.correlate(residual) {
                evaluated += 1;
                if corr < self.config.visual.noise_corr_threshold {
                    consistent = false;
                }
            }
        }
        if evaluated > 0 {
            findings.noise_consistent = Some(consistent);
        }
    }

    async fn run_ocr(
        &self,
        pages: &[std::path::PathBuf],
        findings: &mut VisualFindings,
    ) -> Option<BTreeMap<usize, String>> {
        let engine = match &self.capabilities.ocr {
            Some(engine) => engine,
            None => {
                findings
                    .errors
                    .push("OCR engine unavailable; word density unknown".into());
                return None;
            }
        };

        let mut recognized = BTreeMap::new();
        let mut ratios = Vec::new();
        for (i, page) in pages.iter().enumerate() {
            let index = i + 1;
            match engine.recognize(page).await {
                Ok(text) => {
                    // informal normalization: recognized words per page,
                    // scaled; auxiliary signal only
                    ratios.push(text.split_whitespace().count() as f64 / 100.0);
                    recognized.insert(index, text);
                }
                Err(e) => findings.errors.push(format!("OCR degraded on page {index}: {e}")),
            }
        }

        if !ratios.is_empty() {
            findings.ocr_density = Some(ratios.iter().sum::<f64>() / ratios.len() as f64);
        }
        if recognized.is_empty() {
            None
        } else {
            Some(recognized)
        }
    }
}

/// Mutual-nearest-neighbour self-matching.
///
/// A pair survives only when each keypoint is the other's nearest
/// neighbour, the descriptor distance stays under the threshold, and the
/// points are far enough apart not to be the same feature.
fn mutual_matches(keypoints: &[Keypoint], config: &VisualConfig) -> Vec<(usize, usize)> {
    let n = keypoints.len();
    if n < 2 {
        return Vec::new();
    }

    let nearest: Vec<Option<(usize, u32)>> = (0..n)
        .map(|i| {
            let mut best: Option<(usize, u32)> = None;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = keypoints[i].distance(&keypoints[j]);
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((j, d));
                }
            }
            best
        })
        .collect();

    let mut matches = Vec::new();
    for i in 0..n {
        let (j, distance) = match nearest[i] {
            Some(pair) => pair,
            None => continue,
        };
        if i >= j {
            continue; // each mutual pair reported once
        }
        if distance > config.match_distance_threshold {
            continue;
        }
        let mutual = nearest[j].map_or(false, |(back, _)| back == i);
        if !mutual {
            continue;
        }
        let dx = keypoints[i].x - keypoints[j].x;
        let dy = keypoints[i].y - keypoints[j].y;
        if (dx * dx + dy * dy).sqrt() < config.min_match_separation {
            continue; // effectively a self-match
        }
        matches.push((i, j));
    }
    matches
}
