//! Keypoint extraction for copy-move detection
//!
//! FAST corners ranked by score, each described by a 256-bit binary
//! descriptor built from deterministic intensity-pair comparisons inside a
//! 17x17 patch. The descriptor pattern is fixed so repeated runs over the
//! same page produce identical descriptors.

use image::GrayImage;
use imageproc::corners::corners_fast9;

use super::{Keypoint, KeypointExtractor};

/// Half-width of the descriptor patch; keypoints closer to the border are
/// dropped
const PATCH_RADIUS: u32 = 8;

/// FAST-corner keypoint extractor
pub struct FastFeatureExtractor {
    /// Intensity threshold for the corner detector
    pub threshold: u8,
}

impl Default for FastFeatureExtractor {
    fn default() -> Self {
        Self { threshold: 20 }
    }
}

/// Deterministic sampling-pair offsets for bit `k`, each within the patch
fn pair_offsets(k: usize) -> ((i32, i32), (i32, i32)) {
    let r = PATCH_RADIUS as i32;
    let dx1 = (k % 16) as i32 - r;
    let dy1 = ((k / 16) % 16) as i32 - r;
    let dx2 = ((k * 5 + 7) % 16) as i32 - r;
    let dy2 = ((k * 11 + 3) % 16) as i32 - r;
    ((dx1, dy1), (dx2, dy2))
}

fn describe(image: &GrayImage, x: u32, y: u32) -> [u8; 32] {
    let mut descriptor = [0u8; 32];
    for k in 0..256 {
        let ((dx1, dy1), (dx2, dy2)) = pair_offsets(k);
        let a = image.get_pixel((x as i32 + dx1) as u32, (y as i32 + dy1) as u32).0[0];
        let b = image.get_pixel((x as i32 + dx2) as u32, (y as i32 + dy2) as u32).0[0];
        if a > b {
            descriptor[k / 8] |= 1 << (k % 8);
        }
    }
    descriptor
}

impl KeypointExtractor for FastFeatureExtractor {
    fn extract(&self, image: &GrayImage, max_keypoints: usize) -> Vec<Keypoint> {
        let (width, height) = image.dimensions();
        if width <= 2 * PATCH_RADIUS || height <= 2 * PATCH_RADIUS {
            return Vec::new();
        }

        let mut corners = corners_fast9(image, self.threshold);
        corners.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        corners
            .into_iter()
            .filter(|c| {
                c.x >= PATCH_RADIUS
                    && c.y >= PATCH_RADIUS
                    && c.x < width - PATCH_RADIUS
                    && c.y < height - PATCH_RADIUS
            })
            .take(max_keypoints)
            .map(|c| Keypoint {
                x: c.x as f32,
                y: c.y as f32,
                descriptor: describe(image, c.x, c.y),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn checkered(width: u32, height: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([230u8])
            } else {
                Luma([20u8])
            }
        })
    }

    #[test]
    fn tiny_image_yields_nothing() {
        let image = GrayImage::new(8, 8);
        let extractor = FastFeatureExtractor::default();
        assert!(extractor.extract(&image, 100).is_empty());
    }

    #[test]
    fn flat_image_yields_nothing() {
        let image = GrayImage::from_pixel(64, 64, Luma([128u8]));
        let extractor = FastFeatureExtractor::default();
        assert!(extractor.extract(&image, 100).is_empty());
    }

    #[test]
    fn keypoint_bound_respected() {
        let image = checkered(128, 128, 8);
        let extractor = FastFeatureExtractor::default();
        let keypoints = extractor.extract(&image, 5);
        assert!(keypoints.len() <= 5);
    }

    #[test]
    fn identical_patches_identical_descriptors() {
        let image = checkered(128, 128, 8);
        let extractor = FastFeatureExtractor::default();
        let a = extractor.extract(&image, 50);
        let b = extractor.extract(&image, 50);
        assert_eq!(a.len(), b.len());
        for (ka, kb) in a.iter().zip(b.iter()) {
            assert_eq!(ka.descriptor, kb.descriptor);
        }
    }
}
