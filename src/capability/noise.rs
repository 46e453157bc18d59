//! Sensor-noise residual extraction
//!
//! The residual is the high-frequency component left after subtracting a
//! Gaussian-smoothed copy of the page, pooled onto a fixed grid so pages
//! of different pixel sizes stay comparable.

use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;

use super::NoiseExtractor;

/// Side length of the pooled residual grid
const GRID: usize = 64;

/// Fixed-size noise residual of one page
#[derive(Debug, Clone)]
pub struct NoiseResidual(pub Vec<f32>);

impl NoiseResidual {
    /// Element-wise mean of several residuals
    pub fn mean(residuals: &[NoiseResidual]) -> Option<NoiseResidual> {
        let first_len = residuals.first()?.0.len();
        let mut acc = vec![0.0f32; first_len];
        for residual in residuals {
            if residual.0.len() != first_len {
                return None;
            }
            for (a, v) in acc.iter_mut().zip(residual.0.iter()) {
                *a += v;
            }
        }
        let n = residuals.len() as f32;
        Some(NoiseResidual(acc.into_iter().map(|v| v / n).collect()))
    }

    /// Pearson correlation; `None` on mismatched or degenerate input
    pub fn correlate(&self, other: &NoiseResidual) -> Option<f64> {
        if self.0.len() != other.0.len() || self.0.is_empty() {
            return None;
        }
        let n = self.0.len() as f64;
        let mean_a: f64 = self.0.iter().map(|v| *v as f64).sum::<f64>() / n;
        let mean_b: f64 = other.0.iter().map(|v| *v as f64).sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let da = *a as f64 - mean_a;
            let db = *b as f64 - mean_b;
            cov += da * db;
            var_a += da * da;
            var_b += db * db;
        }
        let denom = (var_a * var_b).sqrt();
        if denom == 0.0 {
            return None;
        }
        Some(cov / denom)
    }
}

/// Blur-subtract residual extractor
pub struct ResidualNoiseExtractor {
    /// Gaussian sigma for the smoothed copy
    pub sigma: f32,
}

impl Default for ResidualNoiseExtractor {
    fn default() -> Self {
        Self { sigma: 2.0 }
    }
}

impl NoiseExtractor for ResidualNoiseExtractor {
    fn residual(&self, image: &GrayImage) -> NoiseResidual {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return NoiseResidual(vec![0.0; GRID * GRID]);
        }

        let blurred = gaussian_blur_f32(image, self.sigma);
        let mut sums = vec![0.0f32; GRID * GRID];
        let mut counts = vec![0u32; GRID * GRID];

        for y in 0..height {
            for x in 0..width {
                let value =
                    image.get_pixel(x, y).0[0] as f32 - blurred.get_pixel(x, y).0[0] as f32;
                let gx = ((x as usize * GRID) / width as usize).min(GRID - 1);
                let gy = ((y as usize * GRID) / height as usize).min(GRID - 1);
                sums[gy * GRID + gx] += value;
                counts[gy * GRID + gx] += 1;
            }
        }

        let grid = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| if count > 0 { sum / count as f32 } else { 0.0 })
            .collect();
        NoiseResidual(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn residual_has_fixed_size() {
        let extractor = ResidualNoiseExtractor::default();
        let small = extractor.residual(&GrayImage::new(30, 40));
        let large = extractor.residual(&GrayImage::new(300, 400));
        assert_eq!(small.0.len(), GRID * GRID);
        assert_eq!(large.0.len(), GRID * GRID);
    }

    #[test]
    fn self_correlation_is_high() {
        let image = GrayImage::from_fn(128, 128, |x, y| Luma([((x * 13 + y * 7) % 251) as u8]));
        let extractor = ResidualNoiseExtractor::default();
        let residual = extractor.residual(&image);
        let corr = residual.correlate(&residual).unwrap();
        assert!(corr > 0.99, "self correlation was {corr}");
    }

    #[test]
    fn flat_image_correlation_is_degenerate() {
        let extractor = ResidualNoiseExtractor::default();
        let flat = extractor.residual(&GrayImage::from_pixel(64, 64, Luma([100u8])));
        assert!(flat.correlate(&flat).is_none());
    }

    #[test]
    fn mean_rejects_mismatched_lengths() {
        let a = NoiseResidual(vec![1.0; 4]);
        let b = NoiseResidual(vec![1.0; 8]);
        assert!(NoiseResidual::mean(&[a, b]).is_none());
    }
}
