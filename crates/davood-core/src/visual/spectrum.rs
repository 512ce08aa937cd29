//! Synthetic voice visualizer. No audio is analysed; every frame is random.

use rand::Rng;

/// Bars per frame.
pub const BAND_COUNT: usize = 64;

/// Fraction of the canvas height a full-scale bar occupies.
const HEIGHT_SCALE: f64 = 0.8;

/// One frame of fake spectrum data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumFrame {
    bands: [u8; BAND_COUNT],
}

impl SpectrumFrame {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bands = [0u8; BAND_COUNT];
        rng.fill(&mut bands[..]);
        Self { bands }
    }

    pub fn from_bands(bands: [u8; BAND_COUNT]) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &[u8; BAND_COUNT] {
        &self.bands
    }

    /// Bar heights for a canvas `height` units tall.
    pub fn bar_heights(&self, height: f64) -> Vec<f64> {
        self.bands
            .iter()
            .map(|&v| bar_height(v, height))
            .collect()
    }
}

/// `value / 255 * height * 0.8`.
pub fn bar_height(value: u8, height: f64) -> f64 {
    f64::from(value) / 255.0 * height * HEIGHT_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_bar_height_scale() {
        assert_eq!(bar_height(0, 100.0), 0.0);
        assert!((bar_height(255, 100.0) - 80.0).abs() < 1e-9);
        assert!((bar_height(51, 10.0) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_frames_differ_between_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = SpectrumFrame::random(&mut rng);
        let b = SpectrumFrame::random(&mut rng);
        assert_ne!(a, b);
        assert_eq!(a.bar_heights(20.0).len(), BAND_COUNT);
        assert!(a.bar_heights(20.0).iter().all(|h| (0.0..=16.0).contains(h)));
    }
}
