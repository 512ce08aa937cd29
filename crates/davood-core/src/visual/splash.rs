use rand::Rng;

/// Status lines shown as loading advances, in order.
pub const LOADING_TEXTS: [&str; 5] = [
    "Initializing AI System...",
    "Loading Neural Networks...",
    "Connecting to Backend...",
    "Preparing Interface...",
    "Almost Ready...",
];

/// Fake startup progress, 0 to 100 percent.
#[derive(Debug, Clone, Default)]
pub struct LoadingProgress {
    percent: f64,
    text: Option<&'static str>,
}

impl LoadingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by a random 5 to 20 percent, capped at 100. Returns the new
    /// percentage.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.advance(rng.gen_range(5.0..20.0))
    }

    /// Advance by `step` percent.
    pub fn advance(&mut self, step: f64) -> f64 {
        if self.is_complete() {
            return self.percent;
        }
        self.percent = (self.percent + step).min(100.0);
        // At exactly 100 the index runs past the list and the last text stays.
        let index = (self.percent / 100.0 * LOADING_TEXTS.len() as f64).floor() as usize;
        if let Some(text) = LOADING_TEXTS.get(index) {
            self.text = Some(text);
        }
        self.percent
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Current status line, if any tick has happened.
    pub fn text(&self) -> Option<&'static str> {
        self.text
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_ticks_stay_in_range_and_finish() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut progress = LoadingProgress::new();
        let mut previous = 0.0;
        let mut ticks = 0;
        while !progress.is_complete() {
            let now = progress.tick(&mut rng);
            let step = now - previous;
            assert!(step > 0.0 && step <= 20.0);
            if now < 100.0 {
                assert!(step >= 5.0);
            }
            previous = now;
            ticks += 1;
        }
        assert_eq!(progress.percent(), 100.0);
        assert!((5..=20).contains(&ticks));
    }

    #[test]
    fn test_text_follows_progress() {
        let mut progress = LoadingProgress::new();
        assert_eq!(progress.text(), None);
        progress.advance(10.0);
        assert_eq!(progress.text(), Some("Initializing AI System..."));
        progress.advance(35.0);
        assert_eq!(progress.text(), Some("Connecting to Backend..."));
        progress.advance(40.0);
        assert_eq!(progress.text(), Some("Almost Ready..."));
        progress.advance(100.0);
        assert_eq!(progress.text(), Some("Almost Ready..."));
        assert!(progress.is_complete());
    }
}
