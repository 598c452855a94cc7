use std::time::Duration;

use rand::Rng;

/// Uniformly-sampled pause between requests, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct DelayPolicy {
    min_secs: f64,
    max_secs: f64,
}

impl DelayPolicy {
    /// Bounds are reordered if given backwards and clamped at zero.
    #[must_use]
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        let min_secs = min_secs.max(0.0);
        let max_secs = max_secs.max(0.0);
        if max_secs < min_secs {
            Self {
                min_secs: max_secs,
                max_secs: min_secs,
            }
        } else {
            Self { min_secs, max_secs }
        }
    }

    /// Draw one pause duration from the configured range.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max_secs <= self.min_secs {
            return Duration::from_secs_f64(self.min_secs);
        }
        let secs = rand::rng().random_range(self.min_secs..=self.max_secs);
        Duration::from_secs_f64(secs)
    }

    pub async fn pause(&self) {
        let wait = self.sample();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
