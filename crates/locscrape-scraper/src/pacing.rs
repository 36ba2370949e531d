//! Human-like pauses between requests to the same host.

use std::time::Duration;

/// A uniformly random delay drawn from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    /// Bounds given in either order are accepted.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No delay at all. Used by tests and `--dry-run` style callers.
    #[must_use]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    #[must_use]
    pub fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }

    /// Draw one delay.
    #[must_use]
    pub fn sample(&self) -> Duration {
        let spread = self.max - self.min;
        if spread.is_zero() {
            return self.min;
        }
        self.min + spread.mul_f64(rand::random::<f64>())
    }

    /// Sleep for one sampled delay.
    pub async fn pause(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        tracing::debug!(delay_secs = delay.as_secs_f64(), "pacing");
        tokio::time::sleep(delay).await;
    }
}
