use std::time::Duration;

/// Delay schedule after failing poll cycles
///
/// The first failure waits `initial`; each further consecutive failure
/// doubles the wait up to `max`. A successful cycle resets it.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Record a failure and return the delay to wait before retrying
    pub fn on_failure(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Reset after a successful cycle
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
