use rand::Rng;
use std::time::Duration;

/// Inclusive millisecond range a courtesy delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange::millis(0, 0);

    pub const fn millis(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn secs(min: u64, max: u64) -> Self {
        Self::millis(min * 1000, max * 1000)
    }

    fn sample(&self) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}

/// Randomized pauses between requests and scroll steps. Sites throttle
/// clients that hit them at a fixed cadence.
#[derive(Debug, Clone)]
pub struct Pacing {
    pub enabled: bool,
    pub between_pages: DelayRange,
    pub between_sources: DelayRange,
    pub scroll_pause: DelayRange,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            enabled: true,
            between_pages: DelayRange::secs(2, 4),
            between_sources: DelayRange::secs(3, 5),
            scroll_pause: DelayRange::secs(1, 2),
        }
    }
}

impl Pacing {
    pub fn off() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn sample(&self, range: DelayRange) -> Duration {
        if self.enabled {
            range.sample()
        } else {
            Duration::ZERO
        }
    }

    pub fn pause(&self, range: DelayRange) {
        let d = self.sample(range);
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}
