//! Reward bookkeeping within an episode.

/// Accumulates the rewards of the current episode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardTracker {
    total: f64,
}

impl RewardTracker {
    /// Constructs an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the running total, without clamping.
    pub fn add_reward(&mut self, delta: f64) {
        self.total += delta;
    }

    /// The sum of every reward added since the last reset.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Zeroes the running total.
    pub fn reset(&mut self) {
        self.total = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(RewardTracker::new().total(), 0.0);
    }

    #[test]
    fn accumulates_positive_and_negative() {
        let mut r = RewardTracker::new();
        r.add_reward(1.0);
        r.add_reward(-0.25);
        r.add_reward(-0.05);
        assert!((r.total() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn no_clamping() {
        let mut r = RewardTracker::new();
        for _ in 0..100 {
            r.add_reward(-1.0);
        }
        assert_eq!(r.total(), -100.0);
    }

    #[test]
    fn reset_zeroes() {
        let mut r = RewardTracker::new();
        r.add_reward(3.5);
        r.reset();
        assert_eq!(r.total(), 0.0);
        r.add_reward(-1.0);
        assert_eq!(r.total(), -1.0);
    }
}
