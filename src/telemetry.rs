//! Debug overlay snapshot.

use std::fmt;

/// How an overlay should tint the reward line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardTone {
    Positive,
    Negative,
}

/// Counters a debug overlay polls every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Telemetry {
    pub episode_index: u64,
    pub step_count: u32,
    pub cumulative_reward: f64,
}

impl Telemetry {
    pub fn episode_line(&self) -> String {
        format!("Episode: {} - Step: {}", self.episode_index, self.step_count)
    }

    pub fn reward_line(&self) -> String {
        format!("Reward: {}", self.cumulative_reward)
    }

    /// Negative below zero; zero counts as positive.
    pub fn tone(&self) -> RewardTone {
        if self.cumulative_reward < 0.0 {
            RewardTone::Negative
        } else {
            RewardTone::Positive
        }
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.episode_line(), self.reward_line())
    }
}
