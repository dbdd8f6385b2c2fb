//! Observations handed to the policy.

use super::{agents::Pose, Observation};

/// Number of features in an [`Observation`].
pub const OBSERVATION_SIZE: usize = 5;

/// Encodes the agent and goal poses into a normalized feature vector.
///
/// Planar coordinates are divided by the world's half extent, so positions on the floor map
/// to roughly `[-1, 1]`. Values are not clamped: a body outside the floor produces features
/// outside that range. The heading maps `[0, 360)` onto `[-1, 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservationEncoder {
    half_extent: f64,
}

impl ObservationEncoder {
    /// Constructs an encoder for a square world of side `2 * half_extent`.
    pub fn new(half_extent: f64) -> Self {
        ObservationEncoder { half_extent }
    }

    /// Returns `[goal x, goal z, agent x, agent z, agent heading]`.
    pub fn encode(&self, agent: &Pose, goal: &Pose) -> Observation {
        Observation::new(
            goal.position.x / self.half_extent,
            goal.position.z / self.half_extent,
            agent.position.x / self.half_extent,
            agent.position.z / self.half_extent,
            (agent.heading_degrees / 360.0) * 2.0 - 1.0,
        )
    }
}
