//! Action sources for driving the agent without a learned policy.

use super::{agents::Action, Observation};
use rand::Rng;

/// Chooses one action per decision from the current observation.
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Action;
}

/// Manual control from arrow-key state.
///
/// Up wins over left, left over right; nothing pressed is a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keys {
    pub up: bool,
    pub left: bool,
    pub right: bool,
}

impl Keys {
    pub fn action(&self) -> Action {
        if self.up {
            Action::Forward
        } else if self.left {
            Action::RotateLeft
        } else if self.right {
            Action::RotateRight
        } else {
            Action::Noop
        }
    }
}

/// Turns toward the goal, then walks straight at it.
///
/// Works from the observation alone: positions share one normalization factor, so the bearing
/// to the goal is unaffected by it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeekGoal {
    /// Largest bearing error, in degrees, at which the policy walks instead of turning.
    pub tolerance_degrees: f64,
}

impl Default for SeekGoal {
    fn default() -> Self {
        SeekGoal {
            tolerance_degrees: 5.0,
        }
    }
}

impl SeekGoal {
    /// Signed angle in `(-180, 180]` from the agent's heading to the goal; positive means the
    /// goal is to the right.
    pub fn bearing_error(observation: &Observation) -> f64 {
        let dx = observation[0] - observation[2];
        let dz = observation[1] - observation[3];
        let heading = (observation[4] + 1.0) / 2.0 * 360.0;
        let bearing = dx.atan2(dz).to_degrees();
        let error = (bearing - heading).rem_euclid(360.0);
        if error > 180.0 {
            error - 360.0
        } else {
            error
        }
    }
}

impl Policy for SeekGoal {
    fn act(&mut self, observation: &Observation) -> Action {
        let error = Self::bearing_error(observation);
        if error > self.tolerance_degrees {
            Action::RotateRight
        } else if error < -self.tolerance_degrees {
            Action::RotateLeft
        } else {
            Action::Forward
        }
    }
}

/// Picks uniformly among the four actions.
pub struct RandomPolicy<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPolicy<R> {
    pub fn new(rng: R) -> Self {
        RandomPolicy { rng }
    }
}

impl<R: Rng> Policy for RandomPolicy<R> {
    fn act(&mut self, _observation: &Observation) -> Action {
        Action::ALL[self.rng.gen_range(0..Action::ALL.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn keys_priority() {
        let all = Keys {
            up: true,
            left: true,
            right: true,
        };
        assert_eq!(all.action(), Action::Forward);
        let turn = Keys {
            left: true,
            right: true,
            ..Keys::default()
        };
        assert_eq!(turn.action(), Action::RotateLeft);
        let right = Keys {
            right: true,
            ..Keys::default()
        };
        assert_eq!(right.action(), Action::RotateRight);
        assert_eq!(Keys::default().action(), Action::Noop);
    }

    #[test]
    fn seek_walks_when_facing_goal() {
        // goal straight ahead on +z, agent facing 0 degrees
        let obs = Observation::new(0.0, 0.4, 0.0, 0.0, -1.0);
        assert!(SeekGoal::bearing_error(&obs).abs() < 1e-9);
        assert_eq!(SeekGoal::default().act(&obs), Action::Forward);
    }

    #[test]
    fn seek_turns_toward_goal() {
        // goal on +x is 90 degrees to the right
        let obs = Observation::new(0.5, 0.0, 0.0, 0.0, -1.0);
        assert!((SeekGoal::bearing_error(&obs) - 90.0).abs() < 1e-9);
        assert_eq!(SeekGoal::default().act(&obs), Action::RotateRight);
        // goal on -x is to the left
        let obs = Observation::new(-0.5, 0.0, 0.0, 0.0, -1.0);
        assert_eq!(SeekGoal::default().act(&obs), Action::RotateLeft);
    }

    #[test]
    fn bearing_error_wraps_across_north() {
        // heading 350 degrees, goal at bearing 10 degrees: 20 degrees to the right
        let heading = (350.0 / 360.0) * 2.0 - 1.0;
        let b = 10f64.to_radians();
        let obs = Observation::new(b.sin(), b.cos(), 0.0, 0.0, heading);
        assert!((SeekGoal::bearing_error(&obs) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn random_policy_covers_all_actions() {
        let mut policy = RandomPolicy::new(StdRng::seed_from_u64(1));
        let obs = Observation::zeros();
        let seen: HashSet<Action> = (0..200).map(|_| policy.act(&obs)).collect();
        assert_eq!(seen.len(), 4);
    }
}
