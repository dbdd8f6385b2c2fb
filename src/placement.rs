//! Goal placement at the start of every episode.

use super::{
    agents::{heading_direction, Pose},
    config::TurtleConfig,
    Point,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A freshly drawn goal offset, relative to the agent's spawn point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalSpec {
    /// Bearing in degrees within `[0, 360)`; 0 faces +Z.
    pub bearing_degrees: f64,
    /// Planar distance from the origin of placement.
    pub distance: f64,
}

impl GoalSpec {
    /// Turns the drawn offset into a goal pose around `origin`.
    ///
    /// The goal's height is fixed to `height`, whatever the height of `origin`.
    pub fn resolve(&self, origin: &Point, height: f64) -> Pose {
        let target = origin + heading_direction(self.bearing_degrees) * self.distance;
        Pose::new(Point::new(target.x, height, target.z), 0.0)
    }
}

/// Provides a new goal pose for every episode.
pub trait GoalPlacer {
    /// Produces a goal pose around the provided origin.
    fn place(&mut self, origin: &Point) -> Pose;
}

/// A [`GoalPlacer`] drawing a uniform bearing and a uniform distance within an annulus.
pub struct RandomGoalPlacer<R: Rng> {
    rng: R,
    min_distance: f64,
    max_distance: f64,
    height: f64,
}

impl<R: Rng> RandomGoalPlacer<R> {
    /// Constructs a placer over `[min_distance, max_distance]`.
    ///
    /// Expects `0 <= min_distance <= max_distance`, as checked by
    /// [`TurtleConfig::validate()`].
    pub fn new(rng: R, min_distance: f64, max_distance: f64, height: f64) -> Self {
        RandomGoalPlacer {
            rng,
            min_distance,
            max_distance,
            height,
        }
    }

    /// Draws the bearing and distance of the next goal.
    pub fn sample(&mut self) -> GoalSpec {
        GoalSpec {
            bearing_degrees: self.rng.gen_range(0.0..360.0),
            distance: self.rng.gen_range(self.min_distance..=self.max_distance),
        }
    }
}

impl RandomGoalPlacer<StdRng> {
    /// Constructs a placer from the configured distance range, goal height and seed.
    pub fn from_config(config: &TurtleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let [min, max] = config.goal_distance;
        RandomGoalPlacer::new(rng, min, max, config.goal_height)
    }
}

impl<R: Rng> GoalPlacer for RandomGoalPlacer<R> {
    fn place(&mut self, origin: &Point) -> Pose {
        let spec = self.sample();
        spec.resolve(origin, self.height)
    }
}

/// A [`GoalPlacer`] cycling through fixed positions.
///
/// Useful for scripted scenarios where the goal location must be known in advance.
pub struct FixedGoalPlacer {
    positions: Vec<Point>,
    next: usize,
}

impl FixedGoalPlacer {
    /// Constructs a placer over `positions`; an empty list places every goal at the origin
    /// of placement.
    pub fn new(positions: Vec<Point>) -> Self {
        FixedGoalPlacer { positions, next: 0 }
    }
}

impl GoalPlacer for FixedGoalPlacer {
    fn place(&mut self, origin: &Point) -> Pose {
        if self.positions.is_empty() {
            return Pose::new(*origin, 0.0);
        }
        let position = self.positions[self.next % self.positions.len()];
        self.next += 1;
        Pose::new(position, 0.0)
    }
}
