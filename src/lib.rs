//! Episodic control core for a single goal-seeking agent.
//!
//! The [`EpisodeController`](episode::EpisodeController) owns the episode lifecycle: it resets
//! the agent, respawns the goal at a random bearing, applies shaped rewards and restarts the
//! episode when the goal is reached or the step budget runs out. Physics, rendering and the
//! learning policy live in the host; this crate only sees them through plain method calls.

use nalgebra as na;

/// A position in the world. Y is the vertical axis.
pub type Point = na::Point3<f64>;
/// A direction or offset in the world.
pub type Vector = na::Vector3<f64>;
/// The normalized observation handed to a policy.
///
/// Order: goal x, goal z, agent x, agent z, agent heading.
pub type Observation = na::Vector5<f64>;

pub mod agents;
pub mod color;
pub mod config;
pub mod env;
pub mod episode;
pub mod error;
pub mod feedback;
pub mod placement;
pub mod policy;
pub mod rewards;
pub mod sensors;
pub mod telemetry;

pub use agents::{Action, Pose};
pub use color::Color;
pub use config::TurtleConfig;
pub use episode::{Collision, EpisodeController, EpisodeOutcome, EpisodeSummary, EpisodicAgent};
pub use error::{ConfigError, InvalidAction};
