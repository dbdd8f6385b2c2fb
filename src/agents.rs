//! Entities of the simulation: the turtle agent and its goal.

use super::{color::Color, error::InvalidAction, Point, Vector};
use nalgebra as na;

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit vector along the ground plane for a heading in degrees.
///
/// 0 degrees faces +Z; positive angles turn toward +X.
pub fn heading_direction(heading_degrees: f64) -> Vector {
    na::Rotation3::from_axis_angle(&Vector::y_axis(), heading_degrees.to_radians()) * Vector::z()
}

/// Position plus a heading about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Point,
    /// Heading in degrees, always within `[0, 360)`.
    pub heading_degrees: f64,
}

impl Pose {
    /// Constructs a pose, wrapping the heading into `[0, 360)`.
    pub fn new(position: Point, heading_degrees: f64) -> Self {
        Pose {
            position,
            heading_degrees: wrap_degrees(heading_degrees),
        }
    }

    /// The direction the pose is facing.
    pub fn forward(&self) -> Vector {
        heading_direction(self.heading_degrees)
    }

    /// Distance to another pose, ignoring height.
    pub fn planar_distance(&self, other: &Pose) -> f64 {
        let d = other.position - self.position;
        d.x.hypot(d.z)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::new(Point::origin(), 0.0)
    }
}

/// One discrete decision per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Noop = 0,
    Forward = 1,
    RotateLeft = 2,
    RotateRight = 3,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Noop,
        Action::Forward,
        Action::RotateLeft,
        Action::RotateRight,
    ];

    /// The raw index the host and policy exchange.
    pub fn index(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Action {
    type Error = InvalidAction;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::Noop),
            1 => Ok(Action::Forward),
            2 => Ok(Action::RotateLeft),
            3 => Ok(Action::RotateRight),
            x => Err(InvalidAction(x)),
        }
    }
}

/// Provides the pose bookkeeping shared by every entity the controller places.
pub trait Body {
    /// Provides the pose of the body.
    fn pose(&self) -> Pose;
    /// Sets the pose of the body.
    fn set_pose(&mut self, pose: Pose);
    /// Provides the position of the body.
    fn pos(&self) -> Point {
        self.pose().position
    }
    /// Sets the position of the body, keeping its heading.
    fn set_pos(&mut self, position: Point) {
        let heading = self.pose().heading_degrees;
        self.set_pose(Pose::new(position, heading));
    }
    /// Updates the position of the body based on a provided offset.
    fn update_pos(&mut self, v: Vector) {
        let new_pos = self.pos() + v;
        self.set_pos(new_pos);
    }
}

/// The controlled agent; moves by discrete actions and carries a body color.
#[derive(Clone, Debug)]
pub struct Turtle {
    pose: Pose,
    spawn: Pose,
    color: Color,
    default_color: Color,
    contact_color: Color,
}

impl Turtle {
    /// Constructs a new `Turtle` standing at its spawn pose.
    pub fn new(spawn: Pose, default_color: Color, contact_color: Color) -> Self {
        Turtle {
            pose: spawn,
            spawn,
            color: default_color,
            default_color,
            contact_color,
        }
    }

    /// Moves the turtle back to its spawn pose and restores its default color.
    pub fn reset(&mut self) {
        self.pose = self.spawn;
        self.color = self.default_color;
    }

    /// Applies one discrete action covering `dt` seconds.
    pub fn act(&mut self, action: Action, move_speed: f64, rotation_speed: f64, dt: f64) {
        match action {
            Action::Noop => {}
            Action::Forward => {
                let offset = self.pose.forward() * move_speed * dt;
                self.update_pos(offset);
            }
            Action::RotateLeft => self.rotate(-rotation_speed * dt),
            Action::RotateRight => self.rotate(rotation_speed * dt),
        }
    }

    fn rotate(&mut self, degrees: f64) {
        self.pose = Pose::new(self.pose.position, self.pose.heading_degrees + degrees);
    }

    /// Paints the turtle with its wall-contact color.
    pub fn mark_contact(&mut self) {
        self.color = self.contact_color;
    }

    /// Restores the turtle's default color.
    pub fn clear_contact(&mut self) {
        self.color = self.default_color;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn spawn(&self) -> Pose {
        self.spawn
    }
}

impl Body for Turtle {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

/// The target the turtle has to reach.
#[derive(Clone, Debug, Default)]
pub struct Goal {
    pose: Pose,
}

impl Goal {
    pub fn new(pose: Pose) -> Self {
        Goal { pose }
    }
}

impl Body for Goal {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}
