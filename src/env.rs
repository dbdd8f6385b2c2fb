//! A headless arena standing in for the physics host.
//!
//! Walls bound a square floor; the arena keeps the agent inside them and reports wall contact
//! and goal entry as [`Collision`] events, the way a physics engine's callbacks would.

use super::{
    agents::Pose,
    config::TurtleConfig,
    episode::{Collision, EpisodeController, EpisodeSummary},
    placement::GoalPlacer,
    policy::Policy,
    Point,
};
use tracing::trace;

/// Contact detection for a square arena.
///
/// Tracks enter/stay/exit transitions between ticks.
#[derive(Clone, Debug)]
pub struct Arena {
    half_extent: f64,
    agent_radius: f64,
    goal_radius: f64,
    touching_wall: bool,
    inside_goal: bool,
}

/// What the arena found during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contacts {
    /// Events to dispatch, in order.
    pub events: Vec<Collision>,
    /// Where the agent was pushed back to, if it passed a wall.
    pub corrected: Option<Point>,
}

impl Arena {
    /// Constructs a new `Arena` with the configured bounds and collision radii.
    pub fn new(config: &TurtleConfig) -> Self {
        Arena {
            half_extent: config.world_half_extent,
            agent_radius: config.arena.agent_radius,
            goal_radius: config.arena.goal_radius,
            touching_wall: false,
            inside_goal: false,
        }
    }

    /// Resolves the agent against the walls and the goal trigger after it moved.
    pub fn resolve(&mut self, agent: &Pose, goal: &Pose, dt: f64) -> Contacts {
        let mut contacts = Contacts::default();

        // Bound position
        let limit = self.half_extent - self.agent_radius;
        let p = agent.position;
        let clamped = Point::new(p.x.clamp(-limit, limit), p.y, p.z.clamp(-limit, limit));
        let touching = p.x.abs() >= limit || p.z.abs() >= limit;
        if clamped != p {
            contacts.corrected = Some(clamped);
        }

        match (self.touching_wall, touching) {
            (false, true) => contacts.events.push(Collision::WallEnter),
            (true, true) => contacts.events.push(Collision::WallStay(dt)),
            (true, false) => contacts.events.push(Collision::WallExit),
            (false, false) => {}
        }
        self.touching_wall = touching;

        let at = Pose::new(clamped, agent.heading_degrees);
        let inside = at.planar_distance(goal) < self.goal_radius;
        if inside && !self.inside_goal {
            contacts.events.push(Collision::GoalEnter);
        }
        self.inside_goal = inside;

        contacts
    }

    pub fn touching_wall(&self) -> bool {
        self.touching_wall
    }
}

/// Drives an [`EpisodeController`] with a [`Policy`] inside an [`Arena`].
pub struct Environment<T: Policy> {
    policy: T,
    arena: Arena,
    dt: f64,
    ticks: u64,
}

impl<T: Policy> Environment<T> {
    /// Constructs a new `Environment<T>` ticking at the configured decision interval.
    pub fn new(policy: T, config: &TurtleConfig) -> Self {
        Environment {
            policy,
            arena: Arena::new(config),
            dt: config.tick_dt,
            ticks: 0,
        }
    }

    /// Runs one simulation tick.
    ///
    /// Observe, act, resolve contacts, then advance the ground flash. Returns the summary of an
    /// episode that ended during this tick, if any.
    pub fn tick<P: GoalPlacer>(
        &mut self,
        controller: &mut EpisodeController<P>,
    ) -> Option<EpisodeSummary> {
        let before = controller.episode_index();
        let observation = controller.observe();
        let action = self.policy.act(&observation);
        controller.step(action);

        let contacts =
            self.arena
                .resolve(&controller.agent_pose(), &controller.goal_pose(), self.dt);
        if let Some(position) = contacts.corrected {
            controller.correct_agent_position(position);
        }
        for event in contacts.events {
            trace!(?event, tick = self.ticks, "collision");
            controller.on_collision(event);
        }

        controller.tick_feedback(self.dt);
        self.ticks += 1;

        if controller.episode_index() != before {
            controller.last_episode().copied()
        } else {
            None
        }
    }

    /// Ticks until `episodes` episodes have finished or `max_ticks` ticks have run.
    ///
    /// Returns the summaries of the finished episodes in order.
    pub fn run<P: GoalPlacer>(
        &mut self,
        controller: &mut EpisodeController<P>,
        episodes: usize,
        max_ticks: u64,
    ) -> Vec<EpisodeSummary> {
        let mut finished = Vec::with_capacity(episodes);
        let mut remaining = max_ticks;
        while finished.len() < episodes && remaining > 0 {
            if let Some(summary) = self.tick(controller) {
                finished.push(summary);
            }
            remaining -= 1;
        }
        finished
    }

    /// The number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}
