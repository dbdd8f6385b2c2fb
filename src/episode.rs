//! Episode lifecycle and reward shaping.
//!
//! [`EpisodeController`] owns the agent, the goal, the reward tracker and the ground flash. The
//! host drives it from its tick loop: one [`step`](EpisodeController::step) per decision,
//! collision events as the physics reports them, and
//! [`tick_feedback`](EpisodeController::tick_feedback) once per rendered tick.
//!
//! Every episode ends through the same path, whether the goal was reached or the step budget ran
//! out, and that path immediately begins the next episode. `Terminated` is therefore never
//! visible to callers between calls.

use super::{
    agents::{Action, Body, Goal, Pose, Turtle},
    color::Color,
    config::TurtleConfig,
    feedback::GroundFeedbackAnimator,
    placement::{GoalPlacer, RandomGoalPlacer},
    rewards::RewardTracker,
    sensors::ObservationEncoder,
    telemetry::Telemetry,
    Observation, Point,
};
use rand::rngs::StdRng;
use std::fmt;
use tracing::{debug, info, trace, warn};

/// Lifecycle phase of the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the first episode begins.
    #[default]
    Initializing,
    /// Accepting steps.
    Running,
    /// Between the end of an episode and the start of the next one.
    Terminated,
}

/// Episode counters owned by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpisodeState {
    /// Number of episodes begun so far.
    pub episode_index: u64,
    /// Steps taken in the current episode; never exceeds `step_budget`.
    pub step_count: u32,
    pub step_budget: u32,
    pub phase: Phase,
}

impl EpisodeState {
    fn new(step_budget: u32) -> Self {
        EpisodeState {
            episode_index: 0,
            step_count: 0,
            step_budget,
            phase: Phase::Initializing,
        }
    }
}

/// Why an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EpisodeOutcome {
    /// The agent entered the goal.
    GoalReached,
    /// The step budget ran out.
    Timeout,
}

impl fmt::Display for EpisodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeOutcome::GoalReached => write!(f, "goal reached"),
            EpisodeOutcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// Final numbers of a finished episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub episode_index: u64,
    pub steps: u32,
    pub cumulative_reward: f64,
    pub outcome: EpisodeOutcome,
}

/// Collision and trigger events reported by the host's physics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collision {
    /// The agent started touching a wall.
    WallEnter,
    /// The agent kept touching a wall for `dt` seconds.
    WallStay(f64),
    /// The agent stopped touching a wall.
    WallExit,
    /// The agent entered the goal trigger.
    GoalEnter,
}

/// Engine-independent surface of an episodic agent, driven by the host's tick dispatch.
pub trait EpisodicAgent {
    /// Prepares the agent; `ground_color` is the floor's base color, if the host has a floor.
    fn initialize(&mut self, ground_color: Option<Color>);
    /// Resets the world for a new episode.
    fn begin_episode(&mut self);
    /// Applies one discrete action and returns the next observation.
    fn step(&mut self, action: Action) -> Observation;
    /// Handles a collision or trigger event.
    fn on_collision(&mut self, collision: Collision);
}

/// The episode state machine.
///
/// Generic over the [`GoalPlacer`] so scripted scenarios can pin goal positions.
pub struct EpisodeController<P: GoalPlacer = RandomGoalPlacer<StdRng>> {
    config: TurtleConfig,
    state: EpisodeState,
    rewards: RewardTracker,
    placer: P,
    encoder: ObservationEncoder,
    agent: Turtle,
    goal: Goal,
    ground_base: Option<Color>,
    feedback: Option<GroundFeedbackAnimator>,
    last_episode: Option<EpisodeSummary>,
    initialized: bool,
}

impl EpisodeController {
    /// Constructs a controller placing goals at random, seeded from the configuration.
    pub fn from_config(config: TurtleConfig) -> Self {
        let placer = RandomGoalPlacer::from_config(&config);
        EpisodeController::new(config, placer)
    }
}

impl<P: GoalPlacer> EpisodeController<P> {
    /// Constructs a new `EpisodeController` in the `Initializing` phase.
    ///
    /// Expects a configuration that passed [`TurtleConfig::validate()`].
    pub fn new(config: TurtleConfig, placer: P) -> Self {
        let spawn = Pose::new(Point::new(0.0, config.spawn_height, 0.0), 0.0);
        EpisodeController {
            state: EpisodeState::new(config.step_budget),
            rewards: RewardTracker::new(),
            placer,
            encoder: ObservationEncoder::new(config.world_half_extent),
            agent: Turtle::new(spawn, config.body.default_color, config.body.contact_color),
            goal: Goal::default(),
            ground_base: None,
            feedback: None,
            last_episode: None,
            initialized: false,
            config,
        }
    }

    /// Resets the counters and captures the ground's base color.
    ///
    /// Without a ground color, the episode-start flash is disabled.
    pub fn initialize(&mut self, ground_color: Option<Color>) {
        assert!(!self.initialized, "initialize called twice");
        self.initialized = true;
        self.state.episode_index = 0;
        self.state.step_count = 0;
        self.rewards.reset();
        self.ground_base = ground_color;
        self.feedback = ground_color.map(GroundFeedbackAnimator::new);
        debug!(has_ground = ground_color.is_some(), "initialized");
    }

    /// Starts a new episode.
    ///
    /// Flashes the ground if the previous episode ended with a nonzero reward, then resets the
    /// counters, the agent and the goal.
    pub fn begin_episode(&mut self) {
        assert!(self.initialized, "begin_episode called before initialize");

        let previous = self.rewards.total();
        if previous != 0.0 {
            if let (Some(animator), Some(base)) = (self.feedback.as_mut(), self.ground_base) {
                let target = if previous > 0.0 {
                    self.config.feedback.win_color
                } else {
                    self.config.feedback.loss_color
                };
                animator.start(target, base, self.config.feedback.duration);
            }
        }

        self.state.episode_index += 1;
        self.state.step_count = 0;
        self.rewards.reset();

        self.agent.reset();
        let origin = self.agent.pos();
        let goal = self.placer.place(&origin);
        self.goal.set_pose(goal);

        self.state.phase = Phase::Running;
        debug!(
            episode = self.state.episode_index,
            goal_x = goal.position.x,
            goal_z = goal.position.z,
            "episode begin"
        );
    }

    /// Applies one action, charges the step penalty and ends the episode once the budget is
    /// spent.
    ///
    /// # Panics
    ///
    /// Panics if no episode is running.
    pub fn step(&mut self, action: Action) -> Observation {
        assert_eq!(
            self.state.phase,
            Phase::Running,
            "step called with no running episode"
        );

        self.agent.act(
            action,
            self.config.move_speed,
            self.config.rotation_speed,
            self.config.tick_dt,
        );
        self.rewards.add_reward(self.step_penalty());
        self.state.step_count += 1;
        trace!(
            step = self.state.step_count,
            ?action,
            reward = self.rewards.total(),
            "step"
        );

        if self.state.step_count >= self.state.step_budget {
            self.end_episode(EpisodeOutcome::Timeout);
        }
        self.observe()
    }

    /// Grants the goal bonus and ends the episode.
    pub fn on_goal_reached(&mut self) {
        if !self.accepts_events("goal enter") {
            return;
        }
        self.rewards.add_reward(self.config.rewards.goal_bonus);
        self.end_episode(EpisodeOutcome::GoalReached);
    }

    /// Charges the one-time wall penalty and paints the agent with its contact color.
    pub fn on_wall_contact_begin(&mut self) {
        if !self.accepts_events("wall enter") {
            return;
        }
        self.rewards
            .add_reward(-self.config.rewards.wall_enter_penalty);
        self.agent.mark_contact();
    }

    /// Charges the sustained wall penalty for `dt` seconds of contact.
    pub fn on_wall_contact_continue(&mut self, dt: f64) {
        if !self.accepts_events("wall stay") {
            return;
        }
        self.rewards
            .add_reward(-self.config.rewards.wall_stay_rate * dt);
    }

    /// Restores the agent's default color.
    pub fn on_wall_contact_end(&mut self) {
        if !self.accepts_events("wall exit") {
            return;
        }
        self.agent.clear_contact();
    }

    /// Dispatches a host collision event.
    pub fn on_collision(&mut self, collision: Collision) {
        match collision {
            Collision::WallEnter => self.on_wall_contact_begin(),
            Collision::WallStay(dt) => self.on_wall_contact_continue(dt),
            Collision::WallExit => self.on_wall_contact_end(),
            Collision::GoalEnter => self.on_goal_reached(),
        }
    }

    /// Advances the ground flash by `dt`; returns the ground color, if there is a ground.
    pub fn tick_feedback(&mut self, dt: f64) -> Option<Color> {
        self.feedback.as_mut().map(|animator| animator.tick(dt))
    }

    /// The single exit of an episode; begins the next one.
    fn end_episode(&mut self, outcome: EpisodeOutcome) {
        self.state.phase = Phase::Terminated;
        let summary = EpisodeSummary {
            episode_index: self.state.episode_index,
            steps: self.state.step_count,
            cumulative_reward: self.rewards.total(),
            outcome,
        };
        info!(
            episode = summary.episode_index,
            steps = summary.steps,
            reward = summary.cumulative_reward,
            %outcome,
            "episode end"
        );
        self.last_episode = Some(summary);
        self.begin_episode();
    }

    fn accepts_events(&self, event: &str) -> bool {
        let running = self.state.phase == Phase::Running;
        if !running {
            warn!(event, phase = ?self.state.phase, "ignoring event outside a running episode");
        }
        running
    }

    fn step_penalty(&self) -> f64 {
        -self.config.rewards.step_penalty / f64::from(self.state.step_budget)
    }

    /// The observation of the current world state.
    pub fn observe(&self) -> Observation {
        self.encoder.encode(&self.agent.pose(), &self.goal.pose())
    }

    /// Corrects the agent's position after the host's physics resolved a collision.
    pub fn correct_agent_position(&mut self, position: Point) {
        self.agent.set_pos(position);
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn episode_index(&self) -> u64 {
        self.state.episode_index
    }

    pub fn step_count(&self) -> u32 {
        self.state.step_count
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.rewards.total()
    }

    /// Summary of the most recently finished episode.
    pub fn last_episode(&self) -> Option<&EpisodeSummary> {
        self.last_episode.as_ref()
    }

    pub fn agent_pose(&self) -> Pose {
        self.agent.pose()
    }

    pub fn goal_pose(&self) -> Pose {
        self.goal.pose()
    }

    pub fn agent_color(&self) -> Color {
        self.agent.color()
    }

    /// The ground color to paint; `None` when the host has no ground.
    pub fn ground_color(&self) -> Option<Color> {
        self.feedback.as_ref().map(GroundFeedbackAnimator::color)
    }

    /// Whether a ground flash is still fading.
    pub fn is_flashing(&self) -> bool {
        self.feedback
            .as_ref()
            .map_or(false, |animator| !animator.is_complete())
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Read-only snapshot for a debug overlay.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            episode_index: self.state.episode_index,
            step_count: self.state.step_count,
            cumulative_reward: self.rewards.total(),
        }
    }
}

impl<P: GoalPlacer> EpisodicAgent for EpisodeController<P> {
    fn initialize(&mut self, ground_color: Option<Color>) {
        Self::initialize(self, ground_color);
    }

    fn begin_episode(&mut self) {
        Self::begin_episode(self);
    }

    fn step(&mut self, action: Action) -> Observation {
        Self::step(self, action)
    }

    fn on_collision(&mut self, collision: Collision) {
        Self::on_collision(self, collision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::FixedGoalPlacer;

    const EPS: f64 = 1e-9;

    fn controller(budget: u32) -> EpisodeController<FixedGoalPlacer> {
        let config = TurtleConfig::default().with_step_budget(budget);
        let placer = FixedGoalPlacer::new(vec![Point::new(2.5, 0.25, 0.0)]);
        let mut c = EpisodeController::new(config, placer);
        c.initialize(Some(Color::GRAY));
        c
    }

    fn running(budget: u32) -> EpisodeController<FixedGoalPlacer> {
        let mut c = controller(budget);
        c.begin_episode();
        c
    }

    #[test]
    fn starts_initializing() {
        let c = EpisodeController::new(TurtleConfig::default(), FixedGoalPlacer::new(vec![]));
        assert_eq!(c.phase(), Phase::Initializing);
        assert_eq!(c.episode_index(), 0);
        assert_eq!(c.cumulative_reward(), 0.0);
    }

    #[test]
    fn begin_episode_establishes_running() {
        let c = running(10);
        assert_eq!(c.phase(), Phase::Running);
        assert_eq!(c.episode_index(), 1);
        assert_eq!(c.step_count(), 0);
        assert_eq!(c.cumulative_reward(), 0.0);
        assert_eq!(c.agent_pose().position, Point::new(0.0, 0.15, 0.0));
        assert_eq!(c.agent_pose().heading_degrees, 0.0);
        assert_eq!(c.goal_pose().position, Point::new(2.5, 0.25, 0.0));
    }

    #[test]
    fn first_observation_matches_scripted_layout() {
        let c = running(10);
        assert_eq!(c.observe().as_slice(), &[0.5, 0.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn step_charges_budget_scaled_penalty() {
        let mut c = running(4);
        c.step(Action::Noop);
        assert!((c.cumulative_reward() + 0.5).abs() < EPS);
        assert_eq!(c.step_count(), 1);
    }

    #[test]
    fn exhausted_budget_times_out_at_minus_two() {
        let mut c = running(7);
        for _ in 0..7 {
            c.step(Action::Noop);
        }
        let summary = c.last_episode().copied().unwrap();
        assert_eq!(summary.outcome, EpisodeOutcome::Timeout);
        assert_eq!(summary.steps, 7);
        assert_eq!(summary.episode_index, 1);
        assert!((summary.cumulative_reward + 2.0).abs() < EPS);
        // next episode already running
        assert_eq!(c.episode_index(), 2);
        assert_eq!(c.step_count(), 0);
        assert_eq!(c.cumulative_reward(), 0.0);
        assert_eq!(c.phase(), Phase::Running);
    }

    #[test]
    fn goal_reached_ends_episode_with_bonus() {
        let mut c = running(10);
        for _ in 0..3 {
            c.step(Action::Forward);
        }
        c.on_goal_reached();
        let summary = c.last_episode().copied().unwrap();
        assert_eq!(summary.outcome, EpisodeOutcome::GoalReached);
        assert_eq!(summary.steps, 3);
        assert!((summary.cumulative_reward - (1.0 - 2.0 * 3.0 / 10.0)).abs() < EPS);
        assert_eq!(c.episode_index(), 2);
        assert_eq!(c.cumulative_reward(), 0.0);
    }

    #[test]
    fn winning_episode_flashes_green() {
        let mut c = running(10);
        c.on_goal_reached();
        assert_eq!(c.ground_color(), Some(Color::GREEN));
        assert!(c.is_flashing());
    }

    #[test]
    fn losing_episode_flashes_red() {
        let mut c = running(2);
        c.step(Action::Noop);
        c.step(Action::Noop);
        assert_eq!(c.ground_color(), Some(Color::RED));
    }

    #[test]
    fn first_episode_does_not_flash() {
        let c = running(10);
        assert_eq!(c.ground_color(), Some(Color::GRAY));
        assert!(!c.is_flashing());
    }

    #[test]
    fn flash_fades_back_to_ground() {
        let mut c = running(10);
        c.on_goal_reached();
        let mid = c.tick_feedback(1.5).unwrap();
        assert_ne!(mid, Color::GREEN);
        assert_ne!(mid, Color::GRAY);
        assert_eq!(c.tick_feedback(1.5), Some(Color::GRAY));
        assert!(!c.is_flashing());
    }

    #[test]
    fn new_flash_replaces_running_flash() {
        let mut c = running(1);
        c.on_goal_reached();
        c.tick_feedback(0.5);
        // single-step budget: one noop times out with a negative total
        c.step(Action::Noop);
        assert_eq!(c.tick_feedback(0.0), Some(Color::RED));
    }

    #[test]
    fn no_ground_means_no_flash() {
        let config = TurtleConfig::default().with_step_budget(5);
        let mut c = EpisodeController::new(config, FixedGoalPlacer::new(vec![]));
        c.initialize(None);
        c.begin_episode();
        c.on_goal_reached();
        assert_eq!(c.ground_color(), None);
        assert_eq!(c.tick_feedback(0.1), None);
        assert!(!c.is_flashing());
    }

    #[test]
    fn wall_contact_penalties_and_color() {
        let mut c = running(10);
        c.on_wall_contact_begin();
        assert_eq!(c.agent_color(), Color::RED);
        assert!((c.cumulative_reward() + 0.05).abs() < EPS);
        c.on_wall_contact_continue(0.5);
        assert!((c.cumulative_reward() + 0.055).abs() < EPS);
        c.on_wall_contact_end();
        assert_eq!(c.agent_color(), Color::BLUE);
    }

    #[test]
    fn begin_episode_restores_body_color() {
        let mut c = running(10);
        c.on_collision(Collision::WallEnter);
        c.on_collision(Collision::GoalEnter);
        assert_eq!(c.agent_color(), Color::BLUE);
    }

    #[test]
    fn collisions_before_first_episode_are_ignored() {
        let mut c = controller(10);
        c.on_collision(Collision::WallEnter);
        c.on_collision(Collision::GoalEnter);
        assert_eq!(c.episode_index(), 0);
        assert_eq!(c.cumulative_reward(), 0.0);
        assert_eq!(c.last_episode(), None);
    }

    #[test]
    #[should_panic(expected = "step called with no running episode")]
    fn step_before_begin_panics() {
        let mut c = controller(10);
        c.step(Action::Forward);
    }

    #[test]
    #[should_panic(expected = "initialize called twice")]
    fn double_initialize_panics() {
        let mut c = controller(10);
        c.initialize(None);
    }

    #[test]
    #[should_panic(expected = "begin_episode called before initialize")]
    fn begin_before_initialize_panics() {
        let mut c = EpisodeController::new(TurtleConfig::default(), FixedGoalPlacer::new(vec![]));
        c.begin_episode();
    }

    #[test]
    fn step_moves_agent_forward() {
        let mut c = running(10);
        let obs = c.step(Action::Forward);
        assert!((c.agent_pose().position.z - 0.03).abs() < EPS);
        assert!((obs[3] - 0.006).abs() < EPS);
    }

    #[test]
    fn correction_moves_agent() {
        let mut c = running(10);
        c.correct_agent_position(Point::new(1.0, 0.15, -1.0));
        assert_eq!(c.agent_pose().position, Point::new(1.0, 0.15, -1.0));
    }

    #[test]
    fn telemetry_reflects_counters() {
        let mut c = running(10);
        c.step(Action::Noop);
        c.step(Action::Noop);
        let t = c.telemetry();
        assert_eq!(t.episode_index, 1);
        assert_eq!(t.step_count, 2);
        assert!((t.cumulative_reward + 0.4).abs() < EPS);
    }

    #[test]
    fn trait_surface_drives_controller() {
        fn drive<A: EpisodicAgent>(agent: &mut A) -> Observation {
            agent.initialize(Some(Color::GRAY));
            agent.begin_episode();
            agent.on_collision(Collision::WallStay(1.0));
            agent.step(Action::RotateRight)
        }
        let config = TurtleConfig::default().with_step_budget(10);
        let mut c = EpisodeController::new(config, FixedGoalPlacer::new(vec![Point::new(2.5, 0.25, 0.0)]));
        let obs = drive(&mut c);
        assert!((obs[4] - ((3.6 / 360.0) * 2.0 - 1.0)).abs() < EPS);
        assert!((c.cumulative_reward() + 0.01 + 0.2).abs() < EPS);
    }
}
