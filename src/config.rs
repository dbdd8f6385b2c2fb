//! Host-supplied constants.
//!
//! Every field has a default, so an empty TOML document yields [`TurtleConfig::default()`].

use crate::{color::Color, error::ConfigError};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

const fn default_step_budget() -> u32 {
    1000
}
const fn default_tick_dt() -> f64 {
    0.02
}
const fn default_move_speed() -> f64 {
    1.5
}
const fn default_rotation_speed() -> f64 {
    180.0
}
const fn default_spawn_height() -> f64 {
    0.15
}
const fn default_goal_height() -> f64 {
    0.25
}
const fn default_world_half_extent() -> f64 {
    5.0
}
const fn default_goal_distance() -> [f64; 2] {
    [1.0, 2.5]
}

/// Configuration for the agent, its episodes and the arena around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Steps per episode before it times out.
    #[serde(default = "default_step_budget")]
    pub step_budget: u32,

    /// Simulated seconds covered by one decision step.
    #[serde(default = "default_tick_dt")]
    pub tick_dt: f64,

    /// Forward speed, in units per second.
    #[serde(default = "default_move_speed")]
    pub move_speed: f64,

    /// Turning speed, in degrees per second.
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f64,

    #[serde(default = "default_spawn_height")]
    pub spawn_height: f64,

    #[serde(default = "default_goal_height")]
    pub goal_height: f64,

    /// Half the side length of the square floor. Positions are normalized by this value.
    #[serde(default = "default_world_half_extent")]
    pub world_half_extent: f64,

    /// Inclusive `[min, max]` distance of the goal from the spawn point.
    #[serde(default = "default_goal_distance")]
    pub goal_distance: [f64; 2],

    /// Seed for goal placement. Drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub rewards: RewardConfig,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    #[serde(default)]
    pub body: BodyConfig,

    #[serde(default)]
    pub arena: ArenaConfig,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        TurtleConfig {
            step_budget: default_step_budget(),
            tick_dt: default_tick_dt(),
            move_speed: default_move_speed(),
            rotation_speed: default_rotation_speed(),
            spawn_height: default_spawn_height(),
            goal_height: default_goal_height(),
            world_half_extent: default_world_half_extent(),
            goal_distance: default_goal_distance(),
            seed: None,
            rewards: RewardConfig::default(),
            feedback: FeedbackConfig::default(),
            body: BodyConfig::default(),
            arena: ArenaConfig::default(),
        }
    }
}

impl TurtleConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: TurtleConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: set the step budget.
    pub fn with_step_budget(mut self, step_budget: u32) -> Self {
        self.step_budget = step_budget;
        self
    }

    /// Builder: set the goal placement seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects values that would break the episode invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_budget == 0 {
            return Err(ConfigError::invalid("step_budget", "must be > 0"));
        }
        positive("tick_dt", self.tick_dt)?;
        positive("world_half_extent", self.world_half_extent)?;
        non_negative("move_speed", self.move_speed)?;
        non_negative("rotation_speed", self.rotation_speed)?;
        let [min, max] = self.goal_distance;
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(ConfigError::invalid(
                "goal_distance",
                format!("expected 0 <= min <= max, got [{}, {}]", min, max),
            ));
        }
        non_negative("rewards.wall_stay_rate", self.rewards.wall_stay_rate)?;
        non_negative("arena.agent_radius", self.arena.agent_radius)?;
        positive("arena.goal_radius", self.arena.goal_radius)?;
        if self.arena.agent_radius >= self.world_half_extent {
            return Err(ConfigError::invalid(
                "arena.agent_radius",
                "must be smaller than world_half_extent",
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} (must be > 0)", value)))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} (must be >= 0)", value)))
    }
}

/// Reward shaping constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Total penalty of an episode that uses its whole step budget; each step costs
    /// `step_penalty / step_budget`.
    pub step_penalty: f64,
    /// Terminal reward for reaching the goal.
    pub goal_bonus: f64,
    /// One-time penalty when wall contact begins.
    pub wall_enter_penalty: f64,
    /// Penalty per second of sustained wall contact.
    pub wall_stay_rate: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        RewardConfig {
            step_penalty: 2.0,
            goal_bonus: 1.0,
            wall_enter_penalty: 0.05,
            wall_stay_rate: 0.01,
        }
    }
}

/// Ground flash shown at the start of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Seconds the flash takes to fade back to the ground's base color.
    pub duration: f64,
    pub win_color: Color,
    pub loss_color: Color,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        FeedbackConfig {
            duration: 3.0,
            win_color: Color::GREEN,
            loss_color: Color::RED,
        }
    }
}

/// Agent body colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub default_color: Color,
    pub contact_color: Color,
}

impl Default for BodyConfig {
    fn default() -> Self {
        BodyConfig {
            default_color: Color::BLUE,
            contact_color: Color::RED,
        }
    }
}

/// Collision geometry used by the headless arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub agent_radius: f64,
    /// Planar distance at which the agent triggers the goal.
    pub goal_radius: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            agent_radius: 0.25,
            goal_radius: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = TurtleConfig::from_toml_str("").unwrap();
        assert_eq!(config, TurtleConfig::default());
    }

    #[test]
    fn defaults_match_host_constants() {
        let c = TurtleConfig::default();
        assert_eq!(c.world_half_extent, 5.0);
        assert_eq!(c.goal_distance, [1.0, 2.5]);
        assert_eq!(c.feedback.duration, 3.0);
        assert_eq!(c.rewards.step_penalty, 2.0);
        assert_eq!(c.rewards.goal_bonus, 1.0);
        assert_eq!(c.rewards.wall_enter_penalty, 0.05);
        assert_eq!(c.rewards.wall_stay_rate, 0.01);
        assert_eq!(c.goal_height, 0.25);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let text = r#"
            step_budget = 250
            seed = 7

            [rewards]
            goal_bonus = 2.0

            [feedback]
            win_color = { r = 0.0, g = 0.5, b = 0.0 }
        "#;
        let c = TurtleConfig::from_toml_str(text).unwrap();
        assert_eq!(c.step_budget, 250);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.rewards.goal_bonus, 2.0);
        assert_eq!(c.rewards.step_penalty, 2.0);
        assert_eq!(c.feedback.win_color, Color::rgb(0.0, 0.5, 0.0));
        assert_eq!(c.feedback.loss_color, Color::RED);
    }

    #[test]
    fn sample_config_file_parses() {
        let c = TurtleConfig::from_toml_str(include_str!("../config/turtle.toml")).unwrap();
        assert_eq!(c.step_budget, 1000);
    }

    #[test]
    fn zero_step_budget_rejected() {
        let err = TurtleConfig::from_toml_str("step_budget = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "step_budget",
                ..
            }
        ));
    }

    #[test]
    fn inverted_goal_distance_rejected() {
        let err = TurtleConfig::from_toml_str("goal_distance = [2.5, 1.0]").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "goal_distance",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_tick_rejected() {
        let c = TurtleConfig {
            tick_dt: 0.0,
            ..TurtleConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = TurtleConfig::from_toml_str("step_budget = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TurtleConfig::load("/nonexistent/turtle.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
