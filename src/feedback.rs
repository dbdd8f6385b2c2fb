//! Ground color flash signalling how the previous episode ended.
//!
//! The flash runs across many ticks: the host calls [`GroundFeedbackAnimator::tick()`] once per
//! simulation tick and paints the returned color. Nothing here blocks or schedules work on its
//! own, so starting an episode never waits on the animation.

use super::color::Color;
use tracing::debug;

/// A single fade from `target` back to `base`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlashTask {
    target: Color,
    base: Color,
    elapsed: f64,
    duration: f64,
}

impl FlashTask {
    /// Constructs a task that has not advanced yet.
    pub fn new(target: Color, base: Color, duration: f64) -> Self {
        FlashTask {
            target,
            base,
            elapsed: 0.0,
            duration,
        }
    }

    /// Advances elapsed time by `dt` and returns the blended color.
    pub fn advance(&mut self, dt: f64) -> Color {
        self.elapsed += dt.max(0.0);
        self.color()
    }

    /// The blend of target and base for the current elapsed time.
    pub fn color(&self) -> Color {
        if self.is_complete() {
            self.base
        } else {
            self.target.lerp(&self.base, self.elapsed / self.duration)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn target(&self) -> Color {
        self.target
    }
}

/// Runs at most one [`FlashTask`] at a time.
///
/// Starting a task replaces whatever task is in flight; the old one is dropped, never blended.
#[derive(Clone, Debug)]
pub struct GroundFeedbackAnimator {
    task: Option<FlashTask>,
    current: Color,
}

impl GroundFeedbackAnimator {
    /// Constructs an idle animator showing `base`.
    pub fn new(base: Color) -> Self {
        GroundFeedbackAnimator {
            task: None,
            current: base,
        }
    }

    /// Starts fading from `target` to `base` over `duration` seconds.
    ///
    /// A non-positive duration snaps straight to `base`.
    pub fn start(&mut self, target: Color, base: Color, duration: f64) {
        if let Some(old) = self.task.take() {
            debug!(elapsed = old.elapsed(), "superseding in-flight ground flash");
        }
        let task = FlashTask::new(target, base, duration);
        if task.is_complete() {
            self.current = base;
        } else {
            debug!(?target, duration, "starting ground flash");
            self.current = task.color();
            self.task = Some(task);
        }
    }

    /// Advances the running task by `dt` and returns the color to paint.
    ///
    /// Once the task completes this keeps returning the base color.
    pub fn tick(&mut self, dt: f64) -> Color {
        if let Some(task) = self.task.as_mut() {
            self.current = task.advance(dt);
            if task.is_complete() {
                self.task = None;
            }
        }
        self.current
    }

    /// The color produced by the latest `start` or `tick`.
    pub fn color(&self) -> Color {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.task.is_none()
    }

    /// Drops the running task, leaving the ground on its current color.
    pub fn cancel(&mut self) {
        self.task = None;
    }
}
