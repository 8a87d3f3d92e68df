use std::time::Duration;

use super::{Animatable, Repeat, Transition};

/// Result of advancing an animation, indicating whether the value changed
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceResult<T> {
    /// Value did not change (animation waiting on its delay or same value)
    NoChange,
    /// Value changed to a new value
    Changed(T),
}

impl<T> AdvanceResult<T> {
    /// Returns true if the value changed
    pub fn is_changed(&self) -> bool {
        matches!(self, AdvanceResult::Changed(_))
    }
}

/// Interpolation of one value from a start to an end over time.
///
/// Time is supplied by the caller on every call, so the state is fully
/// deterministic: the same sequence of timestamps always produces the same
/// sequence of values.
pub struct AnimationState<T: Animatable> {
    /// Current interpolated value
    current: T,
    /// Value when animation started
    start: T,
    /// Value the animation heads to
    target: T,
    /// Time when animation was created
    start_time: Duration,
    /// Transition configuration, fixed for the lifetime of the state
    transition: Transition,
    /// Set once the last run has completed
    finished: bool,
}

impl<T: Animatable> AnimationState<T> {
    pub fn new(start: T, target: T, transition: Transition, now: Duration) -> Self {
        Self {
            current: start.clone(),
            start,
            target,
            start_time: now,
            transition,
            finished: false,
        }
    }

    /// Value at time `now`, and whether the animation is complete at that time.
    pub fn sample(&self, now: Duration) -> (T, bool) {
        let elapsed_ms = (now.saturating_sub(self.start_time).as_secs_f64() * 1000.0) as f32;
        let active_ms = elapsed_ms - self.transition.delay_ms;

        if active_ms < 0.0 {
            // Still in delay period
            return (self.start.clone(), false);
        }

        let duration = self.transition.duration_ms;
        if duration <= 0.0 {
            return (self.target.clone(), true);
        }

        let iteration = (active_ms / duration).floor();
        let runs = match self.transition.repeat {
            Repeat::Never => Some(1.0),
            Repeat::Count(n) => Some(n as f32 + 1.0),
            Repeat::Forever => None,
        };

        if let Some(runs) = runs {
            if iteration >= runs {
                let last_reversed = self.transition.yoyo && (runs as u32 - 1) % 2 == 1;
                let value = if last_reversed {
                    self.start.clone()
                } else {
                    self.target.clone()
                };
                return (value, true);
            }
        }

        let local = (active_ms - iteration * duration) / duration;
        let reversed = self.transition.yoyo && (iteration as u64) % 2 == 1;
        let t = if reversed { 1.0 - local } else { local };
        let eased = self.transition.timing.evaluate(t);
        (T::lerp(&self.start, &self.target, eased), false)
    }

    /// Advance the animation to `now` and return whether the value changed
    pub fn advance(&mut self, now: Duration) -> AdvanceResult<T> {
        if self.finished {
            return AdvanceResult::NoChange;
        }

        let (value, finished) = self.sample(now);
        self.finished = finished;

        if value != self.current {
            self.current = value.clone();
            AdvanceResult::Changed(value)
        } else {
            AdvanceResult::NoChange
        }
    }

    /// Check if animation is still running
    pub fn is_animating(&self) -> bool {
        !self.finished
    }

    /// Get current value
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Get start value
    pub fn start(&self) -> &T {
        &self.start
    }

    /// Get target value
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }
}
