mod animatable;
pub mod driver;
mod follow;
mod state;
mod timing;

pub use animatable::Animatable;
pub use driver::{
    active_count, active_on, animate, animate_from, animate_from_to, cancel, endpoints, is_active,
    set_value, tick, TransitionHandle,
};
pub use follow::Follower;
pub use state::{AdvanceResult, AnimationState};
pub use timing::TimingFunction;

/// How many extra times a transition plays after its first run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Play once
    #[default]
    Never,
    /// Play `n` more times after the first run
    Count(u32),
    /// Loop until cancelled
    Forever,
}

/// Configuration for how a property should animate when it changes
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of one run in milliseconds
    pub duration_ms: f32,
    /// Timing function controlling the animation curve
    pub timing: TimingFunction,
    /// Delay before animation starts in milliseconds
    pub delay_ms: f32,
    /// Extra runs after the first
    pub repeat: Repeat,
    /// Alternate direction on every repeat
    pub yoyo: bool,
    /// Round written values to a multiple of this step
    pub snap: Option<f32>,
}

impl Transition {
    /// Create a new transition with the given duration and timing function
    pub fn new(duration_ms: f32, timing: TimingFunction) -> Self {
        Self {
            duration_ms,
            timing,
            delay_ms: 0.0,
            repeat: Repeat::Never,
            yoyo: false,
            snap: None,
        }
    }

    /// Set the delay before the animation starts
    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the duration of the animation
    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the timing function
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Loop until cancelled
    pub fn forever(self) -> Self {
        self.repeat(Repeat::Forever)
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn snap(mut self, step: f32) -> Self {
        self.snap = Some(step);
        self
    }

    /// Whether this transition never finishes on its own
    pub fn is_looping(&self) -> bool {
        self.repeat == Repeat::Forever
    }
}

impl Default for Transition {
    /// Half a second with a gentle ease-out
    fn default() -> Self {
        Self::new(500.0, TimingFunction::EaseOut)
    }
}
