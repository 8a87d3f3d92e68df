use super::Animatable;

/// Frame-stepped damping toward a moving target.
///
/// Each [`step`](Follower::step) closes a fixed fraction of the remaining
/// distance, which is how the camera eases toward the pointer in the 3D
/// scenes. It never overshoots for factors in `(0, 1]`.
#[derive(Clone, Debug)]
pub struct Follower<T: Animatable> {
    current: T,
    target: T,
    factor: f32,
}

impl<T: Animatable> Follower<T> {
    /// `factor` is clamped to `[0, 1]`; 0 never moves, 1 jumps on the next step.
    pub fn new(value: T, factor: f32) -> Self {
        Self {
            target: value.clone(),
            current: value,
            factor: if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    /// Move one frame toward the target and return the new value.
    pub fn step(&mut self) -> &T {
        self.current = T::lerp(&self.current, &self.target, self.factor);
        &self.current
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Jump straight to `value` and stop moving.
    pub fn reset(&mut self, value: T) {
        self.current = value.clone();
        self.target = value;
    }
}
