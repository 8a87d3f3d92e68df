/// Trait for types that can be animated by interpolating between values
///
/// Structs made of animatable fields can derive it with
/// `#[derive(Animatable)]`.
pub trait Animatable: Clone + PartialEq + Send + Sync + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    /// t can exceed [0, 1] range for overshoot effects
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for (f32, f32) {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        (
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
        )
    }
}

impl<const N: usize> Animatable for [f32; N] {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        let mut out = *from;
        for (i, value) in out.iter_mut().enumerate() {
            *value += (to[i] - from[i]) * t;
        }
        out
    }
}
