//! Pure mappings from input samples to property targets.
//!
//! Mappers hold only configuration and never touch surfaces; callers feed the
//! output to the animation driver. Identical input and configuration always
//! produce identical output.

use nebula_macros::Animatable;

use crate::input::PointerSample;

/// A pure function from a sample to a visual target.
pub trait Mapper {
    type Input;
    type Output;

    fn map(&self, input: Self::Input) -> Self::Output;
}

/// Rotation pair: degrees on page surfaces, radians on scene nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Animatable)]
pub struct Tilt {
    pub rotate_x: f32,
    pub rotate_y: f32,
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Pointer offset to a 3D tilt toward the pointer.
///
/// The output never exceeds `max_tilt` on either axis, even for a pointer far
/// outside the reference rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltMapper {
    pub max_tilt: f32,
}

impl TiltMapper {
    pub fn new(max_tilt: f32) -> Self {
        Self {
            max_tilt: max_tilt.abs(),
        }
    }
}

impl Mapper for TiltMapper {
    type Input = PointerSample;
    type Output = Tilt;

    fn map(&self, sample: PointerSample) -> Tilt {
        let max = finite_or_zero(self.max_tilt).abs();
        let (nx, ny) = sample.normalized();
        let bound = |value: f32| finite_or_zero(value).clamp(-max, max);
        Tilt {
            rotate_x: bound(-ny * max),
            rotate_y: bound(nx * max),
        }
    }
}

/// Pointer offset to a small translation that pulls toward the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MagneticMapper {
    pub strength: f32,
}

impl Mapper for MagneticMapper {
    type Input = PointerSample;
    type Output = (f32, f32);

    fn map(&self, sample: PointerSample) -> (f32, f32) {
        if self.strength == 0.0 {
            return (0.0, 0.0);
        }
        (
            finite_or_zero(sample.x / self.strength),
            finite_or_zero(sample.y / self.strength),
        )
    }
}

/// Scroll progress to per-layer vertical offsets; deeper layers move more.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxMapper {
    pub depth_unit: f32,
    pub amplitude: f32,
}

impl ParallaxMapper {
    /// Offset of layer `index` (0 is the nearest) at `progress`.
    pub fn offset(&self, index: usize, progress: f32) -> f32 {
        let progress = finite_or_zero(progress).clamp(0.0, 1.0);
        let depth = (index as f32 + 1.0) * self.depth_unit;
        (progress - 0.5) * self.amplitude * depth
    }

    pub fn offsets(&self, layers: usize, progress: f32) -> Vec<f32> {
        (0..layers).map(|i| self.offset(i, progress)).collect()
    }
}

impl Mapper for ParallaxMapper {
    type Input = (usize, f32);
    type Output = f32;

    fn map(&self, (index, progress): (usize, f32)) -> f32 {
        self.offset(index, progress)
    }
}

/// Progress scaled by a gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearMapper {
    pub gain: f32,
}

impl Mapper for LinearMapper {
    type Input = f32;
    type Output = f32;

    fn map(&self, progress: f32) -> f32 {
        finite_or_zero(progress).clamp(0.0, 1.0) * self.gain
    }
}

/// Progress to a value between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeMapper {
    pub from: f32,
    pub to: f32,
}

impl RangeMapper {
    pub fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    /// A range starting at `from` and moving `by` further.
    pub fn relative(from: f32, by: f32) -> Self {
        Self::new(from, from + by)
    }
}

impl Mapper for RangeMapper {
    type Input = f32;
    type Output = f32;

    fn map(&self, progress: f32) -> f32 {
        let progress = finite_or_zero(progress).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * progress
    }
}

/// Viewport-normalised pointer to a rotation target for damped follow.
///
/// `gain` is per axis: horizontal pointer movement turns around the y axis,
/// vertical movement around the x axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerFollowMapper {
    pub gain_x: f32,
    pub gain_y: f32,
}

impl PointerFollowMapper {
    pub fn new(gain_x: f32, gain_y: f32) -> Self {
        Self { gain_x, gain_y }
    }

    pub fn uniform(gain: f32) -> Self {
        Self::new(gain, gain)
    }
}

impl Mapper for PointerFollowMapper {
    type Input = PointerSample;
    type Output = Tilt;

    fn map(&self, sample: PointerSample) -> Tilt {
        let (nx, ny) = sample.normalized();
        Tilt {
            rotate_x: finite_or_zero(ny.clamp(-1.0, 1.0) * self.gain_y),
            rotate_y: finite_or_zero(nx.clamp(-1.0, 1.0) * self.gain_x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn sample(x: f32, y: f32) -> PointerSample {
        PointerSample::relative_to(Rect::new(0.0, 0.0, 200.0, 100.0), 100.0 + x, 50.0 + y)
    }

    #[test]
    fn test_tilt_follows_pointer() {
        let tilt = TiltMapper::new(12.0).map(sample(50.0, 25.0));
        assert_eq!(tilt, Tilt { rotate_x: -6.0, rotate_y: 6.0 });
    }

    #[test]
    fn test_tilt_is_bounded() {
        let mapper = TiltMapper::new(12.0);
        for (x, y) in [(1e6, -1e6), (-5000.0, 3.0), (f32::INFINITY, f32::NAN)] {
            let tilt = mapper.map(sample(x, y));
            assert!(tilt.rotate_x.abs() <= 12.0, "{:?}", tilt);
            assert!(tilt.rotate_y.abs() <= 12.0, "{:?}", tilt);
        }
    }

    #[test]
    fn test_tilt_tolerates_bad_bound() {
        let flipped = TiltMapper { max_tilt: -12.0 }.map(sample(50.0, 25.0));
        assert_eq!(flipped, Tilt { rotate_x: -6.0, rotate_y: 6.0 });

        let tilt = TiltMapper { max_tilt: f32::NAN }.map(sample(50.0, 25.0));
        assert_eq!(tilt, Tilt::default());
    }

    #[test]
    fn test_magnetic_offset() {
        let mapper = MagneticMapper { strength: 20.0 };
        assert_eq!(mapper.map(sample(40.0, -20.0)), (2.0, -1.0));
    }

    #[test]
    fn test_parallax_layers() {
        let mapper = ParallaxMapper {
            depth_unit: 0.18,
            amplitude: 120.0,
        };
        let offsets = mapper.offsets(3, 1.0);
        for (offset, expected) in offsets.iter().zip([10.8, 21.6, 32.4]) {
            assert!((offset - expected).abs() < 1e-4, "{} vs {}", offset, expected);
        }
        assert_eq!(mapper.offset(2, 0.5), 0.0);
        assert_eq!(mapper.offset(0, 7.0), mapper.offset(0, 1.0));
    }

    #[test]
    fn test_linear_and_range() {
        assert_eq!(LinearMapper { gain: 90.0 }.map(0.5), 45.0);
        assert_eq!(RangeMapper::new(6.0, 3.0).map(1.0), 3.0);
        assert_eq!(RangeMapper::relative(1.0, 5.0).map(0.5), 3.5);
    }

    #[test]
    fn test_pointer_follow_uses_axis_gains() {
        let mapper = PointerFollowMapper::new(0.4, 0.12);
        let tilt = mapper.map(sample(100.0, -50.0));
        assert!((tilt.rotate_y - 0.4).abs() < 1e-6);
        assert!((tilt.rotate_x + 0.12).abs() < 1e-6);
    }
}
