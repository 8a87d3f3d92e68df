//! Animatable properties of a presentation surface.
//!
//! Every surface carries one `f32` slot per [`Property`]. Which properties are
//! currently driven by a transition is tracked as a [`PropertySet`].

use bitflags::bitflags;

bitflags! {
    /// Set of properties, used to record what a surface currently animates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PropertySet: u16 {
        const TRANSLATE_X = 1 << 0;
        const TRANSLATE_Y = 1 << 1;
        const TRANSLATE_Z = 1 << 2;
        const ROTATE_X = 1 << 3;
        const ROTATE_Y = 1 << 4;
        const ROTATE_Z = 1 << 5;
        const SCALE = 1 << 6;
        const OPACITY = 1 << 7;
        const PARALLAX_SHIFT = 1 << 8;
        const PIN_OFFSET = 1 << 9;
        const COUNTER = 1 << 10;
    }
}

/// A single numeric property of a surface.
///
/// Units are up to the consumer: DOM-style surfaces use pixels and degrees,
/// 3D scene nodes use world units and radians.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
    Scale,
    Opacity,
    /// Custom property read by the view layer (the hero glow offset).
    ParallaxShift,
    /// Offset applied while a pinned scroll region is active.
    PinOffset,
    /// Numeric text content, e.g. an animated statistic.
    Counter,
}

impl Property {
    pub const COUNT: usize = 11;

    pub const ALL: [Property; Self::COUNT] = [
        Property::TranslateX,
        Property::TranslateY,
        Property::TranslateZ,
        Property::RotateX,
        Property::RotateY,
        Property::RotateZ,
        Property::Scale,
        Property::Opacity,
        Property::ParallaxShift,
        Property::PinOffset,
        Property::Counter,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn flag(self) -> PropertySet {
        PropertySet::from_bits_truncate(1 << self.index())
    }

    /// Value a freshly created surface holds for this property.
    pub fn initial(self) -> f32 {
        match self {
            Property::Scale | Property::Opacity => 1.0,
            _ => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::TranslateX => "translate-x",
            Property::TranslateY => "translate-y",
            Property::TranslateZ => "translate-z",
            Property::RotateX => "rotate-x",
            Property::RotateY => "rotate-y",
            Property::RotateZ => "rotate-z",
            Property::Scale => "scale",
            Property::Opacity => "opacity",
            Property::ParallaxShift => "parallax-shift",
            Property::PinOffset => "pin-offset",
            Property::Counter => "counter",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
