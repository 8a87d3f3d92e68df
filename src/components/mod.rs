//! The site's animated sections.
//!
//! Each component knows the surfaces it animates and wires them to the
//! pipeline inside its own mount, so one [`Teardown`] releases everything it
//! created.

mod hero;
mod model_reveal;
mod motion_bands;
mod parallax_scene;
mod particle_backdrop;
mod project_grid;
mod section_title;
mod stats_strip;

use std::rc::Rc;

pub use hero::Hero;
pub use model_reveal::ModelReveal;
pub use motion_bands::MotionBands;
pub use parallax_scene::ParallaxScene;
pub use particle_backdrop::ParticleBackdrop;
pub use project_grid::ProjectGrid;
pub use section_title::SectionTitle;
pub use stats_strip::StatsStrip;

use crate::animation::{self, TimingFunction, Transition};
use crate::lifecycle::Teardown;
use crate::property::Property;
use crate::scene3d::Renderer;
use crate::surface::SurfaceId;

/// Something that can be mounted onto the page.
pub trait Component {
    fn mount(&self) -> Teardown;
}

/// Creates a fresh renderer for each 3D scene mount.
pub type RendererFactory = Rc<dyn Fn() -> Box<dyn Renderer>>;

/// Cubic ease-out over `ms`, the default for entrances.
pub(crate) fn power3(ms: f32) -> Transition {
    Transition::new(ms, TimingFunction::EaseOutCubic)
}

pub(crate) fn elastic(ms: f32, amplitude: f32, period: f32) -> Transition {
    Transition::new(ms, TimingFunction::elastic_out(amplitude, period))
}

/// Linear catch-up toward a scroll-linked target.
pub(crate) fn follow(ms: f32) -> Transition {
    Transition::new(ms, TimingFunction::Linear)
}

/// Fade in from transparent while rising `rise` pixels into place.
pub(crate) fn fade_rise_from(target: SurfaceId, rise: f32, transition: Transition) {
    animation::animate_from(target, Property::Opacity, 0.0, transition.clone());
    animation::animate_from(target, Property::TranslateY, rise, transition);
}

/// Hide `target` below its resting place until [`reveal`] runs.
pub(crate) fn conceal(target: SurfaceId, rise: f32) {
    animation::set_value(target, Property::Opacity, 0.0);
    animation::set_value(target, Property::TranslateY, rise);
}

/// Undo [`conceal`].
pub(crate) fn reveal(target: SurfaceId, transition: Transition) {
    animation::animate(target, Property::Opacity, 1.0, transition.clone());
    animation::animate(target, Property::TranslateY, 0.0, transition);
}
