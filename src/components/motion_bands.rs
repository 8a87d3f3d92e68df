use std::rc::Rc;

use log::debug;

use super::{conceal, follow, power3, reveal, Component, SectionTitle};
use crate::animation::animate;
use crate::config::MotionConfig;
use crate::input::{Anchor, Edge, RegionEnd, ScrollTrigger, Scrub, TriggerRegion};
use crate::lifecycle::{mount, Teardown};
use crate::mapper::{Mapper, ParallaxMapper};
use crate::property::Property;
use crate::surface::SurfaceId;

/// Stacked bands that reveal in sequence and then drift apart at different
/// depths while the section is pinned.
#[derive(Clone, Debug)]
pub struct MotionBands {
    pub wrapper: SurfaceId,
    pub title: Option<SurfaceId>,
    pub bands: Vec<SurfaceId>,
    pub motion: MotionConfig,
}

/// Scrolling the pinned section is held for.
const PIN_DISTANCE: f32 = 400.0;

impl MotionBands {
    fn reveal_in_sequence(&self, wrapper: SurfaceId) {
        for &band in &self.bands {
            conceal(band, 40.0);
        }
        let bands: Rc<[SurfaceId]> = self.bands.clone().into();
        ScrollTrigger::new(
            wrapper,
            TriggerRegion::new(
                Anchor::new(Edge::Top, Edge::Percent(80.0)),
                RegionEnd::Anchor(Anchor::new(Edge::Bottom, Edge::Top)),
            ),
        )
        .once(true)
        .on_enter(move || {
            for (index, &band) in bands.iter().enumerate() {
                reveal(band, power3(800.0).delay(index as f32 * 120.0));
            }
        })
        .create();
    }

    fn drift_while_pinned(&self, wrapper: SurfaceId) {
        let mapper = ParallaxMapper {
            depth_unit: self.motion.band_depth,
            amplitude: self.motion.parallax_amplitude,
        };
        let follow_ms = self.motion.scrub_follow_ms;
        let bands: Rc<[SurfaceId]> = self.bands.clone().into();
        ScrollTrigger::new(
            wrapper,
            TriggerRegion::new(
                Anchor::new(Edge::Top, Edge::Center),
                RegionEnd::Relative(PIN_DISTANCE),
            ),
        )
        .scrub(Scrub::Immediate)
        .pin(true)
        .on_update(move |progress| {
            for (index, &band) in bands.iter().enumerate() {
                animate(
                    band,
                    Property::TranslateY,
                    mapper.map((index, progress)),
                    follow(follow_ms),
                );
            }
        })
        .create();
    }
}

impl Component for MotionBands {
    fn mount(&self) -> Teardown {
        mount(Some(self.wrapper), |wrapper| {
            debug!("motion bands mounted with {} bands", self.bands.len());
            if let Some(title) = self.title {
                // Owned by this mount
                SectionTitle::new(title).mount();
            }
            self.reveal_in_sequence(wrapper);
            self.drift_while_pinned(wrapper);
        })
    }
}
