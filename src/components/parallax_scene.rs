use log::debug;

use super::{conceal, follow, power3, reveal, Component, SectionTitle};
use crate::animation::animate;
use crate::config::MotionConfig;
use crate::input::{Anchor, Edge, RegionEnd, ScrollTrigger, Scrub, TriggerRegion};
use crate::lifecycle::{mount, Teardown};
use crate::mapper::{Mapper, ParallaxMapper};
use crate::property::Property;
use crate::surface::SurfaceId;

/// Bands that each reveal on their own and move at their own depth while the
/// section crosses the viewport.
#[derive(Clone, Debug)]
pub struct ParallaxScene {
    pub section: SurfaceId,
    pub title: Option<SurfaceId>,
    pub bands: Vec<SurfaceId>,
    pub motion: MotionConfig,
}

impl Component for ParallaxScene {
    fn mount(&self) -> Teardown {
        mount(Some(self.section), |section| {
            debug!("parallax scene mounted with {} bands", self.bands.len());
            if let Some(title) = self.title {
                SectionTitle::new(title).mount();
            }

            let mapper = ParallaxMapper {
                depth_unit: self.motion.scene_depth,
                amplitude: self.motion.parallax_amplitude,
            };
            let follow_ms = self.motion.scrub_follow_ms;
            for (index, &band) in self.bands.iter().enumerate() {
                conceal(band, 60.0);
                ScrollTrigger::new(
                    band,
                    TriggerRegion::new(
                        Anchor::new(Edge::Top, Edge::Percent(80.0)),
                        RegionEnd::Anchor(Anchor::new(Edge::Bottom, Edge::Top)),
                    ),
                )
                .once(true)
                .on_enter(move || reveal(band, power3(900.0)))
                .create();

                ScrollTrigger::new(section, TriggerRegion::default())
                    .scrub(Scrub::Immediate)
                    .on_update(move |progress| {
                        animate(
                            band,
                            Property::TranslateY,
                            mapper.map((index, progress)),
                            follow(follow_ms),
                        );
                    })
                    .create();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::tick;
    use crate::geometry::Rect;
    use crate::input::{dispatch, scroll, Event};
    use crate::surface;

    fn scene() -> ParallaxScene {
        let section = surface::create_surface("parallax", Rect::new(0.0, 2000.0, 1280.0, 600.0));
        ParallaxScene {
            section,
            title: None,
            bands: (0..3)
                .map(|i| {
                    let rect = Rect::new(0.0, 2100.0 + i as f32 * 150.0, 1280.0, 120.0);
                    surface::create_child(section, format!("band-{}", i), rect)
                })
                .collect(),
            motion: MotionConfig::default(),
        }
    }

    #[test]
    fn test_bands_reveal_individually() {
        let scene = scene();
        tick(Duration::ZERO);
        scene.mount();
        assert_eq!(scroll::trigger_count(), 6);

        // First band's top reaches 80% of the viewport at 2100 - 640
        dispatch(Event::Scroll { offset_y: 1500.0 });
        tick(Duration::from_millis(5000));

        assert_eq!(surface::value(scene.bands[0], Property::Opacity), Some(1.0));
        assert_eq!(surface::value(scene.bands[2], Property::Opacity), Some(0.0));
        assert_eq!(scroll::trigger_count(), 5);
    }

    #[test]
    fn test_centered_section_has_no_offset() {
        let scene = scene();
        tick(Duration::ZERO);
        scene.mount();

        // Region runs from 1200 to 2600; 1900 is halfway
        dispatch(Event::Scroll { offset_y: 1900.0 });
        tick(Duration::from_millis(5000));

        for &band in &scene.bands {
            let offset = surface::value(band, Property::TranslateY).unwrap_or(f32::NAN);
            assert!(offset.abs() < 1e-3, "offset was {}", offset);
        }
    }
}
