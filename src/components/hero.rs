use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{elastic, fade_rise_from, power3, Component};
use crate::animation::{animate, animate_from_to, set_value, TimingFunction, Transition};
use crate::config::MotionConfig;
use crate::input::{
    add_listener, sample_in, Anchor, Edge, EventKind, Handler, ListenTarget, RegionEnd,
    ScrollTrigger, Scrub, TriggerRegion,
};
use crate::lifecycle::{mount, Teardown};
use crate::mapper::{LinearMapper, MagneticMapper, Mapper, TiltMapper};
use crate::property::Property;
use crate::surface::{self, SurfaceId};

/// The landing section: staggered headline, elastic preview card with idle
/// float and pointer tilt, scroll-linked glow, floating chips and a magnetic
/// call-to-action.
#[derive(Clone, Debug)]
pub struct Hero {
    pub section: SurfaceId,
    pub words: Vec<SurfaceId>,
    pub subtext: Option<SurfaceId>,
    pub cta: Option<SurfaceId>,
    pub button: Option<SurfaceId>,
    pub card: SurfaceId,
    /// Wrapper around the card carrying the idle float
    pub card_float: Option<SurfaceId>,
    pub chips: Vec<SurfaceId>,
    pub motion: MotionConfig,
    pub seed: u64,
}

const POP_MS: f32 = 1100.0;
const POP_DELAY_MS: f32 = 250.0;

impl Hero {
    fn intro(&self) {
        for (index, &word) in self.words.iter().enumerate() {
            fade_rise_from(word, 40.0, power3(900.0).delay(index as f32 * 60.0));
        }
        if let Some(subtext) = self.subtext {
            fade_rise_from(subtext, 20.0, power3(700.0).delay(200.0));
        }
        if let Some(cta) = self.cta {
            fade_rise_from(cta, 10.0, power3(600.0).delay(350.0));
        }
    }

    fn pop_in(&self) {
        let pop = elastic(POP_MS, 1.0, 0.7).delay(POP_DELAY_MS);
        let card = self.card;
        animate_from_to(card, Property::Opacity, 0.0, 1.0, pop.clone());
        animate_from_to(card, Property::TranslateY, 40.0, 0.0, pop.clone());
        animate_from_to(card, Property::RotateX, 12.0, 0.0, pop.clone());
        animate_from_to(card, Property::RotateY, -18.0, 0.0, pop.clone());
        animate_from_to(card, Property::Scale, 0.9, 1.0, pop);

        if let Some(float) = self.card_float {
            // Starts once the pop-in has settled
            let idle = Transition::new(3000.0, TimingFunction::SineInOut)
                .delay(POP_DELAY_MS + POP_MS)
                .forever()
                .yoyo(true);
            animate(float, Property::TranslateY, -10.0, idle.clone());
            animate(float, Property::RotateX, 2.0, idle);
        }
    }

    fn tilt(&self, section: SurfaceId) {
        let card = self.card;
        let mapper = TiltMapper::new(self.motion.hero_tilt);
        let on_move = Handler::new(move |event| {
            let Some((x, y)) = event.position() else {
                return;
            };
            let Some(sample) = sample_in(section, x, y) else {
                return;
            };
            let tilt = mapper.map(sample);
            animate(card, Property::RotateX, tilt.rotate_x, power3(400.0));
            animate(card, Property::RotateY, tilt.rotate_y, power3(400.0));
        });
        let on_leave = Handler::new(move |_| {
            animate(card, Property::RotateX, 0.0, elastic(600.0, 1.0, 0.5));
            animate(card, Property::RotateY, 0.0, elastic(600.0, 1.0, 0.5));
        });
        add_listener(ListenTarget::Surface(section), EventKind::PointerMove, on_move);
        add_listener(ListenTarget::Surface(section), EventKind::PointerLeave, on_leave);
    }

    fn glow(&self, section: SurfaceId) {
        let shift = LinearMapper {
            gain: self.motion.glow_shift,
        };
        let region = TriggerRegion::new(
            Anchor::new(Edge::Top, Edge::Top),
            RegionEnd::Anchor(Anchor::new(Edge::Bottom, Edge::Top)),
        );
        ScrollTrigger::new(section, region)
            .scrub(Scrub::Immediate)
            .on_update(move |progress| {
                set_value(section, Property::ParallaxShift, shift.map(progress));
            })
            .create();
    }

    fn chips(&self) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        for (index, &chip) in self.chips.iter().enumerate() {
            let drift = Transition::new(rng.gen_range(3000.0..5000.0), TimingFunction::SineInOut)
                .forever()
                .yoyo(true)
                .delay(300.0 + index as f32 * 250.0);
            let sway = if index % 2 == 0 { 6.0 } else { -6.0 };
            animate(chip, Property::TranslateY, rng.gen_range(-18.0..18.0), drift.clone());
            animate(chip, Property::TranslateX, sway, drift);
        }
    }

    fn magnetic(&self, button: SurfaceId) {
        let mapper = MagneticMapper {
            strength: self.motion.magnetic_strength,
        };
        let on_move = Handler::new(move |event| {
            let Some((x, y)) = event.position() else {
                return;
            };
            let Some(sample) = sample_in(button, x, y) else {
                return;
            };
            let (dx, dy) = mapper.map(sample);
            animate(button, Property::TranslateX, dx, power3(250.0));
            animate(button, Property::TranslateY, dy, power3(250.0));
        });
        let on_leave = Handler::new(move |_| {
            animate(button, Property::TranslateX, 0.0, elastic(500.0, 1.0, 0.4));
            animate(button, Property::TranslateY, 0.0, elastic(500.0, 1.0, 0.4));
        });
        add_listener(ListenTarget::Surface(button), EventKind::PointerMove, on_move);
        add_listener(ListenTarget::Surface(button), EventKind::PointerLeave, on_leave);
    }
}

impl Component for Hero {
    fn mount(&self) -> Teardown {
        let host = Some(self.section).filter(|_| surface::exists(self.card));
        mount(host, |section| {
            debug!(
                "hero mounted: {} words, {} chips",
                self.words.len(),
                self.chips.len()
            );
            self.intro();
            self.pop_in();
            self.tilt(section);
            self.glow(section);
            self.chips();
            if let Some(button) = self.button.filter(|&b| surface::exists(b)) {
                self.magnetic(button);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::{active_count, tick};
    use crate::geometry::Rect;
    use crate::input::{dispatch, listener_count, Event};

    fn hero() -> Hero {
        let section = surface::create_surface("hero", Rect::new(0.0, 0.0, 1200.0, 500.0));
        let float =
            surface::create_child(section, "card-float", Rect::new(700.0, 50.0, 380.0, 400.0));
        let card = surface::create_child(float, "card", Rect::new(700.0, 50.0, 380.0, 400.0));
        let button = surface::create_child(section, "button", Rect::new(80.0, 400.0, 200.0, 40.0));
        Hero {
            section,
            words: (0..5)
                .map(|i| surface::create_child(section, format!("word-{}", i), Rect::default()))
                .collect(),
            subtext: None,
            cta: None,
            button: Some(button),
            card,
            card_float: Some(float),
            chips: vec![surface::create_child(section, "chip", Rect::default())],
            motion: MotionConfig::default(),
            seed: 7,
        }
    }

    #[test]
    fn test_words_start_hidden() {
        let hero = hero();
        tick(Duration::ZERO);
        hero.mount();

        for &word in &hero.words {
            assert_eq!(surface::value(word, Property::Opacity), Some(0.0));
            assert_eq!(surface::value(word, Property::TranslateY), Some(40.0));
        }
        assert_eq!(surface::value(hero.card, Property::Scale), Some(0.9));
    }

    #[test]
    fn test_tilt_is_bounded_by_config() {
        let hero = hero();
        tick(Duration::ZERO);
        hero.mount();

        // Far right edge of the section
        dispatch(Event::PointerMove { x: 1199.0, y: 250.0 });
        tick(Duration::from_millis(5000));

        let rotate_y = surface::value(hero.card, Property::RotateY).unwrap_or_default();
        assert!(rotate_y > 11.0 && rotate_y <= 12.0, "rotate_y was {}", rotate_y);
    }

    #[test]
    fn test_magnetic_button_follows_pointer() {
        let hero = hero();
        tick(Duration::ZERO);
        hero.mount();

        // Button centre is (180, 420)
        dispatch(Event::PointerMove { x: 220.0, y: 410.0 });
        tick(Duration::from_millis(250));

        assert_eq!(surface::value(hero.button.unwrap(), Property::TranslateX), Some(2.0));
        assert_eq!(surface::value(hero.button.unwrap(), Property::TranslateY), Some(-0.5));
    }

    #[test]
    fn test_teardown_releases_everything() {
        let hero = hero();
        tick(Duration::ZERO);
        let teardown = hero.mount();
        assert_eq!(listener_count(), 4);
        assert!(active_count() > 0);

        teardown.run();

        assert_eq!(listener_count(), 0);
        assert_eq!(active_count(), 0);
        assert_eq!(crate::input::scroll::trigger_count(), 0);
    }

    #[test]
    fn test_missing_card_is_inert() {
        let hero = hero();
        surface::remove_surface(hero.card);
        let teardown = hero.mount();
        assert!(teardown.is_inert());
        assert_eq!(listener_count(), 0);
    }
}
