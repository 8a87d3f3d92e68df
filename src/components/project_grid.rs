use std::rc::Rc;

use log::debug;

use super::{elastic, power3, Component, SectionTitle};
use crate::animation::{animate, set_value};
use crate::config::MotionConfig;
use crate::input::{
    add_listener, sample_in, Anchor, Edge, EventKind, Handler, ListenTarget, RegionEnd,
    ScrollTrigger, TriggerRegion,
};
use crate::lifecycle::{mount, Teardown};
use crate::mapper::{Mapper, TiltMapper};
use crate::property::Property;
use crate::surface::SurfaceId;

/// Project cards that rise into place together and tilt under the pointer.
#[derive(Clone, Debug)]
pub struct ProjectGrid {
    pub section: SurfaceId,
    pub title: Option<SurfaceId>,
    pub cards: Vec<SurfaceId>,
    pub motion: MotionConfig,
}

impl ProjectGrid {
    fn stagger_in(&self, section: SurfaceId) {
        for &card in &self.cards {
            set_value(card, Property::Opacity, 0.0);
            set_value(card, Property::TranslateY, 50.0);
            set_value(card, Property::RotateX, 8.0);
        }
        let cards: Rc<[SurfaceId]> = self.cards.clone().into();
        ScrollTrigger::new(
            section,
            TriggerRegion::new(
                Anchor::new(Edge::Top, Edge::Percent(85.0)),
                RegionEnd::Anchor(Anchor::new(Edge::Bottom, Edge::Top)),
            ),
        )
        .once(true)
        .on_enter(move || {
            for (index, &card) in cards.iter().enumerate() {
                let transition = power3(800.0).delay(index as f32 * 120.0);
                animate(card, Property::Opacity, 1.0, transition.clone());
                animate(card, Property::TranslateY, 0.0, transition.clone());
                animate(card, Property::RotateX, 0.0, transition);
            }
        })
        .create();
    }

    fn hover_tilt(&self, card: SurfaceId) {
        let mapper = TiltMapper::new(self.motion.card_tilt);
        let lift = self.motion.card_lift;
        let on_move = Handler::new(move |event| {
            let Some((x, y)) = event.position() else {
                return;
            };
            let Some(sample) = sample_in(card, x, y) else {
                return;
            };
            let tilt = mapper.map(sample);
            animate(card, Property::RotateX, tilt.rotate_x, power3(250.0));
            animate(card, Property::RotateY, tilt.rotate_y, power3(250.0));
            animate(card, Property::TranslateZ, lift, power3(250.0));
        });
        let on_leave = Handler::new(move |_| {
            let settle = elastic(550.0, 1.0, 0.45);
            animate(card, Property::RotateX, 0.0, settle.clone());
            animate(card, Property::RotateY, 0.0, settle.clone());
            animate(card, Property::TranslateZ, 0.0, settle);
        });
        add_listener(ListenTarget::Surface(card), EventKind::PointerMove, on_move);
        add_listener(ListenTarget::Surface(card), EventKind::PointerLeave, on_leave);
    }
}

impl Component for ProjectGrid {
    fn mount(&self) -> Teardown {
        mount(Some(self.section), |section| {
            debug!("project grid mounted with {} cards", self.cards.len());
            if let Some(title) = self.title {
                SectionTitle::new(title).mount();
            }
            self.stagger_in(section);
            for &card in &self.cards {
                self.hover_tilt(card);
            }
        })
    }
}
