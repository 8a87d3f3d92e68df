use std::rc::Rc;

use log::debug;

use super::{power3, Component};
use crate::animation::animate_from_to;
use crate::input::{Anchor, Edge, RegionEnd, ScrollTrigger, TriggerRegion};
use crate::lifecycle::{mount, Teardown};
use crate::property::Property;
use crate::surface::SurfaceId;

/// A row of counters that count up once the strip scrolls into view.
#[derive(Clone, Debug)]
pub struct StatsStrip {
    pub section: SurfaceId,
    /// Counter surface and the whole number it counts to
    pub counters: Vec<(SurfaceId, f32)>,
}

impl Component for StatsStrip {
    fn mount(&self) -> Teardown {
        mount(Some(self.section), |section| {
            debug!("stats strip mounted with {} counters", self.counters.len());
            let counters: Rc<[(SurfaceId, f32)]> = self.counters.clone().into();
            ScrollTrigger::new(
                section,
                TriggerRegion::new(
                    Anchor::new(Edge::Top, Edge::Percent(80.0)),
                    RegionEnd::Anchor(Anchor::new(Edge::Bottom, Edge::Top)),
                ),
            )
            .once(true)
            .on_enter(move || {
                for &(counter, value) in counters.iter() {
                    animate_from_to(
                        counter,
                        Property::Counter,
                        0.0,
                        value,
                        power3(1600.0).snap(1.0),
                    );
                }
            })
            .create();
        })
    }
}
