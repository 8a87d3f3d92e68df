use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use log::debug;

use super::{Component, RendererFactory};
use crate::animation::{set_value, Follower};
use crate::config::MotionConfig;
use crate::frame::on_frame;
use crate::input::{
    add_listener, scroll, viewport_sample, Anchor, Edge, Event, EventKind, Handler,
    ListenTarget, RegionEnd, ScrollTrigger, Scrub, TriggerRegion,
};
use crate::lifecycle::{mount, on_cleanup, Teardown};
use crate::mapper::{Mapper, PointerFollowMapper, RangeMapper, Tilt};
use crate::property::Property;
use crate::scene3d::{CameraConfig, ParticleField, Scene};
use crate::surface::{self, SurfaceId};

/// Camera distance once the page is scrolled to the bottom.
const DOLLY_END: f32 = 3.3;

/// Full-viewport particle field behind the page.
///
/// Scrolling dollies the camera in and turns the field; the field also drifts
/// on its own every frame and the camera leans toward the pointer.
#[derive(Clone)]
pub struct ParticleBackdrop {
    /// Fixed surface the scene is drawn into
    pub host: SurfaceId,
    /// Scroll progress is measured over this surface, normally the whole page
    pub page: SurfaceId,
    pub renderer: RendererFactory,
    pub field: ParticleField,
    pub motion: MotionConfig,
}

/// The whole scrollable length of the page.
fn page_region() -> TriggerRegion {
    TriggerRegion::new(
        Anchor::new(Edge::Top, Edge::Top),
        RegionEnd::Anchor(Anchor::new(Edge::Bottom, Edge::Bottom)),
    )
}

impl Component for ParticleBackdrop {
    fn mount(&self) -> Teardown {
        mount(Some(self.host), |host| {
            let viewport = scroll::viewport();
            let camera_config = CameraConfig::default();
            let mut scene = Scene::new(
                "backdrop",
                host,
                (self.renderer)(),
                camera_config,
                (viewport.width as u32, viewport.height as u32),
            );

            // Scroll turns the outer node, drift turns the inner one
            let particles = scene.add_node(scene.root(), "particles");
            let spin = scene.add_node(particles, "spin");
            let points = self.field.generate();
            scene.attach_buffer(spin, "particles", ParticleField::bytes(&points));
            debug!("particle backdrop mounted with {} particles", points.len());

            let camera = scene.camera();
            let scene = Rc::new(RefCell::new(scene));

            ScrollTrigger::new(self.page, page_region())
                .scrub(Scrub::Smooth(1.2))
                .drive(
                    camera,
                    Property::TranslateZ,
                    RangeMapper::new(camera_config.position[2], DOLLY_END),
                )
                .create();
            ScrollTrigger::new(self.page, page_region())
                .scrub(Scrub::Smooth(1.5))
                .drive(particles, Property::RotateY, RangeMapper::new(0.0, PI * 1.8))
                .create();

            let follow = Rc::new(RefCell::new(Follower::new(
                Tilt::default(),
                self.motion.camera_damping,
            )));
            let mapper = PointerFollowMapper::uniform(self.motion.camera_follow_gain);
            let aim = follow.clone();
            add_listener(
                ListenTarget::Window,
                EventKind::PointerMove,
                Handler::new(move |event| {
                    if let Some((x, y)) = event.position() {
                        aim.borrow_mut().set_target(mapper.map(viewport_sample(x, y)));
                    }
                }),
            );

            let resized = scene.clone();
            add_listener(
                ListenTarget::Window,
                EventKind::Resize,
                Handler::new(move |event| {
                    if let Event::Resize { width, height } = *event {
                        resized.borrow_mut().resize(width as u32, height as u32);
                    }
                }),
            );

            let (drift_y, drift_x) = self.motion.particle_drift;
            let frame_scene = scene.clone();
            on_frame(move |_| {
                let tilt = *follow.borrow_mut().step();
                set_value(camera, Property::RotateX, tilt.rotate_x);
                set_value(camera, Property::RotateY, tilt.rotate_y);

                let drift = [(Property::RotateY, drift_y), (Property::RotateX, drift_x)];
                for (property, step) in drift {
                    if let Some(angle) = surface::value(spin, property) {
                        set_value(spin, property, angle + step);
                    }
                }
                frame_scene.borrow_mut().render();
            });

            on_cleanup(move || scene.borrow_mut().dispose());
        })
    }
}
