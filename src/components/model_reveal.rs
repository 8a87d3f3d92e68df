use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use super::{power3, Component, RendererFactory};
use crate::animation::{animate_from, set_value, Follower};
use crate::config::MotionConfig;
use crate::frame::on_frame;
use crate::input::{
    add_listener, viewport_sample, EventKind, Handler, ListenTarget, ScrollTrigger, Scrub,
    TriggerRegion,
};
use crate::lifecycle::{mount, on_cleanup, Teardown};
use crate::mapper::{Mapper, PointerFollowMapper, RangeMapper, Tilt};
use crate::property::Property;
use crate::scene3d::{
    instantiate, CameraConfig, Light, ModelAsset, ModelLoader, NodeFilter, Scene,
};
use crate::surface::{self, SurfaceId};

const MODEL_SCALE: f32 = 1.6;
/// Model height above the scene origin after centring
const MODEL_LIFT: f32 = -0.9;
/// Turns added to the model over the section's scroll range, radians
const SCROLL_SPIN: f32 = 5.0;

/// A loaded 3D model that swings into place, spins with scroll and leans
/// toward the pointer.
#[derive(Clone)]
pub struct ModelReveal {
    pub host: SurfaceId,
    pub loader: Rc<dyn ModelLoader>,
    pub path: String,
    pub renderer: RendererFactory,
    /// Nodes hidden after loading
    pub filter: NodeFilter,
    pub motion: MotionConfig,
}

fn camera() -> CameraConfig {
    CameraConfig {
        fov: 90.0,
        near: 0.1,
        far: 200.0,
        position: [0.0, 0.4, 4.0],
    }
}

fn host_size(host: SurfaceId) -> (u32, u32) {
    surface::bounds(host)
        .map(|b| (b.width.max(0.0) as u32, b.height.max(0.0) as u32))
        .unwrap_or_default()
}

impl ModelReveal {
    /// Place the model and start its motion. Group nesting keeps the pointer
    /// lean, the scroll spin and the entry swing on separate nodes.
    fn stage(&self, scene: &mut Scene, host: SurfaceId, asset: &ModelAsset) {
        let tilt = scene.add_node(scene.root(), "tilt");
        let spin = scene.add_node(tilt, "spin");
        let model = instantiate(scene, spin, asset);
        let hidden = surface::hide_where(model, |name| self.filter.hides(name));
        debug!("model {} staged, {} helper nodes hidden", asset.path, hidden);

        let [cx, _, cz] = asset.center().unwrap_or_default();
        set_value(model, Property::Scale, MODEL_SCALE);
        set_value(model, Property::TranslateX, -cx * MODEL_SCALE);
        set_value(model, Property::TranslateY, MODEL_LIFT);
        set_value(model, Property::TranslateZ, -cz * MODEL_SCALE);

        animate_from(model, Property::RotateX, 0.3, power3(1150.0));
        animate_from(model, Property::RotateY, -1.2, power3(1150.0));

        let spun_from = surface::value(spin, Property::RotateY).unwrap_or_default();
        ScrollTrigger::new(host, TriggerRegion::default())
            .scrub(Scrub::Smooth(1.3))
            .drive(
                spin,
                Property::RotateY,
                RangeMapper::relative(spun_from, SCROLL_SPIN),
            )
            .create();

        let (gain_x, gain_y) = self.motion.model_follow_gain;
        let mapper = PointerFollowMapper::new(gain_x, gain_y);
        let follow = Rc::new(RefCell::new(Follower::new(
            Tilt::default(),
            self.motion.model_damping,
        )));
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
        on_frame(move |_| {
            let lean = *follow.borrow_mut().step();
            set_value(tilt, Property::RotateX, lean.rotate_x);
            set_value(tilt, Property::RotateY, lean.rotate_y);
        });
    }
}

impl Component for ModelReveal {
    fn mount(&self) -> Teardown {
        mount(Some(self.host), |host| {
            let mut scene = Scene::new("model", host, (self.renderer)(), camera(), host_size(host));
            scene.add_light(Light::directional(0xffffff, 1.4, [4.0, 3.0, 7.0]));
            scene.add_light(Light::directional(0xa855f7, 1.1, [-4.0, 4.0, -2.0]));
            scene.add_light(Light::ambient(0xffffff, 0.45));

            match self.loader.load(&self.path) {
                Ok(asset) => self.stage(&mut scene, host, &asset),
                Err(err) => warn!("rendering without model: {}", err),
            }

            let scene = Rc::new(RefCell::new(scene));
            let resized = scene.clone();
            add_listener(
                ListenTarget::Window,
                EventKind::Resize,
                Handler::new(move |_| {
                    let (width, height) = host_size(host);
                    resized.borrow_mut().resize(width, height);
                }),
            );

            let frame_scene = scene.clone();
            on_frame(move |_| frame_scene.borrow_mut().render());
            on_cleanup(move || scene.borrow_mut().dispose());
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::frame::advance;
    use crate::geometry::Rect;
    use crate::input::{dispatch, listener_count, scroll, Event};
    use crate::scene3d::{HeadlessRenderer, ModelNode, Renderer, StaticModelLoader};

    fn car() -> ModelNode {
        let body = vec![[-1.0, 0.0, -2.0], [1.0, 1.0, 2.0]];
        let floor = vec![[-3.0, -0.1, -3.0], [3.0, -0.1, 3.0]];
        ModelNode::new("Sketchfab_model")
            .with_child(ModelNode::new("Body").with_vertices(body))
            .with_child(ModelNode::new("Shadow_Plane").with_vertices(floor))
    }

    fn reveal(path: &str) -> (ModelReveal, Rc<RefCell<HeadlessRenderer>>) {
        let host = surface::create_surface("model", Rect::new(190.0, 680.0, 900.0, 540.0));
        let renderer = HeadlessRenderer::shared();
        let shared = renderer.clone();
        let reveal = ModelReveal {
            host,
            loader: Rc::new(StaticModelLoader::new().with("/models/car.glb", car())),
            path: path.to_string(),
            renderer: Rc::new(move || Box::new(shared.clone()) as Box<dyn Renderer>),
            filter: NodeFilter::default(),
            motion: MotionConfig::default(),
        };
        (reveal, renderer)
    }

    fn node_names(renderer: &Rc<RefCell<HeadlessRenderer>>) -> Vec<String> {
        renderer
            .borrow()
            .last_frame()
            .map(|frame| frame.nodes.iter().map(|n| n.name.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_helpers_hidden_and_model_placed() {
        let (reveal, renderer) = reveal("/models/car.glb");
        advance(Duration::ZERO);
        reveal.mount();
        advance(Duration::from_millis(16));

        let names = node_names(&renderer);
        assert!(names.iter().any(|n| n == "Body"));
        assert!(!names.iter().any(|n| n == "Shadow_Plane"));
        assert_eq!(renderer.borrow().stats().live_buffers, 2);
        assert_eq!(renderer.borrow().stats().size, (900, 540));

        let frame = renderer.borrow().last_frame().cloned();
        let model = frame
            .and_then(|f| f.nodes.into_iter().find(|n| n.name == "Sketchfab_model"));
        let model = model.map(|m| (m.scale, m.translate));
        assert_eq!(model, Some((MODEL_SCALE, [0.0, MODEL_LIFT, 0.0])));
    }

    #[test]
    fn test_entry_swing_settles() {
        let (reveal, _renderer) = reveal("/models/car.glb");
        advance(Duration::ZERO);
        reveal.mount();

        let model = surface::with_surfaces(|tree| {
            tree.collect(reveal.host, |s| s.name() == "Sketchfab_model")
        });
        assert_eq!(surface::value(model[0], Property::RotateY), Some(-1.2));

        advance(Duration::from_millis(1150));
        assert_eq!(surface::value(model[0], Property::RotateX), Some(0.0));
        assert_eq!(surface::value(model[0], Property::RotateY), Some(0.0));
    }

    #[test]
    fn test_scroll_spins_the_spin_group() {
        let (reveal, _renderer) = reveal("/models/car.glb");
        advance(Duration::ZERO);
        reveal.mount();

        // Past the end of the section's on-screen range
        dispatch(Event::Scroll { offset_y: 1500.0 });
        advance(Duration::from_millis(16));
        advance(Duration::from_millis(2000));

        let spin = surface::with_surfaces(|tree| tree.collect(reveal.host, |s| s.name() == "spin"));
        assert_eq!(surface::value(spin[0], Property::RotateY), Some(SCROLL_SPIN));
    }

    #[test]
    fn test_missing_model_still_renders() {
        let (reveal, renderer) = reveal("/models/logo.glb");
        let teardown = reveal.mount();
        advance(Duration::from_millis(16));

        assert_eq!(renderer.borrow().stats().frames, 1);
        assert_eq!(renderer.borrow().stats().live_buffers, 0);
        assert_eq!(renderer.borrow().last_frame().map(|f| f.lights.len()), Some(3));
        assert_eq!(scroll::trigger_count(), 0);
        assert_eq!(listener_count(), 1);

        teardown.run();
        assert!(renderer.borrow().stats().disposed);
        assert_eq!(listener_count(), 0);
    }

    #[test]
    fn test_teardown_frees_model_buffers() {
        let (reveal, renderer) = reveal("/models/car.glb");
        let teardown = reveal.mount();
        assert_eq!(listener_count(), 2);

        teardown.run();
        teardown.run();

        let stats = renderer.borrow().stats();
        assert!(stats.disposed);
        assert_eq!(stats.live_buffers, 0);
        assert_eq!(scroll::trigger_count(), 0);
        assert!(surface::children(reveal.host).is_empty());
    }
}
