//! Per-mount 3D scenes on top of a pluggable renderer.
//!
//! Scene nodes and the camera are ordinary surfaces, so the animation driver
//! moves them exactly like DOM-style elements. Rotations of 3D nodes are in
//! radians, translations in scene units.
//!
//! A [`Scene`] owns its renderer and every buffer it uploaded; [`Scene::dispose`]
//! frees all of them and removes the scene's surfaces. Nothing is shared between
//! mounts.

mod model;
mod particles;

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};

use crate::animation::driver;
use crate::geometry::Rect;
use crate::property::Property;
use crate::surface::{self, with_surfaces, SurfaceId};

pub use model::{
    instantiate, AssetError, ModelAsset, ModelLoader, ModelNode, NodeFilter, StaticModelLoader,
};
pub use particles::{Particle, ParticleField};

/// Identifier of a buffer uploaded to a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Camera state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// One visible node for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawNode {
    pub name: String,
    pub buffer: Option<BufferId>,
    pub translate: [f32; 3],
    pub rotate: [f32; 3],
    pub scale: f32,
}

/// Everything a renderer needs to produce a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawList {
    pub camera: CameraView,
    pub lights: Vec<Light>,
    pub nodes: Vec<DrawNode>,
}

/// Backend that turns draw lists into pixels.
pub trait Renderer {
    fn upload(&mut self, label: &str, bytes: &[u8]) -> BufferId;
    fn release(&mut self, buffer: BufferId);
    fn resize(&mut self, width: u32, height: u32);
    fn draw(&mut self, frame: &DrawList);
    /// Free every backend resource. The renderer is not used afterwards.
    fn dispose(&mut self);
}

impl<R: Renderer> Renderer for Rc<RefCell<R>> {
    fn upload(&mut self, label: &str, bytes: &[u8]) -> BufferId {
        self.borrow_mut().upload(label, bytes)
    }

    fn release(&mut self, buffer: BufferId) {
        self.borrow_mut().release(buffer)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.borrow_mut().resize(width, height)
    }

    fn draw(&mut self, frame: &DrawList) {
        self.borrow_mut().draw(frame)
    }

    fn dispose(&mut self) {
        self.borrow_mut().dispose()
    }
}

/// Snapshot of what a [`HeadlessRenderer`] has done.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderStats {
    pub frames: u64,
    pub uploaded_bytes: u64,
    pub live_buffers: usize,
    pub size: (u32, u32),
    pub disposed: bool,
}

/// Renderer that keeps bookkeeping only. Used by tests and the demos.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_buffer: u64,
    live: Vec<BufferId>,
    stats: RenderStats,
    last_frame: Option<DrawList>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer shared between a scene and an observer.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            live_buffers: self.live.len(),
            ..self.stats.clone()
        }
    }

    pub fn last_frame(&self) -> Option<&DrawList> {
        self.last_frame.as_ref()
    }
}

impl Renderer for HeadlessRenderer {
    fn upload(&mut self, label: &str, bytes: &[u8]) -> BufferId {
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        trace!("upload {} ({} bytes) as {:?}", label, bytes.len(), id);
        self.stats.uploaded_bytes += bytes.len() as u64;
        self.live.push(id);
        id
    }

    fn release(&mut self, buffer: BufferId) {
        self.live.retain(|&b| b != buffer);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.stats.size = (width, height);
    }

    fn draw(&mut self, frame: &DrawList) {
        if self.stats.disposed {
            return;
        }
        self.stats.frames += 1;
        self.last_frame = Some(frame.clone());
    }

    fn dispose(&mut self) {
        self.live.clear();
        self.last_frame = None;
        self.stats.disposed = true;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Directional,
    Ambient,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// 0xRRGGBB
    pub color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
}

impl Light {
    pub fn directional(color: u32, intensity: f32, position: [f32; 3]) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity,
            position,
        }
    }

    pub fn ambient(color: u32, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
            position: [0.0; 3],
        }
    }
}

/// Perspective camera parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 65.0,
            near: 0.1,
            far: 50.0,
            position: [0.0, 0.0, 6.0],
        }
    }
}

const POSITION: [Property; 3] = [Property::TranslateX, Property::TranslateY, Property::TranslateZ];
const ROTATION: [Property; 3] = [Property::RotateX, Property::RotateY, Property::RotateZ];

fn read3(node: &surface::Surface, properties: [Property; 3]) -> [f32; 3] {
    properties.map(|p| node.value(p))
}

/// A 3D scene bound to one mount.
pub struct Scene {
    renderer: Box<dyn Renderer>,
    root: SurfaceId,
    camera: SurfaceId,
    camera_config: CameraConfig,
    lights: Vec<Light>,
    meshes: Vec<(SurfaceId, BufferId)>,
    size: (u32, u32),
    disposed: bool,
}

impl Scene {
    /// Create the scene's root and camera surfaces under `host`.
    pub fn new(
        name: &str,
        host: SurfaceId,
        mut renderer: Box<dyn Renderer>,
        camera_config: CameraConfig,
        size: (u32, u32),
    ) -> Self {
        let root = surface::create_child(host, format!("{}-root", name), Rect::default());
        let camera = surface::create_child(host, format!("{}-camera", name), Rect::default());
        for (property, value) in POSITION.into_iter().zip(camera_config.position) {
            driver::set_value(camera, property, value);
        }
        renderer.resize(size.0, size.1);
        debug!("scene {} created at {}x{}", name, size.0, size.1);
        Self {
            renderer,
            root,
            camera,
            camera_config,
            lights: Vec::new(),
            meshes: Vec::new(),
            size,
            disposed: false,
        }
    }

    pub fn root(&self) -> SurfaceId {
        self.root
    }

    pub fn camera(&self) -> SurfaceId {
        self.camera
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Add an empty group node.
    pub fn add_node(&mut self, parent: SurfaceId, name: &str) -> SurfaceId {
        surface::create_child(parent, name, Rect::default())
    }

    /// Upload `bytes` and draw them at `node`.
    pub fn attach_buffer(&mut self, node: SurfaceId, label: &str, bytes: &[u8]) -> BufferId {
        let buffer = self.renderer.upload(label, bytes);
        self.meshes.push((node, buffer));
        buffer
    }

    pub fn buffer_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        self.size = (width, height);
        self.renderer.resize(width, height);
    }

    pub fn aspect(&self) -> f32 {
        if self.size.1 == 0 {
            1.0
        } else {
            self.size.0 as f32 / self.size.1 as f32
        }
    }

    /// Snapshot the visible scene graph and camera.
    pub fn draw_list(&self) -> DrawList {
        let mut nodes = Vec::new();
        let mut hidden: Vec<SurfaceId> = Vec::new();
        let camera = with_surfaces(|tree| {
            tree.visit(self.root, &mut |id, node| {
                let parent_hidden = node.parent().is_some_and(|p| hidden.contains(&p));
                if parent_hidden || !node.is_visible() {
                    hidden.push(id);
                    return;
                }
                let buffer = self
                    .meshes
                    .iter()
                    .find(|(mesh, _)| *mesh == id)
                    .map(|(_, buffer)| *buffer);
                nodes.push(DrawNode {
                    name: node.name().to_string(),
                    buffer,
                    translate: read3(node, POSITION),
                    rotate: read3(node, ROTATION),
                    scale: node.value(Property::Scale),
                });
            });
            tree.get(self.camera).map(|camera| CameraView {
                position: read3(camera, POSITION),
                rotation: read3(camera, ROTATION),
                fov: self.camera_config.fov,
                aspect: self.aspect(),
                near: self.camera_config.near,
                far: self.camera_config.far,
            })
        });
        DrawList {
            camera: camera.unwrap_or(CameraView {
                position: self.camera_config.position,
                rotation: [0.0; 3],
                fov: self.camera_config.fov,
                aspect: self.aspect(),
                near: self.camera_config.near,
                far: self.camera_config.far,
            }),
            lights: self.lights.clone(),
            nodes,
        }
    }

    pub fn render(&mut self) {
        if self.disposed {
            return;
        }
        let frame = self.draw_list();
        self.renderer.draw(&frame);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every buffer, dispose the renderer and remove the scene's
    /// surfaces. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for (_, buffer) in self.meshes.drain(..) {
            self.renderer.release(buffer);
        }
        self.renderer.dispose();
        surface::remove_surface(self.root);
        surface::remove_surface(self.camera);
        debug!("scene disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> SurfaceId {
        surface::create_surface("host", Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    #[test]
    fn test_scene_disposes_everything() {
        let renderer = HeadlessRenderer::shared();
        let mut scene = Scene::new(
            "test",
            host(),
            Box::new(renderer.clone()),
            CameraConfig::default(),
            (800, 600),
        );
        let node = scene.add_node(scene.root(), "points");
        scene.attach_buffer(node, "points", &[0u8; 12]);
        scene.render();
        assert_eq!(renderer.borrow().stats().live_buffers, 1);
        assert_eq!(renderer.borrow().stats().frames, 1);

        scene.dispose();
        scene.dispose();
        scene.render();

        let stats = renderer.borrow().stats();
        assert_eq!(stats.live_buffers, 0);
        assert!(stats.disposed);
        assert_eq!(stats.frames, 1);
        assert!(!surface::exists(scene.root()));
        assert!(!surface::exists(scene.camera()));
    }

    #[test]
    fn test_draw_list_reads_animated_values() {
        let mut scene = Scene::new(
            "test",
            host(),
            Box::new(HeadlessRenderer::new()),
            CameraConfig::default(),
            (800, 400),
        );
        let node = scene.add_node(scene.root(), "model");
        driver::set_value(node, Property::RotateY, 1.5);
        let hidden = scene.add_node(scene.root(), "floor");
        scene.add_node(hidden, "floor-decal");
        surface::set_visible(hidden, false);

        let frame = scene.draw_list();

        assert_eq!(frame.camera.position, [0.0, 0.0, 6.0]);
        assert_eq!(frame.camera.aspect, 2.0);
        let names: Vec<&str> = frame.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["test-root", "model"]);
        assert_eq!(frame.nodes[1].rotate, [0.0, 1.5, 0.0]);
    }
}
