use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use super::Scene;
use crate::surface::SurfaceId;

/// Failure to produce a model asset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("model `{0}` not found")]
    NotFound(String),
    #[error("model `{0}` has no geometry")]
    Empty(String),
    #[error("model `{path}` is malformed: {reason}")]
    Malformed { path: String, reason: String },
}

/// A node of a loaded model. Vertex positions are in model space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_vertices(mut self, vertices: Vec<[f32; 3]>) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a ModelNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelAsset {
    pub path: String,
    pub root: ModelNode,
}

impl ModelAsset {
    /// Axis-aligned bounds of every vertex, hidden helper nodes included.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut bounds: Option<([f32; 3], [f32; 3])> = None;
        self.root.visit(&mut |node| {
            for vertex in &node.vertices {
                let (min, max) = bounds.get_or_insert((*vertex, *vertex));
                for axis in 0..3 {
                    min[axis] = min[axis].min(vertex[axis]);
                    max[axis] = max[axis].max(vertex[axis]);
                }
            }
        });
        bounds
    }

    pub fn center(&self) -> Option<[f32; 3]> {
        self.bounds()
            .map(|(min, max)| [0, 1, 2].map(|axis| (min[axis] + max[axis]) / 2.0))
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(&mut |_| count += 1);
        count
    }

    fn validate(self) -> Result<Self, AssetError> {
        let mut has_geometry = false;
        let mut non_finite = false;
        self.root.visit(&mut |node| {
            has_geometry |= !node.vertices.is_empty();
            non_finite |= node.vertices.iter().flatten().any(|v| !v.is_finite());
        });
        if non_finite {
            return Err(AssetError::Malformed {
                path: self.path,
                reason: "non-finite vertex".to_string(),
            });
        }
        if !has_geometry {
            return Err(AssetError::Empty(self.path));
        }
        Ok(self)
    }
}

/// Source of model assets.
pub trait ModelLoader {
    fn load(&self, path: &str) -> Result<ModelAsset, AssetError>;
}

/// Loader serving assets registered in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticModelLoader {
    assets: HashMap<String, ModelNode>,
}

impl StaticModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, root: ModelNode) -> Self {
        self.assets.insert(path.into(), root);
        self
    }
}

impl ModelLoader for StaticModelLoader {
    fn load(&self, path: &str) -> Result<ModelAsset, AssetError> {
        let root = self
            .assets
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        ModelAsset {
            path: path.to_string(),
            root,
        }
        .validate()
    }
}

/// Case-insensitive name filter for helper nodes shipped inside models.
///
/// A node is hidden when its name contains a denied word and no allowed word.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeFilter {
    deny: Vec<String>,
    allow: Vec<String>,
}

impl NodeFilter {
    /// Hide nothing.
    pub fn none() -> Self {
        Self {
            deny: Vec::new(),
            allow: Vec::new(),
        }
    }

    pub fn deny(mut self, word: &str) -> Self {
        self.deny.push(word.to_lowercase());
        self
    }

    pub fn allow(mut self, word: &str) -> Self {
        self.allow.push(word.to_lowercase());
        self
    }

    pub fn hides(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let contains = |words: &[String]| words.iter().any(|w| name.contains(w.as_str()));
        contains(&self.deny) && !contains(&self.allow)
    }
}

impl Default for NodeFilter {
    /// Floors, shadow catchers and collision helpers exported with scanned models.
    fn default() -> Self {
        ["shadow", "plane", "floor", "ground", "skfb", "collider"]
            .into_iter()
            .fold(Self::none(), |filter, word| filter.deny(word))
    }
}

/// Create surfaces for every node of `asset` under `parent` and upload their
/// geometry. Returns the surface of the model root.
pub fn instantiate(scene: &mut Scene, parent: SurfaceId, asset: &ModelAsset) -> SurfaceId {
    fn add(scene: &mut Scene, parent: SurfaceId, node: &ModelNode) -> SurfaceId {
        let id = scene.add_node(parent, &node.name);
        if !node.vertices.is_empty() {
            scene.attach_buffer(id, &node.name, bytemuck::cast_slice(&node.vertices));
        }
        for child in &node.children {
            add(scene, id, child);
        }
        id
    }

    let root = add(scene, parent, &asset.root);
    debug!(
        "instantiated {} ({} nodes, {} buffers)",
        asset.path,
        asset.node_count(),
        scene.buffer_count()
    );
    root
}
