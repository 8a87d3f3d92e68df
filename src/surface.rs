//! Arena-based storage for presentation surfaces.
//!
//! A surface is anything the view layer can move, rotate, scale or fade: a DOM
//! style element, a 3D scene node or the camera. The view layer creates and
//! removes surfaces; the animation driver is the only writer of their
//! property values.
//!
//! ## Key Features
//!
//! - **Generational Indices**: [`SurfaceId`] contains index + generation so a
//!   stale id never aliases a surface allocated later in the same slot.
//!
//! - **Dense Storage**: Surfaces are stored contiguously with a sparse map for
//!   O(1) lookup and swap-remove for O(1) removal.
//!
//! - **Hierarchy**: Surfaces form a tree; removing a surface removes its whole
//!   subtree, and [`visit`] walks a subtree depth-first.

use std::cell::RefCell;

use crate::geometry::Rect;
use crate::property::{Property, PropertySet};

/// Unique identifier for a surface in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SurfaceId {
    index: u32,
    generation: u32,
}

impl SurfaceId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// A presentation surface with its geometry and animated values.
#[derive(Debug, Clone)]
pub struct Surface {
    name: String,
    bounds: Rect,
    values: [f32; Property::COUNT],
    animating: PropertySet,
    visible: bool,
    parent: Option<SurfaceId>,
    children: Vec<SurfaceId>,
}

impl Surface {
    fn new(name: String, bounds: Rect) -> Self {
        let mut values = [0.0; Property::COUNT];
        for property in Property::ALL {
            values[property.index()] = property.initial();
        }
        Self {
            name,
            bounds,
            values,
            animating: PropertySet::empty(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layout bounds in page coordinates (before any animated transform).
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn value(&self, property: Property) -> f32 {
        self.values[property.index()]
    }

    /// Properties with an active transition.
    pub fn animating(&self) -> PropertySet {
        self.animating
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn parent(&self) -> Option<SurfaceId> {
        self.parent
    }

    pub fn children(&self) -> &[SurfaceId] {
        &self.children
    }
}

struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

struct Node {
    surface: Surface,
    sparse_index: u32,
}

/// Central storage for surfaces using a sparse-set layout.
pub struct SurfaceTree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    /// Generation to hand out next for each sparse slot
    generations: Vec<u32>,
    free_indices: Vec<u32>,
}

impl SurfaceTree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            generations: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Insert a surface, optionally as the last child of `parent`.
    pub fn insert(&mut self, name: String, bounds: Rect, parent: Option<SurfaceId>) -> SurfaceId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            (idx, self.generations[idx as usize])
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            self.generations.push(0);
            (idx, 0)
        };

        let id = SurfaceId::new(sparse_index, generation);
        let mut surface = Surface::new(name, bounds);

        let parent = parent.filter(|p| self.contains(*p));
        surface.parent = parent;

        let dense_index = self.dense.len();
        self.dense.push(Node {
            surface,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        if let Some(parent_id) = parent {
            if let Some(parent) = self.get_mut(parent_id) {
                parent.children.push(id);
            }
        }

        id
    }

    /// Remove a surface and its whole subtree.
    pub fn remove(&mut self, id: SurfaceId) {
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };

        let children = std::mem::take(&mut self.dense[dense_index].surface.children);
        for child in children {
            self.remove(child);
        }

        // Children removal may have moved this node
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };

        if let Some(parent_id) = self.dense[dense_index].surface.parent {
            if let Some(parent) = self.get_mut(parent_id) {
                parent.children.retain(|&c| c != id);
            }
        }
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };

        let last_dense_index = self.dense.len() - 1;
        self.dense.swap_remove(dense_index);
        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            if let Some(ref mut entry) = self.sparse[moved_sparse_idx as usize] {
                entry.dense_index = dense_index;
            }
        }

        self.sparse[id.index as usize] = None;
        self.generations[id.index as usize] = id.generation.wrapping_add(1);
        self.free_indices.push(id.index);
    }

    fn dense_index(&self, id: SurfaceId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation)
            .map(|e| e.dense_index)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.dense_index(id).map(|idx| &self.dense[idx].surface)
    }

    fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.dense_index(id).map(|idx| &mut self.dense[idx].surface)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn set_bounds(&mut self, id: SurfaceId, bounds: Rect) {
        if let Some(surface) = self.get_mut(id) {
            surface.bounds = bounds;
        }
    }

    pub fn set_visible(&mut self, id: SurfaceId, visible: bool) {
        if let Some(surface) = self.get_mut(id) {
            surface.visible = visible;
        }
    }

    /// Write a property value. Returns false if the surface no longer exists.
    pub(crate) fn write(&mut self, id: SurfaceId, property: Property, value: f32) -> bool {
        match self.get_mut(id) {
            Some(surface) => {
                surface.values[property.index()] = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_animating(&mut self, id: SurfaceId, property: Property, animating: bool) {
        if let Some(surface) = self.get_mut(id) {
            surface.animating.set(property.flag(), animating);
        }
    }

    /// Depth-first pre-order walk over `root` and its descendants.
    pub fn visit(&self, root: SurfaceId, f: &mut impl FnMut(SurfaceId, &Surface)) {
        let Some(surface) = self.get(root) else {
            return;
        };
        f(root, surface);
        for &child in &surface.children {
            self.visit(child, f);
        }
    }

    /// Collect the ids of `root` and its descendants for which `keep` is true.
    pub fn collect(&self, root: SurfaceId, keep: impl Fn(&Surface) -> bool) -> Vec<SurfaceId> {
        let mut ids = Vec::new();
        self.visit(root, &mut |id, surface| {
            if keep(surface) {
                ids.push(id);
            }
        });
        ids
    }
}

impl Default for SurfaceTree {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static SURFACES: RefCell<SurfaceTree> = RefCell::new(SurfaceTree::new());
}

/// Access the surface arena of this thread.
pub fn with_surfaces<R>(f: impl FnOnce(&SurfaceTree) -> R) -> R {
    SURFACES.with(|tree| f(&tree.borrow()))
}

pub(crate) fn with_surfaces_mut<R>(f: impl FnOnce(&mut SurfaceTree) -> R) -> R {
    SURFACES.with(|tree| f(&mut tree.borrow_mut()))
}

/// Create a top-level surface.
pub fn create_surface(name: impl Into<String>, bounds: Rect) -> SurfaceId {
    with_surfaces_mut(|tree| tree.insert(name.into(), bounds, None))
}

/// Create a surface as the last child of `parent`.
pub fn create_child(parent: SurfaceId, name: impl Into<String>, bounds: Rect) -> SurfaceId {
    with_surfaces_mut(|tree| tree.insert(name.into(), bounds, Some(parent)))
}

/// Remove a surface and its subtree. Stale ids are ignored.
pub fn remove_surface(id: SurfaceId) {
    with_surfaces_mut(|tree| tree.remove(id));
}

pub fn exists(id: SurfaceId) -> bool {
    with_surfaces(|tree| tree.contains(id))
}

pub fn bounds(id: SurfaceId) -> Option<Rect> {
    with_surfaces(|tree| tree.get(id).map(Surface::bounds))
}

pub fn set_bounds(id: SurfaceId, bounds: Rect) {
    with_surfaces_mut(|tree| tree.set_bounds(id, bounds));
}

pub fn value(id: SurfaceId, property: Property) -> Option<f32> {
    with_surfaces(|tree| tree.get(id).map(|s| s.value(property)))
}

pub fn animating(id: SurfaceId) -> PropertySet {
    with_surfaces(|tree| tree.get(id).map(Surface::animating).unwrap_or_default())
}

pub fn is_visible(id: SurfaceId) -> bool {
    with_surfaces(|tree| tree.get(id).is_some_and(Surface::is_visible))
}

pub fn set_visible(id: SurfaceId, visible: bool) {
    with_surfaces_mut(|tree| tree.set_visible(id, visible));
}

pub fn children(id: SurfaceId) -> Vec<SurfaceId> {
    with_surfaces(|tree| tree.get(id).map(|s| s.children.clone()).unwrap_or_default())
}

/// Hide every surface under `root` (inclusive) whose name `hide` selects.
/// Returns how many surfaces were hidden.
pub fn hide_where(root: SurfaceId, hide: impl Fn(&str) -> bool) -> usize {
    with_surfaces_mut(|tree| {
        let ids = tree.collect(root, |surface| hide(surface.name()));
        for &id in &ids {
            tree.set_visible(id, false);
        }
        ids.len()
    })
}

pub(crate) fn reset_surfaces() {
    with_surfaces_mut(|tree| *tree = SurfaceTree::new());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_has_initial_values() {
        let mut tree = SurfaceTree::new();
        let id = tree.insert("card".into(), Rect::new(0.0, 0.0, 10.0, 10.0), None);
        let surface = tree.get(id).unwrap();
        assert_eq!(surface.value(Property::Opacity), 1.0);
        assert_eq!(surface.value(Property::Scale), 1.0);
        assert_eq!(surface.value(Property::TranslateY), 0.0);
        assert!(surface.is_visible());
    }

    #[test]
    fn test_stale_id_is_rejected_after_reuse() {
        let mut tree = SurfaceTree::new();
        let first = tree.insert("a".into(), Rect::default(), None);
        tree.remove(first);
        let second = tree.insert("b".into(), Rect::default(), None);

        assert!(!tree.contains(first));
        assert!(tree.contains(second));
        assert!(!tree.write(first, Property::Opacity, 0.0));
        assert_eq!(tree.get(second).unwrap().name(), "b");
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut tree = SurfaceTree::new();
        let root = tree.insert("root".into(), Rect::default(), None);
        let child = tree.insert("child".into(), Rect::default(), Some(root));
        let grandchild = tree.insert("grandchild".into(), Rect::default(), Some(child));
        let sibling = tree.insert("sibling".into(), Rect::default(), None);

        tree.remove(root);

        assert!(!tree.contains(root));
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.contains(sibling));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_remove_child_detaches_from_parent() {
        let mut tree = SurfaceTree::new();
        let root = tree.insert("root".into(), Rect::default(), None);
        let a = tree.insert("a".into(), Rect::default(), Some(root));
        let b = tree.insert("b".into(), Rect::default(), Some(root));

        tree.remove(a);

        assert_eq!(tree.get(root).unwrap().children(), &[b]);
    }

    #[test]
    fn test_visit_is_preorder() {
        let mut tree = SurfaceTree::new();
        let root = tree.insert("root".into(), Rect::default(), None);
        let a = tree.insert("a".into(), Rect::default(), Some(root));
        tree.insert("a1".into(), Rect::default(), Some(a));
        tree.insert("b".into(), Rect::default(), Some(root));

        let mut names = Vec::new();
        tree.visit(root, &mut |_, s| names.push(s.name().to_string()));
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_hide_where_uses_predicate() {
        let root = create_surface("model", Rect::default());
        let floor = create_child(root, "Floor_Plane", Rect::default());
        let body = create_child(root, "Body", Rect::default());

        let hidden = hide_where(root, |name| name.to_lowercase().contains("floor"));

        assert_eq!(hidden, 1);
        assert!(!is_visible(floor));
        assert!(is_visible(body));
        assert!(is_visible(root));
    }
}
