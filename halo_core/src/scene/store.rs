// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::sync::Arc;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::transform::Transform3d;

use super::id::{GeometryId, INVALID, MaterialId, NodeId};
use super::materials::MaterialStore;
use super::traverse::{Children, Descendants};

/// Per-node boolean flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the node (and its subtree) is hidden.
    pub hidden: bool,
    /// Whether ray/pointer hit-testing considers this node.
    pub raycast: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            hidden: false,
            raycast: true,
        }
    }
}

/// The drawable content of a mesh node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mesh {
    /// Shared vertex data.
    pub geometry: GeometryId,
    /// The material this node draws with.
    pub material: MaterialId,
}

/// Struct-of-arrays storage for a scene's nodes and materials.
///
/// Nodes are either groups (no content) or meshes (geometry plus material).
/// Destroyed nodes are recycled through a free list and generation counters
/// reject stale handles.
#[derive(Debug)]
pub struct SceneGraph {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties --
    pub(crate) name: Vec<Option<Arc<str>>>,
    pub(crate) mesh: Vec<Option<Mesh>>,
    pub(crate) local_transform: Vec<Transform3d>,
    pub(crate) flags: Vec<NodeFlags>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Transform3d>,
    pub(crate) effective_hidden: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Materials --
    pub(crate) materials: MaterialStore,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates an empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            name: Vec::new(),
            mesh: Vec::new(),
            local_transform: Vec::new(),
            flags: Vec::new(),
            world_transform: Vec::new(),
            effective_hidden: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            materials: MaterialStore::default(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a detached group node.
    pub fn create_group(&mut self) -> NodeId {
        self.alloc(None)
    }

    /// Creates a detached mesh node drawing `geometry` with `material`.
    ///
    /// # Panics
    ///
    /// Panics if `material` has been disposed.
    pub fn create_mesh(&mut self, geometry: GeometryId, material: MaterialId) -> NodeId {
        self.materials.validate(material);
        self.alloc(Some(Mesh { geometry, material }))
    }

    pub(super) fn alloc(&mut self, mesh: Option<Mesh>) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            // The slot's generation was bumped on destroy; bump again so the
            // new handle differs from every handle issued before.
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.name[i] = None;
            self.mesh[i] = mesh;
            self.local_transform[i] = Transform3d::IDENTITY;
            self.flags[i] = NodeFlags::default();
            self.world_transform[i] = Transform3d::IDENTITY;
            self.effective_hidden[i] = false;
            self.live[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.name.push(None);
            self.mesh.push(mesh);
            self.local_transform.push(Transform3d::IDENTITY);
            self.flags.push(NodeFlags::default());
            self.world_transform.push(Transform3d::IDENTITY);
            self.effective_hidden.push(false);
            self.generation.push(0);
            self.live.push(true);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a leaf node, freeing its slot for reuse.
    ///
    /// The node's material, if any, is left alive: materials are released
    /// by whoever owns them via [`dispose_material`](Self::dispose_material).
    ///
    /// # Panics
    ///
    /// Panics if the node has children or if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        self.dirty.remove_key(idx);

        self.generation[idx as usize] += 1;
        self.live[idx as usize] = false;
        self.mesh[idx as usize] = None;
        self.name[idx as usize] = None;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }

    /// Detaches `root` and destroys it together with every descendant.
    ///
    /// Returns how many nodes were destroyed. Materials are not disposed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_subtree(&mut self, root: NodeId) -> usize {
        self.validate(root);
        if self.parent[root.idx as usize] != INVALID {
            self.remove_from_parent(root);
        }
        let doomed: Vec<NodeId> = self.descendants(root).collect();
        // Reverse pre-order visits every child before its parent.
        for &id in doomed.iter().rev() {
            self.destroy_node(id);
        }
        doomed.len()
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `parent` lies inside `child`'s subtree.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            !self.is_ancestor_or_self(c, p),
            "cannot attach a node beneath itself"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.link_dirty(c, p);
    }

    /// Inserts `child` directly after `sibling` under `sibling`'s parent.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or
    /// `sibling` has no parent.
    pub fn insert_after(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        assert!(
            !self.is_ancestor_or_self(c, p),
            "cannot attach a node beneath itself"
        );

        let next = self.next_sibling[s as usize];
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = s;
        self.next_sibling[c as usize] = next;
        self.next_sibling[s as usize] = c;
        if next != INVALID {
            self.prev_sibling[next as usize] = c;
        }

        self.link_dirty(c, p);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a node, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns a depth-first pre-order iterator over `root` and its
    /// descendants, visiting children in order.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        self.validate(root);
        Descendants::new(self, root.idx)
    }

    /// Returns the live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.live[idx as usize] && self.parent[idx as usize] == INVALID)
            .map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters --

    /// Returns the node's name, if one was set.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.name[id.idx as usize].as_deref()
    }

    /// Returns the node's mesh content, or `None` for a group.
    #[must_use]
    pub fn mesh(&self, id: NodeId) -> Option<Mesh> {
        self.validate(id);
        self.mesh[id.idx as usize]
    }

    /// Returns whether the node is a mesh.
    #[must_use]
    pub fn is_mesh(&self, id: NodeId) -> bool {
        self.mesh(id).is_some()
    }

    /// Returns the local transform of a node.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the computed world transform.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns whether the node is hidden directly or through an ancestor.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn effective_hidden(&self, id: NodeId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets a node's name.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<Arc<str>>) {
        self.validate(id);
        self.name[id.idx as usize] = Some(name.into());
    }

    /// Sets the local transform, propagating to descendants on evaluate.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform3d) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Replaces the material a mesh node draws with.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a mesh or either handle is stale.
    pub fn set_material(&mut self, id: NodeId, material: MaterialId) {
        self.validate(id);
        self.materials.validate(material);
        let mesh = self.mesh[id.idx as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("{id:?} is not a mesh"));
        mesh.material = material;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.validate(id);
        let old = core::mem::replace(&mut self.flags[id.idx as usize], flags);
        if old.hidden != flags.hidden {
            self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        }
        if old.raycast != flags.raycast {
            self.dirty.mark(id.idx, dirty::FLAGS);
        }
    }

    /// Sets whether hit-testing considers this node.
    pub fn set_raycast(&mut self, id: NodeId, raycast: bool) {
        let flags = NodeFlags {
            raycast,
            ..self.flags(id)
        };
        self.set_flags(id, flags);
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns whether `ancestor` is `idx` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    fn link_dirty(&mut self, c: u32, p: u32) {
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::material::Material;

    fn mesh_node(scene: &mut SceneGraph, geometry: u32) -> NodeId {
        let m = scene.create_material(Material::default());
        scene.create_mesh(GeometryId(geometry), m)
    }

    #[test]
    fn create_and_destroy() {
        let mut scene = SceneGraph::new();
        let id = scene.create_group();
        assert!(scene.is_alive(id));
        assert_eq!(scene.node_count(), 1);
        scene.destroy_node(id);
        assert!(!scene.is_alive(id));
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut scene = SceneGraph::new();
        let a = scene.create_group();
        scene.destroy_node(a);
        let b = scene.create_group();
        assert_eq!(a.index(), b.index());
        assert!(!scene.is_alive(a));
        assert!(scene.is_alive(b));
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut scene = SceneGraph::new();
        let p = scene.create_group();
        let a = scene.create_group();
        let b = scene.create_group();
        scene.add_child(p, a);
        scene.add_child(p, b);
        assert_eq!(scene.children(p).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(scene.parent(b), Some(p));
    }

    #[test]
    fn insert_after_places_node_beside_sibling() {
        let mut scene = SceneGraph::new();
        let p = scene.create_group();
        let a = scene.create_group();
        let c = scene.create_group();
        let b = scene.create_group();
        let d = scene.create_group();
        scene.add_child(p, a);
        scene.add_child(p, c);
        scene.insert_after(b, a);
        scene.insert_after(d, c);
        assert_eq!(scene.children(p).collect::<Vec<_>>(), vec![a, b, c, d]);
    }

    #[test]
    fn remove_from_parent_unlinks() {
        let mut scene = SceneGraph::new();
        let p = scene.create_group();
        let a = scene.create_group();
        let b = scene.create_group();
        scene.add_child(p, a);
        scene.add_child(p, b);
        scene.remove_from_parent(a);
        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.children(p).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn roots_lists_parentless_live_nodes() {
        let mut scene = SceneGraph::new();
        let a = scene.create_group();
        let b = scene.create_group();
        let c = scene.create_group();
        scene.add_child(a, c);
        scene.destroy_node(b);
        assert_eq!(scene.roots(), vec![a]);
    }

    #[test]
    fn destroy_subtree_frees_every_descendant_but_not_materials() {
        let mut scene = SceneGraph::new();
        let host = scene.create_group();
        let root = scene.create_group();
        let mid = scene.create_group();
        let leaf = mesh_node(&mut scene, 1);
        scene.add_child(host, root);
        scene.add_child(root, mid);
        scene.add_child(mid, leaf);
        let material = scene.mesh(leaf).map(|m| m.material);

        assert_eq!(scene.destroy_subtree(root), 3);
        assert!(!scene.is_alive(leaf));
        assert!(scene.children(host).next().is_none());
        assert!(material.is_some_and(|m| scene.is_material_alive(m)));
    }

    #[test]
    fn set_flags_only_marks_changed_channels() {
        let mut scene = SceneGraph::new();
        let id = scene.create_group();
        let _ = scene.evaluate();

        scene.set_raycast(id, false);
        let changes = scene.evaluate();
        assert_eq!(changes.flags, vec![id.index()]);
        assert!(changes.transforms.is_empty(), "hidden did not change");
        assert!(!scene.flags(id).raycast);
    }

    #[test]
    fn set_material_swaps_content() {
        let mut scene = SceneGraph::new();
        let id = mesh_node(&mut scene, 7);
        let other = scene.create_material(Material::new(crate::color::Color::RED));
        let _ = scene.evaluate();

        scene.set_material(id, other);
        assert_eq!(scene.mesh(id).map(|m| m.material), Some(other));
        let changes = scene.evaluate();
        assert!(changes.content.contains(&id.index()));
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut scene = SceneGraph::new();
        let p = scene.create_group();
        let c = scene.create_group();
        scene.add_child(p, c);
        scene.destroy_node(p);
    }

    #[test]
    #[should_panic(expected = "cannot attach a node beneath itself")]
    fn cycles_are_rejected() {
        let mut scene = SceneGraph::new();
        let a = scene.create_group();
        let b = scene.create_group();
        scene.add_child(a, b);
        scene.add_child(b, a);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_parent() {
        let mut scene = SceneGraph::new();
        let id = scene.create_group();
        scene.destroy_node(id);
        let _ = scene.parent(id);
    }

    #[test]
    #[should_panic(expected = "is not a mesh")]
    fn set_material_on_group_panics() {
        let mut scene = SceneGraph::new();
        let g = scene.create_group();
        let m = scene.create_material(Material::default());
        scene.set_material(g, m);
    }
}
