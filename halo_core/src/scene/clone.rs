// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node cloning and template instantiation.

use alloc::vec::Vec;

use understory_dirty::EagerPolicy;

use crate::asset::SceneTemplate;
use crate::dirty;

use super::id::{MaterialId, NodeId};
use super::store::SceneGraph;

/// The result of [`SceneGraph::instantiate`].
#[derive(Clone, Debug)]
pub struct Instantiation {
    /// The detached root group of the copy.
    pub root: NodeId,
    /// One freshly created material per mesh node, in traversal order.
    ///
    /// These belong to whoever instantiated the template.
    pub materials: Vec<MaterialId>,
}

impl SceneGraph {
    /// Creates a detached copy of a single node.
    ///
    /// Name, transform, flags, and mesh content are copied. Geometry and
    /// material handles are shared with the source; children are not copied.
    ///
    /// # Panics
    ///
    /// Panics if `src` is stale.
    pub fn clone_node(&mut self, src: NodeId) -> NodeId {
        self.validate(src);
        let i = src.idx as usize;
        let (mesh, name, transform, flags) = (
            self.mesh[i],
            self.name[i].clone(),
            self.local_transform[i],
            self.flags[i],
        );
        let id = self.alloc(mesh);
        let j = id.idx as usize;
        self.name[j] = name;
        self.local_transform[j] = transform;
        self.flags[j] = flags;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        id
    }

    /// Deep-copies a template into this graph.
    ///
    /// Every mesh node receives its own material, copied from the template's
    /// material table, so no two instances (and no two meshes within one
    /// instance) share a mutable material even where the template does.
    /// Child order matches the template.
    pub fn instantiate(&mut self, template: &SceneTemplate) -> Instantiation {
        let mut ids = Vec::with_capacity(template.len());
        for node in template.nodes() {
            let id = match node.mesh {
                Some(mesh) => {
                    let material = self.create_material(template.material(mesh.material).duplicate());
                    self.create_mesh(mesh.geometry, material)
                }
                None => self.create_group(),
            };
            if let Some(name) = &node.name {
                self.set_name(id, name.clone());
            }
            self.set_transform(id, node.transform);
            ids.push(id);
        }
        for (parent, node) in ids.iter().zip(template.nodes()) {
            for &child in node.children() {
                self.add_child(*parent, ids[child]);
            }
        }

        let root = ids[SceneTemplate::ROOT];
        let materials = self
            .descendants(root)
            .filter_map(|id| self.mesh(id).map(|m| m.material))
            .collect();
        Instantiation { root, materials }
    }
}
