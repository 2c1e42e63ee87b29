// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation drains each dirty channel once per frame:
//!
//! 1. **TRANSFORM**: recompute `world_transform = parent_world * local` and
//!    `effective_hidden = parent_hidden || flags.hidden`, parents first.
//! 2. **CONTENT** / **FLAGS**: collect only; backends read current values.
//! 3. **TOPOLOGY**: discard (the traversal order is rebuilt up front).
//! 4. Material creations, updates, and disposals queued by the material
//!    store are deduplicated and moved into the result.
//!
//! [`SceneChanges`] carries raw slot indices so a backend can key its own
//! resource tables without re-validating handles. Slots are reused, so each
//! list describes the slot's state at evaluate time, not its history:
//!
//! - A material slot freed and filled again before evaluate appears only in
//!   `created_materials`. Its old GPU copy is replaced, never released.
//! - A node slot freed and filled again appears in both `removed` and
//!   `added`. Apply `removed` first.
//! - A node or material created and destroyed between two evaluates is never
//!   `added` or `created_materials`; its slot may still appear in `removed`
//!   or `disposed_materials`, which a backend that never saw it ignores.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::SceneGraph;
use crate::dirty;
use crate::transform::Transform3d;

/// The set of changes produced by a single [`SceneGraph::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Nodes whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes that became effectively hidden.
    pub hidden: Vec<u32>,
    /// Nodes that became visible again.
    pub unhidden: Vec<u32>,
    /// Mesh nodes whose geometry or material handle changed.
    pub content: Vec<u32>,
    /// Nodes whose raycast participation changed.
    pub flags: Vec<u32>,
    /// Material slots holding a material created since the last evaluate.
    pub created_materials: Vec<u32>,
    /// Material slots edited since the last evaluate, excluding those in
    /// `created_materials`.
    pub materials: Vec<u32>,
    /// Material slots that are empty now and were not empty after the last
    /// evaluate.
    pub disposed_materials: Vec<u32>,
    /// Live nodes created since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last evaluate. Applied before `added`.
    pub removed: Vec<u32>,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.content.clear();
        self.flags.clear();
        self.created_materials.clear();
        self.materials.clear();
        self.disposed_materials.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.hidden.is_empty()
            && self.unhidden.is_empty()
            && self.content.is_empty()
            && self.flags.is_empty()
            && self.created_materials.is_empty()
            && self.materials.is_empty()
            && self.disposed_materials.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl SceneGraph {
    /// Evaluates the scene, recomputing dirty properties and returning the
    /// set of changes.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let live = &self.live;
        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .filter(|&idx| live[idx as usize])
            .collect();
        for &idx in &dirty_transforms {
            let i = idx as usize;
            let p = self.parent[i];
            let (parent_world, parent_hidden) = if p != INVALID {
                (self.world_transform[p as usize], self.effective_hidden[p as usize])
            } else {
                (Transform3d::IDENTITY, false)
            };
            self.world_transform[i] = parent_world * self.local_transform[i];

            let hidden = parent_hidden || self.flags[i].hidden;
            if hidden != self.effective_hidden[i] {
                if hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[i] = hidden;
            }
        }
        changes.transforms = dirty_transforms;

        changes.content = self.drain_local(dirty::CONTENT);
        changes.flags = self.drain_local(dirty::FLAGS);
        let _ = self.drain_local(dirty::TOPOLOGY);

        let mut created = core::mem::take(&mut self.materials.pending_created);
        let mut updated = core::mem::take(&mut self.materials.pending_updated);
        let mut disposed = core::mem::take(&mut self.materials.pending_disposed);
        let materials = &self.materials;
        dedup(&mut created);
        dedup(&mut updated);
        dedup(&mut disposed);
        created.retain(|&idx| materials.slot_occupied(idx));
        updated.retain(|&idx| materials.slot_occupied(idx) && !created.contains(&idx));
        disposed.retain(|&idx| !materials.slot_occupied(idx));
        changes.created_materials = created;
        changes.materials = updated;
        changes.disposed_materials = disposed;

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        dedup(&mut changes.added);
        dedup(&mut changes.removed);
        let live = &self.live;
        changes.added.retain(|&idx| live[idx as usize]);
    }

    /// Returns the current traversal order (depth-first pre-order over all roots).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Returns the meshes under `root` that hit-testing would consider:
    /// visible meshes whose raycast flag is set, in traversal order.
    ///
    /// Visibility is read from the last [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn pickable(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| {
                let i = id.idx as usize;
                self.mesh[i].is_some() && self.flags[i].raycast && !self.effective_hidden[i]
            })
            .collect()
    }

    fn drain_local(&mut self, channel: understory_dirty::Channel) -> Vec<u32> {
        let live = &self.live;
        self.dirty
            .drain(channel)
            .deterministic()
            .run()
            .filter(|&idx| live[idx as usize])
            .collect()
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.live[idx as usize] && self.parent[idx as usize] == INVALID {
                let root = self.handle(idx);
                let order: Vec<u32> = self.descendants(root).map(NodeId::index).collect();
                self.traversal_order.extend(order);
            }
        }
    }
}

/// Drops repeated entries, keeping the first occurrence of each.
fn dedup(list: &mut Vec<u32>) {
    let mut seen = Vec::with_capacity(list.len());
    list.retain(|idx| {
        if seen.contains(idx) {
            return false;
        }
        seen.push(*idx);
        true
    });
}
