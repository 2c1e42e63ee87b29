// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational material storage.

use alloc::vec::Vec;

use crate::material::Material;

use super::id::MaterialId;
use super::store::SceneGraph;

#[derive(Debug, Default)]
pub(crate) struct MaterialStore {
    slots: Vec<Option<Material>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    pub(crate) pending_created: Vec<u32>,
    pub(crate) pending_updated: Vec<u32>,
    pub(crate) pending_disposed: Vec<u32>,
}

impl MaterialStore {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "material slot counts stay far below u32::MAX"
    )]
    fn insert(&mut self, material: Material) -> MaterialId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generation[idx as usize] += 1;
            self.slots[idx as usize] = Some(material);
            idx
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Some(material));
            self.generation.push(0);
            idx
        };
        self.pending_created.push(idx);
        MaterialId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn is_alive(&self, id: MaterialId) -> bool {
        self.generation
            .get(id.idx as usize)
            .is_some_and(|&g| g == id.generation)
            && self.slots[id.idx as usize].is_some()
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: MaterialId) {
        assert!(self.is_alive(id), "stale MaterialId: {id:?}");
    }

    fn get(&self, id: MaterialId) -> &Material {
        match self.slots.get(id.idx as usize) {
            Some(Some(m)) if self.generation[id.idx as usize] == id.generation => m,
            _ => panic!("stale MaterialId: {id:?}"),
        }
    }

    fn get_mut(&mut self, id: MaterialId) -> &mut Material {
        match self.slots.get_mut(id.idx as usize) {
            Some(Some(m)) if self.generation[id.idx as usize] == id.generation => m,
            _ => panic!("stale MaterialId: {id:?}"),
        }
    }

    fn remove(&mut self, id: MaterialId) {
        self.validate(id);
        self.slots[id.idx as usize] = None;
        self.generation[id.idx as usize] += 1;
        self.free_list.push(id.idx);
        self.pending_disposed.push(id.idx);
    }

    pub(crate) fn slot_occupied(&self, idx: u32) -> bool {
        self.slots.get(idx as usize).is_some_and(Option::is_some)
    }

    fn slot(&self, idx: u32) -> Option<&Material> {
        self.slots.get(idx as usize).and_then(Option::as_ref)
    }

    fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl SceneGraph {
    /// Adds a material and returns its handle.
    ///
    /// The slot is reported in the next
    /// [`SceneChanges::created_materials`](super::SceneChanges::created_materials).
    pub fn create_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    /// Creates an independent copy of an existing material.
    ///
    /// The copy starts at version 0 and shares nothing with the original,
    /// so edits to either never reach the other.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn clone_material(&mut self, id: MaterialId) -> MaterialId {
        let copy = self.materials.get(id).duplicate();
        self.materials.insert(copy)
    }

    /// Returns a material's current properties.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use]
    pub fn material(&self, id: MaterialId) -> &Material {
        self.materials.get(id)
    }

    /// Returns the material occupying a raw slot index, as listed in
    /// [`SceneChanges`](super::SceneChanges), or `None` for an empty slot.
    #[must_use]
    pub fn material_at(&self, idx: u32) -> Option<&Material> {
        self.materials.slot(idx)
    }

    /// Edits a material in place and flags it for re-upload.
    ///
    /// The material's version is bumped and its slot is reported in the next
    /// [`SceneChanges::materials`](super::SceneChanges::materials).
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn update_material<R>(&mut self, id: MaterialId, edit: impl FnOnce(&mut Material) -> R) -> R {
        let material = self.materials.get_mut(id);
        let out = edit(material);
        material.version = material.version.wrapping_add(1);
        self.materials.pending_updated.push(id.idx);
        out
    }

    /// Releases a material.
    ///
    /// The slot is queued in [`SceneChanges::disposed_materials`](super::SceneChanges::disposed_materials)
    /// so the backend can free its GPU-side copy, unless a new material
    /// takes the slot before the next evaluate. Mesh nodes still
    /// referencing the material must be destroyed or re-pointed first.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale, including when it was already disposed.
    pub fn dispose_material(&mut self, id: MaterialId) {
        self.materials.remove(id);
    }

    /// Returns whether the material handle is still live.
    #[must_use]
    pub fn is_material_alive(&self, id: MaterialId) -> bool {
        self.materials.is_alive(id)
    }

    /// Returns the number of live materials.
    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.live_count()
    }
}
