// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural invariant checks over a live scene.
//!
//! Each check returns the first violation it finds. Tests call them after
//! every frame of a scenario, so a regression is reported at the frame that
//! introduced it rather than where it happens to surface.

use std::collections::HashSet;

use halo_core::instance::AssetInstance;
use halo_core::scene::{MaterialId, NodeId, SceneGraph};
use halo_effects::{OverlayClone, OverlayEffect};

/// A broken structural invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// A mesh node appears in two instances.
    #[error("mesh {0:?} belongs to more than one instance")]
    SharedMesh(NodeId),
    /// A material is referenced by two instances.
    #[error("material {0:?} is shared between instances")]
    SharedMaterial(MaterialId),
    /// A published mesh is not under the instance root.
    #[error("published mesh {0:?} is outside its instance root")]
    MeshOutsideRoot(NodeId),
    /// A published mesh is listed twice or has been destroyed.
    #[error("published mesh {0:?} is duplicated or dead")]
    BadMesh(NodeId),
    /// An overlay does not hold exactly one clone per mesh.
    #[error("expected {expected} overlay clones, found {actual}")]
    CloneCount {
        /// Meshes in the published set.
        expected: usize,
        /// Clones the overlay holds.
        actual: usize,
    },
    /// A clone is not the next sibling of its source mesh.
    #[error("clone {clone:?} is not placed beside {mesh:?}")]
    MisplacedClone {
        /// The duplicate.
        clone: NodeId,
        /// The mesh it duplicates.
        mesh: NodeId,
    },
    /// A clone still takes part in hit-testing.
    #[error("clone {0:?} is pickable")]
    PickableClone(NodeId),
    /// A clone draws with a material it does not own.
    #[error("clone {0:?} does not own its material")]
    BorrowedMaterial(NodeId),
    /// A clone survived its teardown.
    #[error("clone {0:?} outlived its overlay")]
    LeakedClone(NodeId),
    /// A clone material survived its teardown.
    #[error("material {0:?} outlived its overlay")]
    LeakedMaterial(MaterialId),
}

/// Checks that a resolved instance publishes each of its own meshes once,
/// all under its root, drawing only with materials it owns.
///
/// An unresolved instance passes trivially.
pub fn check_instance(scene: &SceneGraph, instance: &AssetInstance) -> Result<(), InvariantError> {
    let Some(meshes) = instance.meshes() else {
        return Ok(());
    };
    let under_root: HashSet<NodeId> = scene.descendants(instance.root()).collect();
    let owned: HashSet<MaterialId> = instance.materials().iter().copied().collect();
    let mut seen = HashSet::new();
    for &mesh in meshes.iter() {
        if !scene.is_alive(mesh) || !seen.insert(mesh) {
            return Err(InvariantError::BadMesh(mesh));
        }
        if !under_root.contains(&mesh) {
            return Err(InvariantError::MeshOutsideRoot(mesh));
        }
        match scene.mesh(mesh) {
            Some(m) if owned.contains(&m.material) => {}
            Some(m) => return Err(InvariantError::SharedMaterial(m.material)),
            None => return Err(InvariantError::BadMesh(mesh)),
        }
    }
    Ok(())
}

/// Checks that no mesh node or material handle appears in two instances.
pub fn check_disjoint(instances: &[&AssetInstance]) -> Result<(), InvariantError> {
    let mut meshes = HashSet::new();
    let mut materials = HashSet::new();
    for instance in instances {
        for &mesh in instance.meshes().map(|m| &**m).unwrap_or_default() {
            if !meshes.insert(mesh) {
                return Err(InvariantError::SharedMesh(mesh));
            }
        }
        for &material in instance.materials() {
            if !materials.insert(material) {
                return Err(InvariantError::SharedMaterial(material));
            }
        }
    }
    Ok(())
}

/// Checks that `overlay` holds one well-formed clone per published mesh.
///
/// Each clone must directly follow its source among the source's siblings
/// (or be its child, for a parentless source), be excluded from
/// hit-testing, and draw with a live material no other node uses.
pub fn check_overlay(
    scene: &SceneGraph,
    instance: &AssetInstance,
    overlay: &OverlayEffect,
) -> Result<(), InvariantError> {
    let expected = instance.meshes().map_or(0, |m| m.len());
    let clones = overlay.clones();
    if clones.len() != expected {
        return Err(InvariantError::CloneCount {
            expected,
            actual: clones.len(),
        });
    }
    let sources: HashSet<MaterialId> = instance.materials().iter().copied().collect();
    let mut owned = HashSet::new();
    for clone in clones {
        if !beside(scene, clone) {
            return Err(InvariantError::MisplacedClone {
                clone: clone.node,
                mesh: clone.source,
            });
        }
        if scene.flags(clone.node).raycast {
            return Err(InvariantError::PickableClone(clone.node));
        }
        let draws_own = scene
            .mesh(clone.node)
            .is_some_and(|m| m.material == clone.material);
        if !draws_own
            || !scene.is_material_alive(clone.material)
            || sources.contains(&clone.material)
            || !owned.insert(clone.material)
        {
            return Err(InvariantError::BorrowedMaterial(clone.node));
        }
    }
    Ok(())
}

/// Checks that every clone in `clones` and its material are gone.
pub fn check_released(scene: &SceneGraph, clones: &[OverlayClone]) -> Result<(), InvariantError> {
    for clone in clones {
        if scene.is_alive(clone.node) {
            return Err(InvariantError::LeakedClone(clone.node));
        }
        if scene.is_material_alive(clone.material) {
            return Err(InvariantError::LeakedMaterial(clone.material));
        }
    }
    Ok(())
}

fn beside(scene: &SceneGraph, clone: &OverlayClone) -> bool {
    if !scene.is_alive(clone.node) || !scene.is_alive(clone.source) {
        return false;
    }
    match scene.parent(clone.source) {
        Some(parent) => {
            let mut siblings = scene.children(parent);
            siblings.any(|n| n == clone.source) && siblings.next() == Some(clone.node)
        }
        None => scene.parent(clone.node) == Some(clone.source),
    }
}
