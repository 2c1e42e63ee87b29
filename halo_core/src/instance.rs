// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-use copies of shared assets.
//!
//! An [`AssetInstance`] owns one mount site: a root group in the scene, a
//! scope in the [`Scopes`] tree, and (once the loader resolves) a private
//! copy of the source's template. The copy is rebuilt only when the loader
//! hands back a different [`SharedAsset`]; repeated updates with the same
//! asset leave the clone, its materials, and the published [`MeshSet`]
//! untouched, so effects keyed on mesh-set identity do no work.
//!
//! ```text
//!   host parent
//!       └── root (group, placement applied here)
//!             └── clone root (instantiated template)
//!                   ├── mesh ─┐
//!                   └── group │ published as EffectContext { root, meshes }
//!                         └── mesh
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::task::Poll;

use crate::asset::{AssetLoader, LoadError, SharedAsset, SourceId};
use crate::context::{EffectContext, MeshSet, ScopeId, Scopes};
use crate::scene::{MaterialId, NodeId, SceneGraph};
use crate::trace::{InstanceReleasedEvent, InstanceResolvedEvent, InstanceSuspendedEvent, Tracer};
use crate::transform::{Placement, Transform3d};

/// Mount-time configuration for an [`AssetInstance`].
#[derive(Clone, Debug)]
pub struct AssetInstanceProps {
    /// The asset to load.
    pub source: SourceId,
    /// Placement of the root group; `None` leaves it at the identity.
    pub placement: Option<Placement>,
    /// Node the root group is attached under; `None` mounts it as a scene root.
    pub parent: Option<NodeId>,
}

impl AssetInstanceProps {
    /// Props for `source` with no placement and no parent.
    #[must_use]
    pub fn new(source: impl Into<SourceId>) -> Self {
        Self {
            source: source.into(),
            placement: None,
            parent: None,
        }
    }

    /// Sets the placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Sets the host parent.
    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

#[derive(Debug)]
struct Resolved {
    asset: SharedAsset,
    clone_root: NodeId,
    materials: Vec<MaterialId>,
    meshes: MeshSet,
}

/// One mounted copy of a shared asset.
#[derive(Debug)]
pub struct AssetInstance {
    scope: ScopeId,
    root: NodeId,
    source: SourceId,
    placement: Option<Placement>,
    resolved: Option<Resolved>,
}

impl AssetInstance {
    /// Creates the root group and scope. Nothing is loaded until
    /// [`update`](Self::update).
    ///
    /// Components that should see this instance's context must be given
    /// [`scope`](Self::scope) or a scope nested beneath it.
    ///
    /// # Panics
    ///
    /// Panics if `parent_scope` or `props.parent` is stale.
    pub fn mount(
        scene: &mut SceneGraph,
        scopes: &mut Scopes,
        parent_scope: Option<ScopeId>,
        props: AssetInstanceProps,
    ) -> Self {
        let root = scene.create_group();
        scene.set_name(root, props.source.as_str());
        if let Some(placement) = props.placement {
            scene.set_transform(root, placement.to_transform());
        }
        if let Some(parent) = props.parent {
            scene.add_child(parent, root);
        }
        Self {
            scope: scopes.create_scope(parent_scope),
            root,
            source: props.source,
            placement: props.placement,
            resolved: None,
        }
    }

    /// The scope this instance provides its context on.
    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The mounted root group. Stable for the instance's whole lifetime.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The source currently requested.
    #[must_use]
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// The current placement.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// Whether a clone is mounted and published.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// The published mesh set, once resolved.
    #[must_use]
    pub fn meshes(&self) -> Option<&MeshSet> {
        self.resolved.as_ref().map(|r| &r.meshes)
    }

    /// Root of the current clone, once resolved.
    #[must_use]
    pub fn clone_root(&self) -> Option<NodeId> {
        self.resolved.as_ref().map(|r| r.clone_root)
    }

    /// Materials this instance owns, one per mesh of the current clone.
    #[must_use]
    pub fn materials(&self) -> &[MaterialId] {
        self.resolved.as_ref().map_or(&[], |r| &r.materials)
    }

    /// Requests a different source. Takes effect on the next
    /// [`update`](Self::update); the current clone stays mounted until the
    /// new source resolves.
    pub fn set_source(&mut self, source: impl Into<SourceId>) {
        self.source = source.into();
    }

    /// Applies a new placement to the root group if it differs from the
    /// current one.
    pub fn set_placement(&mut self, scene: &mut SceneGraph, placement: Option<Placement>) {
        if placement == self.placement {
            return;
        }
        let transform = placement.map_or(Transform3d::IDENTITY, |p| p.to_transform());
        scene.set_transform(self.root, transform);
        self.placement = placement;
    }

    /// Resolves the source and, if the loader returned a different asset
    /// than the one currently cloned, rebuilds the clone and republishes
    /// the context.
    ///
    /// Returns [`Poll::Pending`] while the loader is still working; nothing
    /// changes in that case. Load errors are passed through and also leave
    /// the current clone (if any) in place.
    pub fn update(
        &mut self,
        scene: &mut SceneGraph,
        scopes: &mut Scopes,
        loader: &mut dyn AssetLoader,
        tracer: &mut Tracer<'_>,
    ) -> Poll<Result<(), LoadError>> {
        let asset = match loader.load(&self.source) {
            Poll::Pending => {
                tracer.instance_suspended(&InstanceSuspendedEvent {
                    source: &self.source,
                    root: self.root,
                });
                return Poll::Pending;
            }
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Ready(Ok(asset)) => asset,
        };
        if self
            .resolved
            .as_ref()
            .is_some_and(|r| Arc::ptr_eq(&r.asset, &asset))
        {
            return Poll::Ready(Ok(()));
        }

        let replaced = self.release(scene, tracer);
        let copy = scene.instantiate(&asset);
        scene.add_child(self.root, copy.root);
        // Computed once per clone; overlays later attached inside the clone
        // must not show up here.
        let meshes = MeshSet::new(
            scene
                .descendants(copy.root)
                .filter(|&id| scene.is_mesh(id))
                .collect(),
        );
        scopes.provide(
            self.scope,
            EffectContext {
                root: self.root,
                meshes: meshes.clone(),
            },
        );
        tracer.instance_resolved(&InstanceResolvedEvent {
            source: &self.source,
            root: self.root,
            clone_root: copy.root,
            mesh_count: meshes.len(),
            replaced,
        });
        self.resolved = Some(Resolved {
            asset,
            clone_root: copy.root,
            materials: copy.materials,
            meshes,
        });
        Poll::Ready(Ok(()))
    }

    /// Withdraws the context and destroys everything under the root group.
    ///
    /// Only the instance's own materials are disposed; anything another
    /// component attached inside the subtree loses its nodes but keeps its
    /// materials for its owner to release.
    ///
    /// # Panics
    ///
    /// Panics if scopes nested under [`scope`](Self::scope) are still alive.
    pub fn unmount(mut self, scene: &mut SceneGraph, scopes: &mut Scopes, tracer: &mut Tracer<'_>) {
        let _ = scopes.revoke(self.scope);
        self.release(scene, tracer);
        if scene.is_alive(self.root) {
            scene.destroy_subtree(self.root);
        }
        scopes.destroy_scope(self.scope);
    }

    fn release(&mut self, scene: &mut SceneGraph, tracer: &mut Tracer<'_>) -> bool {
        let Some(resolved) = self.resolved.take() else {
            return false;
        };
        let nodes_destroyed = if scene.is_alive(resolved.clone_root) {
            scene.destroy_subtree(resolved.clone_root)
        } else {
            0
        };
        for &material in &resolved.materials {
            scene.dispose_material(material);
        }
        tracer.instance_released(&InstanceReleasedEvent {
            root: self.root,
            nodes_destroyed,
            materials_disposed: resolved.materials.len(),
        });
        true
    }
}
