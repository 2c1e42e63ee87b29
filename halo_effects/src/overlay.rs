// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tinted overlay duplicates.
//!
//! An [`OverlayEffect`] owns a set of [`OverlayClone`]s, one per mesh of
//! the instance it is mounted in. [`sync`](OverlayEffect::sync) runs one of
//! two triggers per call:
//!
//! 1. **Structural**: the published mesh set is not the one the clones were
//!    built for. All clones are torn down, then one fresh clone is built per
//!    mesh with the current config.
//! 2. **Config**: same mesh set, different color or opacity. Every clone's
//!    material is edited in place; no node is created or destroyed.
//!
//! Structural sync already applies the current config, so when both change
//! in the same frame only the structural trigger runs and each old clone is
//! torn down once.

use alloc::vec::Vec;

use halo_core::color::Color;
use halo_core::context::{MeshSet, ScopeId, Scopes};
use halo_core::scene::{MaterialId, NodeId, SceneGraph};
use halo_core::trace::{OverlaySyncEvent, OverlaySyncKind, OverlayTeardownEvent, Tracer};
use halo_core::transform::Transform3d;

/// Overlay tint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Tint color.
    pub color: Color,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl OverlayConfig {
    /// A tint of `color` at opacity 0.5.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            opacity: 0.5,
        }
    }

    /// Sets the opacity, clamped to `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `opacity` is NaN.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        assert!(!opacity.is_nan(), "overlay opacity must not be NaN");
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// One duplicate owned by an [`OverlayEffect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayClone {
    /// The mesh this duplicates.
    pub source: NodeId,
    /// The duplicate node.
    pub node: NodeId,
    /// The duplicate's own material.
    pub material: MaterialId,
}

/// Keeps a translucent, non-pickable duplicate beside every mesh of the
/// enclosing instance.
#[derive(Debug)]
pub struct OverlayEffect {
    scope: ScopeId,
    config: OverlayConfig,
    /// Config the clones currently show.
    applied: OverlayConfig,
    /// Mesh set the clones were built for.
    built_for: Option<MeshSet>,
    clones: Vec<OverlayClone>,
    mesh_set_version: u64,
}

impl OverlayEffect {
    /// Mounts the effect in `scope`. No clones exist until the first
    /// [`sync`](Self::sync).
    ///
    /// # Panics
    ///
    /// Panics if no enclosing scope provides an effect context.
    pub fn mount(scopes: &Scopes, scope: ScopeId, config: OverlayConfig) -> Self {
        let _ = scopes.effect_data(scope);
        Self {
            scope,
            config,
            applied: config,
            built_for: None,
            clones: Vec::new(),
            mesh_set_version: 0,
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> OverlayConfig {
        self.config
    }

    /// Replaces the configuration; applied on the next sync.
    pub fn set_config(&mut self, config: OverlayConfig) {
        self.config = config;
    }

    /// Sets the tint color; applied on the next sync.
    pub fn set_color(&mut self, color: Color) {
        self.config.color = color;
    }

    /// Sets the opacity (clamped to `[0, 1]`); applied on the next sync.
    ///
    /// # Panics
    ///
    /// Panics if `opacity` is NaN.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.config = self.config.with_opacity(opacity);
    }

    /// The clones currently owned, in mesh-set order.
    #[must_use]
    pub fn clones(&self) -> &[OverlayClone] {
        &self.clones
    }

    /// How many structural syncs have run. Config syncs leave it unchanged.
    #[must_use]
    pub fn mesh_set_version(&self) -> u64 {
        self.mesh_set_version
    }

    /// Brings the clones in line with the enclosing instance's mesh set and
    /// the current config. Returns which trigger ran, if any.
    ///
    /// # Panics
    ///
    /// Panics if the providing instance has been unmounted.
    pub fn sync(
        &mut self,
        scene: &mut SceneGraph,
        scopes: &Scopes,
        tracer: &mut Tracer<'_>,
    ) -> Option<OverlaySyncKind> {
        let meshes = &scopes.effect_data(self.scope).meshes;
        let kind = if !self.built_for.as_ref().is_some_and(|b| b.same(meshes)) {
            self.teardown(scene, tracer);
            self.build(scene, meshes);
            self.built_for = Some(meshes.clone());
            self.mesh_set_version += 1;
            OverlaySyncKind::Structural
        } else if self.applied != self.config {
            let OverlayConfig { color, opacity } = self.config;
            for clone in &self.clones {
                scene.update_material(clone.material, |m| {
                    m.color = color;
                    m.opacity = opacity;
                });
            }
            OverlaySyncKind::Config
        } else {
            return None;
        };
        self.applied = self.config;
        tracer.overlay_sync(&OverlaySyncEvent {
            kind,
            clones: self.clones.len(),
        });
        Some(kind)
    }

    /// Removes every clone and releases every clone material.
    ///
    /// Clones already destroyed by the removal of an ancestor (for example
    /// the instance rebuilding its clone first) are skipped, but their
    /// materials are still released.
    pub fn unmount(mut self, scene: &mut SceneGraph, tracer: &mut Tracer<'_>) {
        self.teardown(scene, tracer);
    }

    fn build(&mut self, scene: &mut SceneGraph, meshes: &MeshSet) {
        self.clones.reserve(meshes.len());
        for &source in meshes.iter() {
            let Some(mesh) = scene.mesh(source) else {
                continue;
            };
            let material = scene.clone_material(mesh.material);
            let config = self.config;
            scene.update_material(material, |m| {
                m.color = config.color;
                m.opacity = config.opacity;
                m.transparent = true;
                m.depth_write = false;
            });

            let node = scene.clone_node(source);
            scene.set_material(node, material);
            scene.set_raycast(node, false);
            if scene.parent(source).is_some() {
                scene.insert_after(node, source);
            } else {
                // Parentless source: hang the duplicate off the source itself,
                // where it must not apply the source's transform twice.
                scene.set_transform(node, Transform3d::IDENTITY);
                scene.add_child(source, node);
            }
            self.clones.push(OverlayClone {
                source,
                node,
                material,
            });
        }
    }

    fn teardown(&mut self, scene: &mut SceneGraph, tracer: &mut Tracer<'_>) {
        let clones = core::mem::take(&mut self.clones);
        self.built_for = None;
        if clones.is_empty() {
            return;
        }
        let mut detached = 0;
        for clone in &clones {
            if scene.is_alive(clone.node) {
                scene.destroy_subtree(clone.node);
                detached += 1;
            }
            scene.dispose_material(clone.material);
        }
        tracer.overlay_teardown(&OverlayTeardownEvent {
            detached,
            skipped: clones.len() - detached,
            materials_released: clones.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use halo_core::context::EffectContext;
    use halo_core::material::Material;
    use halo_core::scene::GeometryId;

    use super::*;

    struct Fixture {
        scene: SceneGraph,
        scopes: Scopes,
        scope: ScopeId,
        root: NodeId,
        meshes: MeshSet,
    }

    impl Fixture {
        /// A root group holding `n` meshes, published on a fresh scope.
        fn new(n: u32) -> Self {
            let mut scene = SceneGraph::new();
            let mut scopes = Scopes::new();
            let root = scene.create_group();
            let nodes = (0..n)
                .map(|i| {
                    let m = scene.create_material(Material::new(Color::WHITE));
                    let mesh = scene.create_mesh(GeometryId(i), m);
                    scene.add_child(root, mesh);
                    mesh
                })
                .collect();
            let meshes = MeshSet::new(nodes);
            let scope = scopes.create_scope(None);
            scopes.provide(
                scope,
                EffectContext {
                    root,
                    meshes: meshes.clone(),
                },
            );
            Self {
                scene,
                scopes,
                scope,
                root,
                meshes,
            }
        }

        fn republish(&mut self, nodes: Vec<NodeId>) {
            self.meshes = MeshSet::new(nodes);
            self.scopes.provide(
                self.scope,
                EffectContext {
                    root: self.root,
                    meshes: self.meshes.clone(),
                },
            );
        }

        fn sync(&mut self, overlay: &mut OverlayEffect) -> Option<OverlaySyncKind> {
            overlay.sync(&mut self.scene, &self.scopes, &mut Tracer::none())
        }
    }

    fn red(opacity: f32) -> OverlayConfig {
        OverlayConfig::new(Color::RED).with_opacity(opacity)
    }

    #[test]
    fn first_sync_builds_one_clone_per_mesh() {
        let mut f = Fixture::new(3);
        let mut overlay = OverlayEffect::mount(&f.scopes, f.scope, red(0.3));
        assert!(overlay.clones().is_empty());

        assert_eq!(f.sync(&mut overlay), Some(OverlaySyncKind::Structural));
        assert_eq!(overlay.clones().len(), 3);
        for (clone, &source) in overlay.clones().iter().zip(f.meshes.iter()) {
            assert_eq!(clone.source, source);
            assert_eq!(f.scene.parent(clone.node), Some(f.root));
            assert!(!f.scene.flags(clone.node).raycast);
            let m = f.scene.material(clone.material);
            assert_eq!(m.color, Color::RED);
            assert!((m.opacity - 0.3).abs() < f32::EPSILON);
            assert!(m.transparent);
            assert!(!m.depth_write);
            assert_eq!(f.scene.mesh(clone.node).map(|m| m.geometry), f.scene.mesh(source).map(|m| m.geometry));
        }
        // Each duplicate sits right after its source.
        let order: Vec<_> = f.scene.children(f.root).collect();
        let c = overlay.clones();
        assert_eq!(order, [f.meshes[0], c[0].node, f.meshes[1], c[1].node, f.meshes[2], c[2].node]);
    }

    #[test]
    fn unchanged_inputs_do_nothing() {
        let mut f = Fixture::new(2);
        let mut overlay = OverlayEffect::mount(&f.scopes, f.scope, red(0.3));
        let _ = f.sync(&mut overlay);
        let before = overlay.clones().to_vec();
        assert_eq!(f.sync(&mut overlay), None);
        assert_eq!(overlay.clones(), &before[..]);
    }

    #[test]
    fn config_sync_edits_materials_in_place() {
        let mut f = Fixture::new(2);
        let mut overlay = OverlayEffect::mount(&f.scopes, f.scope, red(0.3));
        let _ = f.sync(&mut overlay);
        let before = overlay.clones().to_vec();
        let nodes = f.scene.node_count();
        let _ = f.scene.evaluate();

        overlay.set_opacity(0.8);
        overlay.set_color(Color::from_hex(0x00_ff_00));
        assert_eq!(f.sync(&mut overlay), Some(OverlaySyncKind::Config));
        assert_eq!(overlay.clones(), &before[..]);
        assert_eq!(f.scene.node_count(), nodes);
        assert_eq!(overlay.mesh_set_version(), 1);
        for clone in overlay.clones() {
            let m = f.scene.material(clone.material);
            assert!((m.opacity - 0.8).abs() < f32::EPSILON);
            assert_eq!(m.color, Color::from_hex(0x00_ff_00));
            assert_eq!(m.version(), 2);
            assert_eq!(f.scene.parent(clone.node), Some(f.root));
        }
        let changes = f.scene.evaluate();
        assert_eq!(changes.materials.len(), 2);
        assert!(changes.added.is_empty());
    }

    #[test]
    fn mesh_set_change_replaces_every_clone() {
        let mut f = Fixture::new(3);
        let mut overlay = OverlayEffect::mount(&f.scopes, f.scope, red(0.5));
        let _ = f.sync(&mut overlay);
        let old = overlay.clones().to_vec();

        let keep = f.meshes[2];
        f.republish(vec![keep]);
        overlay.set_opacity(0.25);
        assert_eq!(f.sync(&mut overlay), Some(OverlaySyncKind::Structural));

        assert_eq!(overlay.clones().len(), 1);
        assert_eq!(overlay.clones()[0].source, keep);
        assert!((f.scene.material(overlay.clones()[0].material).opacity - 0.25).abs() < f32::EPSILON);
        for c in &old {
            assert!(!f.scene.is_alive(c.node));
            assert!(!f.scene.is_material_alive(c.material));
        }
        // Three sources, one duplicate.
        assert_eq!(f.scene.children(f.root).count(), 4);
        assert_eq!(overlay.mesh_set_version(), 2);
    }

    #[test]
    fn unmount_removes_everything_it_added() {
        let mut f = Fixture::new(2);
        let nodes = f.scene.node_count();
        let materials = f.scene.material_count();
        let mut overlay = OverlayEffect::mount(&f.scopes, f.scope, red(0.3));
        let _ = f.sync(&mut overlay);
        let clones = overlay.clones().to_vec();

        overlay.unmount(&mut f.scene, &mut Tracer::none());
        assert_eq!(f.scene.node_count(), nodes);
        assert_eq!(f.scene.material_count(), materials);
        assert!(clones.iter().all(|c| !f.scene.is_alive(c.node)));
        let kids: Vec<_> = f.scene.children(f.root).collect();
        assert_eq!(kids, &f.meshes[..]);
        assert!(f.meshes.iter().all(|&m| f.scene.flags(m).raycast));
    }

    #[test]
    fn teardown_skips_nodes_already_destroyed() {
        let mut f = Fixture::new(2);
        let mut overlay = OverlayEffect::mount(&f.scopes, f.scope, red(0.3));
        let _ = f.sync(&mut overlay);
        let materials: Vec<_> = overlay.clones().iter().map(|c| c.material).collect();

        // The owner of the subtree removed it first.
        let _ = f.scene.destroy_subtree(f.root);
        overlay.unmount(&mut f.scene, &mut Tracer::none());
        assert!(materials.iter().all(|&m| !f.scene.is_material_alive(m)));
    }

    #[test]
    fn empty_mesh_set_builds_nothing() {
        let mut f = Fixture::new(0);
        let mut overlay = OverlayEffect::mount(&f.scopes, f.scope, red(0.3));
        assert_eq!(f.sync(&mut overlay), Some(OverlaySyncKind::Structural));
        assert!(overlay.clones().is_empty());
        overlay.set_opacity(0.9);
        assert_eq!(f.sync(&mut overlay), Some(OverlaySyncKind::Config));
        assert_eq!(f.scene.node_count(), 1);
    }

    #[test]
    fn parentless_source_hosts_its_own_duplicate() {
        let mut scene = SceneGraph::new();
        let mut scopes = Scopes::new();
        let m = scene.create_material(Material::default());
        let lone = scene.create_mesh(GeometryId(0), m);
        scene.set_transform(lone, Transform3d::from_translation(5.0, 0.0, 0.0));
        let scope = scopes.create_scope(None);
        scopes.provide(
            scope,
            EffectContext {
                root: lone,
                meshes: MeshSet::new(vec![lone]),
            },
        );
        let mut overlay = OverlayEffect::mount(&scopes, scope, red(0.3));
        let _ = overlay.sync(&mut scene, &scopes, &mut Tracer::none());

        let dup = overlay.clones()[0].node;
        assert_eq!(scene.parent(dup), Some(lone));
        let _ = scene.evaluate();
        assert_eq!(scene.world_transform(dup), scene.world_transform(lone));
    }

    #[test]
    fn opacity_is_clamped() {
        assert!((red(1.01).opacity - 1.0).abs() < f32::EPSILON);
        assert!(red(-0.01).opacity.abs() < f32::EPSILON);
        assert!((OverlayConfig::new(Color::RED).opacity - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    #[should_panic(expected = "effect components must be mounted within an AssetInstance")]
    fn mount_outside_instance_panics() {
        let mut scopes = Scopes::new();
        let scope = scopes.create_scope(None);
        let _ = OverlayEffect::mount(&scopes, scope, red(0.3));
    }
}
