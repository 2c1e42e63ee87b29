// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording test doubles for the two backend traits.

use std::collections::BTreeSet;

use halo_core::backend::Presenter;
use halo_core::color::Color;
use halo_core::scene::{NodeId, SceneChanges, SceneGraph};
use halo_render::{CompositePlan, Compositor};

/// What one [`Presenter::apply`] call received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresentedFrame {
    /// Nodes created.
    pub added: usize,
    /// Nodes destroyed.
    pub removed: usize,
    /// Material slots uploaded, fresh or edited.
    pub material_uploads: usize,
    /// Uploaded material slots released.
    pub material_releases: usize,
}

/// A [`Presenter`] that mirrors live node and material slots and records
/// every frame.
///
/// # Panics
///
/// [`apply`](Presenter::apply) panics when the changes ask it to upload an
/// empty material slot or edit one it never received.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    live: BTreeSet<u32>,
    materials: BTreeSet<u32>,
    frames: Vec<PresentedFrame>,
}

impl RecordingPresenter {
    /// Creates an empty presenter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every frame applied so far.
    #[must_use]
    pub fn frames(&self) -> &[PresentedFrame] {
        &self.frames
    }

    /// The most recent frame.
    #[must_use]
    pub fn last(&self) -> Option<&PresentedFrame> {
        self.frames.last()
    }

    /// How many node slots the mirror believes are live.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.live.len()
    }

    /// Material slots the mirror holds an upload for.
    #[must_use]
    pub fn uploaded_materials(&self) -> &BTreeSet<u32> {
        &self.materials
    }

    /// Total material uploads over all frames.
    #[must_use]
    pub fn material_uploads(&self) -> usize {
        self.frames.iter().map(|f| f.material_uploads).sum()
    }

    /// Total material releases over all frames.
    #[must_use]
    pub fn material_releases(&self) -> usize {
        self.frames.iter().map(|f| f.material_releases).sum()
    }
}

impl Presenter for RecordingPresenter {
    fn apply(&mut self, scene: &SceneGraph, changes: &SceneChanges) {
        for idx in &changes.removed {
            self.live.remove(idx);
        }
        self.live.extend(changes.added.iter().copied());

        let mut material_releases = 0;
        for idx in &changes.disposed_materials {
            if self.materials.remove(idx) {
                material_releases += 1;
            }
        }
        for &idx in &changes.created_materials {
            assert!(
                scene.material_at(idx).is_some(),
                "created material slot {idx} is empty"
            );
            self.materials.insert(idx);
        }
        for idx in &changes.materials {
            assert!(
                self.materials.contains(idx),
                "material slot {idx} edited before it was created"
            );
        }
        self.frames.push(PresentedFrame {
            added: changes.added.len(),
            removed: changes.removed.len(),
            material_uploads: changes.created_materials.len() + changes.materials.len(),
            material_releases,
        });
    }
}

/// One outline pass as a compositor saw it.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositedOutline {
    /// The selected meshes.
    pub selection: Vec<NodeId>,
    /// Edge color.
    pub edge_color: Color,
    /// Selected nodes that were no longer alive.
    pub stale: usize,
}

/// A [`Compositor`] that records the outline passes of every frame.
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    frames: Vec<Vec<CompositedOutline>>,
}

impl RecordingCompositor {
    /// Creates an empty compositor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outline passes per frame.
    #[must_use]
    pub fn frames(&self) -> &[Vec<CompositedOutline>] {
        &self.frames
    }

    /// Outline passes of the most recent frame, empty before the first.
    #[must_use]
    pub fn last(&self) -> &[CompositedOutline] {
        self.frames.last().map(Vec::as_slice).unwrap_or_default()
    }
}

impl Compositor for RecordingCompositor {
    fn composite(&mut self, scene: &SceneGraph, plan: &CompositePlan) {
        let outlines = plan
            .outlines()
            .map(|pass| CompositedOutline {
                selection: pass.selection.to_vec(),
                edge_color: pass.edge_color,
                stale: pass.selection.iter().filter(|&&n| !scene.is_alive(n)).count(),
            })
            .collect();
        self.frames.push(outlines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::context::MeshSet;
    use halo_core::material::Material;
    use halo_core::scene::GeometryId;
    use halo_render::{ComposerSettings, OutlinePass, Pass};

    #[test]
    fn presenter_mirrors_live_nodes() {
        let mut scene = SceneGraph::new();
        let mut presenter = RecordingPresenter::new();
        let root = scene.create_group();
        let child = scene.create_group();
        scene.add_child(root, child);
        let changes = scene.evaluate();
        presenter.apply(&scene, &changes);
        assert_eq!(presenter.live_nodes(), 2);

        // Created and destroyed before the next evaluate.
        let transient = scene.create_group();
        scene.destroy_node(transient);
        scene.destroy_node(child);
        let changes = scene.evaluate();
        presenter.apply(&scene, &changes);
        assert_eq!(presenter.live_nodes(), scene.node_count());
        assert_eq!(presenter.live_nodes(), 1);
    }

    #[test]
    fn presenter_counts_material_traffic() {
        let mut scene = SceneGraph::new();
        let mut presenter = RecordingPresenter::new();
        let m = scene.create_material(Material::new(Color::WHITE));
        scene.update_material(m, |m| m.opacity = 0.3);
        let changes = scene.evaluate();
        presenter.apply(&scene, &changes);
        scene.dispose_material(m);
        let changes = scene.evaluate();
        presenter.apply(&scene, &changes);

        assert_eq!(presenter.material_uploads(), 1);
        assert_eq!(presenter.material_releases(), 1);
        assert_eq!(presenter.frames().len(), 2);
    }

    #[test]
    fn compositor_flags_stale_selections() {
        let mut scene = SceneGraph::new();
        let m = scene.create_material(Material::default());
        let a = scene.create_mesh(GeometryId(0), m);
        let b = scene.create_mesh(GeometryId(0), m);
        scene.destroy_node(b);

        let mut plan = CompositePlan::new();
        plan.declare(
            ComposerSettings::default(),
            vec![Pass::Outline(OutlinePass {
                selection: MeshSet::new(vec![a, b]),
                edge_color: Color::RED,
                edge_strength: 2.0,
                resolution: 1000,
                blur: false,
            })],
        );
        let mut compositor = RecordingCompositor::new();
        assert!(compositor.last().is_empty());
        compositor.composite(&scene, &plan);

        let [outline] = compositor.last() else {
            panic!("expected one outline");
        };
        assert_eq!(outline.selection, [a, b]);
        assert_eq!(outline.stale, 1);
    }
}
