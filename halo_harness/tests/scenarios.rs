// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios: instances, overlays, and outlines driven through a
//! headless stage, with invariants checked after every frame.

use std::task::Poll;

use halo_core::asset::{LoadError, SourceId};
use halo_core::color::Color;
use halo_core::instance::{AssetInstance, AssetInstanceProps};
use halo_core::scene::NodeId;
use halo_core::trace::{OverlaySyncKind, Tracer};
use halo_core::transform::Placement;
use halo_effects::{OutlineConfig, OverlayConfig, OverlayEffect, SelectionOutlineEffect};
use halo_harness::check::{
    InvariantError, check_disjoint, check_instance, check_overlay, check_released,
};
use halo_harness::fixtures::{self, BENCH_MESHES, BENCH_SOURCE};
use halo_harness::loader::MemoryLoader;
use halo_harness::stage::Stage;

const LAMP: &str = "models/lamp/model.gltf";
const EMPTY: &str = "models/empty/model.gltf";

fn stage() -> Stage {
    stage_with(MemoryLoader::new())
}

fn stage_with(mut loader: MemoryLoader) -> Stage {
    loader.register(BENCH_SOURCE, fixtures::bench());
    loader.register(LAMP, fixtures::lamp());
    loader.register(EMPTY, fixtures::empty());
    Stage::new(loader)
}

/// Mounts an instance of `source` and resolves it within one frame.
fn resolved(stage: &mut Stage, source: &str, placement: Option<Placement>) -> AssetInstance {
    let mut props = AssetInstanceProps::new(source);
    if let Some(p) = placement {
        props = props.with_placement(p);
    }
    let mut instance = stage.mount(None, props);
    stage.begin_frame();
    assert_eq!(
        stage.update(&mut instance, &mut Tracer::none()),
        Poll::Ready(Ok(()))
    );
    stage.end_frame(&mut Tracer::none());
    instance
}

fn red() -> Color {
    Color::named("red").unwrap()
}

fn mesh_names(stage: &Stage, instance: &AssetInstance) -> Vec<String> {
    instance
        .meshes()
        .unwrap()
        .iter()
        .map(|&m| stage.scene.name(m).unwrap().to_owned())
        .collect()
}

#[test]
fn instances_of_one_source_never_alias() {
    let mut stage = stage();
    let a = resolved(&mut stage, BENCH_SOURCE, None);
    let b = resolved(&mut stage, BENCH_SOURCE, Some(Placement::at(0.0, 0.0, -2.0)));

    // One cached asset, two independent clones.
    assert!(stage.loader.cached(&SourceId::from(BENCH_SOURCE)).is_some());
    assert_eq!(check_disjoint(&[&a, &b]), Ok(()));
    assert_eq!(check_instance(&stage.scene, &a), Ok(()));
    assert_eq!(check_instance(&stage.scene, &b), Ok(()));
    assert!(!a.meshes().unwrap().same(b.meshes().unwrap()));

    // Editing one instance's material leaves the other's untouched.
    let a_seat = a.meshes().unwrap()[4];
    let b_seat = b.meshes().unwrap()[4];
    let a_mat = stage.scene.mesh(a_seat).unwrap().material;
    let b_mat = stage.scene.mesh(b_seat).unwrap().material;
    let before = stage.scene.material(b_mat).clone();
    stage.scene.update_material(a_mat, |m| m.color = Color::RED);
    assert_eq!(*stage.scene.material(b_mat), before);
}

#[test]
fn a_bare_instance_publishes_every_template_mesh() {
    let mut stage = stage();
    let bench = resolved(&mut stage, BENCH_SOURCE, None);

    assert_eq!(bench.meshes().unwrap().len(), fixtures::bench().mesh_count());
    assert_eq!(mesh_names(&stage, &bench), BENCH_MESHES);
    // Root group plus one node per template node; no duplicates anywhere.
    assert_eq!(stage.scene.node_count(), 1 + fixtures::bench().len());
    assert_eq!(stage.presenter.live_nodes(), stage.scene.node_count());
    assert_eq!(bench.materials().len(), 6);
}

#[test]
fn mesh_order_is_stable_across_updates() {
    let mut stage = stage();
    let mut bench = resolved(&mut stage, BENCH_SOURCE, None);
    let first = bench.meshes().unwrap().clone();
    let clone_root = bench.clone_root();

    for _ in 0..3 {
        stage.begin_frame();
        let _ = stage.update(&mut bench, &mut Tracer::none());
        stage.end_frame(&mut Tracer::none());
    }
    assert!(bench.meshes().unwrap().same(&first));
    assert_eq!(bench.clone_root(), clone_root);

    let recomputed: Vec<NodeId> = stage
        .scene
        .descendants(clone_root.unwrap())
        .filter(|&n| stage.scene.is_mesh(n))
        .collect();
    assert_eq!(recomputed, &*first);
}

#[test]
fn red_overlay_duplicates_every_mesh() {
    let mut stage = stage();
    let bench = resolved(&mut stage, BENCH_SOURCE, None);
    let mut overlay = OverlayEffect::mount(
        &stage.scopes,
        bench.scope(),
        OverlayConfig::new(red()).with_opacity(0.3),
    );

    stage.begin_frame();
    let kind = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());

    assert_eq!(kind, Some(OverlaySyncKind::Structural));
    assert_eq!(check_overlay(&stage.scene, &bench, &overlay), Ok(()));
    for clone in overlay.clones() {
        let material = stage.scene.material(clone.material);
        assert_eq!(material.color, Color::RED);
        assert_eq!(material.opacity, 0.3);
        assert!(material.transparent);
        assert!(!material.depth_write);
        assert!(!stage.scene.flags(clone.node).raycast);
        // The duplicate sits where its source sits.
        assert_eq!(
            stage.scene.world_transform(clone.node),
            stage.scene.world_transform(clone.source)
        );
    }
    // Hit-testing still sees exactly the original meshes.
    assert_eq!(stage.scene.pickable(bench.root()), &**bench.meshes().unwrap());
}

#[test]
fn opacity_change_keeps_clone_identities() {
    let mut stage = stage();
    let bench = resolved(&mut stage, BENCH_SOURCE, None);
    let mut overlay = OverlayEffect::mount(
        &stage.scopes,
        bench.scope(),
        OverlayConfig::new(red()).with_opacity(0.3),
    );
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());
    let before = overlay.clones().to_vec();
    let parents: Vec<_> = before.iter().map(|c| stage.scene.parent(c.node)).collect();

    overlay.set_opacity(0.8);
    stage.begin_frame();
    let kind = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());

    assert_eq!(kind, Some(OverlaySyncKind::Config));
    assert_eq!(overlay.clones(), before);
    assert_eq!(overlay.mesh_set_version(), 1);
    let after: Vec<_> = before.iter().map(|c| stage.scene.parent(c.node)).collect();
    assert_eq!(after, parents);
    for clone in &before {
        let material = stage.scene.material(clone.material);
        assert_eq!(material.opacity, 0.8);
        assert_eq!(material.color, Color::RED);
    }

    // The backend re-uploads the six materials and creates nothing.
    let last = stage.presenter.last().unwrap();
    assert_eq!(last.material_uploads, 6);
    assert_eq!(last.added, 0);
    assert_eq!(last.removed, 0);

    // Nothing changed since: no trigger runs.
    assert_eq!(
        overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none()),
        None
    );
}

#[test]
fn unmounting_the_overlay_leaves_only_the_originals() {
    let mut stage = stage();
    let bench = resolved(&mut stage, BENCH_SOURCE, None);
    let nodes = stage.scene.node_count();
    let materials = stage.scene.material_count();

    let mut overlay = OverlayEffect::mount(
        &stage.scopes,
        bench.scope(),
        OverlayConfig::new(red()).with_opacity(0.3),
    );
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());
    assert_eq!(stage.scene.node_count(), nodes + 6);
    let clones = overlay.clones().to_vec();

    stage.begin_frame();
    overlay.unmount(&mut stage.scene, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());

    assert_eq!(check_released(&stage.scene, &clones), Ok(()));
    assert_eq!(stage.scene.node_count(), nodes);
    assert_eq!(stage.scene.material_count(), materials);
    assert_eq!(check_instance(&stage.scene, &bench), Ok(()));
    // No parent of a source mesh keeps a non-pickable child.
    for &mesh in bench.meshes().unwrap().iter() {
        let parent = stage.scene.parent(mesh).unwrap();
        assert!(
            stage
                .scene
                .children(parent)
                .all(|n| stage.scene.flags(n).raycast),
            "overlay child left under {parent:?}"
        );
    }
    let last = stage.presenter.last().unwrap();
    assert_eq!(last.removed, 6);
    assert_eq!(last.material_releases, 6);
}

#[test]
fn source_change_rebuilds_overlays_for_the_new_mesh_set() {
    let mut stage = stage();
    let mut instance = resolved(&mut stage, BENCH_SOURCE, None);
    let mut overlay = OverlayEffect::mount(
        &stage.scopes,
        instance.scope(),
        OverlayConfig::new(red()),
    );
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());
    let old = overlay.clones().to_vec();
    let old_meshes = instance.meshes().unwrap().clone();
    assert_eq!(old.len(), 6);

    // V1 (6 meshes) -> V2 (1 mesh), with a config change in the same frame.
    instance.set_source(LAMP);
    overlay.set_opacity(0.8);
    stage.begin_frame();
    assert!(stage.update(&mut instance, &mut Tracer::none()).is_ready());
    let kind = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());

    assert_eq!(kind, Some(OverlaySyncKind::Structural));
    assert_eq!(overlay.clones().len(), 1);
    assert_eq!(overlay.mesh_set_version(), 2);
    assert!(
        overlay
            .clones()
            .iter()
            .all(|c| !old_meshes.contains(&c.source))
    );
    assert_eq!(check_released(&stage.scene, &old), Ok(()));
    assert_eq!(check_overlay(&stage.scene, &instance, &overlay), Ok(()));
    assert_eq!(
        stage.scene.material(overlay.clones()[0].material).opacity,
        0.8
    );

    // And back: V2 (1 mesh) -> V1 (6 meshes).
    instance.set_source(BENCH_SOURCE);
    let _ = stage.update(&mut instance, &mut Tracer::none());
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());
    assert_eq!(check_overlay(&stage.scene, &instance, &overlay), Ok(()));
    assert_eq!(stage.presenter.live_nodes(), stage.scene.node_count());
}

/// Slot indices of every material the instance and its overlay draw with.
fn materials_in_use(instance: &AssetInstance, overlay: &OverlayEffect) -> Vec<u32> {
    instance
        .materials()
        .iter()
        .chain(overlay.clones().iter().map(|c| &c.material))
        .map(|m| m.index())
        .collect()
}

#[test]
fn rebuilds_never_release_materials_in_use() {
    let mut stage = stage();
    let mut instance = resolved(&mut stage, BENCH_SOURCE, None);
    let mut overlay = OverlayEffect::mount(
        &stage.scopes,
        instance.scope(),
        OverlayConfig::new(red()),
    );
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());

    // Each swap frees slots and refills some of them in the same frame.
    for source in [LAMP, BENCH_SOURCE, LAMP] {
        instance.set_source(source);
        stage.begin_frame();
        assert!(stage.update(&mut instance, &mut Tracer::none()).is_ready());
        assert_eq!(
            overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none()),
            Some(OverlaySyncKind::Structural)
        );
        let changes = stage.end_frame(&mut Tracer::none()).clone();

        let in_use = materials_in_use(&instance, &overlay);
        for idx in &in_use {
            assert!(
                !changes.disposed_materials.contains(idx),
                "slot {idx} released while {source} draws with it"
            );
            assert!(
                stage.presenter.uploaded_materials().contains(idx),
                "slot {idx} never uploaded for {source}"
            );
        }
        assert_eq!(
            stage.presenter.uploaded_materials().len(),
            stage.scene.material_count()
        );
        assert_eq!(in_use.len(), stage.scene.material_count());
    }
}

#[test]
fn evicted_asset_is_recloned() {
    let mut stage = stage();
    let mut bench = resolved(&mut stage, BENCH_SOURCE, None);
    let mut overlay =
        OverlayEffect::mount(&stage.scopes, bench.scope(), OverlayConfig::new(red()));
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    let clone_root = bench.clone_root();

    // Same source text, new asset identity.
    assert!(stage.loader.evict(&SourceId::from(BENCH_SOURCE)));
    let _ = stage.update(&mut bench, &mut Tracer::none());
    assert_ne!(bench.clone_root(), clone_root);
    assert_eq!(
        overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none()),
        Some(OverlaySyncKind::Structural)
    );
    stage.end_frame(&mut Tracer::none());
    assert_eq!(check_overlay(&stage.scene, &bench, &overlay), Ok(()));
}

#[test]
fn suspended_reload_keeps_the_previous_clone() {
    let mut stage = stage_with(MemoryLoader::new().with_latency(2));
    let mut bench = stage.mount(None, AssetInstanceProps::new(BENCH_SOURCE));

    assert!(stage.update(&mut bench, &mut Tracer::none()).is_pending());
    assert!(!bench.is_resolved());
    assert!(stage.scopes.try_effect_data(bench.scope()).is_none());
    assert!(stage.update(&mut bench, &mut Tracer::none()).is_pending());
    assert!(stage.update(&mut bench, &mut Tracer::none()).is_ready());
    let meshes = bench.meshes().unwrap().clone();

    let mut overlay =
        OverlayEffect::mount(&stage.scopes, bench.scope(), OverlayConfig::new(red()));
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());

    stage.loader.evict(&SourceId::from(BENCH_SOURCE));
    assert!(stage.update(&mut bench, &mut Tracer::none()).is_pending());
    assert!(bench.meshes().unwrap().same(&meshes));
    assert_eq!(
        overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none()),
        None
    );
}

#[test]
fn load_errors_reach_the_host() {
    let mut loader = MemoryLoader::new();
    loader.fail("broken.gltf", "unexpected end of buffer");
    let mut stage = stage_with(loader);

    let mut missing = stage.mount(None, AssetInstanceProps::new("nowhere.gltf"));
    assert_eq!(
        stage.update(&mut missing, &mut Tracer::none()),
        Poll::Ready(Err(LoadError::NotFound(SourceId::from("nowhere.gltf"))))
    );

    let mut broken = stage.mount(None, AssetInstanceProps::new("broken.gltf"));
    let Poll::Ready(Err(err)) = stage.update(&mut broken, &mut Tracer::none()) else {
        panic!("expected a load error");
    };
    assert_eq!(
        err.to_string(),
        "failed to load `broken.gltf`: unexpected end of buffer"
    );
    assert!(!broken.is_resolved());
}

#[test]
fn outline_follows_the_selection() {
    let mut stage = stage();
    let bench = resolved(&mut stage, BENCH_SOURCE, None);
    let blue: Color = "#0000FF".parse().unwrap();
    let outline = SelectionOutlineEffect::mount(
        &stage.scopes,
        bench.scope(),
        OutlineConfig::default().with_edge_color(blue),
    );

    stage.begin_frame();
    assert!(outline.render(&stage.scopes, &mut stage.plan, &mut Tracer::none()));
    stage.end_frame(&mut Tracer::none());

    let [pass] = stage.compositor.last() else {
        panic!("expected exactly one outline pass");
    };
    assert_eq!(pass.selection, &**bench.meshes().unwrap());
    assert_eq!(pass.edge_color, Color::from_hex(0x00_00_ff));
    assert_eq!(pass.stale, 0);
    let composer = &stage.plan.composers[0];
    assert!(!composer.settings.auto_clear);
    assert_eq!(composer.settings.multisampling, 8);

    // A frame where the effect does not render declares nothing.
    stage.begin_frame();
    stage.end_frame(&mut Tracer::none());
    assert!(stage.compositor.last().is_empty());
}

#[test]
fn empty_selection_registers_no_pass() {
    let mut stage = stage();
    let empty = resolved(&mut stage, EMPTY, None);
    assert_eq!(empty.meshes().unwrap().len(), 0);

    let outline = SelectionOutlineEffect::mount(&stage.scopes, empty.scope(), OutlineConfig::default());
    let mut overlay =
        OverlayEffect::mount(&stage.scopes, empty.scope(), OverlayConfig::new(red()));
    stage.begin_frame();
    assert!(!outline.render(&stage.scopes, &mut stage.plan, &mut Tracer::none()));
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());

    assert!(stage.plan.is_empty());
    assert!(stage.compositor.last().is_empty());
    assert!(overlay.clones().is_empty());
}

#[test]
fn nested_instance_shadows_the_outer_context() {
    let mut stage = stage();
    let outer = resolved(&mut stage, BENCH_SOURCE, None);
    let mut inner = stage.mount(
        Some(outer.scope()),
        AssetInstanceProps::new(LAMP).with_parent(outer.root()),
    );
    let _ = stage.update(&mut inner, &mut Tracer::none());

    // A consumer scope under the inner instance sees the lamp.
    let consumer = stage.scopes.create_scope(Some(inner.scope()));
    let mut overlay = OverlayEffect::mount(&stage.scopes, consumer, OverlayConfig::new(red()));
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    assert_eq!(overlay.clones().len(), 1);
    assert!(inner.meshes().unwrap().contains(&overlay.clones()[0].source));
    // The outer published set is unchanged by the nested clone.
    assert_eq!(outer.meshes().unwrap().len(), 6);

    overlay.unmount(&mut stage.scene, &mut Tracer::none());
    stage.scopes.destroy_scope(consumer);
    inner.unmount(&mut stage.scene, &mut stage.scopes, &mut Tracer::none());
    assert_eq!(check_instance(&stage.scene, &outer), Ok(()));
}

#[test]
fn instance_unmount_before_overlay_unmount_releases_everything() {
    let mut stage = stage();
    let baseline_nodes = stage.scene.node_count();
    let baseline_materials = stage.scene.material_count();
    let bench = resolved(&mut stage, BENCH_SOURCE, None);
    let mut overlay =
        OverlayEffect::mount(&stage.scopes, bench.scope(), OverlayConfig::new(red()));
    let _ = overlay.sync(&mut stage.scene, &stage.scopes, &mut Tracer::none());
    let clones = overlay.clones().to_vec();

    bench.unmount(&mut stage.scene, &mut stage.scopes, &mut Tracer::none());
    // Clone nodes went with the subtree; their materials did not.
    assert_eq!(
        check_released(&stage.scene, &clones),
        Err(InvariantError::LeakedMaterial(clones[0].material))
    );
    overlay.unmount(&mut stage.scene, &mut Tracer::none());
    stage.end_frame(&mut Tracer::none());

    assert_eq!(check_released(&stage.scene, &clones), Ok(()));
    assert_eq!(stage.scene.node_count(), baseline_nodes);
    assert_eq!(stage.scene.material_count(), baseline_materials);
    assert_eq!(stage.presenter.live_nodes(), 0);
}

#[test]
fn placement_positions_the_whole_instance() {
    let mut stage = stage();
    let mut bench = resolved(&mut stage, BENCH_SOURCE, Some(Placement::at(0.0, 0.0, -2.0)));
    let seat = bench.meshes().unwrap()[4];
    assert_eq!(
        stage.scene.world_transform(seat).translation(),
        [0.0, 0.45, -2.0]
    );

    bench.set_placement(&mut stage.scene, None);
    stage.end_frame(&mut Tracer::none());
    assert_eq!(
        stage.scene.world_transform(seat).translation(),
        [0.0, 0.45, 0.0]
    );
}

#[test]
#[should_panic(expected = "effect components must be mounted within an AssetInstance")]
fn overlay_outside_an_instance_panics() {
    let mut stage = stage();
    let orphan = stage.scopes.create_scope(None);
    let _ = OverlayEffect::mount(&stage.scopes, orphan, OverlayConfig::new(red()));
}

#[test]
#[should_panic(expected = "effect components must be mounted within an AssetInstance")]
fn outline_before_resolution_panics() {
    let mut stage = stage_with(MemoryLoader::new().with_latency(1));
    let mut bench = stage.mount(None, AssetInstanceProps::new(BENCH_SOURCE));
    assert!(stage.update(&mut bench, &mut Tracer::none()).is_pending());
    let _ = SelectionOutlineEffect::mount(&stage.scopes, bench.scope(), OutlineConfig::default());
}
