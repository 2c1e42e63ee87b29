// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Template fixtures.

use halo_core::asset::SceneTemplate;
use halo_core::color::Color;
use halo_core::material::Material;
use halo_core::scene::GeometryId;
use halo_core::transform::Transform3d;

/// Source identifier the bench fixture is registered under.
pub const BENCH_SOURCE: &str = "models/bench-2/model.gltf";

/// Mesh names of [`bench`], in depth-first order.
pub const BENCH_MESHES: [&str; 6] = [
    "leg_front_left",
    "leg_front_right",
    "leg_back_left",
    "leg_back_right",
    "seat",
    "backrest",
];

/// A park bench: a frame group of four metal legs, then a wooden seat and
/// backrest. All legs share one material and both planks share another, as
/// exported files tend to.
#[must_use]
pub fn bench() -> SceneTemplate {
    let mut t = SceneTemplate::new("bench");
    let metal = t.add_material(Material::new(Color::from_hex(0x4a_4a_4a)));
    let wood = t.add_material(Material::new(Color::from_hex(0x8b_5a_2b)));

    let frame = t.add_group(SceneTemplate::ROOT, "frame");
    let leg = GeometryId(1);
    for (name, [x, z]) in BENCH_MESHES[..4]
        .iter()
        .zip([[-0.9, 0.25], [0.9, 0.25], [-0.9, -0.25], [0.9, -0.25]])
    {
        let id = t.add_mesh(frame, name, leg, metal);
        t.set_transform(id, Transform3d::from_translation(x, 0.2, z));
    }
    let seat = t.add_mesh(SceneTemplate::ROOT, BENCH_MESHES[4], GeometryId(2), wood);
    t.set_transform(seat, Transform3d::from_translation(0.0, 0.45, 0.0));
    let back = t.add_mesh(SceneTemplate::ROOT, BENCH_MESHES[5], GeometryId(3), wood);
    t.set_transform(
        back,
        Transform3d::from_translation(0.0, 0.8, -0.3) * Transform3d::from_rotation_x(-0.2),
    );
    t
}

/// A single-mesh lamp.
#[must_use]
pub fn lamp() -> SceneTemplate {
    let mut t = SceneTemplate::new("lamp");
    let brass = t.add_material(Material::new(Color::from_hex(0xb5_a6_42)));
    let _ = t.add_mesh(SceneTemplate::ROOT, "shade", GeometryId(10), brass);
    t
}

/// A template with groups but no meshes.
#[must_use]
pub fn empty() -> SceneTemplate {
    let mut t = SceneTemplate::new("empty");
    let _ = t.add_group(SceneTemplate::ROOT, "anchor");
    t
}
