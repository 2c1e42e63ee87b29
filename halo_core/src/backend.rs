// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for rendering engines.
//!
//! Halo arranges nodes and materials; it never draws. A rendering backend
//! mirrors the [`SceneGraph`] into its own resources and keeps that mirror
//! current by consuming the [`SceneChanges`] each evaluation produces:
//!
//! - **Nodes**: free on `removed`, then create on `added`. A reused slot is
//!   in both lists, so this order matters. Then re-read world transforms
//!   listed in `transforms` and toggle visibility on `hidden`/`unhidden`.
//! - **Materials**: release the GPU side of slots in `disposed_materials`,
//!   upload slots in `created_materials` (replacing whatever the slot held
//!   before), and re-upload slots listed in `materials`. The three lists are
//!   disjoint.
//! - **Content**: rebind geometry or material for nodes in `content`.
//!
//! Releasing a slot the backend never created is a no-op.
//!
//! Compositor passes (outlines and the like) are declared separately through
//! the `halo_render` crate.

use crate::scene::{SceneChanges, SceneGraph};

/// Applies evaluated scene changes to an engine-native presentation tree.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame(t: f64) {
///     // Resolve instances; effects sync against the published mesh sets.
///     let _ = instance.update(&mut scene, &mut scopes, &mut loader, &mut tracer);
///     overlay.sync(&mut scene, &scopes, &mut tracer);
///     outline.render(&scopes, &mut plan, &mut tracer);
///
///     // Evaluate: drain dirty channels, recompute world properties
///     let changes = scene.evaluate();
///
///     // Present: apply incremental changes to the engine
///     presenter.apply(&scene, &changes);
///     compositor.composite(&scene, &plan);
/// }
/// ```
pub trait Presenter {
    /// Applies the given [`SceneChanges`] to the backing presentation tree,
    /// reading current property values from `scene` as needed.
    fn apply(&mut self, scene: &SceneGraph, changes: &SceneChanges);
}
