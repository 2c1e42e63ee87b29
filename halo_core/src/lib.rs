// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph, asset instancing, and scoped effect context.
//!
//! `halo_core` lets independently written effect components attach to a
//! shared 3D subtree without the subtree knowing about them. It is `no_std`
//! compatible (with `alloc`) and stores nodes and materials in
//! struct-of-arrays tables addressed by generational handles.
//!
//! # Architecture
//!
//! One frame of a host looks like this:
//!
//! ```text
//!   AssetLoader::load() ──► SharedAsset
//!                               │
//!                               ▼
//!   AssetInstance::update() ──► SceneGraph::instantiate()
//!         │                          (once per asset identity)
//!         ▼
//!   Scopes::provide(EffectContext { root, meshes })
//!         │
//!         ├──► overlay / outline effects read Scopes::effect_data()
//!         ▼
//!   SceneGraph::evaluate() ──► SceneChanges ──► Presenter::apply()
//! ```
//!
//! **[`scene`]**: Struct-of-arrays node tree with generational handles,
//! plus the material store. Callers set local properties; world transforms
//! and effective visibility are computed by evaluation.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`asset`]**: Immutable [`SceneTemplate`](asset::SceneTemplate)s and the
//! [`AssetLoader`](asset::AssetLoader) boundary.
//!
//! **[`instance`]**: [`AssetInstance`](instance::AssetInstance): a private,
//! material-independent copy of a template per mount site.
//!
//! **[`context`]**: The scope tree that carries each instance's
//! [`EffectContext`](context::EffectContext) to the components nested in it.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait rendering
//! engines implement to mirror the graph.
//!
//! **[`color`]**, **[`material`]**, **[`transform`]**: Value types.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! lifecycle instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod asset;
pub mod backend;
pub mod color;
pub mod context;
pub mod dirty;
pub mod instance;
pub mod material;
pub mod scene;
pub mod trace;
pub mod transform;
