// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect components for halo asset instances.
//!
//! Effects are mounted in a scope nested under an
//! [`AssetInstance`](halo_core::instance::AssetInstance) and read its mesh
//! set from [`Scopes`](halo_core::context::Scopes). Neither effect needs the
//! instance to know it exists.
//!
//! - [`SelectionOutlineEffect`]: declares an outline pass over the mesh set
//!   into a [`CompositePlan`](halo_render::CompositePlan) each frame. Owns no
//!   scene resources.
//! - [`OverlayEffect`]: keeps one tinted, translucent, non-pickable
//!   duplicate beside every mesh, and removes exactly those duplicates again.
//!
//! Mounting either effect outside every instance's scope panics.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod outline;
mod overlay;

pub use outline::{OutlineConfig, SelectionOutlineEffect};
pub use overlay::{OverlayClone, OverlayConfig, OverlayEffect};
