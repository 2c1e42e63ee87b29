// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor pass declarations for halo effects.
//!
//! This crate is the boundary between effect components and an external
//! post-processing compositor. Effects never run passes themselves; each
//! frame they *declare* what they want into a [`CompositePlan`], and the
//! host hands the plan to a [`Compositor`]. It defines:
//!
//! - [`ComposerSettings`]: how the compositor's effect chain is configured
//! - [`OutlinePass`]: an edge-detection pass over a mesh selection
//! - [`CompositePlan`]: the passes declared for one frame
//! - [`Compositor`]: the trait an engine's post-processing stack implements

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod pass;
mod plan;

pub use pass::{ComposerSettings, OutlinePass, Pass};
pub use plan::{Composer, CompositePlan, Compositor};
