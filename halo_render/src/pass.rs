// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pass and composer configuration.

use halo_core::color::Color;
use halo_core::context::MeshSet;

/// Configuration of one post-processing effect chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposerSettings {
    /// Whether the compositor clears the target before its passes run.
    pub auto_clear: bool,
    /// MSAA sample count for the chain's render targets.
    pub multisampling: u8,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            auto_clear: false,
            multisampling: 8,
        }
    }
}

impl ComposerSettings {
    /// Sets `auto_clear`.
    #[must_use]
    pub fn with_auto_clear(mut self, auto_clear: bool) -> Self {
        self.auto_clear = auto_clear;
        self
    }

    /// Sets the MSAA sample count.
    #[must_use]
    pub fn with_multisampling(mut self, samples: u8) -> Self {
        self.multisampling = samples;
        self
    }
}

/// Draws an edge around every node in `selection`.
///
/// The selection is a reference to the instance's mesh set, not a copy:
/// the compositor resolves node handles against the scene it is given.
#[derive(Clone, Debug)]
pub struct OutlinePass {
    /// Meshes to outline. Never empty.
    pub selection: MeshSet,
    /// Edge color.
    pub edge_color: Color,
    /// Edge intensity, `>= 0`.
    pub edge_strength: f32,
    /// Width in pixels of the outline render target.
    pub resolution: u32,
    /// Whether the edge is blurred.
    pub blur: bool,
}

/// A declared compositor pass.
#[derive(Clone, Debug)]
pub enum Pass {
    /// Selection outline.
    Outline(OutlinePass),
}
