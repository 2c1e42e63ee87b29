// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite plan: the compositor work declared for one frame.

use alloc::vec::Vec;

use halo_core::scene::SceneGraph;

use crate::pass::{ComposerSettings, OutlinePass, Pass};

/// One effect chain: its settings and its passes in order.
#[derive(Clone, Debug, Default)]
pub struct Composer {
    /// Chain configuration.
    pub settings: ComposerSettings,
    /// Passes in execution order.
    pub passes: Vec<Pass>,
}

/// The compositor work declared for a single frame.
///
/// Effects append to the plan while rendering; the host clears it at the
/// start of every frame, so a pass exists only while some effect keeps
/// declaring it.
#[derive(Clone, Debug, Default)]
pub struct CompositePlan {
    /// Declared chains in declaration order.
    pub composers: Vec<Composer>,
}

impl CompositePlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.composers.clear();
    }

    /// Declares a chain.
    pub fn declare(&mut self, settings: ComposerSettings, passes: Vec<Pass>) {
        self.composers.push(Composer { settings, passes });
    }

    /// Returns `true` if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.composers.is_empty()
    }

    /// Iterates over every declared outline pass.
    pub fn outlines(&self) -> impl Iterator<Item = &OutlinePass> + '_ {
        self.composers
            .iter()
            .flat_map(|c| &c.passes)
            .map(|p| match p {
                Pass::Outline(o) => o,
            })
    }
}

/// Runs declared passes on top of the rendered scene.
///
/// Implemented by the engine's post-processing stack; halo never looks
/// inside.
pub trait Compositor {
    /// Executes `plan` for the current frame, resolving selections against
    /// `scene`.
    fn composite(&mut self, scene: &SceneGraph, plan: &CompositePlan);
}
