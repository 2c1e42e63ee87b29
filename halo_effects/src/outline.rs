// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection outline.

use alloc::vec;

use halo_core::color::Color;
use halo_core::context::{ScopeId, Scopes};
use halo_core::trace::{OutlineDeclaredEvent, Tracer};
use halo_render::{ComposerSettings, CompositePlan, OutlinePass, Pass};

/// Outline appearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlineConfig {
    /// Visible edge color.
    pub edge_color: Color,
    /// Edge intensity, `>= 0`.
    pub edge_strength: f32,
    /// Width in pixels of the outline render target.
    pub resolution: u32,
    /// Whether the edge is blurred.
    pub blur: bool,
    /// Settings of the chain the pass is declared in.
    pub composer: ComposerSettings,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            edge_color: Color::BLACK,
            edge_strength: 2.0,
            resolution: 1000,
            blur: false,
            composer: ComposerSettings::default(),
        }
    }
}

impl OutlineConfig {
    /// Sets the edge color.
    #[must_use]
    pub fn with_edge_color(mut self, color: Color) -> Self {
        self.edge_color = color;
        self
    }

    /// Sets the edge strength.
    ///
    /// # Panics
    ///
    /// Panics if `strength` is negative or not finite.
    #[must_use]
    pub fn with_edge_strength(mut self, strength: f32) -> Self {
        self.edge_strength = strength;
        self.validate();
        self
    }

    /// Sets the outline render target width.
    #[must_use]
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Enables or disables blur.
    #[must_use]
    pub fn with_blur(mut self, blur: bool) -> Self {
        self.blur = blur;
        self
    }

    fn validate(&self) {
        assert!(
            self.edge_strength.is_finite() && self.edge_strength >= 0.0,
            "edge strength must be finite and non-negative, got {}",
            self.edge_strength
        );
    }
}

/// Hands an instance's mesh set to the compositor as an outline selection.
///
/// The effect has no state beyond its configuration: every
/// [`render`](Self::render) re-declares the pass with the current selection.
#[derive(Clone, Debug)]
pub struct SelectionOutlineEffect {
    scope: ScopeId,
    config: OutlineConfig,
}

impl SelectionOutlineEffect {
    /// Mounts the effect in `scope`.
    ///
    /// # Panics
    ///
    /// Panics if no enclosing scope provides an effect context, or if the
    /// config's edge strength is negative or not finite.
    pub fn mount(scopes: &Scopes, scope: ScopeId, config: OutlineConfig) -> Self {
        let _ = scopes.effect_data(scope);
        config.validate();
        Self { scope, config }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Replaces the configuration; used from the next render on.
    ///
    /// # Panics
    ///
    /// Panics if the edge strength is negative or not finite.
    pub fn set_config(&mut self, config: OutlineConfig) {
        config.validate();
        self.config = config;
    }

    /// Declares this frame's outline pass into `plan`.
    ///
    /// Returns whether a pass was declared: an empty mesh set declares
    /// nothing.
    ///
    /// # Panics
    ///
    /// Panics if the providing instance has been unmounted.
    pub fn render(&self, scopes: &Scopes, plan: &mut CompositePlan, tracer: &mut Tracer<'_>) -> bool {
        let meshes = &scopes.effect_data(self.scope).meshes;
        let declared = !meshes.is_empty();
        if declared {
            plan.declare(
                self.config.composer,
                vec![Pass::Outline(OutlinePass {
                    selection: meshes.clone(),
                    edge_color: self.config.edge_color,
                    edge_strength: self.config.edge_strength,
                    resolution: self.config.resolution,
                    blur: self.config.blur,
                })],
            );
        }
        tracer.outline_declared(&OutlineDeclaredEvent {
            selection_len: meshes.len(),
            declared,
        });
        declared
    }
}
