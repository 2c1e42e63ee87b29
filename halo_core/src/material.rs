// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface material properties.

use crate::color::Color;

/// The properties of a surface material.
///
/// Materials live in a [`SceneGraph`](crate::scene::SceneGraph) and are
/// referenced from mesh nodes by [`MaterialId`](crate::scene::MaterialId).
/// Every edit made through
/// [`update_material`](crate::scene::SceneGraph::update_material) bumps
/// [`version`](Self::version), which is how a backend learns that the
/// GPU-side copy must be re-uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Base color.
    pub color: Color,
    /// Opacity in `[0, 1]`; only honored when [`transparent`](Self::transparent) is set.
    pub opacity: f32,
    /// Whether the material is alpha-blended.
    pub transparent: bool,
    /// Whether drawing writes depth.
    pub depth_write: bool,
    pub(crate) version: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

impl Material {
    /// Creates an opaque material of the given color.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            depth_write: true,
            version: 0,
        }
    }

    /// Returns the material with the given opacity and transparency enabled.
    #[must_use]
    pub const fn translucent(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = true;
        self
    }

    /// Returns how many times this material has been updated since creation.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Copies the properties into a fresh, never-updated material.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            version: 0,
            ..self.clone()
        }
    }
}
