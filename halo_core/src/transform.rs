// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node transforms and host placement.
//!
//! [`Transform3d`] is the column-major 4×4 matrix stored per node.
//! [`Placement`] is the position / rotation / scale triple a host hands to an
//! [`AssetInstance`](crate::instance::AssetInstance) root, composed as
//! `T * Rz * Ry * Rx * S` (XYZ Euler order).

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 affine transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Columns `[x, y, z, w]`; column 3 holds the translation.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The identity transform.
    pub const IDENTITY: Self = Self::from_scale(1.0, 1.0, 1.0);

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.cols[3] = [x, y, z, 1.0];
        t
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation around the X axis (radians).
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        let mut t = Self::IDENTITY;
        t.cols[1] = [0.0, c, s, 0.0];
        t.cols[2] = [0.0, -s, c, 0.0];
        t
    }

    /// Rotation around the Y axis (radians).
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        let mut t = Self::IDENTITY;
        t.cols[0] = [c, 0.0, -s, 0.0];
        t.cols[2] = [s, 0.0, c, 0.0];
        t
    }

    /// Rotation around the Z axis (radians).
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        let mut t = Self::IDENTITY;
        t.cols[0] = [c, s, 0.0, 0.0];
        t.cols[1] = [-s, c, 0.0, 0.0];
        t
    }

    /// Returns the translation component.
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> [f64; 3] {
        let c = self.cols[3];
        [c[0], c[1], c[2]]
    }

    /// Transforms a point (w = 1).
    #[must_use]
    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        let c = &self.cols;
        let mut out = [0.0; 3];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * p[0] + c[1][i] * p[1] + c[2][i] * p[2] + c[3][i];
        }
        out
    }

    /// Returns `true` if every element is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.cols[k][i] * rhs.cols[j][k]).sum();
            }
        }
        Self { cols: out }
    }
}

fn sin_cos(radians: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    let sc = radians.sin_cos();
    #[cfg(not(feature = "std"))]
    let sc = (radians.sin(), radians.cos());
    sc
}

/// Position, Euler rotation, and scale applied to a mounted root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Translation.
    pub position: [f64; 3],
    /// XYZ Euler angles in radians.
    pub rotation: [f64; 3],
    /// Per-axis scale.
    pub scale: [f64; 3],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Placement {
    /// A placement that only translates.
    #[must_use]
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: [x, y, z],
            ..Self::default()
        }
    }

    /// Composes the placement into a single matrix.
    #[must_use]
    pub fn to_transform(&self) -> Transform3d {
        let [x, y, z] = self.position;
        let [rx, ry, rz] = self.rotation;
        let [sx, sy, sz] = self.scale;
        Transform3d::from_translation(x, y, z)
            * Transform3d::from_rotation_z(rz)
            * Transform3d::from_rotation_y(ry)
            * Transform3d::from_rotation_x(rx)
            * Transform3d::from_scale(sx, sy, sz)
    }
}
