// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RGB colors and the textual forms effects accept.

use core::fmt;
use core::str::FromStr;

/// An sRGB color with `f32` components in `[0, 1]`.
///
/// Components keep the sRGB encoding of their textual form: `#808080` is
/// stored as `128 / 255` in every channel, not its linear-light value. A
/// backend that shades in linear space decodes on upload.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

/// Why a color string was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// `#` followed by something other than 3 or 6 hex digits.
    #[error("malformed hex color `{0}`")]
    BadHex(alloc::string::String),
    /// Not a recognized CSS color name.
    #[error("unknown color name `{0}`")]
    UnknownName(alloc::string::String),
}

const NAMED: &[(&str, u32)] = &[
    ("black", 0x00_00_00),
    ("white", 0xff_ff_ff),
    ("red", 0xff_00_00),
    ("green", 0x00_80_00),
    ("lime", 0x00_ff_00),
    ("blue", 0x00_00_ff),
    ("yellow", 0xff_ff_00),
    ("cyan", 0x00_ff_ff),
    ("aqua", 0x00_ff_ff),
    ("magenta", 0xff_00_ff),
    ("fuchsia", 0xff_00_ff),
    ("gray", 0x80_80_80),
    ("grey", 0x80_80_80),
    ("orange", 0xff_a5_00),
    ("purple", 0x80_00_80),
    ("pink", 0xff_c0_cb),
];

impl Color {
    /// Black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// White.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Pure red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    /// Creates a color from components.
    #[inline]
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from a packed `0xRRGGBB` value, each byte divided
    /// by 255 with no transfer function applied.
    #[must_use]
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| f32::from(((hex >> shift) & 0xff) as u8) / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Packs the color back into `0xRRGGBB`, rounding each channel.
    #[must_use]
    pub fn to_hex(self) -> u32 {
        let q = |v: f32| {
            #[expect(clippy::cast_possible_truncation, reason = "clamped to 0..=255 first")]
            let byte = (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
            byte.min(255)
        };
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }

    /// Looks up a CSS color name (case-insensitive).
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, hex)| Self::from_hex(hex))
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(digits) = s.strip_prefix('#') else {
            return Self::named(s).ok_or_else(|| ColorParseError::UnknownName(s.into()));
        };
        let bad = || ColorParseError::BadHex(s.into());
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| bad())?;
        match digits.len() {
            6 => Ok(Self::from_hex(value)),
            // #rgb expands each nibble: #f0a -> #ff00aa.
            3 => {
                let (r, g, b) = ((value >> 8) & 0xf, (value >> 4) & 0xf, value & 0xf);
                Ok(Self::from_hex((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11))
            }
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}
