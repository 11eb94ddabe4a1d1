// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color types and tint blending.
//!
//! Every visible drawable receives a tint computed from three sources: the
//! view-wide [`GlobalTint`], the slot's [`Color`] (plus an optional dark
//! color), and the attachment's own [`Color`]. How those combine depends on
//! the presenter's capability, expressed as a [`TintMode`]:
//!
//! - [`TintMode::Single`] multiplies everything into one light tint
//!   ([`blend_single`]).
//! - [`TintMode::Dual`] interpolates between the global light and dark tints
//!   for both a light and a dark channel ([`blend_dual`]).
//!
//! All functions here are pure. Alpha never enters the RGB product: the slot
//! alpha is carried on [`Tint::alpha`] and the attachment alpha is applied as
//! drawable opacity by the synchronizer.

use core::fmt;
use core::ops::Mul;

/// An RGB triple with components in `0.0..=1.0`.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
}

impl Rgb {
    /// Opaque white, the neutral light tint.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Black, the neutral dark tint.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a color from its components.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Unpacks a `0xRRGGBB` value.
    #[must_use]
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Packs the color into `0xRRGGBB`, clamping each component.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "components are clamped to 0..=255 before the cast"
    )]
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Per-component `self * t + other * (1 - t)`.
    #[must_use]
    pub fn mix(self, other: Self, t: Self) -> Self {
        Self::new(
            self.r * t.r + other.r * (1.0 - t.r),
            self.g * t.g + other.g * (1.0 - t.g),
            self.b * t.b + other.b * (1.0 - t.b),
        )
    }
}

impl Mul for Rgb {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb({:.3}, {:.3}, {:.3})", self.r, self.g, self.b)
    }
}

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from its components.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the RGB part.
    #[inline]
    #[must_use]
    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// How a drawable composites onto what is behind it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Source-over alpha compositing.
    #[default]
    Normal,
    /// Additive blending.
    Additive,
    /// Multiply blending.
    Multiply,
    /// Screen blending.
    Screen,
}

/// The tint capability of the host presenter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TintMode {
    /// One multiplicative tint per drawable.
    #[default]
    Single,
    /// Independent light and dark tint channels per drawable.
    Dual,
}

/// The view-wide tint pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalTint {
    /// Light tint; the only one used in [`TintMode::Single`].
    pub light: Rgb,
    /// Dark tint, used in [`TintMode::Dual`].
    pub dark: Rgb,
}

impl Default for GlobalTint {
    fn default() -> Self {
        Self {
            light: Rgb::WHITE,
            dark: Rgb::BLACK,
        }
    }
}

/// The blended tint of one drawable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tint {
    /// Primary channel.
    pub light: Rgb,
    /// Secondary channel, present only in [`TintMode::Dual`].
    pub dark: Option<Rgb>,
    /// Slot alpha, applied to the slot container.
    pub alpha: f32,
}

/// Single-tint blend: `light * slot * attachment`.
#[must_use]
pub fn blend_single(light: Rgb, slot: Color, attachment: Color) -> Tint {
    Tint {
        light: light * slot.rgb() * attachment.rgb(),
        dark: None,
        alpha: slot.a,
    }
}

/// Dual-tint blend.
///
/// With `c = slot * attachment`, the light channel is
/// `tint.light * c + tint.dark * (1 - c)`. The dark channel uses the slot's
/// dark color `d` (black when absent) the same way:
/// `tint.light * d + tint.dark * (1 - d)`.
#[must_use]
pub fn blend_dual(tint: GlobalTint, slot: Color, slot_dark: Option<Rgb>, attachment: Color) -> Tint {
    let c = slot.rgb() * attachment.rgb();
    let d = slot_dark.unwrap_or(Rgb::BLACK);
    Tint {
        light: tint.light.mix(tint.dark, c),
        dark: Some(tint.light.mix(tint.dark, d)),
        alpha: slot.a,
    }
}

/// Blends according to `mode`.
#[must_use]
pub fn blend(
    mode: TintMode,
    tint: GlobalTint,
    slot: Color,
    slot_dark: Option<Rgb>,
    attachment: Color,
) -> Tint {
    match mode {
        TintMode::Single => blend_single(tint.light, slot, attachment),
        TintMode::Dual => blend_dual(tint, slot, slot_dark, attachment),
    }
}
