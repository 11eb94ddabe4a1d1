// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node content, paint, and flags.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::attachment::TextureId;
use crate::color::{BlendMode, Rgb};

/// What a node draws.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Content {
    /// Nothing; the node only groups its children.
    #[default]
    Group,
    /// A textured quad of `size` centered on `anchor` (in unit coordinates).
    Sprite {
        /// Texture page.
        texture: TextureId,
        /// Pixel rectangle on the page.
        frame: Rect,
        /// Drawn size before the node transform.
        size: Size,
        /// Anchor in `0.0..=1.0` unit coordinates.
        anchor: Point,
    },
    /// A textured triangle mesh.
    Mesh {
        /// Texture page.
        texture: TextureId,
        /// Pixel rectangle on the page that `uvs` address.
        frame: Rect,
        /// `x, y` pairs in node space.
        vertices: Vec<f32>,
        /// `u, v` pairs in `0.0..=1.0` coordinates of `frame`, one per vertex.
        uvs: Vec<f32>,
        /// Triangle list.
        indices: Vec<u16>,
    },
    /// A filled polygon used as a mask.
    Mask {
        /// `x, y` pairs in node space.
        points: Vec<f32>,
    },
}

impl Content {
    /// Returns whether this content produces pixels of its own.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        matches!(self, Self::Sprite { .. } | Self::Mesh { .. })
    }
}

/// Tint and blending of a node's own content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Primary tint.
    pub tint: Rgb,
    /// Secondary tint for dual-tint presenters.
    pub dark: Option<Rgb>,
    /// Blend mode.
    pub blend_mode: BlendMode,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            tint: Rgb::WHITE,
            dark: None,
            blend_mode: BlendMode::Normal,
        }
    }
}

/// Per-node boolean flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the node and its subtree are hidden.
    pub hidden: bool,
    /// Whether the node's own content is drawn. A mask polygon is not
    /// renderable; it only shapes the node that references it.
    pub renderable: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            hidden: false,
            renderable: true,
        }
    }
}
