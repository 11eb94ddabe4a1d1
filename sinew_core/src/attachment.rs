// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable attachment definitions.
//!
//! An [`Attachment`] is the visual content a slot can show. It is shared
//! (behind an [`Arc`]) between every slot and skeleton instance that uses the
//! same named attachment, and is never mutated by the synchronizer. The three
//! kinds are a closed set; "no attachment" is `None` at the slot level.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::color::Color;
use crate::skeleton::Bone;

/// An opaque reference to a texture page owned by the host renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// A named rectangle of a texture page.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureRegion {
    /// Region name as it appears in the atlas.
    pub name: Arc<str>,
    /// The page this region lives on.
    pub texture: TextureId,
    /// Pixel rectangle on the page.
    pub frame: Rect,
    /// Untrimmed size of the source image.
    pub original_size: Size,
}

impl TextureRegion {
    /// Creates a region whose original size equals its frame size.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, texture: TextureId, frame: Rect) -> Self {
        Self {
            name: name.into(),
            texture,
            frame,
            original_size: frame.size(),
        }
    }

    /// Sets the untrimmed size.
    #[must_use]
    pub fn with_original_size(mut self, size: Size) -> Self {
        self.original_size = size;
        self
    }
}

/// A textured quad placed relative to its slot's bone.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionAttachment {
    /// Attachment name; also the sprite cache key.
    pub name: Arc<str>,
    /// Resolved texture region, or `None` when the atlas had no match.
    pub region: Option<TextureRegion>,
    /// Offset from the bone origin.
    pub x: f64,
    /// Offset from the bone origin.
    pub y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Quad width in skeleton units.
    pub width: f64,
    /// Quad height in skeleton units.
    pub height: f64,
    /// Attachment tint.
    pub color: Color,
}

impl RegionAttachment {
    /// Creates an untransformed, untinted attachment of the given size.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        region: Option<TextureRegion>,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            name: name.into(),
            region,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width,
            height,
            color: Color::WHITE,
        }
    }

    /// Sets the offset from the bone origin.
    #[must_use]
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Sets the rotation, in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Sets the scale factors.
    #[must_use]
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Sets the attachment tint.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Returns the sprite's transform relative to the slot container.
    ///
    /// The sprite is drawn at the region's original size around its center,
    /// so the scale maps that size onto the attachment's quad. `size`
    /// replaces the declared width and height when a size override is
    /// active. The vertical scale is negated because skeleton space is Y-up.
    #[must_use]
    pub fn sprite_transform(&self, region: &TextureRegion, size: Option<Size>) -> Affine {
        let quad = size.unwrap_or(Size::new(self.width, self.height));
        let sx = self.scale_x * quad.width / region.original_size.width;
        let sy = -self.scale_y * quad.height / region.original_size.height;
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation * (core::f64::consts::PI / 180.0))
            * Affine::scale_non_uniform(sx, sy)
    }
}

/// Vertex positions of a mesh or clip polygon.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexData {
    /// `x, y` pairs in the space of the slot's bone.
    Unweighted(Vec<f32>),
    /// Vertices influenced by several bones.
    ///
    /// `bones` holds, per vertex, an influence count followed by that many
    /// bone indices. `vertices` holds one `x, y, weight` triple per
    /// influence, with `x, y` in the space of the influencing bone.
    Weighted {
        /// Per-vertex influence counts and bone indices.
        bones: Vec<u32>,
        /// `x, y, weight` per influence.
        vertices: Vec<f32>,
    },
}

impl VertexData {
    /// Returns the number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Unweighted(v) => v.len() / 2,
            Self::Weighted { bones, .. } => {
                let mut count = 0;
                let mut i = 0;
                while i < bones.len() {
                    i += bones[i] as usize + 1;
                    count += 1;
                }
                count
            }
        }
    }

    /// Returns the length of the world vertex buffer (`2 * vertex_count`).
    #[must_use]
    pub fn world_vertices_length(&self) -> usize {
        self.vertex_count() * 2
    }

    /// Writes world positions as `x, y` pairs into `out`.
    ///
    /// `slot_bone` is used for unweighted data. `deform`, when not empty,
    /// holds per-position offsets added before transforming (one pair per
    /// vertex for unweighted data, one pair per influence for weighted data).
    /// Writing stops at whichever of the source data or `out` ends first;
    /// influences that name a missing bone contribute nothing.
    pub fn compute_world_vertices(
        &self,
        bones: &[Bone],
        slot_bone: usize,
        deform: &[f32],
        out: &mut [f32],
    ) {
        let offset = |i: usize| deform.get(i).copied().unwrap_or(0.0);
        match self {
            Self::Unweighted(local) => {
                let world = bones.get(slot_bone).map_or(Affine::IDENTITY, |b| b.world);
                for (v, pair) in local.chunks_exact(2).enumerate() {
                    let Some(dst) = out.get_mut(v * 2..v * 2 + 2) else {
                        break;
                    };
                    let p = Point::new(
                        f64::from(pair[0] + offset(v * 2)),
                        f64::from(pair[1] + offset(v * 2 + 1)),
                    );
                    write_point(dst, world * p);
                }
            }
            Self::Weighted { bones: refs, vertices } => {
                let mut v = 0;
                let mut b = 0;
                let mut influence = 0;
                while b < refs.len() {
                    let count = refs[b] as usize;
                    let mut sum = Vec2::ZERO;
                    for &bone in refs.iter().skip(b + 1).take(count) {
                        let base = influence * 3;
                        if let (Some(bone), Some(triple)) =
                            (bones.get(bone as usize), vertices.get(base..base + 3))
                        {
                            let p = Point::new(
                                f64::from(triple[0] + offset(influence * 2)),
                                f64::from(triple[1] + offset(influence * 2 + 1)),
                            );
                            sum += (bone.world * p).to_vec2() * f64::from(triple[2]);
                        }
                        influence += 1;
                    }
                    b += count + 1;
                    let Some(dst) = out.get_mut(v * 2..v * 2 + 2) else {
                        break;
                    };
                    write_point(dst, sum.to_point());
                    v += 1;
                }
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "scene geometry is stored in f32"
)]
fn write_point(dst: &mut [f32], p: Point) {
    dst[0] = p.x as f32;
    dst[1] = p.y as f32;
}

/// A textured triangle mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshAttachment {
    /// Attachment name; also the mesh cache key.
    pub name: Arc<str>,
    /// Resolved texture region, or `None` when the atlas had no match.
    pub region: Option<TextureRegion>,
    /// Vertex positions.
    pub vertices: VertexData,
    /// `u, v` pairs, one per vertex.
    pub region_uvs: Vec<f32>,
    /// Triangle list indexing into the vertices.
    pub triangles: Vec<u16>,
    /// Attachment tint.
    pub color: Color,
}

/// A polygon that masks the slots following it in draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipAttachment {
    /// Attachment name.
    pub name: Arc<str>,
    /// Polygon vertices.
    pub vertices: VertexData,
    /// Index of the last slot masked by this clip, if any.
    pub end_slot: Option<usize>,
}

/// The visual content of a slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Attachment {
    /// A textured quad.
    Region(RegionAttachment),
    /// A textured mesh.
    Mesh(MeshAttachment),
    /// A clip polygon.
    Clip(ClipAttachment),
}

impl Attachment {
    /// Returns the attachment's name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        match self {
            Self::Region(a) => &a.name,
            Self::Mesh(a) => &a.name,
            Self::Clip(a) => &a.name,
        }
    }

    /// Returns the attachment's own texture region, if it has one.
    #[must_use]
    pub fn region(&self) -> Option<&TextureRegion> {
        match self {
            Self::Region(a) => a.region.as_ref(),
            Self::Mesh(a) => a.region.as_ref(),
            Self::Clip(_) => None,
        }
    }

    /// Returns whether this attachment draws a texture.
    #[must_use]
    pub fn is_textured(&self) -> bool {
        !matches!(self, Self::Clip(_))
    }
}

impl From<RegionAttachment> for Attachment {
    fn from(a: RegionAttachment) -> Self {
        Self::Region(a)
    }
}

impl From<MeshAttachment> for Attachment {
    fn from(a: MeshAttachment) -> Self {
        Self::Mesh(a)
    }
}

impl From<ClipAttachment> for Attachment {
    fn from(a: ClipAttachment) -> Self {
        Self::Clip(a)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn bone(world: Affine) -> Bone {
        Bone {
            name: "bone".into(),
            world,
        }
    }

    #[test]
    fn sprite_transform_maps_original_size_onto_quad() {
        let region = TextureRegion::new("r", TextureId(0), Rect::new(0.0, 0.0, 50.0, 25.0));
        let attachment = RegionAttachment::new("a", Some(region.clone()), 100.0, 100.0)
            .with_offset(3.0, 4.0);
        let xf = attachment.sprite_transform(&region, None);
        let c = xf.as_coeffs();
        assert_eq!(c, [2.0, 0.0, 0.0, -4.0, 3.0, 4.0]);
    }

    #[test]
    fn size_override_replaces_declared_size() {
        let region = TextureRegion::new("r", TextureId(0), Rect::new(0.0, 0.0, 10.0, 10.0));
        let attachment =
            RegionAttachment::new("a", Some(region.clone()), 100.0, 100.0).with_scale(2.0, 1.0);
        let xf = attachment.sprite_transform(&region, Some(Size::new(5.0, 20.0)));
        let c = xf.as_coeffs();
        assert_eq!(c[0], 1.0, "2 * 5 / 10");
        assert_eq!(c[3], -2.0, "-(1 * 20 / 10)");
    }

    #[test]
    fn sprite_transform_rotates_in_degrees() {
        let region = TextureRegion::new("r", TextureId(0), Rect::new(0.0, 0.0, 1.0, 1.0));
        let attachment = RegionAttachment::new("a", Some(region.clone()), 1.0, -1.0)
            .with_rotation(90.0);
        let p = attachment.sprite_transform(&region, None) * Point::new(1.0, 0.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unweighted_vertices_follow_slot_bone_and_deform() {
        let bones = [bone(Affine::translate((10.0, 0.0)))];
        let data = VertexData::Unweighted(vec![0.0, 0.0, 1.0, 1.0]);
        let mut out = [0.0_f32; 4];
        data.compute_world_vertices(&bones, 0, &[0.5, 0.0, 0.0, 0.0], &mut out);
        assert_eq!(out, [10.5, 0.0, 11.0, 1.0]);
    }

    #[test]
    fn weighted_vertices_blend_bone_influences() {
        let bones = [
            bone(Affine::translate((10.0, 0.0))),
            bone(Affine::translate((0.0, 10.0))),
        ];
        // One vertex influenced half by each bone, one by bone 1 only.
        let data = VertexData::Weighted {
            bones: vec![2, 0, 1, 1, 1],
            vertices: vec![0.0, 0.0, 0.5, 0.0, 0.0, 0.5, 2.0, 2.0, 1.0],
        };
        assert_eq!(data.vertex_count(), 2);
        let mut out = [0.0_f32; 4];
        data.compute_world_vertices(&bones, 0, &[], &mut out);
        assert_eq!(out, [5.0, 5.0, 2.0, 12.0]);
    }

    #[test]
    fn short_output_buffer_is_not_overrun() {
        let bones = [bone(Affine::IDENTITY)];
        let data = VertexData::Unweighted(vec![1.0, 2.0, 3.0, 4.0]);
        let mut out = [0.0_f32; 2];
        data.compute_world_vertices(&bones, 0, &[], &mut out);
        assert_eq!(out, [1.0, 2.0]);
    }
}
