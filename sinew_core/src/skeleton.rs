// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The posed skeleton consumed by the synchronizer.
//!
//! Pose computation is not done here. A [`PoseDriver`] (typically an
//! animation state machine) advances time and writes bone world transforms,
//! slot attachments, colors, and draw order into a [`Skeleton`]; the view then
//! mirrors that state into the scene tree.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::Affine;

use crate::attachment::{Attachment, VertexData};
use crate::color::{BlendMode, Color, Rgb};
use crate::error::{GeometryFault, SkeletonError};

/// A posed bone.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    /// Bone name.
    pub name: Arc<str>,
    /// Transform from bone space to skeleton space.
    pub world: Affine,
}

impl Bone {
    /// Creates a bone at the given world transform.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, world: Affine) -> Self {
        Self {
            name: name.into(),
            world,
        }
    }
}

/// A posed slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    /// Slot name.
    pub name: Arc<str>,
    /// Index of the bone this slot follows.
    pub bone: usize,
    /// Current attachment, if any.
    pub attachment: Option<Arc<Attachment>>,
    /// Slot tint.
    pub color: Color,
    /// Secondary tint for dual-tint presenters.
    pub dark_color: Option<Rgb>,
    /// Blend mode for the slot's drawable.
    pub blend_mode: BlendMode,
    /// Per-vertex offsets applied to mesh and clip vertices; empty for none.
    pub deform: Vec<f32>,
}

impl Slot {
    /// Creates a white, normally blended slot.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        bone: usize,
        attachment: Option<Arc<Attachment>>,
    ) -> Self {
        Self {
            name: name.into(),
            bone,
            attachment,
            color: Color::WHITE,
            dark_color: None,
            blend_mode: BlendMode::Normal,
            deform: Vec::new(),
        }
    }
}

/// Bones, slots, and draw order of one skeleton instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Skeleton {
    /// Bones, in definition order.
    pub bones: Vec<Bone>,
    /// Slots, in definition order.
    pub slots: Vec<Slot>,
    /// Slot indices in render order, back to front.
    pub draw_order: Vec<usize>,
}

impl Skeleton {
    /// Creates a skeleton whose draw order is the slot order.
    #[must_use]
    pub fn new(bones: Vec<Bone>, slots: Vec<Slot>) -> Self {
        let draw_order = (0..slots.len()).collect();
        Self {
            bones,
            slots,
            draw_order,
        }
    }

    /// Returns the index of the slot with the given name.
    #[must_use]
    pub fn find_slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| &*s.name == name)
    }

    /// Returns the world transform of a slot's bone.
    ///
    /// Falls back to identity if the slot or bone does not exist.
    #[must_use]
    pub fn slot_bone_world(&self, slot: usize) -> Affine {
        self.slots
            .get(slot)
            .and_then(|s| self.bones.get(s.bone))
            .map_or(Affine::IDENTITY, |b| b.world)
    }

    /// Checks structural consistency.
    ///
    /// Verifies bone references, that the draw order is a permutation of the
    /// slots, and the geometry of every slot's current attachment.
    pub fn validate(&self) -> Result<(), SkeletonError> {
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.bone >= self.bones.len() {
                return Err(SkeletonError::BoneOutOfRange {
                    slot: i,
                    bone: slot.bone,
                    bones: self.bones.len(),
                });
            }
        }

        if self.draw_order.len() != self.slots.len() {
            return Err(SkeletonError::DrawOrderLength {
                len: self.draw_order.len(),
                slots: self.slots.len(),
            });
        }
        let mut seen = alloc::vec![false; self.slots.len()];
        for (position, &slot) in self.draw_order.iter().enumerate() {
            let Some(flag) = seen.get_mut(slot) else {
                return Err(SkeletonError::DrawOrderOutOfRange { position, slot });
            };
            if *flag {
                return Err(SkeletonError::DrawOrderDuplicate { slot });
            }
            *flag = true;
        }

        for slot in &self.slots {
            if let Some(attachment) = &slot.attachment {
                self.validate_attachment(attachment)?;
            }
        }
        Ok(())
    }

    fn validate_attachment(&self, attachment: &Attachment) -> Result<(), SkeletonError> {
        let malformed = |reason| SkeletonError::MalformedGeometry {
            attachment: attachment.name().clone(),
            reason,
        };
        match attachment {
            Attachment::Region(_) => Ok(()),
            Attachment::Mesh(mesh) => {
                self.validate_vertices(&mesh.vertices).map_err(malformed)?;
                let vertices = mesh.vertices.vertex_count();
                if mesh.region_uvs.len() != vertices * 2 {
                    return Err(malformed(GeometryFault::UvCount {
                        uvs: mesh.region_uvs.len(),
                        vertices,
                    }));
                }
                if mesh.triangles.len() % 3 != 0 {
                    return Err(malformed(GeometryFault::PartialTriangle(
                        mesh.triangles.len(),
                    )));
                }
                if let Some(&index) = mesh.triangles.iter().find(|&&i| usize::from(i) >= vertices)
                {
                    return Err(malformed(GeometryFault::TriangleIndex { index, vertices }));
                }
                Ok(())
            }
            Attachment::Clip(clip) => {
                self.validate_vertices(&clip.vertices).map_err(malformed)?;
                match clip.end_slot {
                    Some(end_slot) if end_slot >= self.slots.len() => {
                        Err(SkeletonError::ClipEndOutOfRange {
                            attachment: clip.name.clone(),
                            end_slot,
                        })
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    fn validate_vertices(&self, data: &VertexData) -> Result<(), GeometryFault> {
        match data {
            VertexData::Unweighted(v) => {
                if v.len() % 2 != 0 {
                    return Err(GeometryFault::OddCoordinates);
                }
            }
            VertexData::Weighted { bones, vertices } => {
                let mut influences = 0;
                let mut i = 0;
                while i < bones.len() {
                    let count = bones[i] as usize;
                    let Some(refs) = bones.get(i + 1..i + 1 + count) else {
                        return Err(GeometryFault::TruncatedWeights);
                    };
                    if let Some(&bone) = refs.iter().find(|&&b| b as usize >= self.bones.len()) {
                        return Err(GeometryFault::UnknownBone(bone));
                    }
                    influences += count;
                    i += count + 1;
                }
                if vertices.len() != influences * 3 {
                    return Err(GeometryFault::WeightCount {
                        found: vertices.len(),
                        expected: influences * 3,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Result of advancing the pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoseStatus {
    /// The skeleton holds the new pose.
    Posed,
    /// A callback during the update asked for the view to be destroyed.
    Destroyed,
}

/// The external animation state that poses a skeleton.
pub trait PoseDriver {
    /// Advances animation time by `dt` seconds and writes the resulting pose
    /// (bone world transforms, attachments, colors, draw order) into
    /// `skeleton`.
    fn advance(&mut self, dt: f64, skeleton: &mut Skeleton) -> PoseStatus;
}

/// A driver that never changes the pose.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPose;

impl PoseDriver for StaticPose {
    fn advance(&mut self, dt: f64, skeleton: &mut Skeleton) -> PoseStatus {
        _ = (dt, skeleton);
        PoseStatus::Posed
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::attachment::{ClipAttachment, MeshAttachment};

    fn skeleton_with(attachment: Attachment) -> Skeleton {
        Skeleton::new(
            vec![Bone::new("root", Affine::IDENTITY)],
            vec![Slot::new("a", 0, Some(Arc::new(attachment)))],
        )
    }

    fn mesh(vertices: VertexData, uvs: Vec<f32>, triangles: Vec<u16>) -> Attachment {
        Attachment::Mesh(MeshAttachment {
            name: "mesh".into(),
            region: None,
            vertices,
            region_uvs: uvs,
            triangles,
            color: Color::WHITE,
        })
    }

    #[test]
    fn default_draw_order_is_slot_order() {
        let skeleton = Skeleton::new(
            vec![Bone::new("root", Affine::IDENTITY)],
            vec![Slot::new("a", 0, None), Slot::new("b", 0, None)],
        );
        assert_eq!(skeleton.draw_order, vec![0, 1]);
        assert_eq!(skeleton.find_slot_index("b"), Some(1));
        assert_eq!(skeleton.find_slot_index("c"), None);
        assert!(skeleton.validate().is_ok());
    }

    #[test]
    fn rejects_missing_bone() {
        let skeleton = Skeleton::new(Vec::new(), vec![Slot::new("a", 0, None)]);
        assert_eq!(
            skeleton.validate(),
            Err(SkeletonError::BoneOutOfRange {
                slot: 0,
                bone: 0,
                bones: 0
            })
        );
    }

    #[test]
    fn rejects_bad_draw_order() {
        let mut skeleton = Skeleton::new(
            vec![Bone::new("root", Affine::IDENTITY)],
            vec![Slot::new("a", 0, None), Slot::new("b", 0, None)],
        );
        skeleton.draw_order = vec![1, 1];
        assert_eq!(
            skeleton.validate(),
            Err(SkeletonError::DrawOrderDuplicate { slot: 1 })
        );
        skeleton.draw_order = vec![0, 2];
        assert_eq!(
            skeleton.validate(),
            Err(SkeletonError::DrawOrderOutOfRange {
                position: 1,
                slot: 2
            })
        );
        skeleton.draw_order = vec![0];
        assert!(matches!(
            skeleton.validate(),
            Err(SkeletonError::DrawOrderLength { len: 1, slots: 2 })
        ));
    }

    #[test]
    fn rejects_malformed_mesh() {
        let quad = VertexData::Unweighted(vec![0.0; 8]);
        let skeleton = skeleton_with(mesh(quad.clone(), vec![0.0; 6], vec![0, 1, 2]));
        assert!(matches!(
            skeleton.validate(),
            Err(SkeletonError::MalformedGeometry {
                reason: GeometryFault::UvCount { uvs: 6, vertices: 4 },
                ..
            })
        ));

        let skeleton = skeleton_with(mesh(quad, vec![0.0; 8], vec![0, 1, 4]));
        assert!(matches!(
            skeleton.validate(),
            Err(SkeletonError::MalformedGeometry {
                reason: GeometryFault::TriangleIndex { index: 4, .. },
                ..
            })
        ));
    }

    #[test]
    fn rejects_truncated_weights() {
        let weighted = VertexData::Weighted {
            bones: vec![2, 0],
            vertices: vec![0.0; 6],
        };
        let skeleton = skeleton_with(mesh(weighted, vec![0.0; 2], Vec::new()));
        assert!(matches!(
            skeleton.validate(),
            Err(SkeletonError::MalformedGeometry {
                reason: GeometryFault::TruncatedWeights,
                ..
            })
        ));
    }

    #[test]
    fn rejects_clip_ending_past_last_slot() {
        let skeleton = skeleton_with(Attachment::Clip(ClipAttachment {
            name: "clip".into(),
            vertices: VertexData::Unweighted(vec![0.0; 6]),
            end_slot: Some(3),
        }));
        assert!(matches!(
            skeleton.validate(),
            Err(SkeletonError::ClipEndOutOfRange { end_slot: 3, .. })
        ));
    }

    #[test]
    fn slot_bone_world_falls_back_to_identity() {
        let skeleton = Skeleton::new(
            vec![Bone::new("root", Affine::translate((1.0, 2.0)))],
            vec![Slot::new("a", 0, None)],
        );
        assert_eq!(skeleton.slot_bone_world(0), Affine::translate((1.0, 2.0)));
        assert_eq!(skeleton.slot_bone_world(7), Affine::IDENTITY);
    }
}
