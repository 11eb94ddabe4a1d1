// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only two operations can fail: building a view from a malformed skeleton
//! ([`SkeletonError`]) and overriding a slot texture ([`LookupError`]).
//! Everything that happens per frame degrades instead of failing.

use alloc::string::String;
use alloc::sync::Arc;

/// A skeleton definition rejected at view construction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkeletonError {
    /// A slot refers to a bone that does not exist.
    #[error("slot {slot} refers to bone {bone}, but the skeleton has {bones} bones")]
    BoneOutOfRange {
        /// Offending slot index.
        slot: usize,
        /// Bone index it refers to.
        bone: usize,
        /// Number of bones.
        bones: usize,
    },
    /// The draw order does not list every slot exactly once.
    #[error("draw order has {len} entries for {slots} slots")]
    DrawOrderLength {
        /// Draw order length.
        len: usize,
        /// Number of slots.
        slots: usize,
    },
    /// A draw order entry names a slot that does not exist.
    #[error("draw order position {position} refers to missing slot {slot}")]
    DrawOrderOutOfRange {
        /// Position in the draw order.
        position: usize,
        /// Slot index at that position.
        slot: usize,
    },
    /// A slot appears twice in the draw order.
    #[error("slot {slot} appears more than once in the draw order")]
    DrawOrderDuplicate {
        /// The repeated slot index.
        slot: usize,
    },
    /// A clip attachment ends at a slot that does not exist.
    #[error("clip attachment `{attachment}` ends at missing slot {end_slot}")]
    ClipEndOutOfRange {
        /// Attachment name.
        attachment: Arc<str>,
        /// The declared end slot.
        end_slot: usize,
    },
    /// Mesh or clip geometry is inconsistent.
    #[error("attachment `{attachment}` has malformed geometry: {reason}")]
    MalformedGeometry {
        /// Attachment name.
        attachment: Arc<str>,
        /// What is wrong with it.
        reason: GeometryFault,
    },
}

/// The specific inconsistency behind [`SkeletonError::MalformedGeometry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeometryFault {
    /// Unweighted vertex data has an odd number of coordinates.
    #[error("odd number of vertex coordinates")]
    OddCoordinates,
    /// The weighted bone stream ends in the middle of a vertex.
    #[error("weighted bone stream is truncated")]
    TruncatedWeights,
    /// The weighted vertex stream does not hold one triple per influence.
    #[error("weighted vertex stream has {found} values, expected {expected}")]
    WeightCount {
        /// Values present.
        found: usize,
        /// Values required.
        expected: usize,
    },
    /// A weighted influence names a missing bone.
    #[error("influence refers to missing bone {0}")]
    UnknownBone(u32),
    /// UV count does not match the vertex count.
    #[error("{uvs} uv values for {vertices} vertices")]
    UvCount {
        /// UV values present.
        uvs: usize,
        /// Vertex count.
        vertices: usize,
    },
    /// Triangle list length is not a multiple of three.
    #[error("triangle list length {0} is not a multiple of 3")]
    PartialTriangle(usize),
    /// A triangle index is out of range.
    #[error("triangle index {index} out of range for {vertices} vertices")]
    TriangleIndex {
        /// Offending index.
        index: u16,
        /// Vertex count.
        vertices: usize,
    },
}

/// A texture override request that could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No slot at that index.
    #[error("slot index {index} out of range ({len} slots)")]
    SlotIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of slots.
        len: usize,
    },
    /// No slot with that name.
    #[error("no slot named `{0}`")]
    UnknownSlotName(String),
    /// The slot shows nothing, or a clip, so there is no texture to replace.
    #[error("slot {slot} has no textured attachment")]
    NoTexturedAttachment {
        /// Slot index.
        slot: usize,
    },
    /// The resolver has no region with that name.
    #[error("no texture region named `{0}`")]
    UnknownRegion(String),
    /// The view has been torn down.
    #[error("the skeleton view has been torn down")]
    TornDown,
}
