// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test fixtures.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use crate::attachment::{
    Attachment, ClipAttachment, MeshAttachment, RegionAttachment, TextureId, TextureRegion,
    VertexData,
};
use crate::backend::Presenter;
use crate::scene::{SceneChanges, SceneTree};
use crate::skeleton::{Bone, PoseDriver, PoseStatus, Skeleton, Slot};

/// A 32x16 region named `name`, placed on the page by name so that
/// different names get different frames.
pub(crate) fn region(name: &str) -> TextureRegion {
    let x = f64::from(name.bytes().map(u32::from).sum::<u32>());
    TextureRegion::new(name, TextureId(7), Rect::new(x, 0.0, x + 32.0, 16.0))
}

/// A region attachment named `name` that exactly covers its 32x16 region.
pub(crate) fn region_attachment(name: &str) -> Arc<Attachment> {
    Arc::new(Attachment::Region(RegionAttachment::new(
        name,
        Some(region(name)),
        32.0,
        16.0,
    )))
}

/// A 10x10 quad mesh in bone space.
pub(crate) fn mesh_attachment(name: &str) -> Arc<Attachment> {
    Arc::new(Attachment::Mesh(MeshAttachment {
        name: name.into(),
        region: Some(region(name)),
        vertices: VertexData::Unweighted(vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0]),
        region_uvs: vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
        triangles: vec![0, 1, 2, 2, 3, 0],
        color: crate::color::Color::WHITE,
    }))
}

/// A triangular clip polygon.
pub(crate) fn clip_attachment(name: &str, end_slot: Option<usize>) -> Arc<Attachment> {
    Arc::new(Attachment::Clip(ClipAttachment {
        name: name.into(),
        vertices: VertexData::Unweighted(vec![0.0, 0.0, 20.0, 0.0, 0.0, 20.0]),
        end_slot,
    }))
}

/// One bone at `(10, 20)` and one slot per attachment, named `s0`, `s1`, ...
pub(crate) fn skeleton(attachments: Vec<Option<Arc<Attachment>>>) -> Skeleton {
    let slots = attachments
        .into_iter()
        .enumerate()
        .map(|(i, a)| Slot::new(alloc::format!("s{i}"), 0, a))
        .collect();
    Skeleton::new(
        vec![Bone::new("root", Affine::translate((10.0, 20.0)))],
        slots,
    )
}

/// One scripted change applied by [`ScriptedDriver`].
#[derive(Clone, Debug)]
pub(crate) enum Step {
    /// Set a slot's attachment.
    Attach(usize, Option<Arc<Attachment>>),
    /// Replace the draw order.
    DrawOrder(Vec<usize>),
    /// Report the view destroyed.
    Destroy,
}

/// A pose driver that records every `dt` and applies one step per frame.
#[derive(Debug, Default)]
pub(crate) struct ScriptedDriver {
    pub(crate) dts: Vec<f64>,
    pub(crate) script: VecDeque<Step>,
}

impl ScriptedDriver {
    pub(crate) fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            dts: Vec::new(),
            script: script.into_iter().collect(),
        }
    }
}

impl PoseDriver for ScriptedDriver {
    fn advance(&mut self, dt: f64, skeleton: &mut Skeleton) -> PoseStatus {
        self.dts.push(dt);
        match self.script.pop_front() {
            Some(Step::Attach(slot, attachment)) => {
                skeleton.slots[slot].attachment = attachment;
            }
            Some(Step::DrawOrder(order)) => skeleton.draw_order = order,
            Some(Step::Destroy) => return PoseStatus::Destroyed,
            None => {}
        }
        PoseStatus::Posed
    }
}

/// A presenter that counts what it was asked to apply.
#[derive(Debug, Default)]
pub(crate) struct RecordingPresenter {
    pub(crate) frames: usize,
    pub(crate) added: usize,
    pub(crate) removed: usize,
    pub(crate) live: usize,
}

impl Presenter for RecordingPresenter {
    fn apply(&mut self, scene: &SceneTree, changes: &SceneChanges) {
        self.frames += 1;
        self.added += changes.added.len();
        self.removed += changes.removed.len();
        self.live = scene.node_count();
    }
}
