// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-order compositing.
//!
//! Each frame the root's child list is rebuilt from the skeleton's draw order.
//! A slot showing a clip opens a *clip scope*: the clip slot's own container
//! stays at top level, and every following slot up to and including the
//! clip's end slot is moved into the clip's masked container. Each absorbed
//! slot leaves a hidden placeholder at its draw position, so the root always
//! has one child per slot.
//!
//! Only one scope is open at a time. A clip met while a scope is open ends
//! that scope and opens its own. A scope still open when the draw order runs
//! out keeps its members. Draw order entries naming a missing slot, or a slot
//! already placed, are skipped.
//!
//! The new child lists are computed into reusable buffers first and then
//! applied with [`SceneTree::set_children`]: the root first, then each clip
//! container. Applying the root first detaches absorbed containers from
//! wherever they were, so no intermediate state can form a cycle.

use alloc::vec::Vec;
use core::ops::Range;

use crate::attachment::Attachment;
use crate::cache::DrawableCache;
use crate::scene::{NodeId, SceneTree};
use crate::skeleton::Skeleton;
use crate::trace::{ClipScopeEnd, ClipScopeEvent, Tracer};

/// What one [`DrawOrderCompositor::composite`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompositeReport {
    /// Clip scopes opened.
    pub scopes_opened: u32,
    /// Scopes that reached their end slot, including self-closing ones.
    pub scopes_closed: u32,
    /// Scopes ended by a following clip.
    pub superseded: u32,
    /// Whether a scope was still open at the end of the draw order.
    pub unterminated: bool,
    /// Placeholders placed at top level.
    pub placeholders: u32,
}

#[derive(Clone, Copy, Debug)]
struct OpenScope {
    slot: usize,
    container: NodeId,
    start: usize,
    end_slot: Option<usize>,
}

/// Rebuilds the root's child list from the draw order.
#[derive(Debug, Default)]
pub struct DrawOrderCompositor {
    top_level: Vec<NodeId>,
    members: Vec<NodeId>,
    scopes: Vec<(NodeId, Range<usize>)>,
    placed: Vec<bool>,
}

impl DrawOrderCompositor {
    /// Creates a compositor with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Composites `skeleton.draw_order` under `root`.
    ///
    /// Every slot must already be synchronized for this frame: a slot opens
    /// a scope only if its current attachment is a clip and its clip nodes
    /// exist.
    pub fn composite(
        &mut self,
        scene: &mut SceneTree,
        root: NodeId,
        cache: &mut DrawableCache,
        skeleton: &Skeleton,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> CompositeReport {
        self.top_level.clear();
        self.members.clear();
        self.scopes.clear();
        self.placed.clear();
        self.placed.resize(cache.len(), false);

        let mut report = CompositeReport::default();
        let mut open: Option<OpenScope> = None;

        for (position, &slot_index) in skeleton.draw_order.iter().enumerate() {
            match self.placed.get_mut(slot_index) {
                Some(placed) if !*placed => *placed = true,
                _ => {
                    log::debug!("draw order position {position}: slot {slot_index} skipped");
                    continue;
                }
            }
            let Some(drawables) = cache.slot(slot_index) else {
                continue;
            };
            let container = drawables.container();
            let attachment = skeleton
                .slots
                .get(slot_index)
                .and_then(|s| s.attachment.as_deref());
            let active_clip = match (attachment, drawables.clip()) {
                (Some(Attachment::Clip(clip)), Some(nodes)) => Some((clip.end_slot, nodes)),
                _ => None,
            };

            if let Some((end_slot, nodes)) = active_clip {
                if let Some(scope) = open.take() {
                    log::debug!(
                        "clip in slot {slot_index} supersedes the open clip of slot {}",
                        scope.slot
                    );
                    self.close(scope, ClipScopeEnd::Superseded, frame_index, tracer);
                    report.superseded += 1;
                }
                self.top_level.push(container);
                report.scopes_opened += 1;

                let scope = OpenScope {
                    slot: slot_index,
                    container: nodes.container,
                    start: self.members.len(),
                    end_slot,
                };
                if end_slot == Some(slot_index) {
                    self.close(scope, ClipScopeEnd::SelfClosed, frame_index, tracer);
                    report.scopes_closed += 1;
                } else {
                    open = Some(scope);
                }
            } else if let Some(scope) = open {
                let placeholder = cache.placeholder(scene, position);
                self.top_level.push(placeholder);
                self.members.push(container);
                report.placeholders += 1;

                if scope.end_slot == Some(slot_index) {
                    open = None;
                    self.close(scope, ClipScopeEnd::Closed, frame_index, tracer);
                    report.scopes_closed += 1;
                }
            } else {
                self.top_level.push(container);
            }
        }

        if let Some(scope) = open {
            log::debug!(
                "clip in slot {} never reached its end slot {:?}; {} slots stay clipped",
                scope.slot,
                scope.end_slot,
                self.members.len() - scope.start
            );
            self.close(scope, ClipScopeEnd::Unterminated, frame_index, tracer);
            report.unterminated = true;
        }

        scene.set_children(root, &self.top_level);
        for (container, range) in &self.scopes {
            scene.set_children(*container, &self.members[range.clone()]);
        }

        report
    }

    fn close(
        &mut self,
        scope: OpenScope,
        end: ClipScopeEnd,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) {
        let range = scope.start..self.members.len();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "member count is bounded by the slot count"
        )]
        let members = range.len() as u32;
        tracer.clip_scope(&ClipScopeEvent {
            frame_index,
            slot: scope.slot,
            members,
            end,
        });
        self.scopes.push((scope.container, range));
    }
}
