// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered sequence of draw items for one frame.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use sinew_core::attachment::TextureId;
use sinew_core::scene::{Content, NodeId, Paint, SceneTree};

/// A single draw command in the render plan.
///
/// Items are produced in back-to-front order, matching the scene tree's
/// depth-first child order. Geometry is in world space.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderItem {
    /// A textured quad.
    Sprite {
        /// The node this item originates from.
        node: NodeId,
        /// Texture page.
        texture: TextureId,
        /// Pixel rectangle on the page.
        frame: Rect,
        /// Maps the quad `(0, 0)..size` to world space.
        transform: Affine,
        /// Quad size.
        size: Size,
        /// Effective alpha, accumulated from ancestors.
        alpha: f32,
        /// Tint and blend mode.
        paint: Paint,
    },
    /// A textured triangle mesh.
    Mesh {
        /// The node this item originates from.
        node: NodeId,
        /// Texture page.
        texture: TextureId,
        /// Pixel rectangle on the page that `uvs` address.
        frame: Rect,
        /// World-space `x, y` pairs.
        vertices: Vec<f32>,
        /// `u, v` pairs in unit coordinates of `frame`.
        uvs: Vec<f32>,
        /// Triangle list.
        indices: Vec<u16>,
        /// Effective alpha, accumulated from ancestors.
        alpha: f32,
        /// Tint and blend mode.
        paint: Paint,
    },
    /// Starts masking by a world-space polygon. Masks nest.
    PushMask {
        /// The node carrying the polygon.
        node: NodeId,
        /// World-space `x, y` pairs.
        points: Vec<f32>,
    },
    /// Ends the innermost mask.
    PopMask,
}

/// An ordered list of draw commands for one skeleton view.
///
/// Renderers that redraw from scratch each frame build a plan from an
/// evaluated tree instead of tracking incremental changes.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Draw items in back-to-front order.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Creates an empty render plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a plan for the subtree under `root`.
    ///
    /// `scene` must have been evaluated since its last change.
    #[must_use]
    pub fn build(scene: &SceneTree, root: NodeId) -> Self {
        let mut plan = Self::new();
        plan.rebuild(scene, root);
        plan
    }

    /// Clears the plan and refills it from the subtree under `root`.
    pub fn rebuild(&mut self, scene: &SceneTree, root: NodeId) {
        self.clear();
        if scene.is_alive(root) {
            self.visit(scene, root);
        }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the number of sprite and mesh items.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, RenderItem::Sprite { .. } | RenderItem::Mesh { .. }))
            .count()
    }

    fn visit(&mut self, scene: &SceneTree, node: NodeId) {
        if scene.effective_hidden(node) {
            return;
        }

        let mask = scene.mask(node).filter(|&m| scene.is_alive(m));
        if let Some(mask) = mask {
            let points = match scene.content(mask) {
                Content::Mask { points } => to_world(scene.world_transform(mask), points),
                _ => Vec::new(),
            };
            self.items.push(RenderItem::PushMask { node: mask, points });
        }

        if scene.flags(node).renderable {
            self.push_content(scene, node);
        }
        for child in scene.children(node) {
            self.visit(scene, child);
        }

        if mask.is_some() {
            self.items.push(RenderItem::PopMask);
        }
    }

    fn push_content(&mut self, scene: &SceneTree, node: NodeId) {
        let world = scene.world_transform(node);
        let alpha = scene.effective_alpha(node);
        let paint = scene.paint(node);
        match scene.content(node) {
            Content::Sprite {
                texture,
                frame,
                size,
                anchor,
            } => {
                let origin = Vec2::new(-anchor.x * size.width, -anchor.y * size.height);
                self.items.push(RenderItem::Sprite {
                    node,
                    texture: *texture,
                    frame: *frame,
                    transform: world * Affine::translate(origin),
                    size: *size,
                    alpha,
                    paint,
                });
            }
            Content::Mesh {
                texture,
                frame,
                vertices,
                uvs,
                indices,
            } => {
                self.items.push(RenderItem::Mesh {
                    node,
                    texture: *texture,
                    frame: *frame,
                    vertices: to_world(world, vertices),
                    uvs: uvs.clone(),
                    indices: indices.clone(),
                    alpha,
                    paint,
                });
            }
            Content::Group | Content::Mask { .. } => {}
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "plan geometry is stored in f32"
)]
fn to_world(transform: Affine, points: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(points.len());
    for pair in points.chunks_exact(2) {
        let p = transform * Point::new(f64::from(pair[0]), f64::from(pair[1]));
        out.push(p.x as f32);
        out.push(p.y as f32);
    }
    out
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;

    use super::*;
    use sinew_core::attachment::{
        Attachment, ClipAttachment, RegionAttachment, TextureRegion, VertexData,
    };
    use sinew_core::config::ViewConfig;
    use sinew_core::skeleton::{Bone, Skeleton, Slot, StaticPose};
    use sinew_core::view::SkeletonView;

    fn region(name: &str, x: f64) -> Arc<Attachment> {
        let region = TextureRegion::new(name, TextureId(0), Rect::new(x, 0.0, x + 10.0, 10.0));
        Arc::new(Attachment::Region(RegionAttachment::new(
            name,
            Some(region),
            10.0,
            10.0,
        )))
    }

    fn clip(end_slot: usize) -> Arc<Attachment> {
        Arc::new(Attachment::Clip(ClipAttachment {
            name: "clip".into(),
            vertices: VertexData::Unweighted(vec![0.0, 0.0, 5.0, 0.0, 0.0, 5.0]),
            end_slot: Some(end_slot),
        }))
    }

    fn view(attachments: Vec<Option<Arc<Attachment>>>) -> SkeletonView<StaticPose> {
        let slots = attachments
            .into_iter()
            .enumerate()
            .map(|(i, a)| Slot::new(alloc::format!("s{i}"), 0, a))
            .collect();
        let skeleton = Skeleton::new(
            vec![Bone::new("root", Affine::translate((100.0, 0.0)))],
            slots,
        );
        SkeletonView::new(skeleton, StaticPose, ViewConfig::new()).unwrap()
    }

    fn kinds(plan: &RenderPlan) -> Vec<&'static str> {
        plan.items
            .iter()
            .map(|i| match i {
                RenderItem::Sprite { .. } => "sprite",
                RenderItem::Mesh { .. } => "mesh",
                RenderItem::PushMask { .. } => "push",
                RenderItem::PopMask => "pop",
            })
            .collect()
    }

    #[test]
    fn sprites_follow_draw_order() {
        let mut v = view(vec![Some(region("a", 0.0)), Some(region("b", 10.0))]);
        v.skeleton_mut().unwrap().draw_order = vec![1, 0];
        v.update(0.0);
        let _ = v.evaluate();

        let plan = RenderPlan::build(v.scene(), v.root());
        let frames: Vec<_> = plan
            .items
            .iter()
            .filter_map(|i| match i {
                RenderItem::Sprite { frame, .. } => Some(frame.x0),
                _ => None,
            })
            .collect();
        assert_eq!(frames, [10.0, 0.0]);
    }

    #[test]
    fn sprite_quad_is_centered_on_bone() {
        let mut v = view(vec![Some(region("a", 0.0))]);
        v.update(0.0);
        let _ = v.evaluate();

        let plan = RenderPlan::build(v.scene(), v.root());
        let RenderItem::Sprite {
            transform, size, ..
        } = &plan.items[0]
        else {
            panic!("expected a sprite");
        };
        let center = *transform * Point::new(size.width / 2.0, size.height / 2.0);
        assert!((center.x - 100.0).abs() < 1e-9);
        assert!(center.y.abs() < 1e-9);
    }

    #[test]
    fn clip_scope_is_bracketed_by_mask() {
        // Draw order [A, B(clip, end = D), C, D].
        let mut v = view(vec![
            Some(region("a", 0.0)),
            Some(clip(3)),
            Some(region("c", 20.0)),
            Some(region("d", 30.0)),
        ]);
        v.update(0.0);
        let _ = v.evaluate();

        let plan = RenderPlan::build(v.scene(), v.root());
        assert_eq!(kinds(&plan), ["sprite", "push", "sprite", "sprite", "pop"]);
        assert_eq!(plan.draw_count(), 3);
        let RenderItem::PushMask { points, .. } = &plan.items[1] else {
            panic!("expected a mask");
        };
        assert_eq!(points, &[100.0, 0.0, 105.0, 0.0, 100.0, 5.0]);
    }

    #[test]
    fn hidden_slots_are_skipped() {
        let mut v = view(vec![Some(region("a", 0.0)), None]);
        v.update(0.0);
        let _ = v.evaluate();
        assert_eq!(RenderPlan::build(v.scene(), v.root()).items.len(), 1);

        v.set_visible(false);
        let _ = v.evaluate();
        assert!(RenderPlan::build(v.scene(), v.root()).items.is_empty());
    }

    #[test]
    fn torn_down_view_builds_empty_plan() {
        let mut v = view(vec![Some(region("a", 0.0))]);
        v.teardown();
        let _ = v.evaluate();
        let mut plan = RenderPlan::new();
        plan.rebuild(v.scene(), v.root());
        assert!(plan.items.is_empty());
    }
}
