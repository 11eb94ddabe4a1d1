// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-slot attachment synchronization.
//!
//! [`AttachmentSynchronizer::sync`] mirrors one posed slot into its container:
//!
//! - **No attachment**, or a textured attachment without a region: the slot
//!   container is hidden and nothing else is touched.
//! - **Region**: the sprite cached under the attachment name becomes the only
//!   visible sprite. Region, size, and local transform are re-applied whenever
//!   the attachment object, its effective region, or the size override
//!   differ from what the sprite last showed. The container follows the bone.
//! - **Mesh**: the mesh cached under the attachment name becomes visible and
//!   its world vertices are recomputed. Vertices are in skeleton space, so
//!   the container transform is reset to identity.
//! - **Clip**: the mask polygon and the masked container are created on first
//!   use and the polygon is recomputed in skeleton space.
//!
//! The blended tint and the slot's blend mode go to the visible sprite or
//! mesh.

use alloc::sync::Arc;
use alloc::vec;

use kurbo::{Affine, Point, Size};

use crate::attachment::{
    Attachment, ClipAttachment, MeshAttachment, RegionAttachment, TextureRegion,
};
use crate::cache::{
    CacheStats, ClipDrawables, DrawableCache, DrawableEntry, DrawableKind, SlotDrawables,
};
use crate::color::{GlobalTint, Tint, TintMode, blend};
use crate::scene::{Content, NodeFlags, NodeId, Paint, SceneTree};
use crate::skeleton::{Skeleton, Slot};
use crate::trace::Tracer;

/// Result of synchronizing one slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSync {
    /// The visible sprite or mesh, if any.
    pub drawable: Option<NodeId>,
    /// Whether mesh or clip vertices were recomputed.
    pub geometry_updated: bool,
    /// Tint applied to [`drawable`](Self::drawable).
    pub tint: Option<Tint>,
}

impl SlotSync {
    const HIDDEN: Self = Self {
        drawable: None,
        geometry_updated: false,
        tint: None,
    };
}

/// Mirrors posed slots into their cached drawables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttachmentSynchronizer {
    tint: GlobalTint,
    mode: TintMode,
}

impl AttachmentSynchronizer {
    /// Creates a synchronizer with a white light tint and a black dark tint.
    #[must_use]
    pub fn new(mode: TintMode) -> Self {
        Self {
            tint: GlobalTint::default(),
            mode,
        }
    }

    /// Returns the instance-wide tint.
    #[must_use]
    pub fn tint(&self) -> GlobalTint {
        self.tint
    }

    /// Sets the instance-wide tint.
    pub fn set_tint(&mut self, tint: GlobalTint) {
        self.tint = tint;
    }

    /// Returns the tint mode.
    #[must_use]
    pub fn mode(&self) -> TintMode {
        self.mode
    }

    /// Sets the tint mode.
    pub fn set_mode(&mut self, mode: TintMode) {
        self.mode = mode;
    }

    /// Synchronizes slot `slot_index` of `skeleton` into its drawables.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of range for `skeleton` or `cache`.
    pub fn sync(
        &self,
        scene: &mut SceneTree,
        cache: &mut DrawableCache,
        skeleton: &Skeleton,
        slot_index: usize,
        tracer: &mut Tracer<'_>,
    ) -> SlotSync {
        let slot = &skeleton.slots[slot_index];
        let (drawables, stats) = cache.slot_and_stats(slot_index);
        let container = drawables.container;

        let mut ctx = SlotContext {
            scene,
            drawables,
            stats,
            tracer,
            slot_index,
        };

        let result = match slot.attachment.as_ref() {
            None => None,
            Some(attachment) => match &**attachment {
                Attachment::Region(region) => ctx
                    .sync_region(skeleton, attachment, region)
                    .map(|node| (node, false, region.color)),
                Attachment::Mesh(mesh) => ctx
                    .sync_mesh(skeleton, slot, attachment, mesh)
                    .map(|node| (node, true, mesh.color)),
                Attachment::Clip(clip) => {
                    ctx.sync_clip(skeleton, slot, clip);
                    ctx.scene.set_hidden(container, false);
                    ctx.scene.set_alpha(container, slot.color.a);
                    let result = SlotSync {
                        drawable: None,
                        geometry_updated: true,
                        tint: None,
                    };
                    ctx.trace_sync(&result);
                    return result;
                }
            },
        };

        let Some((node, geometry_updated, attachment_color)) = result else {
            ctx.scene.set_hidden(container, true);
            ctx.trace_sync(&SlotSync::HIDDEN);
            return SlotSync::HIDDEN;
        };

        ctx.scene.set_hidden(container, false);
        ctx.scene.set_alpha(container, slot.color.a);

        let tint = blend(
            self.mode,
            self.tint,
            slot.color,
            slot.dark_color,
            attachment_color,
        );
        ctx.scene.set_paint(
            node,
            Paint {
                tint: tint.light,
                dark: tint.dark,
                blend_mode: slot.blend_mode,
            },
        );

        let result = SlotSync {
            drawable: Some(node),
            geometry_updated,
            tint: Some(tint),
        };
        ctx.trace_sync(&result);
        result
    }
}

/// The name-keyed drawable maps of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cached {
    Sprite,
    Mesh,
}

impl Cached {
    const fn kind(self) -> DrawableKind {
        match self {
            Self::Sprite => DrawableKind::Sprite,
            Self::Mesh => DrawableKind::Mesh,
        }
    }
}

/// Borrowed state for one slot sync.
struct SlotContext<'s, 't, 'a> {
    scene: &'s mut SceneTree,
    drawables: &'s mut SlotDrawables,
    stats: &'s mut CacheStats,
    tracer: &'t mut Tracer<'a>,
    slot_index: usize,
}

impl SlotContext<'_, '_, '_> {
    fn sync_region(
        &mut self,
        skeleton: &Skeleton,
        attachment: &Arc<Attachment>,
        region: &RegionAttachment,
    ) -> Option<NodeId> {
        let (texture, size) = self.effective_region(attachment)?;
        self.retire_mesh();

        if self.drawables.current_sprite.as_deref() != Some(&*region.name) {
            self.retire_sprite();
            let node = self.cached_or_create(Cached::Sprite, &region.name);
            self.scene.set_hidden(node, false);
            self.drawables.current_sprite = Some(region.name.clone());
        }

        let entry = self.drawables.sprites.get_mut(&*region.name)?;
        let node = entry.node();
        if !entry.is_applied(attachment, &texture, size) {
            self.scene.set_content(
                node,
                Content::Sprite {
                    texture: texture.texture,
                    frame: texture.frame,
                    size: texture.original_size,
                    anchor: Point::new(0.5, 0.5),
                },
            );
            self.scene
                .set_transform(node, region.sprite_transform(&texture, size));
            entry.mark_applied(attachment, &texture, size);
        }
        self.scene.set_alpha(node, region.color.a);

        let bone_world = skeleton.slot_bone_world(self.slot_index);
        self.scene.set_transform(self.drawables.container, bone_world);
        Some(node)
    }

    fn sync_mesh(
        &mut self,
        skeleton: &Skeleton,
        slot: &Slot,
        attachment: &Arc<Attachment>,
        mesh: &MeshAttachment,
    ) -> Option<NodeId> {
        let (texture, size) = self.effective_region(attachment)?;
        self.retire_sprite();
        self.scene
            .set_transform(self.drawables.container, Affine::IDENTITY);

        if self.drawables.current_mesh.as_deref() != Some(&*mesh.name) {
            self.retire_mesh();
            let node = self.cached_or_create(Cached::Mesh, &mesh.name);
            self.scene.set_hidden(node, false);
            self.drawables.current_mesh = Some(mesh.name.clone());
        }

        let entry = self.drawables.meshes.get_mut(&*mesh.name)?;
        let node = entry.node();
        if !entry.is_applied(attachment, &texture, size) {
            self.scene.set_content(
                node,
                Content::Mesh {
                    texture: texture.texture,
                    frame: texture.frame,
                    vertices: vec![0.0; mesh.region_uvs.len()],
                    uvs: mesh.region_uvs.clone(),
                    indices: mesh.triangles.clone(),
                },
            );
            entry.mark_applied(attachment, &texture, size);
        }

        self.scene.edit_content(node, |content| {
            if let Content::Mesh { vertices, .. } = content {
                mesh.vertices
                    .compute_world_vertices(&skeleton.bones, slot.bone, &slot.deform, vertices);
            }
        });
        self.scene.set_alpha(node, mesh.color.a);
        Some(node)
    }

    fn sync_clip(&mut self, skeleton: &Skeleton, slot: &Slot, clip: &ClipAttachment) {
        self.retire_sprite();
        self.retire_mesh();

        let clip_nodes = match self.drawables.clip {
            Some(nodes) => nodes,
            None => self.create_clip(),
        };
        self.scene
            .set_transform(self.drawables.container, Affine::IDENTITY);

        let len = clip.vertices.world_vertices_length();
        self.scene.edit_content(clip_nodes.mask, |content| {
            if let Content::Mask { points } = content {
                points.resize(len, 0.0);
                clip.vertices
                    .compute_world_vertices(&skeleton.bones, slot.bone, &slot.deform, points);
            }
        });
    }

    /// Returns the region to draw `attachment` with and the size override.
    fn effective_region(
        &self,
        attachment: &Arc<Attachment>,
    ) -> Option<(TextureRegion, Option<Size>)> {
        let (region, size) = self.drawables.effective_region(attachment);
        region.cloned().map(|r| (r, size))
    }

    fn cached_or_create(&mut self, cached: Cached, name: &Arc<str>) -> NodeId {
        let map = match cached {
            Cached::Sprite => &mut self.drawables.sprites,
            Cached::Mesh => &mut self.drawables.meshes,
        };
        if let Some(entry) = map.get(&**name) {
            return entry.node();
        }

        let node = self.scene.create_node();
        self.scene.add_child(self.drawables.container, node);
        map.insert(name.clone(), DrawableEntry::new(node));
        match cached {
            Cached::Sprite => self.stats.sprites_created += 1,
            Cached::Mesh => self.stats.meshes_created += 1,
        }
        let kind = cached.kind();
        log::trace!(
            "slot {}: created {kind:?} {node:?} for `{name}`",
            self.slot_index
        );
        #[cfg(feature = "trace-rich")]
        self.tracer
            .drawable_created(&crate::trace::DrawableEvent {
                slot: self.slot_index,
                kind,
                node,
            });
        node
    }

    fn create_clip(&mut self) -> ClipDrawables {
        let mask = self.scene.create_with_content(Content::Mask {
            points: alloc::vec::Vec::new(),
        });
        self.scene.set_flags(
            mask,
            NodeFlags {
                hidden: false,
                renderable: false,
            },
        );
        let container = self.scene.create_node();
        self.scene.set_mask(container, Some(mask));
        self.scene.add_child(self.drawables.container, container);
        self.scene.add_child(self.drawables.container, mask);

        let nodes = ClipDrawables { mask, container };
        self.drawables.clip = Some(nodes);
        self.stats.clips_created += 1;
        log::trace!(
            "slot {}: created clip mask {mask:?} and container {container:?}",
            self.slot_index
        );
        #[cfg(feature = "trace-rich")]
        {
            let slot = self.slot_index;
            self.tracer.drawable_created(&crate::trace::DrawableEvent {
                slot,
                kind: DrawableKind::ClipMask,
                node: mask,
            });
            self.tracer.drawable_created(&crate::trace::DrawableEvent {
                slot,
                kind: DrawableKind::ClipContainer,
                node: container,
            });
        }
        nodes
    }

    fn retire_sprite(&mut self) {
        if let Some(node) = self.drawables.current_sprite() {
            self.scene.set_hidden(node, true);
        }
        self.drawables.current_sprite = None;
    }

    fn retire_mesh(&mut self) {
        if let Some(node) = self.drawables.current_mesh() {
            self.scene.set_hidden(node, true);
        }
        self.drawables.current_mesh = None;
    }

    fn trace_sync(&mut self, result: &SlotSync) {
        #[cfg(feature = "trace-rich")]
        self.tracer.slot_sync(&crate::trace::SlotSyncEvent {
            slot: self.slot_index,
            drawable: result.drawable,
            geometry_updated: result.geometry_updated,
        });
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = (&self.tracer, result);
        }
    }
}
