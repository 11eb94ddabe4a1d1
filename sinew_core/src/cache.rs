// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable cache.
//!
//! Every slot owns one container node plus the drawables created for the
//! attachments it has shown: sprites and meshes keyed by attachment name, and
//! at most one clip mask with its masked container. Drawables are created on
//! first use and hidden when their attachment goes inactive. They are only
//! destroyed by [`DrawableCache::release_all`] at teardown.

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Size;

use crate::attachment::{Attachment, TextureRegion};
use crate::scene::{NodeId, SceneTree};
use crate::trace::Tracer;

/// The role of a node created by the synchronizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    /// Per-slot container.
    SlotContainer,
    /// Region attachment sprite.
    Sprite,
    /// Mesh attachment mesh.
    Mesh,
    /// Clip polygon.
    ClipMask,
    /// Container masked by a clip polygon.
    ClipContainer,
    /// Hidden stand-in occupying a draw position.
    Placeholder,
}

/// What was last applied to a drawable, so unchanged frames skip the work.
#[derive(Clone, Debug)]
struct Applied {
    attachment: Arc<Attachment>,
    region: TextureRegion,
    size: Option<Size>,
}

/// A cached sprite or mesh.
#[derive(Clone, Debug)]
pub struct DrawableEntry {
    node: NodeId,
    applied: Option<Applied>,
}

impl DrawableEntry {
    pub(crate) fn new(node: NodeId) -> Self {
        Self {
            node,
            applied: None,
        }
    }

    /// Returns the drawable's node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Returns whether this exact attachment, region, and size are already
    /// applied.
    pub(crate) fn is_applied(
        &self,
        attachment: &Arc<Attachment>,
        region: &TextureRegion,
        size: Option<Size>,
    ) -> bool {
        self.applied.as_ref().is_some_and(|a| {
            Arc::ptr_eq(&a.attachment, attachment) && a.region == *region && a.size == size
        })
    }

    pub(crate) fn mark_applied(
        &mut self,
        attachment: &Arc<Attachment>,
        region: &TextureRegion,
        size: Option<Size>,
    ) {
        self.applied = Some(Applied {
            attachment: attachment.clone(),
            region: region.clone(),
            size,
        });
    }
}

/// A per-instance replacement for an attachment's texture region.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureOverride {
    /// The attachment the override applies to.
    pub attachment: Arc<Attachment>,
    /// Region drawn instead of the attachment's own.
    pub region: TextureRegion,
    /// Quad size replacing the attachment's declared width and height.
    pub size: Option<Size>,
}

/// The clip nodes of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClipDrawables {
    /// Polygon node; not renderable.
    pub mask: NodeId,
    /// Container masked by [`mask`](Self::mask); holds the slots of an open
    /// clip scope.
    pub container: NodeId,
}

/// Drawables owned by one slot.
#[derive(Debug)]
pub struct SlotDrawables {
    pub(crate) container: NodeId,
    pub(crate) sprites: HashMap<Arc<str>, DrawableEntry>,
    pub(crate) meshes: HashMap<Arc<str>, DrawableEntry>,
    pub(crate) current_sprite: Option<Arc<str>>,
    pub(crate) current_mesh: Option<Arc<str>>,
    pub(crate) clip: Option<ClipDrawables>,
    pub(crate) texture_override: Option<TextureOverride>,
}

impl SlotDrawables {
    fn new(container: NodeId) -> Self {
        Self {
            container,
            sprites: HashMap::new(),
            meshes: HashMap::new(),
            current_sprite: None,
            current_mesh: None,
            clip: None,
            texture_override: None,
        }
    }

    /// Returns the slot container.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Returns the cached sprite for an attachment name.
    #[must_use]
    pub fn sprite(&self, name: &str) -> Option<NodeId> {
        self.sprites.get(name).map(DrawableEntry::node)
    }

    /// Returns the cached mesh for an attachment name.
    #[must_use]
    pub fn mesh(&self, name: &str) -> Option<NodeId> {
        self.meshes.get(name).map(DrawableEntry::node)
    }

    /// Returns the number of cached sprites.
    #[must_use]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Returns the number of cached meshes.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Returns the attachment name of the visible sprite.
    #[must_use]
    pub fn current_sprite_name(&self) -> Option<&str> {
        self.current_sprite.as_deref()
    }

    /// Returns the attachment name of the visible mesh.
    #[must_use]
    pub fn current_mesh_name(&self) -> Option<&str> {
        self.current_mesh.as_deref()
    }

    /// Returns the visible sprite.
    #[must_use]
    pub fn current_sprite(&self) -> Option<NodeId> {
        self.current_sprite.as_deref().and_then(|n| self.sprite(n))
    }

    /// Returns the visible mesh.
    #[must_use]
    pub fn current_mesh(&self) -> Option<NodeId> {
        self.current_mesh.as_deref().and_then(|n| self.mesh(n))
    }

    /// Returns the visible sprite or mesh with its attachment name.
    #[must_use]
    pub fn active_drawable(&self) -> Option<(&str, NodeId)> {
        let sprite = self.current_sprite.as_deref().zip(self.current_sprite());
        sprite.or_else(|| self.current_mesh.as_deref().zip(self.current_mesh()))
    }

    /// Returns the clip nodes, if this slot has ever shown a clip.
    #[must_use]
    pub fn clip(&self) -> Option<ClipDrawables> {
        self.clip
    }

    /// Returns the active texture override.
    #[must_use]
    pub fn texture_override(&self) -> Option<&TextureOverride> {
        self.texture_override.as_ref()
    }

    /// Returns the region and size override to draw `attachment` with.
    pub(crate) fn effective_region<'a>(
        &'a self,
        attachment: &'a Arc<Attachment>,
    ) -> (Option<&'a TextureRegion>, Option<Size>) {
        match &self.texture_override {
            Some(o) if Arc::ptr_eq(&o.attachment, attachment) => (Some(&o.region), o.size),
            _ => (attachment.region(), None),
        }
    }
}

/// Creation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CacheStats {
    /// Slot containers created.
    pub containers_created: u32,
    /// Sprites created.
    pub sprites_created: u32,
    /// Meshes created.
    pub meshes_created: u32,
    /// Clip mask/container pairs created.
    pub clips_created: u32,
    /// Placeholders created.
    pub placeholders_created: u32,
}

/// Nodes released by [`DrawableCache::release_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TeardownReport {
    /// Sprites released.
    pub sprites: u32,
    /// Meshes released.
    pub meshes: u32,
    /// Clip masks and clip containers released (two per clip).
    pub clip_nodes: u32,
    /// Placeholders released.
    pub placeholders: u32,
    /// Slot containers released.
    pub containers: u32,
}

impl TeardownReport {
    /// Returns the total number of released nodes.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.sprites + self.meshes + self.clip_nodes + self.placeholders + self.containers
    }
}

/// All drawables of one skeleton view.
#[derive(Debug, Default)]
pub struct DrawableCache {
    slots: Vec<SlotDrawables>,
    placeholders: Vec<Option<NodeId>>,
    stats: CacheStats,
}

impl DrawableCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a slot container under `root` and registers it as the next
    /// slot.
    pub(crate) fn push_slot(&mut self, scene: &mut SceneTree, root: NodeId) -> NodeId {
        let container = scene.create_node();
        scene.add_child(root, container);
        self.slots.push(SlotDrawables::new(container));
        self.stats.containers_created += 1;
        container
    }

    /// Returns the drawables of a slot.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&SlotDrawables> {
        self.slots.get(index)
    }

    /// Returns the drawables of every slot, in slot order.
    #[must_use]
    pub fn slots(&self) -> &[SlotDrawables] {
        &self.slots
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the creation counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut SlotDrawables {
        &mut self.slots[index]
    }

    pub(crate) fn slot_and_stats(&mut self, index: usize) -> (&mut SlotDrawables, &mut CacheStats) {
        (&mut self.slots[index], &mut self.stats)
    }

    /// Returns the placeholder for a draw position, creating a hidden one on
    /// first use.
    pub(crate) fn placeholder(&mut self, scene: &mut SceneTree, position: usize) -> NodeId {
        if self.placeholders.len() <= position {
            self.placeholders.resize(position + 1, None);
        }
        let stats = &mut self.stats;
        *self.placeholders[position].get_or_insert_with(|| {
            let node = scene.create_node();
            scene.set_hidden(node, true);
            stats.placeholders_created += 1;
            node
        })
    }

    /// Destroys every node this cache created.
    ///
    /// Children go before their containers: sprites and meshes first, then
    /// clip containers (after detaching the slot containers they hold) and
    /// clip masks, then placeholders, then slot containers.
    pub(crate) fn release_all(
        &mut self,
        scene: &mut SceneTree,
        tracer: &mut Tracer<'_>,
    ) -> TeardownReport {
        let mut report = TeardownReport::default();

        for (slot_index, slot) in self.slots.iter_mut().enumerate() {
            for (_, entry) in slot.meshes.drain() {
                release(scene, tracer, slot_index, DrawableKind::Mesh, entry.node);
                report.meshes += 1;
            }
            for (_, entry) in slot.sprites.drain() {
                release(scene, tracer, slot_index, DrawableKind::Sprite, entry.node);
                report.sprites += 1;
            }
            slot.current_sprite = None;
            slot.current_mesh = None;
            slot.texture_override = None;
        }

        for (slot_index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(clip) = slot.clip.take() {
                scene.set_children(clip.container, &[]);
                scene.set_mask(clip.container, None);
                release(scene, tracer, slot_index, DrawableKind::ClipContainer, clip.container);
                release(scene, tracer, slot_index, DrawableKind::ClipMask, clip.mask);
                report.clip_nodes += 2;
            }
        }

        for (position, node) in self.placeholders.drain(..).enumerate() {
            if let Some(node) = node {
                release(scene, tracer, position, DrawableKind::Placeholder, node);
                report.placeholders += 1;
            }
        }

        for (slot_index, slot) in self.slots.drain(..).enumerate() {
            release(scene, tracer, slot_index, DrawableKind::SlotContainer, slot.container);
            report.containers += 1;
        }

        report
    }
}

fn release(
    scene: &mut SceneTree,
    tracer: &mut Tracer<'_>,
    slot: usize,
    kind: DrawableKind,
    node: NodeId,
) {
    scene.destroy_node(node);
    #[cfg(feature = "trace-rich")]
    tracer.drawable_released(&crate::trace::DrawableEvent { slot, kind, node });
    #[cfg(not(feature = "trace-rich"))]
    {
        _ = (tracer, slot, kind);
    }
}
