// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::vec::Vec;

use kurbo::Affine;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::content::{Content, NodeFlags, Paint};
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::dirty;

/// Struct-of-arrays storage for all nodes of a scene.
///
/// Nodes are addressed by [`NodeId`] handles. Destroyed nodes are recycled
/// via a free list, and generation counters reject stale handles.
#[derive(Debug)]
pub struct SceneTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties --
    pub(crate) local_transform: Vec<Affine>,
    pub(crate) local_alpha: Vec<f32>,
    pub(crate) mask: Vec<Option<NodeId>>,
    pub(crate) content: Vec<Content>,
    pub(crate) paint: Vec<Paint>,
    pub(crate) flags: Vec<NodeFlags>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) effective_alpha: Vec<f32>,
    pub(crate) effective_hidden: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    pub(crate) dirty: DirtyTracker<u32>,

    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            local_alpha: Vec::new(),
            mask: Vec::new(),
            content: Vec::new(),
            paint: Vec::new(),
            flags: Vec::new(),
            world_transform: Vec::new(),
            effective_alpha: Vec::new(),
            effective_hidden: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a detached group node and returns its handle.
    ///
    /// The node starts with an identity transform, full alpha, no mask,
    /// [`Content::Group`], default paint, and default flags.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_transform[i] = Affine::IDENTITY;
            self.local_alpha[i] = 1.0;
            self.mask[i] = None;
            self.content[i] = Content::Group;
            self.paint[i] = Paint::default();
            self.flags[i] = NodeFlags::default();
            self.world_transform[i] = Affine::IDENTITY;
            self.effective_alpha[i] = 1.0;
            self.effective_hidden[i] = false;
            self.alive[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(Affine::IDENTITY);
            self.local_alpha.push(1.0);
            self.mask.push(None);
            self.content.push(Content::Group);
            self.paint.push(Paint::default());
            self.flags.push(NodeFlags::default());
            self.world_transform.push(Affine::IDENTITY);
            self.effective_alpha.push(1.0);
            self.effective_hidden.push(false);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a detached node with the given content.
    pub fn create_with_content(&mut self, content: Content) -> NodeId {
        let id = self.create_node();
        self.content[id.idx as usize] = content;
        id
    }

    /// Destroys a node, detaching it from its parent first.
    ///
    /// # Panics
    ///
    /// Panics if the node has children or if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.alive[idx as usize] = false;
        self.content[idx as usize] = Content::Group;
        self.mask[idx as usize] = None;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }

    /// Returns whether the handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        self.link_last(parent.idx, child.idx);
        self.dirty.mark(parent.idx, dirty::TOPOLOGY);
    }

    /// Detaches `child` from its parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");
        let p = self.parent[c as usize];
        self.detach(c);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Moves `child` to the end of `new_parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        if self.parent[c as usize] != INVALID {
            let old = self.parent[c as usize];
            self.detach(c);
            self.dirty.mark(old, dirty::TOPOLOGY);
        }
        self.link_last(new_parent.idx, c);
        self.dirty.mark(new_parent.idx, dirty::TOPOLOGY);
    }

    /// Makes `children` the exact, ordered child list of `parent`.
    ///
    /// Current children missing from `children` are detached. Nodes in
    /// `children` that live under another parent are moved. Nothing is
    /// marked dirty when the child list already matches.
    ///
    /// # Panics
    ///
    /// Panics if any handle is stale, if `parent` is listed among its own
    /// children, or if a node is listed twice.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) {
        self.validate(parent);
        for &c in children {
            self.validate(c);
        }
        if self.children(parent).eq(children.iter().copied()) {
            return;
        }
        let p = parent.idx;

        // Unthread the current list. Kept children keep `parent == p` and
        // their dependency edges; dropped children are fully detached.
        let mut cur = self.first_child[p as usize];
        while cur != INVALID {
            let next = self.next_sibling[cur as usize];
            self.next_sibling[cur as usize] = INVALID;
            self.prev_sibling[cur as usize] = INVALID;
            if !children.iter().any(|c| c.idx == cur) {
                self.parent[cur as usize] = INVALID;
                self.drop_inherited_edges(cur, p);
            }
            cur = next;
        }
        self.first_child[p as usize] = INVALID;

        let mut last = INVALID;
        for child in children {
            let c = child.idx;
            assert!(c != p, "node cannot be its own child");
            let old = self.parent[c as usize];
            if old == p {
                assert!(
                    self.prev_sibling[c as usize] == INVALID && self.first_child[p as usize] != c,
                    "node listed twice in set_children"
                );
            } else {
                if old != INVALID {
                    self.detach(c);
                    self.dirty.mark(old, dirty::TOPOLOGY);
                }
                self.parent[c as usize] = p;
                let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
                let _ = self.dirty.add_dependency(c, p, dirty::ALPHA);
                self.mark_subtree_inherited_dirty(c);
            }
            if last == INVALID {
                self.first_child[p as usize] = c;
            } else {
                self.next_sibling[last as usize] = c;
                self.prev_sibling[c as usize] = last;
            }
            last = c;
        }

        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.handle(self.parent[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns all live nodes without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .filter_map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters --

    /// Returns the local transform of a node.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the local alpha of a node.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.local_alpha[id.idx as usize]
    }

    /// Returns the node whose content masks this node, if any.
    #[must_use]
    pub fn mask(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.mask[id.idx as usize]
    }

    /// Returns the content of a node.
    #[must_use]
    pub fn content(&self, id: NodeId) -> &Content {
        self.validate(id);
        &self.content[id.idx as usize]
    }

    /// Returns the paint of a node.
    #[must_use]
    pub fn paint(&self, id: NodeId) -> Paint {
        self.validate(id);
        self.paint[id.idx as usize]
    }

    /// Returns the flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns whether the node's own hidden flag is set.
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.flags(id).hidden
    }

    /// Returns the world transform computed by the last
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the effective alpha computed by the last
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn effective_alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.effective_alpha[id.idx as usize]
    }

    /// Returns whether the node or an ancestor was hidden at the last
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn effective_hidden(&self, id: NodeId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local transform of a node.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) {
        self.validate(id);
        if self.local_transform[id.idx as usize] != transform {
            self.local_transform[id.idx as usize] = transform;
            self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        }
    }

    /// Sets the local alpha of a node.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        self.validate(id);
        if self.local_alpha[id.idx as usize] != alpha {
            self.local_alpha[id.idx as usize] = alpha;
            self.dirty.mark_with(id.idx, dirty::ALPHA, &EagerPolicy);
        }
    }

    /// Sets the node whose content masks this node and its subtree.
    pub fn set_mask(&mut self, id: NodeId, mask: Option<NodeId>) {
        self.validate(id);
        if let Some(m) = mask {
            self.validate(m);
        }
        if self.mask[id.idx as usize] != mask {
            self.mask[id.idx as usize] = mask;
            self.dirty.mark(id.idx, dirty::CLIP);
        }
    }

    /// Replaces the content of a node.
    pub fn set_content(&mut self, id: NodeId, content: Content) {
        self.validate(id);
        if self.content[id.idx as usize] != content {
            self.content[id.idx as usize] = content;
            self.dirty.mark(id.idx, dirty::CONTENT);
        }
    }

    /// Edits the content of a node in place, keeping its buffers.
    ///
    /// Always marks the content dirty.
    pub fn edit_content<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Content) -> R) -> R {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::CONTENT);
        f(&mut self.content[id.idx as usize])
    }

    /// Sets the paint of a node.
    pub fn set_paint(&mut self, id: NodeId, paint: Paint) {
        self.validate(id);
        if self.paint[id.idx as usize] != paint {
            self.paint[id.idx as usize] = paint;
            self.dirty.mark(id.idx, dirty::PAINT);
        }
    }

    /// Sets the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.validate(id);
        if self.flags[id.idx as usize] != flags {
            self.flags[id.idx as usize] = flags;
            self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        }
    }

    /// Sets only the hidden flag of a node.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        let flags = NodeFlags {
            hidden,
            ..self.flags(id)
        };
        self.set_flags(id, flags);
    }

    // -- Raw-index accessors for presenters --
    //
    // These take raw slot indices as found in `SceneChanges` and skip
    // generation validation.

    /// Returns the world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Affine {
        self.assert_in_range(idx);
        self.world_transform[idx as usize]
    }

    /// Returns the effective alpha at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn effective_alpha_at(&self, idx: u32) -> f32 {
        self.assert_in_range(idx);
        self.effective_alpha[idx as usize]
    }

    /// Returns whether the node at raw slot `idx` is effectively hidden.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn effective_hidden_at(&self, idx: u32) -> bool {
        self.assert_in_range(idx);
        self.effective_hidden[idx as usize]
    }

    /// Returns the content at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> &Content {
        self.assert_in_range(idx);
        &self.content[idx as usize]
    }

    /// Returns the paint at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn paint_at(&self, idx: u32) -> Paint {
        self.assert_in_range(idx);
        self.paint[idx as usize]
    }

    /// Returns the mask reference at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn mask_at(&self, idx: u32) -> Option<NodeId> {
        self.assert_in_range(idx);
        self.mask[idx as usize]
    }

    /// Returns the parent's raw slot index, or [`INVALID`].
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn parent_at(&self, idx: u32) -> u32 {
        self.assert_in_range(idx);
        self.parent[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len
                && self.generation[id.idx as usize] == id.generation
                && self.alive[id.idx as usize],
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn assert_in_range(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    fn handle(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| NodeId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Appends `c` to `p`'s child list and wires inherited channels.
    fn link_last(&mut self, p: u32, c: u32) {
        assert!(p != c, "node cannot be its own child");
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::ALPHA);
        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
    }

    /// Unlinks `c` from its parent and drops its inherited-channel edges.
    fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.drop_inherited_edges(c, p);
    }

    fn drop_inherited_edges(&mut self, c: u32, p: u32) {
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(c, p, dirty::ALPHA);
        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::ALPHA, &EagerPolicy);
    }
}
