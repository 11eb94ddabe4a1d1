// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene evaluation and change tracking.
//!
//! Evaluation drains each dirty channel in turn:
//!
//! 1. **TRANSFORM** recomputes `world_transform = parent_world * local` and
//!    `effective_hidden = parent_hidden || flags.hidden`, parents first.
//! 2. **ALPHA** recomputes `effective_alpha = parent_alpha * local_alpha`.
//! 3. **CLIP**, **CONTENT**, and **PAINT** are collected as-is; presenters
//!    read the current values from the tree.
//! 4. **TOPOLOGY** is consumed; the traversal order was rebuilt up front.
//!
//! [`SceneChanges`] carries raw slot indices so presenters can use the
//! `*_at()` accessors without generation checks.

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::INVALID;
use super::store::SceneTree;
use crate::dirty;

/// The changes produced by one [`SceneTree::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Nodes whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose effective alpha was recomputed.
    pub alphas: Vec<u32>,
    /// Nodes whose mask reference changed.
    pub masks: Vec<u32>,
    /// Nodes whose content changed.
    pub content: Vec<u32>,
    /// Nodes whose paint changed.
    pub paints: Vec<u32>,
    /// Nodes that became effectively hidden.
    pub hidden: Vec<u32>,
    /// Nodes that stopped being effectively hidden.
    pub unhidden: Vec<u32>,
    /// Nodes created since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether any child list changed.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.alphas.clear();
        self.masks.clear();
        self.content.clear();
        self.paints.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.topology_changed
            && self.transforms.is_empty()
            && self.alphas.is_empty()
            && self.masks.is_empty()
            && self.content.is_empty()
            && self.paints.is_empty()
            && self.hidden.is_empty()
            && self.unhidden.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
    }
}

impl SceneTree {
    /// Evaluates the tree and returns what changed.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let parent = self.parent[idx as usize];
            let (parent_world, parent_hidden) = if parent != INVALID {
                (
                    self.world_transform[parent as usize],
                    self.effective_hidden[parent as usize],
                )
            } else {
                (Affine::IDENTITY, false)
            };
            self.world_transform[idx as usize] = parent_world * self.local_transform[idx as usize];

            let hidden = parent_hidden || self.flags[idx as usize].hidden;
            if hidden != self.effective_hidden[idx as usize] {
                if hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[idx as usize] = hidden;
            }
        }
        changes.transforms = dirty_transforms;

        let dirty_alphas: Vec<u32> = self
            .dirty
            .drain(dirty::ALPHA)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_alphas {
            let parent = self.parent[idx as usize];
            let parent_alpha = if parent != INVALID {
                self.effective_alpha[parent as usize]
            } else {
                1.0
            };
            self.effective_alpha[idx as usize] = parent_alpha * self.local_alpha[idx as usize];
        }
        changes.alphas = dirty_alphas;

        changes.masks = self.dirty.drain(dirty::CLIP).deterministic().run().collect();
        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();
        changes.paints = self.dirty.drain(dirty::PAINT).deterministic().run().collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the depth-first pre-order of all live nodes, as of the last
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.alive[idx as usize] && self.parent[idx as usize] == INVALID {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::scene::{NodeFlags, Paint};

    #[test]
    fn evaluate_computes_world_transforms() {
        let mut tree = SceneTree::new();
        let parent = tree.create_node();
        let child = tree.create_node();
        tree.set_transform(parent, Affine::translate((10.0, 0.0)));
        tree.set_transform(child, Affine::scale(2.0));
        tree.add_child(parent, child);

        let _ = tree.evaluate();
        assert_eq!(
            tree.world_transform(child),
            Affine::translate((10.0, 0.0)) * Affine::scale(2.0)
        );
    }

    #[test]
    fn evaluate_multiplies_alpha_down_the_tree() {
        let mut tree = SceneTree::new();
        let grandparent = tree.create_node();
        let parent = tree.create_node();
        let child = tree.create_node();
        tree.add_child(grandparent, parent);
        tree.add_child(parent, child);
        tree.set_alpha(grandparent, 0.5);
        tree.set_alpha(parent, 0.8);
        tree.set_alpha(child, 0.5);

        let _ = tree.evaluate();
        let eps = 1e-6;
        assert!((tree.effective_alpha(parent) - 0.4).abs() < eps);
        assert!((tree.effective_alpha(child) - 0.2).abs() < eps);
    }

    #[test]
    fn steady_state_evaluate_is_empty() {
        let mut tree = SceneTree::new();
        let root = tree.create_node();
        let child = tree.create_node();
        tree.add_child(root, child);
        let first = tree.evaluate();
        assert_eq!(first.added.len(), 2);

        let second = tree.evaluate();
        assert!(second.is_empty());
    }

    #[test]
    fn traversal_order_is_depth_first() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        let c = tree.create_node();
        let d = tree.create_node();
        // a -> [b -> [d], c]
        tree.add_child(a, b);
        tree.add_child(a, c);
        tree.add_child(b, d);

        let _ = tree.evaluate();
        assert_eq!(tree.traversal_order(), &[a.idx, b.idx, d.idx, c.idx]);
    }

    #[test]
    fn hiding_a_parent_hides_the_subtree() {
        let mut tree = SceneTree::new();
        let parent = tree.create_node();
        let child = tree.create_node();
        tree.add_child(parent, child);
        let _ = tree.evaluate();

        tree.set_hidden(parent, true);
        let changes = tree.evaluate();
        assert!(tree.effective_hidden(child));
        assert!(changes.hidden.contains(&parent.idx));
        assert!(changes.hidden.contains(&child.idx));

        tree.set_hidden(parent, false);
        let changes = tree.evaluate();
        assert!(!tree.effective_hidden(child));
        assert!(changes.unhidden.contains(&child.idx));
    }

    #[test]
    fn renderable_flag_does_not_hide() {
        let mut tree = SceneTree::new();
        let id = tree.create_node();
        tree.set_flags(
            id,
            NodeFlags {
                hidden: false,
                renderable: false,
            },
        );
        let _ = tree.evaluate();
        assert!(!tree.effective_hidden(id));
        assert!(!tree.flags(id).renderable);
    }

    #[test]
    fn set_children_recomputes_moved_subtree() {
        let mut tree = SceneTree::new();
        let old_parent = tree.create_node();
        let new_parent = tree.create_node();
        let child = tree.create_node();
        tree.add_child(old_parent, child);
        tree.set_transform(old_parent, Affine::translate((5.0, 0.0)));
        tree.set_transform(new_parent, Affine::translate((0.0, 7.0)));
        tree.set_alpha(new_parent, 0.5);
        let _ = tree.evaluate();

        tree.set_children(new_parent, &[child]);
        let changes = tree.evaluate();
        assert!(changes.topology_changed);
        assert!(changes.transforms.contains(&child.idx));
        assert_eq!(tree.world_transform(child), Affine::translate((0.0, 7.0)));
        assert!((tree.effective_alpha(child) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn paint_changes_are_reported() {
        let mut tree = SceneTree::new();
        let id = tree.create_node();
        let _ = tree.evaluate();

        tree.set_paint(
            id,
            Paint {
                tint: Rgb::new(1.0, 0.0, 0.0),
                ..Paint::default()
            },
        );
        let changes = tree.evaluate();
        assert_eq!(changes.paints, &[id.idx]);
    }

    #[test]
    fn destroyed_nodes_are_reported_once() {
        let mut tree = SceneTree::new();
        let id = tree.create_node();
        let _ = tree.evaluate();

        tree.destroy_node(id);
        let changes = tree.evaluate();
        assert_eq!(changes.removed, &[id.idx]);
        assert!(tree.evaluate().removed.is_empty());
    }

    #[test]
    fn evaluate_into_reuses_buffer() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let mut changes = SceneChanges::default();
        tree.evaluate_into(&mut changes);
        assert_eq!(changes.added.len(), 1);

        tree.set_alpha(a, 0.5);
        tree.evaluate_into(&mut changes);
        assert!(changes.added.is_empty(), "added should be cleared");
        assert!(changes.alphas.contains(&a.idx));
    }
}
