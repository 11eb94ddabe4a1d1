// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presenter contract for host scene graphs.
//!
//! Sinew never touches a host renderer directly. Every skeleton view mirrors
//! its pose into a logical [`SceneTree`]; the host then pulls the incremental
//! [`SceneChanges`] out of the tree and replays them on its own objects:
//!
//! - **Added / removed** nodes map to creating and releasing host containers,
//!   sprites, meshes, and polygon masks.
//! - **Topology** changes map to the host's own add/remove child calls. The
//!   tree is the source of truth for the ordered child list of every node.
//! - **Transforms, alphas, masks, content, paints, hidden/unhidden** map to
//!   property writes on the corresponding host object.
//!
//! # Crate boundaries
//!
//! `sinew_core` owns the skeleton model, the synchronizer, the compositor, and
//! this contract module. Host integrations depend on `sinew_core` and
//! implement [`Presenter`]; `sinew_render` provides a presenter-independent
//! flattening of the tree for renderers that redraw from scratch.

use crate::scene::{SceneChanges, SceneTree};

/// Applies evaluated scene changes to a host scene graph.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame(now: HostTime) {
///     // Pose, synchronize slots, composite draw order.
///     view.tick(now, timebase);
///
///     // Evaluate: drain dirty channels, recompute world properties.
///     let changes = view.evaluate();
///
///     // Present: apply incremental changes to the host tree.
///     presenter.apply(view.scene(), &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies the given [`SceneChanges`] to the host tree, reading current
    /// property values from `scene` as needed.
    fn apply(&mut self, scene: &SceneTree, changes: &SceneChanges);
}
