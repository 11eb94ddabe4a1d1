// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical scene tree.
//!
//! The synchronizer never touches a host renderer directly. It builds and
//! mutates this arena-indexed tree of nodes, and a
//! [`Presenter`](crate::backend::Presenter) translates the evaluated changes
//! into the host's own add/remove/update calls.
//!
//! Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that goes stale when the
//!   node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - **Local properties** set by the caller:
//!   [`transform`](SceneTree::set_transform), [`alpha`](SceneTree::set_alpha),
//!   [`mask`](SceneTree::set_mask), [`content`](SceneTree::set_content),
//!   [`paint`](SceneTree::set_paint), and [`flags`](SceneTree::set_flags).
//! - **Computed properties** produced by [`evaluate`](SceneTree::evaluate):
//!   world transform, effective alpha, and effective hidden state.
//!
//! Setters compare against the stored value and do nothing when it is
//! unchanged, so re-applying a steady pose every frame marks nothing dirty.

mod content;
mod evaluate;
mod id;
mod store;
mod traverse;

pub use content::{Content, NodeFlags, Paint};
pub use evaluate::SceneChanges;
pub use id::{INVALID, NodeId};
pub use store::SceneTree;
pub use traverse::Children;
