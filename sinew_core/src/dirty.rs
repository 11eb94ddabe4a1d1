// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The scene tree uses multi-channel dirty tracking (via [`understory_dirty`])
//! so that a frame in which only a few slots moved produces a small
//! [`SceneChanges`](crate::scene::SceneChanges) set.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`TRANSFORM`] and [`ALPHA`] are marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have child-to-parent
//!   dependency edges, since world transforms, effective alpha, and effective
//!   hidden state are inherited. Flag changes are routed through
//!   [`TRANSFORM`] so one drain recomputes both.
//!
//! - **Local-only**: [`CLIP`], [`CONTENT`], and [`PAINT`] only report the
//!   node that was touched. Mask references, drawable content, and tint are
//!   per-node.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on every child-list mutation and
//!   triggers a traversal-order rebuild during evaluation.

use understory_dirty::Channel;

/// Transform or flags changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Alpha changed.
pub const ALPHA: Channel = Channel::new(1);

/// Mask reference changed.
pub const CLIP: Channel = Channel::new(2);

/// Drawable content (texture, vertices, polygon) changed.
pub const CONTENT: Channel = Channel::new(3);

/// Child lists changed.
pub const TOPOLOGY: Channel = Channel::new(4);

/// Tint or blend mode changed.
pub const PAINT: Channel = Channel::new(5);
