// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skeletal animation mirrored into a cached, clip-aware scene tree.
//!
//! `sinew_core` takes an already-posed skeleton (bone world transforms, slot
//! attachments, colors, draw order) and keeps a tree of drawable nodes in
//! step with it, frame after frame. It is `no_std` compatible (with `alloc`)
//! and stores the tree as struct-of-arrays with generational handles.
//!
//! # Architecture
//!
//! ```text
//!   PoseDriver::advance(dt) ──► Skeleton
//!                                  │
//!                 ┌────────────────┘
//!                 ▼
//!   AttachmentSynchronizer (per slot) ──► DrawableCache
//!                                             │
//!                 ┌───────────────────────────┘
//!                 ▼
//!   DrawOrderCompositor ──► SceneTree::evaluate() ──► Presenter::apply()
//! ```
//!
//! **[`view`]** [`SkeletonView`](view::SkeletonView) ties the frame
//! together: delay clamping, auto-update ticks, texture overrides, and
//! teardown.
//!
//! **[`sync`]** Mirrors each slot's current attachment into a sprite, a
//! mesh, or a clip mask, reusing drawables by attachment name.
//!
//! **[`composite`]** Rebuilds the root's child list from the draw order,
//! moving clipped slots under their clip's masked container.
//!
//! **[`color`]** Single and dual tint blending.
//!
//! **[`cache`]** Per-slot drawable bookkeeping and teardown.
//!
//! **[`scene`]** Struct-of-arrays node tree. Properties are set by the
//! synchronizer; world transforms, effective alphas, and effective
//! visibility are computed by evaluation.
//!
//! **[`dirty`]** Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`backend`]** The [`Presenter`](backend::Presenter) trait that host
//! integrations implement.
//!
//! **[`trace`]** [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-slot sync
//!   and per-drawable events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod atlas;
pub mod attachment;
pub mod backend;
pub mod cache;
pub mod color;
pub mod composite;
pub mod config;
pub mod dirty;
pub mod error;
pub mod scene;
pub mod skeleton;
pub mod sync;
pub mod time;
pub mod trace;
pub mod view;

#[cfg(test)]
mod testing;
