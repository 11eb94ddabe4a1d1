// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans for sinew scene trees.
//!
//! This crate flattens an evaluated [`sinew_core`] scene subtree into the
//! back-to-front draw list a renderer executes:
//!
//! - [`RenderItem`]: a sprite, a mesh, or a mask push/pop
//! - [`RenderPlan`]: an ordered list of render items for one frame

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod plan;

pub use plan::{RenderItem, RenderPlan};
