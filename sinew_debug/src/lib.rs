// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for sinew diagnostics.
//!
//! This crate provides [`TraceSink`](sinew_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory recording of every event.
//! - [`json::export`]: writes recorded events as JSON, and
//!   [`json::scene_snapshot`] dumps a scene subtree.

pub mod json;
pub mod pretty;
pub mod recorder;
