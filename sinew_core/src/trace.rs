// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for skeleton views.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! view calls at each stage of a frame. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates the per-slot [`SlotSyncEvent`] and
//!   per-node [`DrawableEvent`] events plus the corresponding `TraceSink`
//!   methods.

use crate::cache::TeardownReport;
use crate::view::{AbortReason, FrameReport};

#[cfg(feature = "trace-rich")]
use crate::cache::DrawableKind;
#[cfg(feature = "trace-rich")]
use crate::scene::NodeId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a clip scope ended during compositing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipScopeEnd {
    /// The end slot was reached.
    Closed,
    /// The clip names its own slot as the end slot; the scope is empty.
    SelfClosed,
    /// Another clip started before the end slot was reached.
    Superseded,
    /// The draw order ran out before the end slot was reached.
    Unterminated,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame starts, after delta-time clamping.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Per-view frame counter.
    pub frame_index: u64,
    /// Delta time requested by the host, in seconds.
    pub requested_dt: f64,
    /// Delta time handed to the pose driver, in seconds.
    pub clamped_dt: f64,
}

/// Emitted when a frame finishes synchronizing and compositing.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Per-view frame counter.
    pub frame_index: u64,
    /// What the frame did.
    pub report: FrameReport,
}

/// Emitted when a frame stops before synchronizing.
#[derive(Clone, Copy, Debug)]
pub struct FrameAbortedEvent {
    /// Per-view frame counter.
    pub frame_index: u64,
    /// Why the frame stopped.
    pub reason: AbortReason,
}

/// Emitted for every clip scope the compositor closes.
#[derive(Clone, Copy, Debug)]
pub struct ClipScopeEvent {
    /// Per-view frame counter.
    pub frame_index: u64,
    /// Slot holding the clip attachment.
    pub slot: usize,
    /// Number of slot containers moved under the clip.
    pub members: u32,
    /// How the scope ended.
    pub end: ClipScopeEnd,
}

/// Emitted once when a view releases its drawables.
#[derive(Clone, Copy, Debug)]
pub struct TeardownEvent {
    /// Frame counter at teardown.
    pub frame_index: u64,
    /// Released node counts.
    pub report: TeardownReport,
}

/// Per-slot synchronization record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct SlotSyncEvent {
    /// Slot index.
    pub slot: usize,
    /// Visible sprite or mesh after the sync, if any.
    pub drawable: Option<NodeId>,
    /// Whether mesh or clip vertices were recomputed.
    pub geometry_updated: bool,
}

/// A drawable node being created or released.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DrawableEvent {
    /// Owning slot, or the draw position for placeholders.
    pub slot: usize,
    /// Role of the node.
    pub kind: DrawableKind,
    /// The node.
    pub node: NodeId,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from skeleton views.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a frame finishes.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called when a frame stops early.
    fn on_frame_aborted(&mut self, e: &FrameAbortedEvent) {
        _ = e;
    }

    /// Called for each closed clip scope.
    fn on_clip_scope(&mut self, e: &ClipScopeEvent) {
        _ = e;
    }

    /// Called when a view releases its drawables.
    fn on_teardown(&mut self, e: &TeardownEvent) {
        _ = e;
    }

    /// Called after each slot is synchronized (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_slot_sync(&mut self, e: &SlotSyncEvent) {
        _ = e;
    }

    /// Called when a drawable node is created (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_drawable_created(&mut self, e: &DrawableEvent) {
        _ = e;
    }

    /// Called when a drawable node is destroyed (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_drawable_released(&mut self, e: &DrawableEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameEndEvent`].
    #[inline]
    pub fn frame_end(&mut self, e: &FrameEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameAbortedEvent`].
    #[inline]
    pub fn frame_aborted(&mut self, e: &FrameAbortedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_aborted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClipScopeEvent`].
    #[inline]
    pub fn clip_scope(&mut self, e: &ClipScopeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clip_scope(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TeardownEvent`].
    #[inline]
    pub fn teardown(&mut self, e: &TeardownEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_teardown(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SlotSyncEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn slot_sync(&mut self, e: &SlotSyncEvent) {
        if let Some(s) = &mut self.sink {
            s.on_slot_sync(e);
        }
    }

    /// Emits a created [`DrawableEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn drawable_created(&mut self, e: &DrawableEvent) {
        if let Some(s) = &mut self.sink {
            s.on_drawable_created(e);
        }
    }

    /// Emits a released [`DrawableEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn drawable_released(&mut self, e: &DrawableEvent) {
        if let Some(s) = &mut self.sink {
            s.on_drawable_released(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
