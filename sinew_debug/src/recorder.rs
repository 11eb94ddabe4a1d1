// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it receives,
//! in order, as a [`RecordedEvent`]. Recordings feed [`export`](crate::json::export)
//! or assertions in host tests.

use sinew_core::trace::{
    ClipScopeEvent, DrawableEvent, FrameAbortedEvent, FrameBeginEvent, FrameEndEvent,
    SlotSyncEvent, TeardownEvent, TraceSink,
};

/// A recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// A [`FrameAbortedEvent`].
    FrameAborted(FrameAbortedEvent),
    /// A [`ClipScopeEvent`].
    ClipScope(ClipScopeEvent),
    /// A [`TeardownEvent`].
    Teardown(TeardownEvent),
    /// A [`SlotSyncEvent`].
    SlotSync(SlotSyncEvent),
    /// A [`DrawableEvent`] for a newly created node.
    DrawableCreated(DrawableEvent),
    /// A [`DrawableEvent`] for a destroyed node.
    DrawableReleased(DrawableEvent),
}

impl RecordedEvent {
    /// Returns the frame counter, for events that carry one.
    #[must_use]
    pub fn frame_index(&self) -> Option<u64> {
        match self {
            Self::FrameBegin(e) => Some(e.frame_index),
            Self::FrameEnd(e) => Some(e.frame_index),
            Self::FrameAborted(e) => Some(e.frame_index),
            Self::ClipScope(e) => Some(e.frame_index),
            Self::Teardown(e) => Some(e.frame_index),
            Self::SlotSync(_) | Self::DrawableCreated(_) | Self::DrawableReleased(_) => None,
        }
    }
}

/// A [`TraceSink`] that records events into a `Vec`.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Drops all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.events.push(RecordedEvent::FrameBegin(*e));
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.events.push(RecordedEvent::FrameEnd(*e));
    }

    fn on_frame_aborted(&mut self, e: &FrameAbortedEvent) {
        self.events.push(RecordedEvent::FrameAborted(*e));
    }

    fn on_clip_scope(&mut self, e: &ClipScopeEvent) {
        self.events.push(RecordedEvent::ClipScope(*e));
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.events.push(RecordedEvent::Teardown(*e));
    }

    fn on_slot_sync(&mut self, e: &SlotSyncEvent) {
        self.events.push(RecordedEvent::SlotSync(*e));
    }

    fn on_drawable_created(&mut self, e: &DrawableEvent) {
        self.events.push(RecordedEvent::DrawableCreated(*e));
    }

    fn on_drawable_released(&mut self, e: &DrawableEvent) {
        self.events.push(RecordedEvent::DrawableReleased(*e));
    }
}
