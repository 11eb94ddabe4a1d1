// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use sinew_core::trace::{
    ClipScopeEnd, ClipScopeEvent, DrawableEvent, FrameAbortedEvent, FrameBeginEvent,
    FrameEndEvent, SlotSyncEvent, TeardownEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn scope_end_name(end: ClipScopeEnd) -> &'static str {
    match end {
        ClipScopeEnd::Closed => "closed",
        ClipScopeEnd::SelfClosed => "self-closed",
        ClipScopeEnd::Superseded => "superseded",
        ClipScopeEnd::Unterminated => "UNTERMINATED",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[begin] frame={} dt={:.4}s requested={:.4}s",
            e.frame_index, e.clamped_dt, e.requested_dt,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let r = &e.report;
        let c = &r.composite;
        let _ = writeln!(
            self.writer,
            "[end] frame={} synced={} geometry={} scopes={}/{} superseded={} placeholders={}",
            e.frame_index,
            r.slots_synced,
            r.geometry_updates,
            c.scopes_closed,
            c.scopes_opened,
            c.superseded,
            c.placeholders,
        );
    }

    fn on_frame_aborted(&mut self, e: &FrameAbortedEvent) {
        let _ = writeln!(
            self.writer,
            "[aborted] frame={} reason={:?}",
            e.frame_index, e.reason,
        );
    }

    fn on_clip_scope(&mut self, e: &ClipScopeEvent) {
        let _ = writeln!(
            self.writer,
            "[clip] frame={} slot={} members={} {}",
            e.frame_index,
            e.slot,
            e.members,
            scope_end_name(e.end),
        );
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        let r = &e.report;
        let _ = writeln!(
            self.writer,
            "[teardown] frame={} nodes={} sprites={} meshes={} clip={} placeholders={} containers={}",
            e.frame_index,
            r.total(),
            r.sprites,
            r.meshes,
            r.clip_nodes,
            r.placeholders,
            r.containers,
        );
    }

    fn on_slot_sync(&mut self, e: &SlotSyncEvent) {
        let _ = match e.drawable {
            Some(node) => writeln!(
                self.writer,
                "[slot] {} -> {node:?} geometry={}",
                e.slot, e.geometry_updated,
            ),
            None => writeln!(self.writer, "[slot] {} hidden", e.slot),
        };
    }

    fn on_drawable_created(&mut self, e: &DrawableEvent) {
        let _ = writeln!(
            self.writer,
            "[create] slot={} {:?} {:?}",
            e.slot, e.kind, e.node,
        );
    }

    fn on_drawable_released(&mut self, e: &DrawableEvent) {
        let _ = writeln!(
            self.writer,
            "[release] slot={} {:?} {:?}",
            e.slot, e.kind, e.node,
        );
    }
}
