// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded events and scene snapshots.
//!
//! [`export`] writes a recording from a [`RecorderSink`](crate::recorder::RecorderSink)
//! as a JSON array of event objects. [`scene_snapshot`] dumps a scene subtree
//! for diffing between frames.

use std::io::{self, Write};

use serde_json::{Value, json};

use sinew_core::scene::{Content, NodeId, SceneTree};

use crate::recorder::RecordedEvent;

/// Writes `events` as a JSON array to `writer`.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let values: Vec<Value> = events.iter().map(event_to_json).collect();
    serde_json::to_writer_pretty(&mut *writer, &values)?;
    writeln!(writer)
}

/// Converts one recorded event into a JSON object with `name`, `frame`
/// (or `null`), and `args` fields.
#[must_use]
pub fn event_to_json(event: &RecordedEvent) -> Value {
    let (name, args) = match event {
        RecordedEvent::FrameBegin(e) => (
            "FrameBegin",
            json!({
                "requested_dt": e.requested_dt,
                "clamped_dt": e.clamped_dt,
            }),
        ),
        RecordedEvent::FrameEnd(e) => {
            let c = &e.report.composite;
            (
                "FrameEnd",
                json!({
                    "dt": e.report.dt,
                    "slots_synced": e.report.slots_synced,
                    "geometry_updates": e.report.geometry_updates,
                    "scopes_opened": c.scopes_opened,
                    "scopes_closed": c.scopes_closed,
                    "superseded": c.superseded,
                    "unterminated": c.unterminated,
                    "placeholders": c.placeholders,
                }),
            )
        }
        RecordedEvent::FrameAborted(e) => (
            "FrameAborted",
            json!({ "reason": format!("{:?}", e.reason) }),
        ),
        RecordedEvent::ClipScope(e) => (
            "ClipScope",
            json!({
                "slot": e.slot,
                "members": e.members,
                "end": format!("{:?}", e.end),
            }),
        ),
        RecordedEvent::Teardown(e) => (
            "Teardown",
            json!({
                "sprites": e.report.sprites,
                "meshes": e.report.meshes,
                "clip_nodes": e.report.clip_nodes,
                "placeholders": e.report.placeholders,
                "containers": e.report.containers,
            }),
        ),
        RecordedEvent::SlotSync(e) => (
            "SlotSync",
            json!({
                "slot": e.slot,
                "drawable": e.drawable.map(node_json),
                "geometry_updated": e.geometry_updated,
            }),
        ),
        RecordedEvent::DrawableCreated(e) | RecordedEvent::DrawableReleased(e) => (
            if matches!(event, RecordedEvent::DrawableCreated(_)) {
                "DrawableCreated"
            } else {
                "DrawableReleased"
            },
            json!({
                "slot": e.slot,
                "kind": format!("{:?}", e.kind),
                "node": node_json(e.node),
            }),
        ),
    };
    json!({
        "name": name,
        "frame": event.frame_index(),
        "args": args,
    })
}

/// Dumps the subtree under `root` as nested JSON objects.
///
/// Each object carries the node's handle, local and effective visibility,
/// alpha, content kind, mask handle, and children in draw order. `scene`
/// should have been evaluated so that effective values are current.
#[must_use]
pub fn scene_snapshot(scene: &SceneTree, root: NodeId) -> Value {
    if !scene.is_alive(root) {
        return Value::Null;
    }
    let children: Vec<Value> = scene
        .children(root)
        .map(|child| scene_snapshot(scene, child))
        .collect();
    let flags = scene.flags(root);
    let content = match scene.content(root) {
        Content::Group => json!("group"),
        Content::Sprite { frame, size, .. } => json!({
            "sprite": {
                "frame": [frame.x0, frame.y0, frame.x1, frame.y1],
                "size": [size.width, size.height],
            }
        }),
        Content::Mesh {
            vertices, indices, ..
        } => json!({
            "mesh": {
                "vertices": vertices.len() / 2,
                "triangles": indices.len() / 3,
            }
        }),
        Content::Mask { points } => json!({ "mask": { "points": points.len() / 2 } }),
    };
    json!({
        "node": node_json(root),
        "hidden": flags.hidden,
        "effective_hidden": scene.effective_hidden(root),
        "renderable": flags.renderable,
        "alpha": scene.alpha(root),
        "content": content,
        "mask": scene.mask(root).map(node_json),
        "children": children,
    })
}

fn node_json(node: NodeId) -> Value {
    json!([node.index(), node.generation()])
}
