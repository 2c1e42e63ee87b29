// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads an [`EventLog`](super::log::EventLog) and writes
//! [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Halo events carry no wall-clock time, so each entry is placed at
//! `frame * frame_us` microseconds. Instances and overlays get their own
//! track (`tid`) so lifecycles read as separate lanes.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::log::{EventLog, RecordedEvent};

const TID_INSTANCE: u32 = 0;
const TID_OVERLAY: u32 = 1;
const TID_OUTLINE: u32 = 2;
const TID_SCENE: u32 = 3;

/// Exports logged events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(log: &EventLog, frame_us: f64, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for entry in log.entries() {
        let ts = entry.frame as f64 * frame_us;
        let name = entry.event.name();
        let (tid, args) = match &entry.event {
            RecordedEvent::InstanceResolved {
                source,
                root,
                clone_root,
                mesh_count,
                replaced,
            } => (
                TID_INSTANCE,
                json!({
                    "source": source,
                    "root": root.index(),
                    "clone_root": clone_root.index(),
                    "mesh_count": mesh_count,
                    "replaced": replaced,
                }),
            ),
            RecordedEvent::InstanceSuspended { source, root } => (
                TID_INSTANCE,
                json!({
                    "source": source,
                    "root": root.index(),
                }),
            ),
            RecordedEvent::InstanceReleased(e) => (
                TID_INSTANCE,
                json!({
                    "root": e.root.index(),
                    "nodes_destroyed": e.nodes_destroyed,
                    "materials_disposed": e.materials_disposed,
                }),
            ),
            RecordedEvent::OverlaySync(e) => (
                TID_OVERLAY,
                json!({
                    "kind": e.kind.as_str(),
                    "clones": e.clones,
                }),
            ),
            RecordedEvent::OverlayTeardown(e) => (
                TID_OVERLAY,
                json!({
                    "detached": e.detached,
                    "skipped": e.skipped,
                    "materials_released": e.materials_released,
                }),
            ),
            RecordedEvent::OutlineDeclared(e) => (
                TID_OUTLINE,
                json!({
                    "selection_len": e.selection_len,
                    "declared": e.declared,
                }),
            ),
            RecordedEvent::Evaluate(e) => (
                TID_SCENE,
                json!({
                    "transforms": e.transforms,
                    "added": e.added,
                    "removed": e.removed,
                    "created_materials": e.created_materials,
                    "materials": e.materials,
                    "disposed_materials": e.disposed_materials,
                    "topology_changed": e.topology_changed,
                }),
            ),
        };
        events.push(json!({
            "ph": "i",
            "name": name,
            "cat": "Halo",
            "ts": ts,
            "pid": 0,
            "tid": tid,
            "s": "t",
            "args": {
                "frame": entry.frame,
                "event": args,
            }
        }));
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::trace::{
        EvaluateEvent, OverlaySyncEvent, OverlaySyncKind, OverlayTeardownEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut log = EventLog::new();
        log.on_overlay_sync(&OverlaySyncEvent {
            kind: OverlaySyncKind::Structural,
            clones: 3,
        });
        log.on_evaluate(&EvaluateEvent::default());
        log.on_overlay_teardown(&OverlayTeardownEvent {
            detached: 3,
            skipped: 0,
            materials_released: 3,
        });

        let mut out = Vec::new();
        export(&log, 16_000.0, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["name"], "OverlayStructuralSync");
        assert_eq!(parsed[0]["tid"], TID_OVERLAY);
        assert_eq!(parsed[0]["args"]["event"]["clones"], 3);

        assert_eq!(parsed[1]["name"], "Evaluate");
        assert_eq!(parsed[1]["ts"], 0.0);

        // The teardown happened in the second frame.
        assert_eq!(parsed[2]["ts"], 16_000.0);
        assert_eq!(parsed[2]["args"]["frame"], 1);
    }

    #[test]
    fn export_empty_log() {
        let mut out = Vec::new();
        export(&EventLog::new(), 16_000.0, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
