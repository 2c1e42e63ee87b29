// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use halo_core::scene::NodeId;
use halo_core::trace::{
    EvaluateEvent, InstanceReleasedEvent, InstanceResolvedEvent, InstanceSuspendedEvent,
    OutlineDeclaredEvent, OverlaySyncEvent, OverlayTeardownEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    quiet_evaluate: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("quiet_evaluate", &self.quiet_evaluate)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            quiet_evaluate: false,
        }
    }

    /// Suppresses lines for evaluations that changed nothing.
    #[must_use]
    pub fn quiet_evaluate(mut self, quiet: bool) -> Self {
        self.quiet_evaluate = quiet;
        self
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn node(id: NodeId) -> String {
    format!("{}@{}", id.index(), id.generation())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_instance_resolved(&mut self, e: &InstanceResolvedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[instance:resolved] source={} root={} clone={} meshes={}{}",
            e.source,
            node(e.root),
            node(e.clone_root),
            e.mesh_count,
            if e.replaced { " (replaced)" } else { "" },
        );
    }

    fn on_instance_suspended(&mut self, e: &InstanceSuspendedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[instance:suspended] source={} root={}",
            e.source,
            node(e.root),
        );
    }

    fn on_instance_released(&mut self, e: &InstanceReleasedEvent) {
        let _ = writeln!(
            self.writer,
            "[instance:released] root={} nodes={} materials={}",
            node(e.root),
            e.nodes_destroyed,
            e.materials_disposed,
        );
    }

    fn on_overlay_sync(&mut self, e: &OverlaySyncEvent) {
        let _ = writeln!(
            self.writer,
            "[overlay:{}] clones={}",
            e.kind.as_str(),
            e.clones,
        );
    }

    fn on_overlay_teardown(&mut self, e: &OverlayTeardownEvent) {
        let _ = writeln!(
            self.writer,
            "[overlay:teardown] detached={} skipped={} materials={}",
            e.detached, e.skipped, e.materials_released,
        );
    }

    fn on_outline_declared(&mut self, e: &OutlineDeclaredEvent) {
        let state = if e.declared { "declared" } else { "skipped" };
        let _ = writeln!(
            self.writer,
            "[outline] selection={} {state}",
            e.selection_len,
        );
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        if self.quiet_evaluate && *e == EvaluateEvent::default() {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[evaluate] transforms={} added={} removed={} created={} materials={} disposed={}{}",
            e.transforms,
            e.added,
            e.removed,
            e.created_materials,
            e.materials,
            e.disposed_materials,
            if e.topology_changed { " topology" } else { "" },
        );
    }
}
