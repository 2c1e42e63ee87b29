// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`EventLog`] implements [`TraceSink`] and keeps an owned copy of every
//! event. Each entry is stamped with a frame number; the frame advances after
//! every [`on_evaluate`](TraceSink::on_evaluate), since a host evaluates the
//! scene once per frame.

use halo_core::scene::NodeId;
use halo_core::trace::{
    EvaluateEvent, InstanceReleasedEvent, InstanceResolvedEvent, InstanceSuspendedEvent,
    OutlineDeclaredEvent, OverlaySyncEvent, OverlaySyncKind, OverlayTeardownEvent, TraceSink,
};

/// An owned copy of a trace event.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// An [`InstanceResolvedEvent`].
    InstanceResolved {
        /// Source text.
        source: String,
        /// Instance root group.
        root: NodeId,
        /// Fresh clone root.
        clone_root: NodeId,
        /// Published mesh count.
        mesh_count: usize,
        /// Whether a previous clone was released.
        replaced: bool,
    },
    /// An [`InstanceSuspendedEvent`].
    InstanceSuspended {
        /// Source text.
        source: String,
        /// Instance root group.
        root: NodeId,
    },
    /// An [`InstanceReleasedEvent`].
    InstanceReleased(InstanceReleasedEvent),
    /// An [`OverlaySyncEvent`].
    OverlaySync(OverlaySyncEvent),
    /// An [`OverlayTeardownEvent`].
    OverlayTeardown(OverlayTeardownEvent),
    /// An [`OutlineDeclaredEvent`].
    OutlineDeclared(OutlineDeclaredEvent),
    /// An [`EvaluateEvent`].
    Evaluate(EvaluateEvent),
}

impl RecordedEvent {
    /// A short name for the event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InstanceResolved { .. } => "InstanceResolved",
            Self::InstanceSuspended { .. } => "InstanceSuspended",
            Self::InstanceReleased(_) => "InstanceReleased",
            Self::OverlaySync(e) => match e.kind {
                OverlaySyncKind::Structural => "OverlayStructuralSync",
                OverlaySyncKind::Config => "OverlayConfigSync",
            },
            Self::OverlayTeardown(_) => "OverlayTeardown",
            Self::OutlineDeclared(_) => "OutlineDeclared",
            Self::Evaluate(_) => "Evaluate",
        }
    }
}

/// One logged event and the frame it was observed in.
#[derive(Clone, Debug)]
pub struct Entry {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    frame: u64,
    entries: Vec<Entry>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every entry in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the frame the next event will be stamped with.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Counts entries matching `pred`.
    pub fn count(&self, pred: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.event)).count()
    }

    /// Drops every entry and restarts at frame 0.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.frame = 0;
    }

    fn push(&mut self, event: RecordedEvent) {
        self.entries.push(Entry {
            frame: self.frame,
            event,
        });
    }
}

impl TraceSink for EventLog {
    fn on_instance_resolved(&mut self, e: &InstanceResolvedEvent<'_>) {
        self.push(RecordedEvent::InstanceResolved {
            source: e.source.as_str().to_owned(),
            root: e.root,
            clone_root: e.clone_root,
            mesh_count: e.mesh_count,
            replaced: e.replaced,
        });
    }

    fn on_instance_suspended(&mut self, e: &InstanceSuspendedEvent<'_>) {
        self.push(RecordedEvent::InstanceSuspended {
            source: e.source.as_str().to_owned(),
            root: e.root,
        });
    }

    fn on_instance_released(&mut self, e: &InstanceReleasedEvent) {
        self.push(RecordedEvent::InstanceReleased(*e));
    }

    fn on_overlay_sync(&mut self, e: &OverlaySyncEvent) {
        self.push(RecordedEvent::OverlaySync(*e));
    }

    fn on_overlay_teardown(&mut self, e: &OverlayTeardownEvent) {
        self.push(RecordedEvent::OverlayTeardown(*e));
    }

    fn on_outline_declared(&mut self, e: &OutlineDeclaredEvent) {
        self.push(RecordedEvent::OutlineDeclared(*e));
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        self.push(RecordedEvent::Evaluate(*e));
        self.frame += 1;
    }
}
