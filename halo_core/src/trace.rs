// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for instance and effect lifecycles.
//!
//! This module provides a [`TraceSink`] trait with one method per lifecycle
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::asset::SourceId;
use crate::scene::{NodeId, SceneChanges};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which overlay trigger ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlaySyncKind {
    /// The mesh set changed identity; clones were rebuilt.
    Structural,
    /// Color or opacity changed; materials were edited in place.
    Config,
}

impl OverlaySyncKind {
    /// A short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Config => "config",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an instance (re)builds its clone from a resolved asset.
#[derive(Clone, Copy, Debug)]
pub struct InstanceResolvedEvent<'a> {
    /// The source that resolved.
    pub source: &'a SourceId,
    /// The instance's mounted root group.
    pub root: NodeId,
    /// Root of the fresh clone.
    pub clone_root: NodeId,
    /// Number of meshes published.
    pub mesh_count: usize,
    /// Whether an earlier clone was released to make room.
    pub replaced: bool,
}

/// Emitted when an instance's loader reports the source still pending.
#[derive(Clone, Copy, Debug)]
pub struct InstanceSuspendedEvent<'a> {
    /// The pending source.
    pub source: &'a SourceId,
    /// The instance's mounted root group.
    pub root: NodeId,
}

/// Emitted when an instance releases a clone, on rebuild or unmount.
#[derive(Clone, Copy, Debug)]
pub struct InstanceReleasedEvent {
    /// The instance's mounted root group.
    pub root: NodeId,
    /// Nodes destroyed along with the clone.
    pub nodes_destroyed: usize,
    /// Materials the instance disposed.
    pub materials_disposed: usize,
}

/// Emitted after an overlay sync pass.
#[derive(Clone, Copy, Debug)]
pub struct OverlaySyncEvent {
    /// Which trigger ran.
    pub kind: OverlaySyncKind,
    /// Clones owned after the pass.
    pub clones: usize,
}

/// Emitted after an overlay tears down its clones.
#[derive(Clone, Copy, Debug)]
pub struct OverlayTeardownEvent {
    /// Clones detached and destroyed.
    pub detached: usize,
    /// Clones already destroyed by an ancestor's removal.
    pub skipped: usize,
    /// Materials released.
    pub materials_released: usize,
}

/// Emitted each time an outline effect renders.
#[derive(Clone, Copy, Debug)]
pub struct OutlineDeclaredEvent {
    /// Number of meshes in the selection.
    pub selection_len: usize,
    /// Whether a pass was declared (`false` for an empty selection).
    pub declared: bool,
}

/// Summary of one [`SceneGraph::evaluate`](crate::scene::SceneGraph::evaluate).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluateEvent {
    /// World transforms recomputed.
    pub transforms: usize,
    /// Nodes created.
    pub added: usize,
    /// Nodes destroyed.
    pub removed: usize,
    /// Materials created.
    pub created_materials: usize,
    /// Materials edited.
    pub materials: usize,
    /// Materials disposed.
    pub disposed_materials: usize,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

impl From<&SceneChanges> for EvaluateEvent {
    fn from(changes: &SceneChanges) -> Self {
        Self {
            transforms: changes.transforms.len(),
            added: changes.added.len(),
            removed: changes.removed.len(),
            created_materials: changes.created_materials.len(),
            materials: changes.materials.len(),
            disposed_materials: changes.disposed_materials.len(),
            topology_changed: changes.topology_changed,
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives lifecycle trace events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an instance builds a clone.
    fn on_instance_resolved(&mut self, e: &InstanceResolvedEvent<'_>) {
        _ = e;
    }

    /// Called when an instance's source is still loading.
    fn on_instance_suspended(&mut self, e: &InstanceSuspendedEvent<'_>) {
        _ = e;
    }

    /// Called when an instance releases a clone.
    fn on_instance_released(&mut self, e: &InstanceReleasedEvent) {
        _ = e;
    }

    /// Called after an overlay sync pass.
    fn on_overlay_sync(&mut self, e: &OverlaySyncEvent) {
        _ = e;
    }

    /// Called after an overlay teardown.
    fn on_overlay_teardown(&mut self, e: &OverlayTeardownEvent) {
        _ = e;
    }

    /// Called when an outline effect renders.
    fn on_outline_declared(&mut self, e: &OutlineDeclaredEvent) {
        _ = e;
    }

    /// Called after the scene graph is evaluated.
    fn on_evaluate(&mut self, e: &EvaluateEvent) {
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

    /// Emits an [`InstanceResolvedEvent`].
    #[inline]
    pub fn instance_resolved(&mut self, e: &InstanceResolvedEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_instance_resolved(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InstanceSuspendedEvent`].
    #[inline]
    pub fn instance_suspended(&mut self, e: &InstanceSuspendedEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_instance_suspended(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InstanceReleasedEvent`].
    #[inline]
    pub fn instance_released(&mut self, e: &InstanceReleasedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_instance_released(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OverlaySyncEvent`].
    #[inline]
    pub fn overlay_sync(&mut self, e: &OverlaySyncEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_overlay_sync(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OverlayTeardownEvent`].
    #[inline]
    pub fn overlay_teardown(&mut self, e: &OverlayTeardownEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_overlay_teardown(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OutlineDeclaredEvent`].
    #[inline]
    pub fn outline_declared(&mut self, e: &OutlineDeclaredEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_outline_declared(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EvaluateEvent`].
    #[inline]
    pub fn evaluate(&mut self, e: &EvaluateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_evaluate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
