// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless host wiring every halo piece into one frame loop.

use std::task::Poll;

use halo_core::asset::LoadError;
use halo_core::backend::Presenter;
use halo_core::context::{ScopeId, Scopes};
use halo_core::instance::{AssetInstance, AssetInstanceProps};
use halo_core::scene::{SceneChanges, SceneGraph};
use halo_core::trace::{EvaluateEvent, Tracer};
use halo_render::{CompositePlan, Compositor};

use crate::backend::{RecordingCompositor, RecordingPresenter};
use crate::loader::MemoryLoader;

/// Scene, scopes, loader, and recording backends for one headless host.
///
/// Fields are public so a scenario can borrow several at once, the way a
/// host hands them to instances and effects. A frame is everything between
/// [`begin_frame`](Self::begin_frame) and [`end_frame`](Self::end_frame).
#[derive(Debug, Default)]
pub struct Stage {
    /// The scene.
    pub scene: SceneGraph,
    /// Context scopes.
    pub scopes: Scopes,
    /// The asset loader.
    pub loader: MemoryLoader,
    /// Compositor work declared this frame.
    pub plan: CompositePlan,
    /// Receives evaluated changes.
    pub presenter: RecordingPresenter,
    /// Receives the plan.
    pub compositor: RecordingCompositor,
    changes: SceneChanges,
    frame: u64,
}

impl Stage {
    /// Creates a stage around `loader`.
    #[must_use]
    pub fn new(loader: MemoryLoader) -> Self {
        Self {
            loader,
            ..Self::default()
        }
    }

    /// Number of completed frames.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Mounts an instance at the top level or under `parent_scope`.
    pub fn mount(
        &mut self,
        parent_scope: Option<ScopeId>,
        props: AssetInstanceProps,
    ) -> AssetInstance {
        AssetInstance::mount(&mut self.scene, &mut self.scopes, parent_scope, props)
    }

    /// Drives `instance` against the stage's loader.
    pub fn update(
        &mut self,
        instance: &mut AssetInstance,
        tracer: &mut Tracer<'_>,
    ) -> Poll<Result<(), LoadError>> {
        instance.update(&mut self.scene, &mut self.scopes, &mut self.loader, tracer)
    }

    /// Starts a frame: the plan is cleared so effects redeclare their passes.
    pub fn begin_frame(&mut self) {
        self.plan.clear();
    }

    /// Ends a frame: evaluates the scene and hands the changes and the plan
    /// to the backends.
    pub fn end_frame(&mut self, tracer: &mut Tracer<'_>) -> &SceneChanges {
        self.scene.evaluate_into(&mut self.changes);
        tracer.evaluate(&EvaluateEvent::from(&self.changes));
        self.presenter.apply(&self.scene, &self.changes);
        self.compositor.composite(&self.scene, &self.plan);
        self.frame += 1;
        &self.changes
    }
}
